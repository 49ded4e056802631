use clap::{Parser, Subcommand};
use clubmanager::{
    competition::{MAX_REFRESH_HOURS, MessageLevel},
    config::Settings,
    errors::AppError,
    seasons::DurationUnit,
};

const ENVIRONMENT_HELP: &str = "Environment:
  DATABASE_URL         Postgres connection string (seasons)
  REDIS_URL            Redis connection string (games)
  PORT                 HTTP port (default 3001)
  CLUB_HOME_LOCATION   Home venue name
  CLUB_HOME_ALIASES    Comma separated alternative venue names
  SYNC_INTERVAL_SECS   Scheduled refresh interval, 0 disables (default 300)";

#[derive(Parser)]
#[command(name = "clubmanager")]
#[command(about = "Club game scores and seasons service", version)]
#[command(after_help = ENVIRONMENT_HELP)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service (default).
    Serve,
    /// Refresh live and recently started games once.
    UpdateScores {
        /// Look-back window in hours (defaults to SYNC_HOURS).
        #[arg(long, value_parser = clap::value_parser!(i64).range(0..=MAX_REFRESH_HOURS))]
        hours: Option<i64>,
    },
    /// Create the season following the latest one.
    AddSeason {
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        duration: u32,
        #[arg(long, value_enum, default_value = "year")]
        unit: DurationUnit,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    clubmanager::init_tracing();

    if let Err(e) = run(cli.command.unwrap_or(Commands::Serve)).await {
        tracing::error!("{}", e);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> Result<(), AppError> {
    let settings = Settings::from_env()?;

    match command {
        Commands::Serve => clubmanager::start_server(settings).await,
        Commands::UpdateScores { hours } => {
            let hours = hours.unwrap_or(settings.sync.hours);
            let report = clubmanager::run_update_scores(settings, hours).await?;
            for line in &report.lines {
                match line.level() {
                    MessageLevel::Warning => println!("WARNING: {line}"),
                    _ => println!("{line}"),
                }
            }
            Ok(())
        }
        Commands::AddSeason { duration, unit } => {
            let season = clubmanager::run_add_season(settings, duration, unit).await?;
            println!(
                "Created {} ({} - {})",
                season.label(),
                season.start_date,
                season.end_date
            );
            Ok(())
        }
    }
}
