use std::{str::FromStr, time::Duration};

use crate::{competition::validate_hours, errors::AppError};

pub const DEFAULT_RBIHF_URL: &str = "https://rbihf.be/modules/league/ajax/time.php";
pub const DEFAULT_CEHL_URL: &str = "https://www.cehl.eu/ajax/";

/// The club's own venue. A game is a home game when its location matches the
/// name or one of the aliases, ignoring case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeVenue {
    pub name: String,
    pub aliases: Vec<String>,
}

impl HomeVenue {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn matches(&self, location: &str) -> bool {
        let location = location.trim().to_lowercase();
        std::iter::once(&self.name)
            .chain(self.aliases.iter())
            .any(|candidate| candidate.trim().to_lowercase() == location)
    }
}

impl Default for HomeVenue {
    fn default() -> Self {
        Self::new("Home")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompetitionEndpoints {
    pub rbihf_url: String,
    pub cehl_url: String,
}

impl Default for CompetitionEndpoints {
    fn default() -> Self {
        Self {
            rbihf_url: DEFAULT_RBIHF_URL.into(),
            cehl_url: DEFAULT_CEHL_URL.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub endpoints: CompetitionEndpoints,
    pub timeout: Duration,
    pub concurrency: usize,
    /// Zero disables the in-process scheduler.
    pub interval: Duration,
    pub hours: i64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            endpoints: CompetitionEndpoints::default(),
            timeout: Duration::from_secs(10),
            concurrency: 4,
            interval: Duration::from_secs(300),
            hours: 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub redis_url: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub home_venue: HomeVenue,
    pub sync: SyncSettings,
}

impl Settings {
    /// Reads settings from the environment, loading `.env` first when present.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let home_venue = HomeVenue::new(
            optional("CLUB_HOME_LOCATION").unwrap_or_else(|| HomeVenue::default().name),
        )
        .with_aliases(optional("CLUB_HOME_ALIASES").map(split_list).unwrap_or_default());

        let defaults = SyncSettings::default();
        let sync = SyncSettings {
            endpoints: CompetitionEndpoints {
                rbihf_url: optional("RBIHF_URL").unwrap_or_else(|| DEFAULT_RBIHF_URL.into()),
                cehl_url: optional("CEHL_URL").unwrap_or_else(|| DEFAULT_CEHL_URL.into()),
            },
            timeout: parsed::<u64>("SYNC_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            concurrency: parsed::<usize>("SYNC_CONCURRENCY")?
                .unwrap_or(defaults.concurrency)
                .max(1),
            interval: parsed::<u64>("SYNC_INTERVAL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.interval),
            hours: match parsed::<i64>("SYNC_HOURS")? {
                Some(hours) => validate_hours(hours)
                    .map_err(|e| AppError::EnvError(format!("SYNC_HOURS: {e}")))?,
                None => defaults.hours,
            },
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            redis_url: required("REDIS_URL")?,
            port: parsed::<u16>("PORT")?.unwrap_or(3001),
            allowed_origins: optional("ALLOWED_ORIGINS")
                .map(split_list)
                .unwrap_or_else(|| vec!["http://localhost:3000".to_string()]),
            home_venue,
            sync,
        })
    }
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn required(key: &str) -> Result<String, AppError> {
    optional(key).ok_or_else(|| AppError::EnvError(format!("{key} must be set")))
}

fn parsed<T: FromStr>(key: &str) -> Result<Option<T>, AppError> {
    optional(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|_| AppError::EnvError(format!("Invalid value for {key}: {raw}")))
        })
        .transpose()
}

fn split_list(raw: String) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
