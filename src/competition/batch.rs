use std::fmt;

use chrono::{DateTime, Duration, Utc};
use futures::{StreamExt, stream};
use serde::Serialize;
use uuid::Uuid;

use super::{SyncEngine, SyncError, SyncOutcome};
use crate::{errors::AppError, models::Game};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Success,
    Info,
    Warning,
}

/// Longest refresh window accepted, one year.
pub const MAX_REFRESH_HOURS: i64 = 24 * 365;

pub fn validate_hours(hours: i64) -> Result<i64, AppError> {
    if (0..=MAX_REFRESH_HOURS).contains(&hours) {
        Ok(hours)
    } else {
        Err(AppError::BadRequest(format!(
            "Refresh window must be between 0 and {MAX_REFRESH_HOURS} hours, got {hours}"
        )))
    }
}

/// Live games, plus games that started within the last `hours`.
pub fn needs_refresh(game: &Game, now: DateTime<Utc>, hours: i64) -> bool {
    let since = Duration::try_hours(hours).and_then(|window| now.checked_sub_signed(window));
    game.live || (game.date <= now && since.is_some_and(|since| game.date >= since))
}

#[derive(Debug)]
pub struct SyncLine {
    pub game: Game,
    pub result: Result<SyncOutcome, SyncError>,
}

impl SyncLine {
    pub fn level(&self) -> MessageLevel {
        match self.result {
            Ok(SyncOutcome::Updated(_)) => MessageLevel::Success,
            Ok(SyncOutcome::Skipped) | Err(_) => MessageLevel::Warning,
        }
    }
}

impl fmt::Display for SyncLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            Ok(SyncOutcome::Updated(_)) => {
                write!(f, "Game information updated for \"{}\"", self.game)
            }
            Ok(SyncOutcome::Skipped) => {
                write!(f, "Skipped \"{}\" - no competition set", self.game)
            }
            Err(e) => write!(f, "Could not update \"{}\" - {}", self.game, e),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncLineView {
    pub game_id: Uuid,
    pub level: MessageLevel,
    pub message: String,
}

impl From<&SyncLine> for SyncLineView {
    fn from(line: &SyncLine) -> Self {
        Self {
            game_id: line.game.id,
            level: line.level(),
            message: line.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct SyncReport {
    pub lines: Vec<SyncLine>,
}

impl SyncReport {
    pub fn updated(&self) -> usize {
        self.count(|r| matches!(r, Ok(SyncOutcome::Updated(_))))
    }

    pub fn skipped(&self) -> usize {
        self.count(|r| matches!(r, Ok(SyncOutcome::Skipped)))
    }

    pub fn failed(&self) -> usize {
        self.count(Result::is_err)
    }

    fn count(&self, pred: impl Fn(&Result<SyncOutcome, SyncError>) -> bool) -> usize {
        self.lines.iter().filter(|l| pred(&l.result)).count()
    }

    pub fn views(&self) -> Vec<SyncLineView> {
        self.lines.iter().map(SyncLineView::from).collect()
    }
}

/// Syncs every game that is live or started within the last `hours`.
///
/// Games are fetched concurrently, at most `concurrency` at a time. A failure
/// only marks its own line; the rest of the batch carries on. Lines come back
/// in game date order.
pub async fn update_scores(
    engine: &SyncEngine,
    hours: i64,
    now: DateTime<Utc>,
    concurrency: usize,
) -> Result<SyncReport, AppError> {
    let hours = validate_hours(hours)?;
    let games: Vec<Game> = engine
        .games()
        .list_games()
        .await?
        .into_iter()
        .filter(|g| needs_refresh(g, now, hours))
        .collect();

    tracing::info!("Refreshing {} game(s) within the last {hours}h", games.len());

    let mut lines: Vec<SyncLine> = stream::iter(games)
        .map(|game| async move {
            let result = engine.sync(&game).await;
            SyncLine { game, result }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    lines.sort_by_key(|l| l.game.date);

    for line in &lines {
        match line.level() {
            MessageLevel::Warning => tracing::warn!("{line}"),
            _ => tracing::info!("{line}"),
        }
    }

    Ok(SyncReport { lines })
}
