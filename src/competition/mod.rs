//! Live score synchronisation against external league scoreboards.
//!
//! Each supported league is a [`Competition`] variant backed by one
//! [`CompetitionAdapter`]. The [`SyncEngine`] picks the adapter for a game,
//! maps the fetched `scoreA`/`scoreB` pair onto the club's side, and patches
//! the stored game.

pub mod batch;
pub mod cehl;
pub mod engine;
pub mod rbihf;

use std::{fmt, str::FromStr};

use async_trait::async_trait;
use reqwest::{
    Client, StatusCode,
    header::{HeaderMap, HeaderValue},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::{errors::AppError, models::GamePatch};

pub use batch::{
    MAX_REFRESH_HOURS, MessageLevel, SyncLine, SyncLineView, SyncReport, needs_refresh,
    update_scores, validate_hours,
};
pub use engine::SyncEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Competition {
    #[serde(rename = "RBIHF")]
    Rbihf,
    #[serde(rename = "CEHL")]
    Cehl,
}

impl Competition {
    pub const ALL: [Competition; 2] = [Competition::Rbihf, Competition::Cehl];

    pub fn key(&self) -> &'static str {
        match self {
            Competition::Rbihf => "RBIHF",
            Competition::Cehl => "CEHL",
        }
    }
}

impl fmt::Display for Competition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Competition {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Competition::ALL
            .into_iter()
            .find(|c| c.key() == s)
            .ok_or_else(|| SyncError::UnknownCompetition(s.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Competition '{0}' is not registered")]
    UnknownCompetition(String),

    #[error("Game is linked to {0} but has no external game ID")]
    MissingGameId(Competition),

    #[error("Fetching {competition} data failed: {reason}")]
    FetchFailed {
        competition: Competition,
        reason: String,
    },

    #[error("Season lookup failed: {0}")]
    Season(AppError),

    #[error("Storing game update failed: {0}")]
    Store(AppError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The game has no competition set.
    Skipped,
    Updated(GamePatch),
}

/// What an adapter needs to address one game on its scoreboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRequest {
    pub game_id: String,
    pub season_code: String,
}

/// Raw scoreboard data. Scores are in the feed's own order: `score_a` belongs
/// to the home side of the fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawScore {
    pub score_a: i32,
    pub score_b: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreFetch {
    pub live: Option<bool>,
    pub score: Option<RawScore>,
}

impl ScoreFetch {
    /// Turns feed data into a patch for our game. Away games swap the pair.
    pub fn into_patch(self, is_home_game: bool) -> GamePatch {
        let (score_team, score_opponent) = match self.score {
            Some(RawScore { score_a, score_b }) if is_home_game => (Some(score_a), Some(score_b)),
            Some(RawScore { score_a, score_b }) => (Some(score_b), Some(score_a)),
            None => (None, None),
        };

        GamePatch {
            live: self.live,
            score_team,
            score_opponent,
        }
    }
}

#[async_trait]
pub trait CompetitionAdapter: Send + Sync {
    async fn fetch(&self, request: &ScoreRequest) -> Result<ScoreFetch, SyncError>;
}

/// The feeds report `live` as a bool or as `0`/`1`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum LiveFlag {
    Bool(bool),
    Int(i64),
}

impl LiveFlag {
    fn is_live(self) -> bool {
        match self {
            LiveFlag::Bool(live) => live,
            LiveFlag::Int(n) => n == 1,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScorePayload {
    score_a: i32,
    score_b: i32,
}

impl From<ScorePayload> for RawScore {
    fn from(p: ScorePayload) -> Self {
        RawScore {
            score_a: p.score_a,
            score_b: p.score_b,
        }
    }
}

/// Base header set both feeds expect from their own web client.
fn client_headers(host: &str, accept: &str, connection: &str, referer: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let pairs = [
        ("cookie", "language=en"),
        ("postman-token", "clubmanager"),
        ("host", host),
        ("user-agent", "PostmanRuntime/7.37.0"),
        ("accept", accept),
        ("connection", connection),
        ("referer", referer),
        ("x-requested-with", "XMLHttpRequest"),
    ];

    for (name, value) in pairs {
        match value.parse::<HeaderValue>() {
            Ok(value) => {
                headers.insert(name, value);
            }
            Err(_) => tracing::warn!("Dropping invalid {name} header value: {value}"),
        }
    }
    headers
}

/// GET returning the decoded body on HTTP 200. Anything else is reported as
/// the failure reason.
async fn fetch_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    query: &[(&str, &str)],
    headers: HeaderMap,
) -> Result<T, String> {
    tracing::debug!("GET {url} {query:?}");

    let response = client
        .get(url)
        .query(query)
        .headers(headers)
        .send()
        .await
        .map_err(|e| format!("request to {url} failed: {e}"))?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(format!("{url} returned {status}"));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| format!("invalid response from {url}: {e}"))
}
