use std::{collections::HashMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::HomeVenue, errors::AppError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: Uuid,
    pub team: String,
    pub opponent: Option<String>,
    pub game_type: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub season_id: Option<i32>,
    pub competition: Option<String>,
    pub game_id: Option<String>,
    pub live: bool,
    pub score_team: Option<i32>,
    pub score_opponent: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} vs {}",
            self.team,
            self.opponent.as_deref().unwrap_or("TBD")
        )
    }
}

impl Game {
    pub fn new(team: impl Into<String>, game_type: impl Into<String>, date: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            team: team.into(),
            opponent: None,
            game_type: game_type.into(),
            date,
            location: String::new(),
            season_id: None,
            competition: None,
            game_id: None,
            live: false,
            score_team: Some(0),
            score_opponent: Some(0),
            created_at: now,
            modified_at: now,
        }
    }

    pub fn is_home_game(&self, venue: &HomeVenue) -> bool {
        venue.matches(&self.location)
    }

    pub fn is_passed(&self, now: DateTime<Utc>) -> bool {
        self.date <= now
    }

    pub fn to_redis_hash(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("id".into(), self.id.to_string());
        map.insert("team".into(), self.team.clone());
        map.insert("game_type".into(), self.game_type.clone());
        map.insert("date".into(), self.date.to_rfc3339());
        map.insert("location".into(), self.location.clone());
        map.insert("live".into(), self.live.to_string());
        map.insert("created_at".into(), self.created_at.to_rfc3339());
        map.insert("modified_at".into(), self.modified_at.to_rfc3339());
        if let Some(ref opponent) = self.opponent {
            map.insert("opponent".into(), opponent.clone());
        }
        if let Some(season_id) = self.season_id {
            map.insert("season_id".into(), season_id.to_string());
        }
        if let Some(ref competition) = self.competition {
            map.insert("competition".into(), competition.clone());
        }
        if let Some(ref game_id) = self.game_id {
            map.insert("game_id".into(), game_id.clone());
        }
        if let Some(score) = self.score_team {
            map.insert("score_team".into(), score.to_string());
        }
        if let Some(score) = self.score_opponent {
            map.insert("score_opponent".into(), score.to_string());
        }
        map
    }

    pub fn from_redis_hash(map: &HashMap<String, String>) -> Result<Self, AppError> {
        let required = |field: &str| {
            map.get(field)
                .ok_or_else(|| AppError::Deserialization(format!("Missing {field}")))
        };
        let timestamp = |field: &str| -> Result<DateTime<Utc>, AppError> {
            DateTime::parse_from_rfc3339(required(field)?)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| AppError::Deserialization(format!("Invalid timestamp for {field}")))
        };
        let optional_int = |field: &str| -> Result<Option<i32>, AppError> {
            map.get(field)
                .map(|raw| {
                    raw.parse::<i32>()
                        .map_err(|_| AppError::Deserialization(format!("Invalid {field}")))
                })
                .transpose()
        };

        Ok(Self {
            id: required("id")?
                .parse()
                .map_err(|_| AppError::Deserialization("Invalid UUID for id".into()))?,
            team: required("team")?.clone(),
            opponent: map.get("opponent").cloned(),
            game_type: required("game_type")?.clone(),
            date: timestamp("date")?,
            location: map.get("location").cloned().unwrap_or_default(),
            season_id: optional_int("season_id")?,
            competition: map.get("competition").cloned(),
            game_id: map.get("game_id").cloned(),
            live: map
                .get("live")
                .map(|raw| raw == "true")
                .unwrap_or(false),
            score_team: optional_int("score_team")?,
            score_opponent: optional_int("score_opponent")?,
            created_at: timestamp("created_at")?,
            modified_at: timestamp("modified_at")?,
        })
    }
}

/// Fields the score sync is allowed to touch. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamePatch {
    pub live: Option<bool>,
    pub score_team: Option<i32>,
    pub score_opponent: Option<i32>,
}

impl GamePatch {
    pub fn is_empty(&self) -> bool {
        self.live.is_none() && self.score_team.is_none() && self.score_opponent.is_none()
    }

    pub fn apply_to(&self, game: &mut Game) {
        if let Some(live) = self.live {
            game.live = live;
        }
        if let Some(score) = self.score_team {
            game.score_team = Some(score);
        }
        if let Some(score) = self.score_opponent {
            game.score_opponent = Some(score);
        }
    }

    pub fn to_redis_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(live) = self.live {
            fields.push(("live", live.to_string()));
        }
        if let Some(score) = self.score_team {
            fields.push(("score_team", score.to_string()));
        }
        if let Some(score) = self.score_opponent {
            fields.push(("score_opponent", score.to_string()));
        }
        fields
    }
}

/// Public read-only representation with the derived flags filled in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    #[serde(flatten)]
    pub game: Game,
    pub is_home_game: bool,
    pub is_passed: bool,
}

impl GameView {
    pub fn new(game: Game, venue: &HomeVenue, now: DateTime<Utc>) -> Self {
        Self {
            is_home_game: game.is_home_game(venue),
            is_passed: game.is_passed(now),
            game,
        }
    }
}
