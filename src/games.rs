use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::{
    config::HomeVenue,
    db::{GameStore, SeasonStore},
    errors::AppError,
    models::Game,
    seasons,
};

/// Games that started this long ago still show up in the public feed.
pub const RECENT_GAME_HOURS: i64 = 3;

/// Full save of a game.
///
/// The season is always derived from the game date, whatever the caller put in
/// `season_id`. A date outside every season fails and nothing is written. A
/// blank location falls back to the home venue.
pub async fn save_game(
    seasons_store: &dyn SeasonStore,
    games: &dyn GameStore,
    venue: &HomeVenue,
    mut game: Game,
) -> Result<Game, AppError> {
    let season = seasons::get_season(seasons_store, Some(game.date.date_naive())).await?;
    game.season_id = Some(season.id);

    if game.location.trim().is_empty() {
        game.location = venue.name.clone();
    }

    game.modified_at = Utc::now();
    games.save_game(&game).await?;

    tracing::info!("Saved game {} ({}) in {}", game, game.id, season.label());
    Ok(game)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicGameQuery {
    pub team: Option<String>,
    pub count: Option<usize>,
    #[serde(default)]
    pub home_games_only: bool,
    #[serde(default)]
    pub all_games_for_season: bool,
}

/// Games of the given season as exposed by the public API.
///
/// Unless the whole season is requested, only upcoming, live, or recently
/// started games are kept and the list is cut at `count` (default 5) plus
/// one slot per live game.
pub fn select_public_games(
    games: Vec<Game>,
    season_id: i32,
    query: &PublicGameQuery,
    venue: &HomeVenue,
    now: DateTime<Utc>,
) -> Vec<Game> {
    let recent_cutoff = now - Duration::hours(RECENT_GAME_HOURS);
    let team = query
        .team
        .as_deref()
        .filter(|t| !t.eq_ignore_ascii_case("all"))
        .map(str::to_lowercase);

    let selected: Vec<Game> = games
        .into_iter()
        .filter(|g| g.season_id == Some(season_id))
        .filter(|g| query.all_games_for_season || g.live || g.date >= recent_cutoff)
        .filter(|g| team.as_ref().is_none_or(|t| g.team.to_lowercase() == *t))
        .filter(|g| !query.home_games_only || g.is_home_game(venue))
        .collect();

    if query.all_games_for_season {
        return selected;
    }

    let live_count = selected.iter().filter(|g| g.live).count();
    let limit = query.count.unwrap_or(5).saturating_add(live_count);
    selected.into_iter().take(limit).collect()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminGameFilter {
    pub team: Option<String>,
    pub season: Option<i32>,
    pub opponent: Option<String>,
    pub competition: Option<String>,
    /// Only games on or after this moment.
    pub date: Option<DateTime<Utc>>,
}

impl AdminGameFilter {
    pub fn matches(&self, game: &Game) -> bool {
        let eq = |wanted: &Option<String>, actual: Option<&str>| {
            wanted
                .as_deref()
                .is_none_or(|w| actual.is_some_and(|a| a.eq_ignore_ascii_case(w)))
        };

        eq(&self.team, Some(game.team.as_str()))
            && eq(&self.opponent, game.opponent.as_deref())
            && eq(&self.competition, game.competition.as_deref())
            && self.season.is_none_or(|s| game.season_id == Some(s))
            && self.date.is_none_or(|d| game.date >= d)
    }
}
