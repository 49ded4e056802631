use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use clubmanager::{
    competition::{MessageLevel, SyncEngine, SyncError, SyncOutcome, update_scores},
    config::{CompetitionEndpoints, HomeVenue, SyncSettings},
    db::{GameStore, MemoryStore, SeasonStore},
    games::save_game,
    models::Game,
};
use mockito::{Matcher, Server, ServerGuard};

const RBIHF_PATH: &str = "/modules/league/ajax/time.php";

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn game_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 10, 5, 18, 0, 0).unwrap()
}

fn venue() -> HomeVenue {
    HomeVenue::new("Ice Palace").with_aliases(["Palace"])
}

async fn setup(server: &ServerGuard) -> (MemoryStore, SyncEngine) {
    let store = MemoryStore::new();
    store
        .insert_season(d(2024, 7, 1), d(2025, 6, 30))
        .await
        .unwrap();

    let settings = SyncSettings {
        endpoints: CompetitionEndpoints {
            rbihf_url: format!("{}{}", server.url(), RBIHF_PATH),
            cehl_url: format!("{}/ajax/", server.url()),
        },
        ..SyncSettings::default()
    };
    let engine = SyncEngine::new(
        &settings,
        venue(),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
    )
    .unwrap();

    (store, engine)
}

async fn stored_game(
    store: &MemoryStore,
    location: &str,
    competition: Option<&str>,
    game_id: Option<&str>,
    date: DateTime<Utc>,
) -> Game {
    let mut game = Game::new("Seniors", "League", date);
    game.opponent = Some("Visitors".into());
    game.location = location.into();
    game.competition = competition.map(String::from);
    game.game_id = game_id.map(String::from);
    save_game(store, store, &venue(), game).await.unwrap()
}

fn rbihf_query(game_id: &str) -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("gameNr".into(), game_id.into()),
        Matcher::UrlEncoded("season".into(), "2425".into()),
    ])
}

#[tokio::test]
async fn test_rbihf_home_game_keeps_feed_order() {
    let mut server = Server::new_async().await;
    let (store, engine) = setup(&server).await;
    let game = stored_game(
        &store,
        "Ice Palace",
        Some("RBIHF"),
        Some("1234"),
        game_date(),
    )
    .await;

    let mock = server
        .mock("GET", RBIHF_PATH)
        .match_query(rbihf_query("1234"))
        .match_header("x-requested-with", "XMLHttpRequest")
        .match_header("referer", "https://rbihf.be/game/1234")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"live": true, "scoreA": 3, "scoreB": 1}"#)
        .create_async()
        .await;

    let outcome = engine.sync(&game).await.unwrap();
    mock.assert_async().await;
    assert!(matches!(outcome, SyncOutcome::Updated(_)));

    let updated = store.get_game(game.id).await.unwrap();
    assert!(updated.live);
    assert_eq!(updated.score_team, Some(3));
    assert_eq!(updated.score_opponent, Some(1));
}

#[tokio::test]
async fn test_rbihf_away_game_swaps_scores() {
    let mut server = Server::new_async().await;
    let (store, engine) = setup(&server).await;
    let game = stored_game(&store, "Ghent", Some("RBIHF"), Some("1234"), game_date()).await;

    let mock = server
        .mock("GET", RBIHF_PATH)
        .match_query(rbihf_query("1234"))
        .with_status(200)
        .with_body(r#"{"live": 0, "scoreA": 3, "scoreB": 1}"#)
        .create_async()
        .await;

    engine.sync(&game).await.unwrap();
    mock.assert_async().await;

    let updated = store.get_game(game.id).await.unwrap();
    assert!(!updated.live);
    assert_eq!(updated.score_team, Some(1));
    assert_eq!(updated.score_opponent, Some(3));
}

#[tokio::test]
async fn test_home_alias_counts_as_home_game() {
    let mut server = Server::new_async().await;
    let (store, engine) = setup(&server).await;
    let game = stored_game(&store, " palace ", Some("RBIHF"), Some("77"), game_date()).await;

    server
        .mock("GET", RBIHF_PATH)
        .match_query(rbihf_query("77"))
        .with_status(200)
        .with_body(r#"{"live": false, "scoreA": 4, "scoreB": 2}"#)
        .create_async()
        .await;

    engine.sync(&game).await.unwrap();

    let updated = store.get_game(game.id).await.unwrap();
    assert_eq!(updated.score_team, Some(4));
    assert_eq!(updated.score_opponent, Some(2));
}

#[tokio::test]
async fn test_unlinked_game_is_skipped_without_request() {
    let mut server = Server::new_async().await;
    let (store, engine) = setup(&server).await;
    let game = stored_game(&store, "Ice Palace", None, Some("1234"), game_date()).await;

    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let outcome = engine.sync(&game).await.unwrap();
    mock.assert_async().await;

    assert_eq!(outcome, SyncOutcome::Skipped);
    assert!(store.patch_log().await.is_empty());
    assert_eq!(store.get_game(game.id).await.unwrap(), game);
}

#[tokio::test]
async fn test_unknown_competition_fails_without_request() {
    let mut server = Server::new_async().await;
    let (store, engine) = setup(&server).await;
    let game = stored_game(
        &store,
        "Ice Palace",
        Some("UNKNOWN"),
        Some("1234"),
        game_date(),
    )
    .await;

    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = engine.sync(&game).await.unwrap_err();
    mock.assert_async().await;

    assert!(matches!(err, SyncError::UnknownCompetition(ref key) if key == "UNKNOWN"));
    assert_eq!(store.get_game(game.id).await.unwrap(), game);
}

#[tokio::test]
async fn test_missing_game_id_fails_without_request() {
    let mut server = Server::new_async().await;
    let (store, engine) = setup(&server).await;
    let game = stored_game(&store, "Ice Palace", Some("CEHL"), Some("  "), game_date()).await;

    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = engine.sync(&game).await.unwrap_err();
    mock.assert_async().await;

    assert!(matches!(err, SyncError::MissingGameId(_)));
    assert!(store.patch_log().await.is_empty());
}

#[tokio::test]
async fn test_failed_fetch_leaves_game_unchanged() {
    let mut server = Server::new_async().await;
    let (store, engine) = setup(&server).await;
    let game = stored_game(
        &store,
        "Ice Palace",
        Some("RBIHF"),
        Some("1234"),
        game_date(),
    )
    .await;

    server
        .mock("GET", RBIHF_PATH)
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let err = engine.sync(&game).await.unwrap_err();
    assert!(matches!(err, SyncError::FetchFailed { .. }));
    assert!(store.patch_log().await.is_empty());
    assert_eq!(store.get_game(game.id).await.unwrap(), game);
}

#[tokio::test]
async fn test_malformed_body_is_a_fetch_failure() {
    let mut server = Server::new_async().await;
    let (store, engine) = setup(&server).await;
    let game = stored_game(
        &store,
        "Ice Palace",
        Some("RBIHF"),
        Some("1234"),
        game_date(),
    )
    .await;

    server
        .mock("GET", RBIHF_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let err = engine.sync(&game).await.unwrap_err();
    assert!(matches!(err, SyncError::FetchFailed { .. }));
    assert!(store.patch_log().await.is_empty());
}

#[tokio::test]
async fn test_repeated_sync_is_idempotent() {
    let mut server = Server::new_async().await;
    let (store, engine) = setup(&server).await;
    let game = stored_game(
        &store,
        "Ice Palace",
        Some("RBIHF"),
        Some("1234"),
        game_date(),
    )
    .await;

    server
        .mock("GET", RBIHF_PATH)
        .match_query(rbihf_query("1234"))
        .with_status(200)
        .with_body(r#"{"live": true, "scoreA": 2, "scoreB": 2}"#)
        .expect(2)
        .create_async()
        .await;

    engine.sync(&game).await.unwrap();
    let first = store.get_game(game.id).await.unwrap();

    let reloaded = store.get_game(game.id).await.unwrap();
    engine.sync(&reloaded).await.unwrap();
    let second = store.get_game(game.id).await.unwrap();

    assert_eq!(first, second);
    let log = store.patch_log().await;
    assert_eq!(log.len(), 2);
    assert_eq!(log[0], log[1]);
}

#[tokio::test]
async fn test_cehl_reads_timeline_and_score() {
    let mut server = Server::new_async().await;
    let (store, engine) = setup(&server).await;
    let game = stored_game(&store, "Ghent", Some("CEHL"), Some("55"), game_date()).await;

    let query = Matcher::AllOf(vec![
        Matcher::UrlEncoded("nr".into(), "55".into()),
        Matcher::UrlEncoded("season".into(), "2425".into()),
    ]);
    let timeline = server
        .mock("GET", "/ajax/timeline.php")
        .match_query(query.clone())
        .match_header("referer", "https://www.cehl.eu/game/2425/55")
        .with_status(200)
        .with_body(r#"{"live": 1}"#)
        .create_async()
        .await;
    let score = server
        .mock("GET", "/ajax/score.php")
        .match_query(query)
        .with_status(200)
        .with_body(r#"{"scoreA": 5, "scoreB": 2}"#)
        .create_async()
        .await;

    engine.sync(&game).await.unwrap();
    timeline.assert_async().await;
    score.assert_async().await;

    let updated = store.get_game(game.id).await.unwrap();
    assert!(updated.live);
    assert_eq!(updated.score_team, Some(2));
    assert_eq!(updated.score_opponent, Some(5));
}

#[tokio::test]
async fn test_cehl_score_applies_when_timeline_fails() {
    let mut server = Server::new_async().await;
    let (store, engine) = setup(&server).await;
    let game = stored_game(&store, "Ice Palace", Some("CEHL"), Some("55"), game_date()).await;

    server
        .mock("GET", "/ajax/timeline.php")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;
    server
        .mock("GET", "/ajax/score.php")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"scoreA": 1, "scoreB": 0}"#)
        .create_async()
        .await;

    let outcome = engine.sync(&game).await.unwrap();
    let SyncOutcome::Updated(patch) = outcome else {
        panic!("expected an update");
    };
    assert_eq!(patch.live, None);

    let updated = store.get_game(game.id).await.unwrap();
    assert!(!updated.live);
    assert_eq!(updated.score_team, Some(1));
    assert_eq!(updated.score_opponent, Some(0));
}

#[tokio::test]
async fn test_cehl_fails_when_both_endpoints_fail() {
    let mut server = Server::new_async().await;
    let (store, engine) = setup(&server).await;
    let game = stored_game(&store, "Ice Palace", Some("CEHL"), Some("55"), game_date()).await;

    server
        .mock("GET", Matcher::Any)
        .with_status(404)
        .create_async()
        .await;

    let err = engine.sync(&game).await.unwrap_err();
    assert!(matches!(err, SyncError::FetchFailed { .. }));
    assert_eq!(store.get_game(game.id).await.unwrap(), game);
}

#[tokio::test]
async fn test_sync_by_id_returns_updated_game() {
    let mut server = Server::new_async().await;
    let (store, engine) = setup(&server).await;
    let game = stored_game(&store, "Ice Palace", Some("RBIHF"), Some("9"), game_date()).await;

    server
        .mock("GET", RBIHF_PATH)
        .match_query(rbihf_query("9"))
        .with_status(200)
        .with_body(r#"{"live": true, "scoreA": 6, "scoreB": 0}"#)
        .create_async()
        .await;

    let (refreshed, result) = engine.sync_by_id(game.id).await.unwrap();
    assert!(result.is_ok());
    assert_eq!(refreshed.score_team, Some(6));
    assert!(refreshed.live);
}

#[tokio::test]
async fn test_batch_isolates_failures() {
    let mut server = Server::new_async().await;
    let (store, engine) = setup(&server).await;
    let now = Utc.with_ymd_and_hms(2024, 10, 5, 20, 0, 0).unwrap();

    let linked = stored_game(
        &store,
        "Ice Palace",
        Some("RBIHF"),
        Some("1"),
        now - Duration::hours(2),
    )
    .await;
    let broken = stored_game(
        &store,
        "Ice Palace",
        Some("RBIHF"),
        Some("2"),
        now - Duration::hours(1),
    )
    .await;
    let unlinked = stored_game(
        &store,
        "Ice Palace",
        None,
        None,
        now - Duration::minutes(30),
    )
    .await;
    let old = stored_game(
        &store,
        "Ice Palace",
        Some("RBIHF"),
        Some("3"),
        now - Duration::days(3),
    )
    .await;

    server
        .mock("GET", RBIHF_PATH)
        .match_query(rbihf_query("1"))
        .with_status(200)
        .with_body(r#"{"live": false, "scoreA": 3, "scoreB": 2}"#)
        .create_async()
        .await;
    server
        .mock("GET", RBIHF_PATH)
        .match_query(rbihf_query("2"))
        .with_status(500)
        .create_async()
        .await;
    let untouched = server
        .mock("GET", RBIHF_PATH)
        .match_query(rbihf_query("3"))
        .expect(0)
        .create_async()
        .await;

    let report = update_scores(&engine, 3, now, 2).await.unwrap();
    untouched.assert_async().await;

    assert_eq!(report.lines.len(), 3);
    assert_eq!(report.updated(), 1);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.skipped(), 1);

    let order: Vec<_> = report.lines.iter().map(|l| l.game.id).collect();
    assert_eq!(order, vec![linked.id, broken.id, unlinked.id]);

    let views = report.views();
    assert_eq!(views[0].level, MessageLevel::Success);
    assert_eq!(views[0].message, "Game information updated for \"Seniors vs Visitors\"");
    assert_eq!(views[1].level, MessageLevel::Warning);
    assert!(views[1].message.starts_with("Could not update \"Seniors vs Visitors\""));

    assert_eq!(store.get_game(linked.id).await.unwrap().score_team, Some(3));
    assert_eq!(store.get_game(broken.id).await.unwrap(), broken);
    assert_eq!(store.get_game(old.id).await.unwrap(), old);
}
