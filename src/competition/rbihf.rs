use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{
    Competition, CompetitionAdapter, LiveFlag, RawScore, ScoreFetch, ScoreRequest, SyncError,
    client_headers, fetch_json,
};

/// Royal Belgian Ice Hockey Federation. One request returns both the live flag
/// and the score.
pub struct Rbihf {
    client: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct TimePayload {
    live: LiveFlag,
    #[serde(rename = "scoreA")]
    score_a: i32,
    #[serde(rename = "scoreB")]
    score_b: i32,
}

impl Rbihf {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl CompetitionAdapter for Rbihf {
    async fn fetch(&self, request: &ScoreRequest) -> Result<ScoreFetch, SyncError> {
        let referer = format!("https://rbihf.be/game/{}", request.game_id);
        let headers = client_headers("www.rbihf.be", "application/json", "keep-alive", &referer);
        let query = [
            ("gameNr", request.game_id.as_str()),
            ("season", request.season_code.as_str()),
        ];

        let payload: TimePayload = fetch_json(&self.client, &self.url, &query, headers)
            .await
            .map_err(|reason| SyncError::FetchFailed {
                competition: Competition::Rbihf,
                reason,
            })?;

        Ok(ScoreFetch {
            live: Some(payload.live.is_live()),
            score: Some(RawScore {
                score_a: payload.score_a,
                score_b: payload.score_b,
            }),
        })
    }
}
