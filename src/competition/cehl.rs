use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use super::{
    Competition, CompetitionAdapter, LiveFlag, ScoreFetch, ScorePayload, ScoreRequest, SyncError,
    client_headers, fetch_json,
};

/// Central European Hockey League. The live flag and the score come from two
/// separate endpoints; each one applies on its own when the other fails.
pub struct Cehl {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TimelinePayload {
    live: LiveFlag,
}

impl Cehl {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, SyncError> {
        Url::parse(&self.base_url)
            .and_then(|base| base.join(path))
            .map_err(|e| SyncError::FetchFailed {
                competition: Competition::Cehl,
                reason: format!("invalid endpoint {}{path}: {e}", self.base_url),
            })
    }
}

#[async_trait]
impl CompetitionAdapter for Cehl {
    async fn fetch(&self, request: &ScoreRequest) -> Result<ScoreFetch, SyncError> {
        let timeline_url = self.endpoint("timeline.php")?;
        let score_url = self.endpoint("score.php")?;

        let referer = format!(
            "https://www.cehl.eu/game/{}/{}",
            request.season_code, request.game_id
        );
        let headers = client_headers("www.cehl.eu", "*/*", "close", &referer);
        let query = [
            ("nr", request.game_id.as_str()),
            ("season", request.season_code.as_str()),
        ];

        let (timeline, score) = tokio::join!(
            fetch_json::<TimelinePayload>(
                &self.client,
                timeline_url.as_str(),
                &query,
                headers.clone()
            ),
            fetch_json::<ScorePayload>(&self.client, score_url.as_str(), &query, headers),
        );

        match (timeline, score) {
            (Err(timeline_err), Err(score_err)) => Err(SyncError::FetchFailed {
                competition: Competition::Cehl,
                reason: format!("{timeline_err}; {score_err}"),
            }),
            (timeline, score) => {
                if let Err(ref reason) = timeline {
                    tracing::warn!(
                        "CEHL timeline for game {} unavailable: {reason}",
                        request.game_id
                    );
                }
                if let Err(ref reason) = score {
                    tracing::warn!(
                        "CEHL score for game {} unavailable: {reason}",
                        request.game_id
                    );
                }

                Ok(ScoreFetch {
                    live: timeline.ok().map(|t| t.live.is_live()),
                    score: score.ok().map(Into::into),
                })
            }
        }
    }
}
