use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};

use super::config::BallDontLieConfig;
use super::delay::{FixedDelay, RequestDelay};
use super::models::{ApiEnvelope, Cursor, Decoded, ExternalPlayer, ExternalTeam, decode_items};
use crate::error::{ImporterError, Result};
use crate::traits::{NbaSource, Page};

pub const MAX_PER_PAGE: u32 = 100;

/// Client for the BallDontLie NBA API.
///
/// Every successful call is followed by the configured request delay, so a
/// caller issuing requests back to back stays under the upstream rate limit.
pub struct BallDontLieClient {
    config: BallDontLieConfig,
    client: reqwest::Client,
    delay: Arc<dyn RequestDelay>,
    requests: AtomicU64,
}

impl BallDontLieClient {
    pub fn new(config: BallDontLieConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("nba-import/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            delay: Arc::new(FixedDelay(config.request_delay)),
            config,
            client,
            requests: AtomicU64::new(0),
        })
    }

    pub fn with_delay(mut self, delay: impl RequestDelay + 'static) -> Self {
        self.delay = Arc::new(delay);
        self
    }

    /// Number of HTTP requests sent so far, retries included
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    pub async fn fetch_teams(&self) -> Result<Vec<Decoded<ExternalTeam>>> {
        let envelope: ApiEnvelope = self.get("/teams", &[]).await?;

        match envelope.data {
            Some(teams) => Ok(decode_items("team", teams)),
            None => {
                error!("BallDontLie API: invalid teams response structure, no data key");
                Ok(Vec::new())
            }
        }
    }

    pub async fn fetch_players(
        &self,
        cursor: Option<&Cursor>,
        per_page: u32,
    ) -> Result<Page<Decoded<ExternalPlayer>>> {
        let mut query = vec![("per_page", per_page.clamp(1, MAX_PER_PAGE).to_string())];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.as_str().to_string()));
        }

        let envelope: ApiEnvelope = self.get("/players", &query).await?;

        let Some(players) = envelope.data else {
            error!(
                "BallDontLie API: invalid players response structure, no data key (cursor: {:?})",
                cursor.map(Cursor::as_str)
            );
            return Ok(Page::last(Vec::new()));
        };

        let next_cursor = envelope.meta.and_then(|meta| meta.next_cursor);
        Ok(Page::new(decode_items("player", players), next_cursor))
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint);
        info!("BallDontLie API request: GET {} {:?}", endpoint, query);

        let mut attempt = 0;
        let body = loop {
            self.requests.fetch_add(1, Ordering::Relaxed);

            let failure = match self
                .client
                .get(&url)
                .header(AUTHORIZATION, &self.config.api_key)
                .query(query)
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => break response.text().await?,
                Ok(response) => {
                    let status = response.status().as_u16();
                    let body = response.text().await.unwrap_or_default();
                    ImporterError::SourceUnavailable {
                        endpoint: endpoint.to_string(),
                        status,
                        body,
                    }
                }
                Err(e) => ImporterError::RequestError(e),
            };

            if attempt >= self.config.max_retries {
                error!("BallDontLie API: request to {} failed: {}", endpoint, failure);
                return Err(failure);
            }

            attempt += 1;
            warn!(
                "BallDontLie API: request to {} failed, retrying ({}/{}): {}",
                endpoint, attempt, self.config.max_retries, failure
            );
            tokio::time::sleep(self.config.retry_delay).await;
        };

        // Failed calls skip the pause; their retries were already spaced by retry_delay
        let pause = self.delay.delay_after_request();
        if !pause.is_zero() {
            debug!("Rate limiting: waiting {:?} before the next request", pause);
            tokio::time::sleep(pause).await;
        }

        serde_json::from_str(&body).map_err(|source| ImporterError::MalformedResponse {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}

#[async_trait::async_trait]
impl NbaSource for BallDontLieClient {
    async fn fetch_teams(&self) -> Result<Vec<Decoded<ExternalTeam>>> {
        BallDontLieClient::fetch_teams(self).await
    }

    async fn fetch_players(
        &self,
        cursor: Option<&Cursor>,
        per_page: u32,
    ) -> Result<Page<Decoded<ExternalPlayer>>> {
        BallDontLieClient::fetch_players(self, cursor, per_page).await
    }
}
