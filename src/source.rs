//! External recording-metadata services.
//!
//! Data-origin elements talk to the outside world only through
//! [`RecordingSource`]. The HTTP implementation queries MusicBrainz for area
//! lookups and the ListenBrainz dataset hoster for popularity data.
//!
//! # Error policy
//!
//! - Lookup calls retry HTTP 503 forever, with a fixed delay between attempts.
//! - Any other non-success status fails with [`ElementError::DataSource`].
//! - Bulk fetches are never retried.

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ElementError;

/// One row of the popular-recordings dataset, in rank order.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RecordingRow {
    pub recording_mbid: Option<String>,
    #[serde(default)]
    pub recording_name: Option<String>,
    #[serde(default)]
    pub artist_credit_name: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub listen_count: Option<u64>,
}

/// The boundary between elements and recording-metadata services.
#[async_trait]
pub trait RecordingSource: Send + Sync {
    /// Resolve an area (country) name to its MusicBrainz id.
    async fn lookup_area(&self, area_name: &str) -> Result<String, ElementError>;

    /// Most popular recordings for an area, most popular first.
    async fn popular_recordings_by_country(
        &self,
        area_mbid: &str,
    ) -> Result<Vec<RecordingRow>, ElementError>;
}

/// Run `attempt` until it returns something other than "temporarily
/// unavailable", sleeping `delay` between tries. There is no attempt cap.
pub async fn retry_while_unavailable<T, F, Fut>(
    delay: Duration,
    mut attempt: F,
) -> Result<T, ElementError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ElementError>>,
{
    let mut tries: u64 = 0;
    loop {
        match attempt().await {
            Err(e) if e.is_temporarily_unavailable() => {
                tries += 1;
                warn!(tries, "service temporarily unavailable, retrying");
                tokio::time::sleep(delay).await;
            }
            other => return other,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AreaSearch {
    #[serde(default)]
    areas: Vec<AreaHit>,
}

#[derive(Debug, Deserialize)]
struct AreaHit {
    id: String,
}

/// HTTP-backed [`RecordingSource`].
pub struct HttpRecordingSource {
    client: Client,
    musicbrainz_url: String,
    dataset_url: String,
    retry_delay: Duration,
}

impl HttpRecordingSource {
    pub fn from_config(config: &Config) -> Result<Self, ElementError> {
        let mut headers = header::HeaderMap::new();
        let agent = header::HeaderValue::from_str(&config.musicbrainz.user_agent)
            .map_err(|e| ElementError::Configuration(format!("invalid user agent: {}", e)))?;
        headers.insert(header::USER_AGENT, agent);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.http.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            musicbrainz_url: config.musicbrainz.url.trim_end_matches('/').to_string(),
            dataset_url: config.listenbrainz.dataset_url.trim_end_matches('/').to_string(),
            retry_delay: Duration::from_millis(config.http.retry_delay_ms),
        })
    }

    async fn lookup_area_once(&self, area_name: &str) -> Result<String, ElementError> {
        let url = format!("{}/area", self.musicbrainz_url);
        let response = self
            .client
            .get(&url)
            .query(&[("query", area_name), ("fmt", "json")])
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let detail = response.text().await.unwrap_or_default();
            return Err(ElementError::DataSource {
                status: status.as_u16(),
                detail: format!("cannot fetch area '{}' from MusicBrainz: {}", area_name, detail),
            });
        }

        let search: AreaSearch = response
            .json()
            .await
            .map_err(|e| ElementError::Decode(e.to_string()))?;
        first_area_id(search, area_name)
    }
}

fn first_area_id(search: AreaSearch, area_name: &str) -> Result<String, ElementError> {
    search
        .areas
        .into_iter()
        .next()
        .map(|hit| hit.id)
        .ok_or_else(|| ElementError::EmptyResponse(format!("no area matches '{}'", area_name)))
}

#[async_trait]
impl RecordingSource for HttpRecordingSource {
    async fn lookup_area(&self, area_name: &str) -> Result<String, ElementError> {
        retry_while_unavailable(self.retry_delay, || self.lookup_area_once(area_name)).await
    }

    async fn popular_recordings_by_country(
        &self,
        area_mbid: &str,
    ) -> Result<Vec<RecordingRow>, ElementError> {
        let url = format!("{}/popular-recordings-by-country/json", self.dataset_url);
        let body = serde_json::json!([{ "[area_mbid]": area_mbid }]);

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            let detail = response.text().await.unwrap_or_default();
            return Err(ElementError::DataSource {
                status: status.as_u16(),
                detail: format!("cannot fetch popular recordings: {}", detail),
            });
        }

        let rows: Vec<RecordingRow> = response
            .json()
            .await
            .map_err(|e| ElementError::Decode(e.to_string()))?;
        debug!(area_mbid, rows = rows.len(), "fetched popular recordings");
        Ok(rows)
    }
}
