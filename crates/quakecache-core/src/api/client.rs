//! Client for the USGS earthquake GeoJSON summary feeds.
//!
//! `fetch_feed` is the single network primitive. `refresh_earthquake_data`
//! wraps it for the daily display rows and never fails: errors are logged
//! and an empty list comes back instead.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::models::{DisplayRecord, FeedResponse};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL of the public summary feeds
pub const DEFAULT_FEED_BASE_URL: &str = "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary";

/// HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Time window of a summary feed. Every window lists all magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feed {
    Hour,
    Day,
    Week,
    #[default]
    Month,
}

impl Feed {
    /// File name of the feed under the base URL
    pub fn file_name(&self) -> &'static str {
        match self {
            Feed::Hour => "all_hour.geojson",
            Feed::Day => "all_day.geojson",
            Feed::Week => "all_week.geojson",
            Feed::Month => "all_month.geojson",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Feed::Hour => "past hour",
            Feed::Day => "past day",
            Feed::Week => "past week",
            Feed::Month => "past month",
        }
    }
}

/// Client for the USGS feeds.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct FeedClient {
    client: Client,
    base_url: String,
}

impl FeedClient {
    /// Create a client against the public USGS endpoint
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_FEED_BASE_URL, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    /// Create a client against another base URL (a mirror or a local fixture server)
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("quakecache/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn feed_url(&self, feed: Feed) -> String {
        format!("{}/{}", self.base_url, feed.file_name())
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Fetch and parse one summary feed. One request, no retries.
    pub async fn fetch_feed(&self, feed: Feed) -> Result<FeedResponse> {
        let url = self.feed_url(feed);
        debug!(url = %url, "Fetching earthquake feed");

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/geo+json, application/json")
            .send()
            .await
            .map_err(ApiError::NetworkError)
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(response).await?;

        let text = response
            .text()
            .await
            .map_err(ApiError::NetworkError)
            .with_context(|| format!("Failed to read response body from {}", url))?;

        let parsed = parse_feed(&text)
            .with_context(|| format!("Failed to parse feed from {}", url))?;

        info!(feed = feed.label(), count = parsed.features.len(), "Fetched earthquake feed");
        Ok(parsed)
    }

    /// Fetch the daily feed and map it to display rows.
    ///
    /// Returns None when `n_clicks` is zero (nothing triggered yet). A failed
    /// fetch is logged and yields an empty list.
    pub async fn refresh_earthquake_data(&self, n_clicks: u32) -> Option<Vec<DisplayRecord>> {
        self.refresh_earthquake_data_in(n_clicks, &Local).await
    }

    pub async fn refresh_earthquake_data_in<Tz: TimeZone>(
        &self,
        n_clicks: u32,
        tz: &Tz,
    ) -> Option<Vec<DisplayRecord>>
    where
        Tz::Offset: std::fmt::Display,
    {
        if n_clicks == 0 {
            return None;
        }

        match self.fetch_feed(Feed::Day).await {
            Ok(feed) => Some(to_display_records(&feed, tz)),
            Err(e) => {
                error!(error = %e, "Error fetching earthquake data");
                Some(Vec::new())
            }
        }
    }
}

/// Parse a GeoJSON feed body
pub fn parse_feed(text: &str) -> Result<FeedResponse, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::InvalidResponse(e.to_string()))
}

/// Map every feature of a feed to its display row, preserving order
pub fn to_display_records<Tz: TimeZone>(feed: &FeedResponse, tz: &Tz) -> Vec<DisplayRecord>
where
    Tz::Offset: std::fmt::Display,
{
    feed.features
        .iter()
        .map(|quake| quake.to_display_record_in(tz))
        .collect()
}
