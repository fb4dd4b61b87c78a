use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils::format::{format_locale_time, format_magnitude, markdown_link};

/// Placeholder shown for fields the feed left empty
pub const MISSING: &str = "-";

/// A single GeoJSON feature from the USGS summary feeds.
///
/// Only the fields the dashboard reads are typed. Everything else the feed
/// provides (`type`, `geometry`, `felt`, ...) is kept in `extra` so a stored
/// record round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Earthquake {
    pub id: String,
    #[serde(default)]
    pub properties: QuakeProperties,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuakeProperties {
    #[serde(default)]
    pub mag: Option<f64>,
    #[serde(default)]
    pub place: Option<String>,
    #[serde(rename = "magType", default)]
    pub mag_type: Option<String>,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Earthquake {
    pub fn mag_type(&self) -> Option<&str> {
        self.properties.mag_type.as_deref()
    }

    pub fn mag_type_display(&self) -> String {
        self.mag_type().unwrap_or(MISSING).to_string()
    }

    pub fn place_display(&self) -> String {
        self.properties
            .place
            .clone()
            .unwrap_or_else(|| MISSING.to_string())
    }

    pub fn mag_display(&self) -> String {
        format_magnitude(self.properties.mag)
    }

    pub fn time_display<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        self.properties
            .time
            .and_then(|ms| format_locale_time(ms, tz))
            .unwrap_or_else(|| MISSING.to_string())
    }

    /// Flatten into the row shape the daily refresh helper returns
    pub fn to_display_record_in<Tz: TimeZone>(&self, tz: &Tz) -> DisplayRecord
    where
        Tz::Offset: std::fmt::Display,
    {
        DisplayRecord {
            magnitude: self.properties.mag,
            location: self.properties.place.clone(),
            time: self.time_display(tz),
            more_info: markdown_link(self.properties.url.as_deref().unwrap_or_default()),
        }
    }

    pub fn to_display_record(&self) -> DisplayRecord {
        self.to_display_record_in(&Local)
    }
}

/// Flat display row: `{Magnitude, Location, Time, More Info}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayRecord {
    #[serde(rename = "Magnitude")]
    pub magnitude: Option<f64>,
    #[serde(rename = "Location")]
    pub location: Option<String>,
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "More Info")]
    pub more_info: String,
}

/// Top-level GeoJSON `FeatureCollection` body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedResponse {
    #[serde(default)]
    pub metadata: Option<FeedMetadata>,
    #[serde(default)]
    pub features: Vec<Earthquake>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedMetadata {
    #[serde(default)]
    pub generated: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub count: Option<usize>,
}
