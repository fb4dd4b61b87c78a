//! Data models for USGS earthquake feeds.
//!
//! - `Earthquake`: one GeoJSON feature, keyed by `id`
//! - `FeedResponse`, `FeedMetadata`: the `FeatureCollection` envelope
//! - `DisplayRecord`: the flat row produced by the daily refresh helper

pub mod earthquake;

pub use earthquake::{DisplayRecord, Earthquake, FeedMetadata, FeedResponse, QuakeProperties, MISSING};
