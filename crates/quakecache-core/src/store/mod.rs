//! Local keyed store for offline access to fetched earthquakes.
//!
//! This module provides the `QuakeStore`: one database (`EarthquakeData`)
//! holding one collection (`earthquakes`) keyed by feature id. Writes are
//! upserts; nothing expires.

pub mod error;
pub mod manager;

pub use error::StoreError;
pub use manager::{CachedAt, QuakeStore};
