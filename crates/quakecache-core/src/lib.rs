//! Core library for quakecache.
//!
//! Fetches the public USGS earthquake GeoJSON feeds, keeps the records in a
//! local keyed store, and renders them as summary, original and filtered
//! tables.
//!
//! - `api`: feed client and the daily display-row helper
//! - `store`: the local `EarthquakeData` store
//! - `render`: pure table builders and HTML markup
//! - `dashboard`: one async task per dashboard button
//! - `config`: user configuration and data directory

pub mod api;
pub mod config;
pub mod dashboard;
pub mod models;
pub mod render;
pub mod store;
pub mod utils;

pub use api::{ApiError, Feed, FeedClient};
pub use config::Config;
pub use dashboard::{Action, ActionOutcome, Button, Dashboard};
pub use models::{DisplayRecord, Earthquake, FeedResponse};
pub use render::{ContainerView, DataTable, RecordsKind, SummaryRow};
pub use store::{QuakeStore, StoreError};
