//! HTTP client module for the USGS earthquake summary feeds.
//!
//! This module provides the `FeedClient` for fetching the public GeoJSON
//! feeds. The feeds need no authentication; every call is a single GET.

pub mod client;
pub mod error;

pub use client::{Feed, FeedClient};
pub use error::ApiError;
