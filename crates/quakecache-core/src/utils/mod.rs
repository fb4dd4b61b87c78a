//! Utility functions for string formatting and manipulation.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{escape_html, format_locale_time, format_magnitude, markdown_link, truncate_string};
