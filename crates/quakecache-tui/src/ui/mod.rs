//! Terminal UI module using ratatui.
//!
//! - `render`: frame layout, button bar, status bar and overlays
//! - `container`: the data container (summary or record tables)
//! - `input`: keyboard event handling
//! - `styles`: color scheme and text styling

pub mod container;
pub mod input;
pub mod render;
pub mod styles;
