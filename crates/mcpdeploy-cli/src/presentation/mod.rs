//! Shared CLI presentation utilities.
//!
//! Format-only: nothing here talks to the engine.

pub mod connection_display;
pub mod tables;

pub use connection_display::{connection_json, connection_lines};
pub use tables::{format_optional, print_separator, truncate_string};
