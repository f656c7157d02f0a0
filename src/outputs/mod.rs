//! Output of delivered feeds.
//!
//! # Submodules
//!
//! - [`terminal`]: Renders articles and empty/error states for the reader
//! - [`json`]: Writes delivered feeds to JSON files

pub mod json;
pub mod terminal;
