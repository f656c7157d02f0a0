//! User preferences consumed when a query is built.
//!
//! Settings are read through a [`SettingsProvider`] every time a query is
//! built and never cached here, so edits to the settings file apply to the
//! next search.
//!
//! # File format
//!
//! ```yaml
//! order_by: relevance   # newest | oldest | relevance
//! ```

use crate::models::OrderBy;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{debug, warn};

pub trait SettingsProvider {
    /// Preferred result ordering.
    fn order_by(&self) -> OrderBy;
}

/// A provider with a fixed value, used for `--order-by` and defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedSettings {
    pub order_by: OrderBy,
}

impl SettingsProvider for FixedSettings {
    fn order_by(&self) -> OrderBy {
        self.order_by
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    order_by: OrderBy,
}

/// Reads preferences from a YAML file on every call.
///
/// A missing or unreadable file falls back to the defaults.
#[derive(Debug, Clone)]
pub struct YamlSettings {
    path: PathBuf,
}

impl YamlSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> SettingsFile {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Settings file unavailable; using defaults");
                return SettingsFile::default();
            }
        };
        if text.trim().is_empty() {
            return SettingsFile::default();
        }
        serde_yaml::from_str(&text).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "Invalid settings file; using defaults");
            SettingsFile::default()
        })
    }
}

impl SettingsProvider for YamlSettings {
    fn order_by(&self) -> OrderBy {
        self.load().order_by
    }
}
