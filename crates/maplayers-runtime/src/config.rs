#![forbid(unsafe_code)]

//! Panel configuration.
//!
//! Groups the layer panel's tunables into a single [`PanelConfig`] that can be
//! loaded from TOML or JSON with the `panel-config` feature.
//!
//! # Loading
//!
//! ```toml
//! # maplayers.toml
//! row_height = 32
//! sort_distance_threshold = 6
//! pending_timeout_ms = 1500
//! locale = "fr"
//! ```
//!
//! ```rust,ignore
//! let config = PanelConfig::from_toml_file("maplayers.toml")?;
//! let config = PanelConfig::from_json_str(json)?;
//! ```
//!
//! # Defaults
//!
//! Every field defaults to the value the panel uses when no file is given;
//! missing fields in a file keep their default.

#[cfg(feature = "panel-config")]
use std::path::Path;
use std::time::Duration;

use maplayers_core::SortGestureConfig;
#[cfg(feature = "panel-config")]
use serde::{Deserialize, Serialize};

/// Tunables of the layer panel.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "panel-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "panel-config", serde(default))]
pub struct PanelConfig {
    /// Height of one layer row. Default: 40.
    pub row_height: u16,
    /// Vertical travel before a drag starts sorting. Default: 10.
    pub sort_distance_threshold: u16,
    /// Clamp the dragged row to the list edges. Default: true.
    pub lock_to_container_edges: bool,
    /// How long an optimistic reorder waits for the store, in milliseconds.
    /// Default: 2000.
    pub pending_timeout_ms: u64,
    /// Locale for panel strings. Default: `"en"`.
    pub locale: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            row_height: 40,
            sort_distance_threshold: 10,
            lock_to_container_edges: true,
            pending_timeout_ms: 2000,
            locale: "en".into(),
        }
    }
}

impl PanelConfig {
    /// Load from a TOML string.
    #[cfg(feature = "panel-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, PanelConfigError> {
        let config: Self = toml::from_str(s).map_err(PanelConfigError::Toml)?;
        config.validated()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "panel-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, PanelConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(PanelConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "panel-config")]
    pub fn from_json_str(s: &str) -> Result<Self, PanelConfigError> {
        let config: Self = serde_json::from_str(s).map_err(PanelConfigError::Json)?;
        config.validated()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "panel-config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PanelConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(PanelConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters.
    ///
    /// Returns a list of problems; an empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.row_height == 0 {
            errors.push("row_height must be > 0".into());
        }
        if self.pending_timeout_ms == 0 {
            errors.push("pending_timeout_ms must be > 0".into());
        }
        if self.locale.trim().is_empty() {
            errors.push("locale must not be empty".into());
        }
        errors
    }

    /// `self` if valid, else [`PanelConfigError::Validation`].
    pub fn validated(self) -> Result<Self, PanelConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(PanelConfigError::Validation(errors))
        }
    }

    /// Sort gesture thresholds.
    #[must_use]
    pub fn to_sort_gesture_config(&self) -> SortGestureConfig {
        SortGestureConfig {
            row_height: self.row_height,
            distance_threshold: self.sort_distance_threshold,
            lock_to_container_edges: self.lock_to_container_edges,
        }
    }

    /// Optimistic overlay timeout.
    #[must_use]
    pub fn pending_timeout(&self) -> Duration {
        Duration::from_millis(self.pending_timeout_ms)
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur when loading a panel configuration.
#[derive(Debug)]
pub enum PanelConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "panel-config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "panel-config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for PanelConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "panel-config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "panel-config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => write!(f, "validation errors: {}", errors.join("; ")),
        }
    }
}

impl std::error::Error for PanelConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "panel-config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "panel-config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
