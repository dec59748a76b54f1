//! JSON loaders for metadata, metric records and saved questions.
//!
//! # Example
//!
//! ```rust,ignore
//! use metricize::model::loader::{load_metadata, load_metric};
//! use std::path::Path;
//!
//! let metadata = load_metadata(Path::new("metadata.json"))?;
//! let metric = load_metric(Path::new("metric.json"))?;
//! ```

use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::metadata::Metadata;
use super::metric::Metric;
use crate::query::Card;

/// Errors that can occur when loading a JSON document.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Load and deserialize any JSON document.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| LoadError::Json {
        path: path.display().to_string(),
        source,
    })
}

pub fn load_metadata(path: &Path) -> Result<Metadata, LoadError> {
    load_json(path)
}

pub fn load_metric(path: &Path) -> Result<Metric, LoadError> {
    load_json(path)
}

pub fn load_card(path: &Path) -> Result<Card, LoadError> {
    load_json(path)
}
