use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpecError {
    #[error("Failed to read specification document {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid YAML in {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Unsupported specification format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Invalid mount group name: {0:?}")]
    InvalidMount(String),

    #[error("Duplicate mount group: {0}")]
    DuplicateMount(String),
}
