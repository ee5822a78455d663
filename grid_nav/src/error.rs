//! Error types for grid_nav

use thiserror::Error;

/// Configuration errors. Raised at construction, never while mapping.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Grid size must be positive")]
    InvalidSize,

    #[error("{name} must be a positive finite number, got {value}")]
    InvalidCutoff { name: &'static str, value: f64 },

    #[error("YAML error: {0}")]
    Yaml(String),

    #[error("Field {field} has the wrong type")]
    WrongType { field: &'static str },
}

impl From<yaml_rust::ScanError> for ConfigError {
    fn from(e: yaml_rust::ScanError) -> Self {
        ConfigError::Yaml(e.to_string())
    }
}

/// Errors building an occupancy grid or its mask.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Blur kernel error: {0}")]
    Kernel(String),
}

/// Search outcomes that are not "found" and not "no path".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("Search aborted after {expansions} expansions")]
    SearchAborted { expansions: usize },
}

/// Errors from the threaded mapping session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Occupancy grid lock poisoned")]
    Poisoned,

    #[error("Ray channel disconnected")]
    Disconnected,

    #[error("Planning error: {0}")]
    Plan(#[from] PlanError),
}

pub type Result<T> = std::result::Result<T, MapError>;
