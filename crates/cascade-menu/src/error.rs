#![forbid(unsafe_code)]

//! Error types.
//!
//! Only configuration problems are errors. Races between transitions and a
//! disappearing anchor at runtime degrade gracefully (see
//! [`Request`](crate::session::Request)) and never surface here.

/// Errors returned by menu construction and configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    /// The surface could not resolve an anchor element.
    #[error("menu anchor could not be resolved")]
    MissingAnchor,

    /// Two entries in one item tree share an id.
    #[error("duplicate menu item id `{0}`")]
    DuplicateItemId(String),

    /// Configuration failed validation.
    #[error("invalid menu configuration: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),

    /// I/O error reading a configuration file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error.
    #[cfg(feature = "config-file")]
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON parse error.
    #[cfg(feature = "config-file")]
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}
