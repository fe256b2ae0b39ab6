/// Error types for virtual-tryon
///
/// Catalog, capture session, API and config failures all land in `TryOnError`.
/// Lookups that find nothing return `Ok(None)` instead.

use thiserror::Error;

/// Main error type for try-on operations
#[derive(Error, Debug)]
pub enum TryOnError {
    /// I/O errors (config files, sockets, snapshots)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Config file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Camera or microphone access was refused by the host
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Detection engine bring-up failed
    #[error("Engine initialization failed: {0}")]
    EngineInit(String),

    /// A detection loop is already running for this session
    #[error("A try-on session is already active")]
    SessionAlreadyActive,

    /// Fixture data breaks a catalog invariant
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// Request could not be understood
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Frame could not be encoded
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Result type alias for try-on operations
pub type Result<T> = std::result::Result<T, TryOnError>;

/// Convert TryOnError to a user-friendly error message
impl TryOnError {
    pub fn user_message(&self) -> String {
        match self {
            TryOnError::Io(e) => {
                format!("File system error. Check permissions. Details: {}", e)
            }
            TryOnError::Serialization(e) => {
                format!("Data format error: {}", e)
            }
            TryOnError::ConfigParse(e) => {
                format!("Config file is not valid TOML: {}", e)
            }
            TryOnError::Config(msg) => {
                format!("Configuration issue: {}", msg)
            }
            TryOnError::PermissionDenied(_) => {
                "Camera access denied. Please enable camera permissions.".to_string()
            }
            TryOnError::EngineInit(_) => "Failed to initialize AR engine".to_string(),
            TryOnError::SessionAlreadyActive => {
                "A try-on session is already running. Stop it before starting another.".to_string()
            }
            TryOnError::InvalidCatalog(msg) => {
                format!("Catalog data is broken: {}", msg)
            }
            TryOnError::InvalidRequest(msg) => {
                format!("Invalid request: {}", msg)
            }
            TryOnError::Encoding(msg) => {
                format!("Could not capture snapshot: {}", msg)
            }
            TryOnError::Generic(msg) => msg.clone(),
        }
    }
}
