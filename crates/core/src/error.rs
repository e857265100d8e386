//! Error types for ns-core
//!
//! A single error enum covers configuration, transport, protocol, validation
//! and parse failures. Protocol errors carry the HTTP status, transport errors
//! carry a socket-level identifier such as `ETIMEDOUT`.

use thiserror::Error;

/// Result type alias for ns-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Transport identifier for a request that ran past its deadline
pub const ETIMEDOUT: &str = "ETIMEDOUT";

/// Transport identifier for a connection that could not be established
pub const ECONNREFUSED: &str = "ECONNREFUSED";

/// Transport identifier for a connection that failed mid-exchange
pub const ECONNRESET: &str = "ECONNRESET";

/// Error types for ns-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or unusable connection settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// Timeout, DNS or connection failure (retryable)
    #[error("Transport error ({code}): {message}")]
    Transport { code: String, message: String },

    /// The server answered with a status of 300 or above
    #[error("{message}")]
    Protocol { status: u16, message: String },

    /// Invalid argument, detected before any request is sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// Malformed XML in a response that declared itself as XML
    #[error("XML parse error: {0}")]
    Parse(String),

    /// Profile not found
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    /// Profile already exists
    #[error("Profile already exists: {0}")]
    ProfileExists(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Build a transport error with the given identifier
    pub fn transport(code: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Transport {
            code: code.into(),
            message: message.into(),
        }
    }

    /// HTTP status of a protocol error
    pub const fn status(&self) -> Option<u16> {
        match self {
            Error::Protocol { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Socket-level identifier of a transport error
    pub fn transport_code(&self) -> Option<&str> {
        match self {
            Error::Transport { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_) | Error::Validation(_) | Error::InvalidUrl(_) => 2, // UsageError
            Error::Transport { .. } => 3,                                      // NetworkError
            Error::Protocol { status, .. } => match *status {
                401 | 403 => 4, // AuthError
                404 => 5,       // NotFound
                409 => 6,       // Conflict
                _ => 1,
            },
            Error::ProfileNotFound(_) => 5,
            Error::ProfileExists(_) => 6,
            _ => 1, // GeneralError
        }
    }
}
