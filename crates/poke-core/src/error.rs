//! Error types for poke reactions.
//!
//! Expected-shape deviations (wrong platform, non-poke notices, a poke aimed
//! at somebody else) are not errors at all; they resolve to a silent no-op
//! [`Reaction`](crate::Reaction). The variants here cover configuration
//! problems and failures reported by the host.

use thiserror::Error;

/// Result type alias for poke operations.
pub type PokeResult<T> = Result<T, PokeError>;

/// Main error type for all poke operations.
#[derive(Error, Debug)]
pub enum PokeError {
    /// A weighted pick was requested over an empty template sequence.
    #[error("Cannot pick a reply from an empty template list")]
    EmptyInput,

    /// A response mode tag that is neither `command` nor `message`.
    #[error("Invalid response policy: unrecognized mode '{tag}'")]
    InvalidPolicy { tag: String },

    /// Configuration could not be loaded or contains invalid values.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A host I/O call (command execution, message send, outbound poke) failed.
    #[error("Downstream error: {message}")]
    Downstream {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Configuration (CFG_xxx)
    CfgInvalidValue,
    CfgEmptyTemplates,
    CfgInvalidMode,

    // Downstream (HOST_xxx)
    HostCommandFailed,
    HostSendFailed,
    HostPokeFailed,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::CfgInvalidValue => "CFG_001",
            ErrorCode::CfgEmptyTemplates => "CFG_002",
            ErrorCode::CfgInvalidMode => "CFG_003",
            ErrorCode::HostCommandFailed => "HOST_001",
            ErrorCode::HostSendFailed => "HOST_002",
            ErrorCode::HostPokeFailed => "HOST_003",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl PokeError {
    /// Create an invalid policy error for an unrecognized mode tag.
    pub fn invalid_policy(tag: impl Into<String>) -> Self {
        Self::InvalidPolicy { tag: tag.into() }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a downstream error for a failed command execution.
    pub fn command_failed(message: impl Into<String>) -> Self {
        Self::Downstream {
            message: message.into(),
            code: ErrorCode::HostCommandFailed,
            source: None,
        }
    }

    /// Create a downstream error for a failed message send.
    pub fn send_failed(message: impl Into<String>) -> Self {
        Self::Downstream {
            message: message.into(),
            code: ErrorCode::HostSendFailed,
            source: None,
        }
    }

    /// Create a downstream error for a failed outbound poke request.
    pub fn poke_failed(message: impl Into<String>) -> Self {
        Self::Downstream {
            message: message.into(),
            code: ErrorCode::HostPokeFailed,
            source: None,
        }
    }

    /// Attach the underlying cause to a downstream error.
    pub fn with_source(self, err: impl std::error::Error + Send + Sync + 'static) -> Self {
        match self {
            Self::Downstream { message, code, .. } => Self::Downstream {
                message,
                code,
                source: Some(Box::new(err)),
            },
            other => other,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyInput => ErrorCode::CfgEmptyTemplates,
            Self::InvalidPolicy { .. } => ErrorCode::CfgInvalidMode,
            Self::Configuration(_) => ErrorCode::CfgInvalidValue,
            Self::Downstream { code, .. } => *code,
            _ => ErrorCode::Internal,
        }
    }

    /// Whether this error came from the host rather than from configuration.
    pub fn is_downstream(&self) -> bool {
        matches!(self, Self::Downstream { .. })
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::EmptyInput => Some("Add at least one entry to `messages` or switch the mode to `command`"),
            Self::InvalidPolicy { .. } => Some("Set `mode` to either \"command\" or \"message\""),
            Self::Configuration(_) => Some("Check the poke configuration file and POKE_* environment variables"),
            _ => None,
        }
    }
}
