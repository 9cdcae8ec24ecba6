//! Error handling for Efecto
//!
//! Errors only exist at the configuration and file I/O boundary. The
//! real-time processing path is infallible: bad parameter values are
//! clamped at the point of use and never propagated.

use thiserror::Error;

/// Result type alias for Efecto operations
pub type Result<T> = std::result::Result<T, EfectoError>;

/// Main error type for Efecto operations
#[derive(Error, Debug)]
pub enum EfectoError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid audio file: {reason}")]
    InvalidAudio {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Unknown parameter: {name}")]
    UnknownParameter { name: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EfectoError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            EfectoError::FileNotFound { .. } => "FILE_NOT_FOUND",
            EfectoError::InvalidAudio { .. } => "INVALID_AUDIO",
            EfectoError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            EfectoError::UnknownParameter { .. } => "UNKNOWN_PARAMETER",
            EfectoError::Io(_) => "IO_ERROR",
            EfectoError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = EfectoError::FileNotFound {
            path: "test.wav".to_string(),
        };
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");

        let err = EfectoError::UnknownParameter {
            name: "Bogus".to_string(),
        };
        assert_eq!(err.error_code(), "UNKNOWN_PARAMETER");
    }

    #[test]
    fn test_error_display() {
        let err = EfectoError::UnsupportedFormat {
            format: "7-channel audio".to_string(),
        };
        assert_eq!(err.to_string(), "Unsupported audio format: 7-channel audio");
    }
}
