//! Error types for the poller.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PollerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("Invalid device list: {0}")]
    Decode(String),

    #[error("Device list is empty")]
    NoDevices,

    #[error("No device named or identified by '{0}'")]
    DeviceNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PollerError {
    /// Process exit status for this error. Every failure aborts the run the same way.
    pub fn exit_code(&self) -> i32 {
        match self {
            PollerError::Config(_)
            | PollerError::Http(_)
            | PollerError::Timeout(_)
            | PollerError::Decode(_)
            | PollerError::NoDevices
            | PollerError::DeviceNotFound(_)
            | PollerError::Io(_) => 1,
        }
    }
}

impl From<serde_json::Error> for PollerError {
    fn from(e: serde_json::Error) -> Self {
        PollerError::Decode(e.to_string())
    }
}
