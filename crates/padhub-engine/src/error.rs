use thiserror::Error;

use crate::types::DeviceId;

/// Error string reported by the hardware layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct BackendError(pub String);

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Error type for engine operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A record for this device already exists.
    #[error("Controller already registered: {0}")]
    AlreadyRegistered(DeviceId),
    /// The hardware refused to open the device.
    #[error("{0}")]
    OpenFailed(String),
    /// A generic backend error.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Convenient result alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
