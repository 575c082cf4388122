//! Error types for control operations.

use thiserror::Error;

/// Result type for control operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors raised while configuring a controller.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a control constructor.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

impl From<tp_core::TpError> for ControlError {
    fn from(e: tp_core::TpError) -> Self {
        match e {
            tp_core::TpError::NonFinite { what, .. }
            | tp_core::TpError::InvalidArg { what } => ControlError::InvalidArg { what },
        }
    }
}
