//! Error types for simulation operations.

use thiserror::Error;

/// Errors raised while building a simulation.
///
/// Stepping and running are total over finite inputs, so every variant is
/// produced at construction time.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid parameter: {what}")]
    InvalidParameter { what: &'static str },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<tp_controls::ControlError> for SimError {
    fn from(e: tp_controls::ControlError) -> Self {
        match e {
            tp_controls::ControlError::InvalidArg { what } => SimError::InvalidParameter { what },
        }
    }
}

impl From<tp_core::TpError> for SimError {
    fn from(e: tp_core::TpError) -> Self {
        match e {
            tp_core::TpError::NonFinite { what, .. }
            | tp_core::TpError::InvalidArg { what } => SimError::InvalidParameter { what },
        }
    }
}
