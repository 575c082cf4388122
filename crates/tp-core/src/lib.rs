//! tp-core: shared foundation for thermopid.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - timing (opt-in wall-clock instrumentation for the CLI)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod timing;

pub use error::{TpError, TpResult};
pub use numeric::*;
