//! Discrete PID control for thermopid.
//!
//! The controller runs in sampled/digital mode: it assumes exactly one call
//! per sample period and carries its integral and derivative memory between
//! calls. Output is saturated to a fixed actuator range.
//!
//! # Architecture
//!
//! - [`SampleConfig`] holds the validated logical sample period
//! - [`PidController`] owns its [`ControllerState`] and mutates it only in `step`
//! - [`PidTerms`] exposes the per-term breakdown of one step for telemetry

pub mod controller;
pub mod error;
pub mod sampled;

pub use controller::{
    ControllerState, OUTPUT_MAX, OUTPUT_MIN, PidController, PidGains, PidTerms,
};
pub use error::{ControlError, ControlResult};
pub use sampled::SampleConfig;
