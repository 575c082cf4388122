//! PID controller block.
//!
//! The controller is a recurrence over two persistent scalars, the integral
//! accumulator and the previous error. Each `step`:
//!
//! 1. accumulates `error * dt` into the integral (rectangular/Euler rule),
//! 2. differentiates against the previous error,
//! 3. sums the three weighted terms,
//! 4. saturates the sum to `[OUTPUT_MIN, OUTPUT_MAX]`.
//!
//! Saturation is applied to the output only. The integral is never clamped or
//! bled off, so it keeps growing while the output sits at a limit.
//!
//! The previous error starts at zero, so the very first step sees a derivative
//! of `error / dt` ("derivative kick"). That is kept as-is for compatibility
//! with existing tuning.

use serde::{Deserialize, Serialize};
use tp_core::{Real, ensure_finite};

use crate::error::ControlResult;
use crate::sampled::SampleConfig;

/// Lower bound of the controller output (heater off).
pub const OUTPUT_MIN: Real = 0.0;
/// Upper bound of the controller output (heater at full power).
pub const OUTPUT_MAX: Real = 100.0;

/// Proportional, integral and derivative gains.
///
/// `ki` is per second of accumulated error and `kd` multiplies a per-second
/// rate, so both are coupled to the sample period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    pub kp: Real,
    pub ki: Real,
    pub kd: Real,
}

impl PidGains {
    /// Create gains, rejecting non-finite values.
    pub fn new(kp: Real, ki: Real, kd: Real) -> ControlResult<Self> {
        Ok(Self {
            kp: ensure_finite(kp, "kp must be finite")?,
            ki: ensure_finite(ki, "ki must be finite")?,
            kd: ensure_finite(kd, "kd must be finite")?,
        })
    }
}

/// Integral and derivative memory carried between steps.
///
/// Fields are read-only from outside the crate; the only way to change them
/// is through [`PidController::step`] or [`PidController::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControllerState {
    integral: Real,
    last_error: Real,
}

impl ControllerState {
    /// Accumulated `error * dt`.
    pub fn integral(&self) -> Real {
        self.integral
    }

    /// Error seen on the previous step (zero before the first step).
    pub fn last_error(&self) -> Real {
        self.last_error
    }
}

/// Breakdown of a single controller step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidTerms {
    pub p: Real,
    pub i: Real,
    pub d: Real,
    /// Sum of the three terms before saturation.
    pub raw: Real,
    /// Saturated output actually returned by the step.
    pub output: Real,
}

impl PidTerms {
    pub fn is_saturated(&self) -> bool {
        self.raw != self.output
    }
}

/// Stateful PID controller with a saturated `[0, 100]` output.
#[derive(Debug, Clone, PartialEq)]
pub struct PidController {
    gains: PidGains,
    sample: SampleConfig,
    state: ControllerState,
}

impl PidController {
    /// Create a controller with zeroed state.
    pub fn new(gains: PidGains, sample: SampleConfig) -> Self {
        Self {
            gains,
            sample,
            state: ControllerState::default(),
        }
    }

    /// Resume from previously captured state.
    pub fn with_state(mut self, state: ControllerState) -> Self {
        self.state = state;
        self
    }

    pub fn gains(&self) -> &PidGains {
        &self.gains
    }

    pub fn sample(&self) -> SampleConfig {
        self.sample
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Zero the integral and previous error.
    pub fn reset(&mut self) {
        self.state = ControllerState::default();
    }

    /// Advance one sample period and return the saturated control value.
    ///
    /// `error` is `setpoint - process_variable`. Non-finite errors are not
    /// rejected; they propagate into the output and the state.
    pub fn step(&mut self, error: Real) -> Real {
        self.step_terms(error).output
    }

    /// Same as [`step`](Self::step) but returns every term.
    pub fn step_terms(&mut self, error: Real) -> PidTerms {
        let dt = self.sample.dt();

        self.state.integral += error * dt;
        let derivative = (error - self.state.last_error) / dt;

        let p = self.gains.kp * error;
        let i = self.gains.ki * self.state.integral;
        let d = self.gains.kd * derivative;
        let raw = p + i + d;

        // f64::clamp keeps NaN as NaN
        let output = raw.clamp(OUTPUT_MIN, OUTPUT_MAX);

        self.state.last_error = error;

        PidTerms {
            p,
            i,
            d,
            raw,
            output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn controller(kp: Real, ki: Real, kd: Real, dt: Real) -> PidController {
        PidController::new(
            PidGains::new(kp, ki, kd).unwrap(),
            SampleConfig::new(dt).unwrap(),
        )
    }

    #[test]
    fn proportional_pass_through() {
        let mut pid = controller(1.0, 0.0, 0.0, 1.0);
        let terms = pid.step_terms(10.0);

        assert_eq!(terms.output, 10.0);
        assert_eq!(terms.i, 0.0);
        assert_eq!(terms.d, 0.0);
        // Accumulator still integrates; ki = 0 keeps it out of the output.
        assert_eq!(pid.state().integral(), 10.0);
        assert_eq!(pid.state().last_error(), 10.0);
    }

    #[test]
    fn integral_uses_sample_time() {
        let mut pid = controller(0.0, 0.5, 0.0, 30.0);
        pid.step(2.0);
        pid.step(2.0);
        assert_eq!(pid.state().integral(), 120.0);
        assert_eq!(pid.step(0.0), 60.0);
    }

    #[test]
    fn first_step_derivative_kick() {
        let mut pid = controller(0.0, 0.0, 1.0, 2.0);
        // last_error starts at zero, so derivative = 10 / 2
        assert_eq!(pid.step(10.0), 5.0);
        // constant error afterwards gives no derivative action
        assert_eq!(pid.step(10.0), 0.0);
    }

    #[test]
    fn output_saturates_both_ways() {
        let mut pid = controller(10.0, 0.0, 0.0, 1.0);
        let high = pid.step_terms(50.0);
        assert_eq!(high.output, OUTPUT_MAX);
        assert!(high.is_saturated());

        let low = pid.step_terms(-50.0);
        assert_eq!(low.output, OUTPUT_MIN);
        assert!(low.raw < 0.0);
    }

    #[test]
    fn integral_winds_up_while_saturated() {
        let mut pid = controller(10.0, 1.0, 0.0, 1.0);
        for _ in 0..50 {
            assert_eq!(pid.step(20.0), OUTPUT_MAX);
        }
        assert_eq!(pid.state().integral(), 1000.0);
    }

    #[test]
    fn nan_error_propagates() {
        let mut pid = controller(1.0, 0.0, 0.0, 1.0);
        assert!(pid.step(Real::NAN).is_nan());
        assert!(pid.state().integral().is_nan());
    }

    #[test]
    fn reset_and_resume() {
        let mut pid = controller(0.5, 0.01, 0.2, 30.0);
        pid.step(55.0);
        pid.step(40.0);
        let saved = *pid.state();

        let mut resumed = controller(0.5, 0.01, 0.2, 30.0).with_state(saved);
        assert_eq!(pid.step(30.0), resumed.step(30.0));

        pid.reset();
        assert_eq!(*pid.state(), ControllerState::default());
    }

    #[test]
    fn rejects_non_finite_gains() {
        assert!(PidGains::new(Real::NAN, 0.0, 0.0).is_err());
        assert!(PidGains::new(0.0, Real::INFINITY, 0.0).is_err());
    }

    proptest! {
        #[test]
        fn output_stays_in_range(
            errors in prop::collection::vec(-1e4_f64..1e4, 1..64),
            kp in 0.0_f64..10.0,
            ki in 0.0_f64..1.0,
            kd in 0.0_f64..10.0,
        ) {
            let mut pid = controller(kp, ki, kd, 30.0);
            for e in errors {
                let out = pid.step(e);
                prop_assert!((OUTPUT_MIN..=OUTPUT_MAX).contains(&out));
            }
        }
    }
}
