//! Iteration-indexed output of a run.

use serde::{Deserialize, Serialize};
use tp_core::Real;

/// State of the loop after one iteration.
///
/// `process_variable` is the temperature *after* the plant has been advanced
/// with `control_value`; `absolute_error` is the error the controller saw
/// *before* that step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationSample {
    pub iteration: usize,
    pub setpoint: Real,
    pub process_variable: Real,
    pub control_value: Real,
    pub absolute_error: Real,
}

/// Append-only sequence of samples, one per iteration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationRecord {
    samples: Vec<SimulationSample>,
}

impl SimulationRecord {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            samples: Vec::with_capacity(n),
        }
    }

    pub(crate) fn push(&mut self, sample: SimulationSample) {
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[SimulationSample] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SimulationSample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last(&self) -> Option<&SimulationSample> {
        self.samples.last()
    }

    /// Temperature after the last iteration.
    pub fn final_temperature(&self) -> Option<Real> {
        self.last().map(|s| s.process_variable)
    }

    /// `|setpoint - final temperature|`.
    ///
    /// This is the distance left *after* the last step, not the last
    /// sample's `absolute_error` (which predates that step).
    pub fn final_abs_error(&self) -> Option<Real> {
        self.last().map(|s| (s.setpoint - s.process_variable).abs())
    }

    /// `max(process_variable) - setpoint` over the whole record.
    ///
    /// Negative when the setpoint was never reached. NaN samples are carried
    /// through rather than skipped.
    pub fn max_overshoot(&self) -> Option<Real> {
        let last = self.last()?;
        let peak = self
            .samples
            .iter()
            .map(|s| s.process_variable)
            .fold(Real::NEG_INFINITY, nan_max);
        Some(peak - last.setpoint)
    }
}

/// `max` that yields NaN once either side is NaN, unlike [`f64::max`].
pub(crate) fn nan_max(acc: Real, v: Real) -> Real {
    if acc.is_nan() || v.is_nan() {
        Real::NAN
    } else {
        acc.max(v)
    }
}

impl<'a> IntoIterator for &'a SimulationRecord {
    type Item = &'a SimulationSample;
    type IntoIter = std::slice::Iter<'a, SimulationSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(iteration: usize, pv: Real) -> SimulationSample {
        SimulationSample {
            iteration,
            setpoint: 75.0,
            process_variable: pv,
            control_value: 0.0,
            absolute_error: 0.0,
        }
    }

    #[test]
    fn empty_record_has_no_statistics() {
        let record = SimulationRecord::default();
        assert!(record.is_empty());
        assert_eq!(record.final_temperature(), None);
        assert_eq!(record.final_abs_error(), None);
        assert_eq!(record.max_overshoot(), None);
    }

    #[test]
    fn statistics_over_samples() {
        let mut record = SimulationRecord::default();
        for (i, pv) in [40.0, 80.0, 74.0].into_iter().enumerate() {
            record.push(sample(i, pv));
        }
        assert_eq!(record.final_temperature(), Some(74.0));
        assert_eq!(record.final_abs_error(), Some(1.0));
        assert_eq!(record.max_overshoot(), Some(5.0));
    }

    #[test]
    fn overshoot_is_negative_when_setpoint_not_reached() {
        let mut record = SimulationRecord::default();
        record.push(sample(0, 50.0));
        assert_eq!(record.max_overshoot(), Some(-25.0));
    }

    #[test]
    fn overshoot_surfaces_nan() {
        let mut record = SimulationRecord::default();
        record.push(sample(0, f64::NAN));
        record.push(sample(1, 80.0));
        assert!(record.max_overshoot().unwrap().is_nan());
    }
}
