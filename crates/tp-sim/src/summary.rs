//! End-of-run statistics for reports.

use serde::{Deserialize, Serialize};
use tp_core::Real;

use crate::params::SimulationParameters;
use crate::record::{SimulationRecord, nan_max};

/// Report-level view of a run.
///
/// Unlike the accessors on [`SimulationRecord`], these figures include the
/// zeroth (initial) temperature, so they are defined for empty runs too: with
/// no iterations the final temperature is the initial one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimSummary {
    pub setpoint: Real,
    pub initial_temp: Real,
    pub final_temp: Real,
    pub final_abs_error: Real,
    pub max_overshoot: Real,
    pub iterations: usize,
    pub total_time_s: Real,
    /// Largest controller output seen, 0 for empty runs. NaN if any output was NaN.
    pub peak_control_value: Real,
    /// Iterations whose output sat at the 0 or 100 limit.
    pub saturated_iterations: usize,
}

impl SimSummary {
    pub fn from_record(params: &SimulationParameters, record: &SimulationRecord) -> Self {
        let final_temp = record.final_temperature().unwrap_or(params.initial_temp);
        let peak_temp = record
            .iter()
            .map(|s| s.process_variable)
            .fold(params.initial_temp, nan_max);
        let peak_control_value = record
            .iter()
            .map(|s| s.control_value)
            .fold(0.0, nan_max);
        let saturated_iterations = record
            .iter()
            .filter(|s| {
                s.control_value == tp_controls::OUTPUT_MIN
                    || s.control_value == tp_controls::OUTPUT_MAX
            })
            .count();

        Self {
            setpoint: params.setpoint,
            initial_temp: params.initial_temp,
            final_temp,
            final_abs_error: (params.setpoint - final_temp).abs(),
            max_overshoot: peak_temp - params.setpoint,
            iterations: record.len(),
            total_time_s: params.total_time_s(),
            peak_control_value,
            saturated_iterations,
        }
    }

    pub fn total_time_min(&self) -> Real {
        self.total_time_s / 60.0
    }

    /// True when every figure is a finite number.
    pub fn is_finite(&self) -> bool {
        [
            self.setpoint,
            self.initial_temp,
            self.final_temp,
            self.final_abs_error,
            self.max_overshoot,
            self.total_time_s,
            self.peak_control_value,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}
