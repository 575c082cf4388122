//! Immutable simulation parameters.

use serde::{Deserialize, Serialize};
use tp_controls::{PidGains, SampleConfig};
use tp_core::{Real, ensure_finite};

use crate::error::{SimError, SimResult};
use crate::plant::PlantParameters;

/// Every numeric input of one closed-loop run.
///
/// Built directly or by a configuration layer; never mutated once a
/// [`SimulationLoop`](crate::SimulationLoop) holds it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Proportional gain.
    pub kp: Real,
    /// Integral gain, per second of accumulated error.
    pub ki: Real,
    /// Derivative gain, multiplies a per-second error rate.
    pub kd: Real,
    /// Logical seconds per iteration.
    pub sample_time: Real,
    /// Ambient temperature (°C); also the plant's floor.
    pub ambient_temp: Real,
    /// Fraction of the excess over ambient lost per step.
    pub cooling_rate: Real,
    /// Degrees gained per unit of control value per step.
    pub heating_efficiency: Real,
    /// Fraction of each step's delta that is damped away, in `[0, 1)`.
    pub thermal_inertia: Real,
    /// Target temperature (°C).
    pub setpoint: Real,
    /// Temperature before the first iteration (°C).
    pub initial_temp: Real,
    /// Number of iterations to run. Signed so that a negative request can be
    /// reported instead of silently wrapping.
    pub max_iterations: i64,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            kp: 0.50,
            ki: 0.0004,
            kd: 0.20,
            sample_time: 30.0,
            ambient_temp: 20.0,
            cooling_rate: 0.05,
            heating_efficiency: 1.0,
            thermal_inertia: 0.18,
            setpoint: 75.0,
            initial_temp: 20.0,
            max_iterations: 40,
        }
    }
}

impl SimulationParameters {
    /// Check every invariant, returning the first violation.
    pub fn validate(&self) -> SimResult<()> {
        self.gains()?;
        self.sample_config()?;
        self.plant_parameters().validate()?;
        ensure_finite(self.setpoint, "setpoint must be finite")?;
        ensure_finite(self.initial_temp, "initial_temp must be finite")?;
        self.iterations()?;
        Ok(())
    }

    pub fn gains(&self) -> SimResult<PidGains> {
        Ok(PidGains::new(self.kp, self.ki, self.kd)?)
    }

    pub fn sample_config(&self) -> SimResult<SampleConfig> {
        Ok(SampleConfig::new(self.sample_time)?)
    }

    /// Plant-only subset of the parameters.
    pub fn plant_parameters(&self) -> PlantParameters {
        PlantParameters {
            ambient_temp: self.ambient_temp,
            cooling_rate: self.cooling_rate,
            heating_efficiency: self.heating_efficiency,
            thermal_inertia: self.thermal_inertia,
        }
    }

    /// Iteration count as an index bound.
    pub fn iterations(&self) -> SimResult<usize> {
        usize::try_from(self.max_iterations).map_err(|_| SimError::InvalidParameter {
            what: "max_iterations must be non-negative",
        })
    }

    /// Logical length of the run in seconds.
    pub fn total_time_s(&self) -> Real {
        self.max_iterations.max(0) as Real * self.sample_time
    }
}
