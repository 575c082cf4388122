//! One-iteration-at-a-time driver.
//!
//! [`SimulationLoop::run`](crate::SimulationLoop::run) is a plain loop over
//! this type. Orchestrators that need to persist, retry or dispatch each
//! iteration separately drive the stepper directly and use
//! [`LoopCheckpoint`] to carry state across process boundaries; the
//! per-iteration arithmetic is identical either way.

use serde::{Deserialize, Serialize};
use tp_controls::{ControllerState, PidController};
use tp_core::Real;
use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::params::SimulationParameters;
use crate::plant::ThermalPlant;
use crate::record::SimulationSample;

/// Everything needed to continue a run from between two iterations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopCheckpoint {
    /// Index of the next iteration to execute.
    pub iteration: usize,
    /// Current plant temperature.
    pub temperature: Real,
    /// Controller memory.
    pub controller: ControllerState,
}

/// Closed loop that advances one iteration per call.
#[derive(Debug, Clone)]
pub struct LoopStepper {
    setpoint: Real,
    controller: PidController,
    plant: ThermalPlant,
    temperature: Real,
    iteration: usize,
    total: usize,
}

impl LoopStepper {
    /// Fresh stepper at iteration 0 and `initial_temp`.
    pub fn new(params: &SimulationParameters) -> SimResult<Self> {
        params.validate()?;
        Ok(Self::from_parts(
            params.setpoint,
            PidController::new(params.gains()?, params.sample_config()?),
            ThermalPlant::new(params.plant_parameters())?,
            params.initial_temp,
            params.iterations()?,
        ))
    }

    /// Rebuild a stepper from a checkpoint taken on a run with the same
    /// parameters.
    pub fn resume(params: &SimulationParameters, checkpoint: LoopCheckpoint) -> SimResult<Self> {
        let mut stepper = Self::new(params)?;
        if checkpoint.iteration > stepper.total {
            return Err(SimError::InvalidParameter {
                what: "checkpoint iteration exceeds max_iterations",
            });
        }
        stepper.controller = stepper.controller.with_state(checkpoint.controller);
        stepper.temperature = checkpoint.temperature;
        stepper.iteration = checkpoint.iteration;
        Ok(stepper)
    }

    pub(crate) fn from_parts(
        setpoint: Real,
        controller: PidController,
        plant: ThermalPlant,
        initial_temp: Real,
        total: usize,
    ) -> Self {
        Self {
            setpoint,
            controller,
            plant,
            temperature: initial_temp,
            iteration: 0,
            total,
        }
    }

    /// Current plant temperature.
    pub fn temperature(&self) -> Real {
        self.temperature
    }

    /// Index of the next iteration to execute.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn remaining(&self) -> usize {
        self.total - self.iteration
    }

    pub fn is_finished(&self) -> bool {
        self.iteration >= self.total
    }

    pub fn controller(&self) -> &PidController {
        &self.controller
    }

    pub fn plant(&self) -> &ThermalPlant {
        &self.plant
    }

    pub fn checkpoint(&self) -> LoopCheckpoint {
        LoopCheckpoint {
            iteration: self.iteration,
            temperature: self.temperature,
            controller: *self.controller.state(),
        }
    }

    /// Run one iteration, or `None` once the horizon is reached.
    pub fn next_step(&mut self) -> Option<SimulationSample> {
        if self.is_finished() {
            return None;
        }

        let error = self.setpoint - self.temperature;
        let control_value = self.controller.step(error);
        self.temperature = self.plant.advance(self.temperature, control_value);

        let sample = SimulationSample {
            iteration: self.iteration,
            setpoint: self.setpoint,
            process_variable: self.temperature,
            control_value,
            absolute_error: error.abs(),
        };
        debug!(
            iteration = self.iteration,
            setpoint = self.setpoint,
            temperature = self.temperature,
            control_value,
            "control step"
        );

        self.iteration += 1;
        Some(sample)
    }
}

impl Iterator for LoopStepper {
    type Item = SimulationSample;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_step()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl ExactSizeIterator for LoopStepper {}
