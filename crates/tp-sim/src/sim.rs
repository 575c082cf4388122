//! Fixed-horizon simulation runner.

use tp_controls::PidController;
use tp_core::Real;
use tracing::info;

use crate::error::SimResult;
use crate::params::SimulationParameters;
use crate::plant::ThermalPlant;
use crate::record::SimulationRecord;
use crate::stepper::LoopStepper;

/// Validated closed loop, ready to run.
///
/// Holds a zero-state controller and the plant as templates; every call to
/// [`run`](Self::run) or [`stepper`](Self::stepper) starts from a copy, so
/// runs never share state and repeated runs are identical.
#[derive(Debug, Clone)]
pub struct SimulationLoop {
    params: SimulationParameters,
    controller: PidController,
    plant: ThermalPlant,
    iterations: usize,
}

impl SimulationLoop {
    /// Validate `params` and build the loop. Invalid parameters are reported
    /// here, before any iteration executes.
    pub fn new(params: SimulationParameters) -> SimResult<Self> {
        params.validate()?;
        Ok(Self {
            controller: PidController::new(params.gains()?, params.sample_config()?),
            plant: ThermalPlant::new(params.plant_parameters())?,
            iterations: params.iterations()?,
            params,
        })
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    /// The zeroth temperature, which precedes the iteration-indexed record.
    pub fn initial_temp(&self) -> Real {
        self.params.initial_temp
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Fresh single-step driver for this loop.
    pub fn stepper(&self) -> LoopStepper {
        LoopStepper::from_parts(
            self.params.setpoint,
            self.controller.clone(),
            self.plant.clone(),
            self.params.initial_temp,
            self.iterations,
        )
    }

    /// Run exactly `max_iterations` iterations. There is no early exit on
    /// convergence.
    pub fn run(&self) -> SimulationRecord {
        let mut record = SimulationRecord::with_capacity(self.iterations);
        for sample in self.stepper() {
            record.push(sample);
        }

        info!(
            iterations = record.len(),
            setpoint = self.params.setpoint,
            final_temperature = record.final_temperature(),
            max_overshoot = record.max_overshoot(),
            "simulation finished"
        );
        record
    }
}
