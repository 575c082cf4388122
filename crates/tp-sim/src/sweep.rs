//! Parallel parameter sweeps.
//!
//! Each parameter set gets its own controller and plant, so runs share no
//! mutable state and can be spread over the rayon pool.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tp_core::Real;
use tracing::debug;

use crate::error::SimResult;
use crate::params::SimulationParameters;
use crate::sim::SimulationLoop;
use crate::summary::SimSummary;

/// Cartesian product of gain values applied over a base parameter set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GainGrid {
    pub kp: Vec<Real>,
    pub ki: Vec<Real>,
    pub kd: Vec<Real>,
}

impl GainGrid {
    /// Expand the grid in kp-major order. An empty axis keeps the base value.
    pub fn expand(&self, base: &SimulationParameters) -> Vec<SimulationParameters> {
        let axis = |values: &[Real], fallback: Real| -> Vec<Real> {
            if values.is_empty() {
                vec![fallback]
            } else {
                values.to_vec()
            }
        };
        let kps = axis(&self.kp, base.kp);
        let kis = axis(&self.ki, base.ki);
        let kds = axis(&self.kd, base.kd);

        let mut out = Vec::with_capacity(kps.len() * kis.len() * kds.len());
        for &kp in &kps {
            for &ki in &kis {
                for &kd in &kds {
                    out.push(SimulationParameters { kp, ki, kd, ..*base });
                }
            }
        }
        out
    }
}

/// Result of one run in a sweep.
#[derive(Debug, Clone)]
pub struct SweepOutcome {
    pub parameters: SimulationParameters,
    pub result: SimResult<SimSummary>,
}

fn run_one(params: &SimulationParameters) -> SimResult<SimSummary> {
    let sim = SimulationLoop::new(*params)?;
    let record = sim.run();
    Ok(SimSummary::from_record(params, &record))
}

/// Run every parameter set in parallel. Output order matches input order;
/// invalid sets produce an `Err` outcome without stopping the others.
pub fn run_sweep(params: &[SimulationParameters]) -> Vec<SweepOutcome> {
    debug!(runs = params.len(), "starting sweep");
    params
        .par_iter()
        .map(|p| SweepOutcome {
            parameters: *p,
            result: run_one(p),
        })
        .collect()
}
