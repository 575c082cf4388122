//! Result data types.

use serde::{Deserialize, Serialize};
use tp_sim::{SimSummary, SimulationParameters, SimulationRecord, SimulationSample};

pub type RunId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    /// RFC 3339 creation time.
    pub timestamp: String,
    pub solver_version: String,
    pub parameters: SimulationParameters,
    pub summary: SimSummary,
}

impl RunManifest {
    /// Manifest stamped with the current time and a content-hash id.
    pub fn new(params: SimulationParameters, summary: SimSummary, solver_version: &str) -> Self {
        Self {
            run_id: crate::hash::compute_run_id(&params, solver_version),
            timestamp: chrono::Utc::now().to_rfc3339(),
            solver_version: solver_version.to_string(),
            parameters: params,
            summary,
        }
    }
}

/// One line of `timeseries.jsonl`: a sample plus its logical time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesRecord {
    pub time_s: f64,
    pub iteration: usize,
    pub setpoint: f64,
    pub process_variable: f64,
    pub control_value: f64,
    pub absolute_error: f64,
}

impl TimeseriesRecord {
    pub fn from_sample(sample: &SimulationSample, sample_time: f64) -> Self {
        Self {
            time_s: sample.iteration as f64 * sample_time,
            iteration: sample.iteration,
            setpoint: sample.setpoint,
            process_variable: sample.process_variable,
            control_value: sample.control_value,
            absolute_error: sample.absolute_error,
        }
    }

    /// JSON has no NaN or infinity, so only finite rows can be stored.
    pub fn is_finite(&self) -> bool {
        [
            self.time_s,
            self.setpoint,
            self.process_variable,
            self.control_value,
            self.absolute_error,
        ]
        .iter()
        .all(|v| v.is_finite())
    }

    /// Convert a whole record.
    pub fn from_record(record: &SimulationRecord, sample_time: f64) -> Vec<Self> {
        record
            .iter()
            .map(|s| Self::from_sample(s, sample_time))
            .collect()
    }
}
