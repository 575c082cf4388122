//! Flat parameter file format.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tp_sim::{SimResult, SimulationParameters};

use crate::env::EnvSource;
use crate::{ConfigError, ConfigResult};

/// Environment variable names, in the order they are documented.
pub const ENV_KEYS: [&str; 12] = [
    "KP",
    "KI",
    "KD",
    "AMBIENT_TEMP",
    "COOLING_RATE",
    "HEATING_EFFICIENCY",
    "THERMAL_INERTIA",
    "SETPOINT",
    "INITIAL_TEMP",
    "SAMPLE_TIME",
    "MAX_ITERATIONS",
    "OUTPUT_FILE",
];

fn default_output_file() -> PathBuf {
    PathBuf::from("pid_simulation.csv")
}

/// Every named parameter with its default.
///
/// Missing keys in a file fall back to the defaults of
/// [`SimulationParameters`]; unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParameterConfig {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub ambient_temp: f64,
    pub cooling_rate: f64,
    pub heating_efficiency: f64,
    pub thermal_inertia: f64,
    pub setpoint: f64,
    pub initial_temp: f64,
    pub sample_time: f64,
    pub max_iterations: i64,
    pub output_file: PathBuf,
}

impl Default for ParameterConfig {
    fn default() -> Self {
        Self::from_parameters(&SimulationParameters::default())
    }
}

impl ParameterConfig {
    pub fn from_parameters(p: &SimulationParameters) -> Self {
        Self {
            kp: p.kp,
            ki: p.ki,
            kd: p.kd,
            ambient_temp: p.ambient_temp,
            cooling_rate: p.cooling_rate,
            heating_efficiency: p.heating_efficiency,
            thermal_inertia: p.thermal_inertia,
            setpoint: p.setpoint,
            initial_temp: p.initial_temp,
            sample_time: p.sample_time,
            max_iterations: p.max_iterations,
            output_file: default_output_file(),
        }
    }

    /// Unvalidated conversion, for callers that want to report errors later.
    pub fn parameters(&self) -> SimulationParameters {
        SimulationParameters {
            kp: self.kp,
            ki: self.ki,
            kd: self.kd,
            sample_time: self.sample_time,
            ambient_temp: self.ambient_temp,
            cooling_rate: self.cooling_rate,
            heating_efficiency: self.heating_efficiency,
            thermal_inertia: self.thermal_inertia,
            setpoint: self.setpoint,
            initial_temp: self.initial_temp,
            max_iterations: self.max_iterations,
        }
    }

    /// Convert and validate.
    pub fn to_parameters(&self) -> SimResult<SimulationParameters> {
        let params = self.parameters();
        params.validate()?;
        Ok(params)
    }

    /// Set one value by its environment variable name.
    pub fn set(&mut self, key: &str, value: &str) -> ConfigResult<()> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        let real = || value.trim().parse::<f64>().map_err(|_| invalid());

        match key {
            "KP" => self.kp = real()?,
            "KI" => self.ki = real()?,
            "KD" => self.kd = real()?,
            "AMBIENT_TEMP" => self.ambient_temp = real()?,
            "COOLING_RATE" => self.cooling_rate = real()?,
            "HEATING_EFFICIENCY" => self.heating_efficiency = real()?,
            "THERMAL_INERTIA" => self.thermal_inertia = real()?,
            "SETPOINT" => self.setpoint = real()?,
            "INITIAL_TEMP" => self.initial_temp = real()?,
            "SAMPLE_TIME" => self.sample_time = real()?,
            "MAX_ITERATIONS" => {
                self.max_iterations = value.trim().parse::<i64>().map_err(|_| invalid())?
            }
            "OUTPUT_FILE" => self.output_file = PathBuf::from(value.trim()),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// Overlay every key present in `env`. Returns the keys that were applied.
    pub fn apply_env(&mut self, env: &dyn EnvSource) -> ConfigResult<Vec<&'static str>> {
        let mut applied = Vec::new();
        for key in ENV_KEYS {
            if let Some(value) = env.get(key) {
                self.set(key, &value)?;
                applied.push(key);
            }
        }
        Ok(applied)
    }
}
