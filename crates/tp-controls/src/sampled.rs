//! Sample period for digital controllers.
//!
//! Controllers advance on a fixed logical sample period. Nothing here reads a
//! wall clock.

use serde::{Deserialize, Serialize};
use tp_core::{Real, ensure_positive};

use crate::error::ControlResult;

/// Sample configuration for a controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleConfig {
    /// Sample period in logical seconds.
    dt: Real,
}

impl SampleConfig {
    /// Create a new sample configuration.
    ///
    /// `dt` must be finite and strictly positive.
    pub fn new(dt: Real) -> ControlResult<Self> {
        let dt = ensure_positive(dt, "sample_time must be finite and positive")?;
        Ok(Self { dt })
    }

    /// Sample period in seconds.
    pub fn dt(&self) -> Real {
        self.dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ControlError;

    #[test]
    fn sample_config_creation() {
        let config = SampleConfig::new(0.1).unwrap();
        assert_eq!(config.dt(), 0.1);
    }

    #[test]
    fn rejects_non_positive_period() {
        assert!(matches!(
            SampleConfig::new(0.0),
            Err(ControlError::InvalidArg { .. })
        ));
        assert!(SampleConfig::new(-30.0).is_err());
        assert!(SampleConfig::new(f64::NAN).is_err());
    }
}
