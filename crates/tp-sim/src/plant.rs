//! First-order thermal plant.

use serde::{Deserialize, Serialize};
use tp_core::{Real, ensure_finite, ensure_unit_fraction};

use crate::error::SimResult;

/// Physical constants of the plant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlantParameters {
    /// Ambient temperature (°C).
    pub ambient_temp: Real,
    /// Fraction of the excess over ambient lost per step.
    pub cooling_rate: Real,
    /// Degrees gained per unit of control value per step.
    pub heating_efficiency: Real,
    /// Damping applied to each step's delta, in `[0, 1)`.
    pub thermal_inertia: Real,
}

impl PlantParameters {
    pub fn validate(&self) -> SimResult<()> {
        ensure_finite(self.ambient_temp, "ambient_temp must be finite")?;
        ensure_finite(self.cooling_rate, "cooling_rate must be finite")?;
        ensure_finite(self.heating_efficiency, "heating_efficiency must be finite")?;
        ensure_unit_fraction(self.thermal_inertia, "thermal_inertia must be in [0, 1)")?;
        Ok(())
    }
}

/// Heated body losing heat to ambient.
///
/// Per step: `delta = u * eff - (T - T_amb) * k`, then
/// `T' = max(T_amb, T + delta * (1 - inertia))`. This is a single explicit
/// Euler step of a first-order linear model; no stability check is made on
/// the cooling rate. The plant holds no state between calls.
#[derive(Clone, Debug, PartialEq)]
pub struct ThermalPlant {
    params: PlantParameters,
}

impl ThermalPlant {
    pub fn new(params: PlantParameters) -> SimResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &PlantParameters {
        &self.params
    }

    /// Temperature after one sample period under `control_value`.
    ///
    /// `control_value` is used literally, even outside `[0, 100]`.
    pub fn advance(&self, current_temp: Real, control_value: Real) -> Real {
        let p = &self.params;
        let cooling = (current_temp - p.ambient_temp) * p.cooling_rate;
        let heating = control_value * p.heating_efficiency;
        let delta = heating - cooling;
        let new_temp = current_temp + delta * (1.0 - p.thermal_inertia);

        // No active cooling below ambient. Written as a comparison rather than
        // f64::max so a NaN temperature is not replaced by ambient.
        if new_temp < p.ambient_temp {
            p.ambient_temp
        } else {
            new_temp
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tp_core::{Tolerances, nearly_equal};

    fn default_plant() -> ThermalPlant {
        ThermalPlant::new(PlantParameters {
            ambient_temp: 20.0,
            cooling_rate: 0.05,
            heating_efficiency: 1.0,
            thermal_inertia: 0.18,
        })
        .unwrap()
    }

    #[test]
    fn at_ambient_without_heat_is_fixed_point() {
        assert_eq!(default_plant().advance(20.0, 0.0), 20.0);
    }

    #[test]
    fn heating_step() {
        // delta = 10 - 0 ; scaled by 0.82
        let t = default_plant().advance(20.0, 10.0);
        assert!(nearly_equal(t, 28.2, Tolerances::default()));
    }

    #[test]
    fn passive_cooling_toward_ambient() {
        let plant = default_plant();
        // cooling = 80 * 0.05 = 4 ; 100 - 4 * 0.82
        let t = plant.advance(100.0, 0.0);
        assert!(nearly_equal(t, 96.72, Tolerances::default()));
        assert!(t > 20.0);
    }

    #[test]
    fn never_below_ambient() {
        let plant = default_plant();
        assert_eq!(plant.advance(20.0, -50.0), 20.0);
        assert_eq!(plant.advance(5.0, 0.0), 20.0);
    }

    #[test]
    fn zero_inertia_applies_full_delta() {
        let plant = ThermalPlant::new(PlantParameters {
            thermal_inertia: 0.0,
            ..*default_plant().params()
        })
        .unwrap();
        assert_eq!(plant.advance(20.0, 5.0), 25.0);
    }

    #[test]
    fn nan_is_not_floored_away() {
        assert!(default_plant().advance(f64::NAN, 0.0).is_nan());
        assert!(default_plant().advance(20.0, f64::NAN).is_nan());
    }

    #[test]
    fn rejects_invalid_inertia() {
        let params = PlantParameters {
            thermal_inertia: 1.0,
            ..*default_plant().params()
        };
        assert!(ThermalPlant::new(params).is_err());
    }
}
