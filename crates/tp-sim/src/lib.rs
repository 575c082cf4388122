//! Closed-loop thermal simulation for thermopid.
//!
//! Provides:
//! - First-order thermal plant with passive cooling and a floor at ambient
//! - Fixed-horizon simulation loop driving a PID controller against the plant
//! - Single-step driver with serializable checkpoints for external orchestration
//! - Summary statistics and parallel parameter sweeps

pub mod error;
pub mod params;
pub mod plant;
pub mod record;
pub mod sim;
pub mod stepper;
pub mod summary;
pub mod sweep;

// Re-exports for public API
pub use error::{SimError, SimResult};
pub use params::SimulationParameters;
pub use plant::{PlantParameters, ThermalPlant};
pub use record::{SimulationRecord, SimulationSample};
pub use sim::SimulationLoop;
pub use stepper::{LoopCheckpoint, LoopStepper};
pub use summary::SimSummary;
pub use sweep::{GainGrid, SweepOutcome, run_sweep};
