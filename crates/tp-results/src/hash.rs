//! Content-based hashing for run IDs.

use sha2::{Digest, Sha256};
use tp_sim::SimulationParameters;

/// Identical parameters and solver version always map to the same id, so a
/// cached run can be reused instead of recomputed.
pub fn compute_run_id(params: &SimulationParameters, solver_version: &str) -> String {
    let mut hasher = Sha256::new();

    let params_json = serde_json::to_string(params).unwrap_or_default();
    hasher.update(params_json.as_bytes());

    hasher.update(solver_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}
