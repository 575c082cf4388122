//! Lightweight wall-clock timing for the command-line front end.
//!
//! Simulation itself runs on logical sample time; this module only measures
//! how long the host spent in each phase of a command. Printed only when the
//! `TP_TIMING` environment variable is set.

use std::time::Instant;

/// Timing output is on when `TP_TIMING` is set.
pub fn is_enabled() -> bool {
    std::env::var_os("TP_TIMING").is_some()
}

/// A simple timer that measures elapsed time.
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed seconds since `start`, regardless of whether timing is enabled.
    pub fn elapsed_s(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Host-side timing breakdown of one CLI invocation.
#[derive(Debug, Default, Clone)]
pub struct PerfStats {
    pub config_time_s: f64,
    pub simulate_time_s: f64,
    pub save_time_s: f64,
    pub load_cache_time_s: f64,
    pub runs: usize,
}

impl PerfStats {
    pub fn total_time_s(&self) -> f64 {
        self.config_time_s + self.simulate_time_s + self.save_time_s + self.load_cache_time_s
    }

    /// Print a formatted summary of the statistics when timing is enabled.
    pub fn print_summary(&self) {
        if !is_enabled() {
            return;
        }

        println!("\n=== Timing Summary ===");
        println!("Config:    {:.4}s", self.config_time_s);
        if self.runs > 0 {
            println!(
                "Simulate:  {:.4}s ({} run(s), {:.6}s avg)",
                self.simulate_time_s,
                self.runs,
                self.simulate_time_s / self.runs as f64
            );
        }
        if self.save_time_s > 0.0 {
            println!("Save:      {:.4}s", self.save_time_s);
        }
        if self.load_cache_time_s > 0.0 {
            println!("Cache load: {:.4}s", self.load_cache_time_s);
        }
        println!("Total:     {:.4}s", self.total_time_s());
        println!("======================\n");
    }
}
