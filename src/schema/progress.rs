//! Run phase and statistics types.

use serde::{Deserialize, Serialize};

/// Lifecycle of a hill-climbing run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ClimbPhase {
    /// No population rendered yet.
    #[default]
    Idle,
    /// Initial population scored; iterating.
    Running,
    /// Iteration budget exhausted.
    Finished,
}

/// Statistics from a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClimbStats {
    /// Iterations executed (always equal to the budget).
    pub iterations: u64,
    /// Number of accepted mutations.
    pub accepted_changes: u64,
    /// Score of the initial random population.
    pub initial_score: f64,
    /// Score of the final current best.
    pub final_score: f64,
    /// Seed the run's generator was created from.
    pub random_seed: u64,
    /// Time taken (in seconds).
    pub elapsed_seconds: f64,
    /// Iterations per second.
    pub iterations_per_second: f64,
}

impl ClimbStats {
    /// Fraction of iterations whose candidate was accepted.
    pub fn acceptance_rate(&self) -> f64 {
        if self.iterations == 0 {
            0.0
        } else {
            self.accepted_changes as f64 / self.iterations as f64
        }
    }
}

impl std::fmt::Display for ClimbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} iterations, {} changes ({:.2}% accepted), similarity {:.2}% -> {:.2}%, {:.1} it/s",
            self.iterations,
            self.accepted_changes,
            self.acceptance_rate() * 100.0,
            self.initial_score,
            self.final_score,
            self.iterations_per_second
        )
    }
}
