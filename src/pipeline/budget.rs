//! Iteration and wall-clock budget for iterative selection methods

use std::time::{Duration, Instant};

use serde::Serialize;

/// Upper bound on the work an iterative search may do
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IterationBudget {
    /// Maximum evaluation rounds
    pub max_iterations: usize,
    /// Optional wall-clock limit for the whole search
    pub timeout: Option<Duration>,
}

impl Default for IterationBudget {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            timeout: None,
        }
    }
}

impl IterationBudget {
    /// Start counting against this budget.
    pub fn start(&self) -> BudgetTracker {
        BudgetTracker {
            max_iterations: self.max_iterations,
            deadline: self.timeout.map(|t| Instant::now() + t),
            used: 0,
        }
    }
}

/// Running consumption of an [`IterationBudget`]
#[derive(Debug, Clone)]
pub struct BudgetTracker {
    max_iterations: usize,
    deadline: Option<Instant>,
    used: usize,
}

impl BudgetTracker {
    /// Claim one more iteration. Returns `false` once the iteration count
    /// or the deadline is exhausted.
    pub fn try_consume(&mut self) -> bool {
        if self.used >= self.max_iterations {
            return false;
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return false;
            }
        }
        self.used += 1;
        true
    }

    pub fn used(&self) -> usize {
        self.used
    }
}
