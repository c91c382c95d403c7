//! Analysis configuration

use serde::{Deserialize, Serialize};

use crate::{ComputationError, DEFAULT_MAX_ITERATIONS, DEFAULT_PERCENTILE_CUTOFF, DEFAULT_TOLERANCE};

/// Tunables for one analysis run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Quantile used as the inclusion threshold, in (0, 1)
    pub percentile_cutoff: f64,
    /// Power-iteration budget for eigenvector centrality
    pub max_iterations: usize,
    /// Convergence tolerance per node
    pub tolerance: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            percentile_cutoff: DEFAULT_PERCENTILE_CUTOFF,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl AnalysisConfig {
    pub fn with_percentile_cutoff(mut self, cutoff: f64) -> Self {
        self.percentile_cutoff = cutoff;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn validate(&self) -> Result<(), ComputationError> {
        validate_cutoff(self.percentile_cutoff)?;
        if self.max_iterations == 0 {
            return Err(ComputationError::InvalidConfig(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ComputationError::InvalidConfig(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

pub(crate) fn validate_cutoff(cutoff: f64) -> Result<(), ComputationError> {
    if cutoff > 0.0 && cutoff < 1.0 {
        Ok(())
    } else {
        Err(ComputationError::InvalidConfig(format!(
            "percentile_cutoff must be in (0, 1), got {}",
            cutoff
        )))
    }
}
