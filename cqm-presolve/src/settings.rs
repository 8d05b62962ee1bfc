//! Configuration for the presolve driver.

/// Presolve driver settings.
#[derive(Debug, Clone)]
pub struct PresolveSettings {
    /// Maximum number of reduction rounds per run.
    ///
    /// The fixed point is normally reached within a handful of rounds; the
    /// cap only guards against oscillation. Must be finite.
    pub max_rounds: usize,
}

impl Default for PresolveSettings {
    fn default() -> Self {
        Self { max_rounds: 100 }
    }
}

impl PresolveSettings {
    /// Set the reduction round cap.
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }
}
