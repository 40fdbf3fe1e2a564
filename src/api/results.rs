use crate::drift::DriftReport;

/// Result of comparing two schemas.
#[derive(Debug, Clone)]
pub struct CompareResult {
    /// Whether any comparison found a difference or could not run
    pub has_drift: bool,
    /// Every comparison outcome, in run order
    pub report: DriftReport,
}

impl CompareResult {
    pub fn is_clean(&self) -> bool {
        !self.has_drift
    }
}

/// Result of a connection check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Credential-free description of the server that answered
    pub server: String,
}
