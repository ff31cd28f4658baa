//! Gate outcome shared by all validators.

/// Outcome of a validation gate.
///
/// Empty `errors` means the stage output passed. Callers decide
/// whether a failed gate is fatal, retryable, or a warning.
#[derive(Debug, Clone, Default)]
pub struct GateReport {
    pub errors: Vec<String>,
}

impl GateReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    /// Join errors into a single diagnostic line.
    pub fn summary(&self) -> String {
        self.errors.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_is_valid() {
        let report = GateReport::new();
        assert!(report.is_valid());
    }

    #[test]
    fn test_summary_joins_errors() {
        let mut report = GateReport::new();
        report.push("first");
        report.push("second");
        assert!(!report.is_valid());
        assert_eq!(report.summary(), "first; second");
    }
}
