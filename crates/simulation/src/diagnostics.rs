//! Severity-tagged simulation diagnostics.

use serde::Serialize;

/// How serious a diagnostic is. Callers treat `Error` as blocking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Info,
    Warn,
    Error,
}

impl DiagnosticSeverity {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticSeverity::Info => "info",
            DiagnosticSeverity::Warn => "warn",
            DiagnosticSeverity::Error => "error",
        }
    }
}

impl std::fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding about a simulated run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// Stable machine-readable code
    pub code: &'static str,
    /// Severity
    pub severity: DiagnosticSeverity,
    /// Human-readable detail
    pub message: String,
}

impl Diagnostic {
    /// Informational diagnostic.
    pub fn info(code: &'static str, message: impl Into<String>) -> Self {
        Self { code, severity: DiagnosticSeverity::Info, message: message.into() }
    }

    /// Warning diagnostic.
    pub fn warn(code: &'static str, message: impl Into<String>) -> Self {
        Self { code, severity: DiagnosticSeverity::Warn, message: message.into() }
    }

    /// Error diagnostic.
    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        Self { code, severity: DiagnosticSeverity::Error, message: message.into() }
    }

    /// Whether this diagnostic blocks execution.
    pub fn is_blocking(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.code, self.message)
    }
}

/// Diagnostic codes.
pub mod codes {
    /// Program has no constraints
    pub const NO_CONSTRAINTS: &str = "no-constraints";
    /// No constraint opens a policy window
    pub const NO_POLICY_WINDOWS: &str = "no-policy-windows";
    /// Workflow quality under the floor
    pub const LOW_QUALITY: &str = "low-quality";
    /// Baseline policy decision is blocked
    pub const BASELINE_BLOCKED: &str = "baseline-blocked";
    /// Program graded F
    pub const FAILING_GRADE: &str = "failing-grade";
    /// Baseline policy reports blocked constraints
    pub const BLOCKED_CONSTRAINTS: &str = "blocked-constraints";
    /// Step dependencies form a cycle
    pub const DEPENDENCY_CYCLE: &str = "dependency-cycle";
    /// Steps cannot be scheduled
    pub const UNSCHEDULED_STEPS: &str = "unscheduled-steps";
    /// A step depends on an unknown step
    pub const DANGLING_DEPENDENCY: &str = "dangling-dependency";
    /// Critical path of the program
    pub const CRITICAL_PATH: &str = "critical-path";
}

/// Count diagnostics at a severity.
pub fn count_severity(diagnostics: &[Diagnostic], severity: DiagnosticSeverity) -> usize {
    diagnostics.iter().filter(|d| d.severity == severity).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_blocking() {
        let d = Diagnostic::error(codes::LOW_QUALITY, "quality 0.31 below 0.40");
        assert_eq!(d.to_string(), "[error] low-quality: quality 0.31 below 0.40");
        assert!(d.is_blocking());
        assert!(!Diagnostic::warn(codes::NO_CONSTRAINTS, "none").is_blocking());
    }

    #[test]
    fn test_count_severity() {
        let diagnostics = [
            Diagnostic::info(codes::CRITICAL_PATH, "a"),
            Diagnostic::warn(codes::NO_CONSTRAINTS, "b"),
            Diagnostic::warn(codes::DANGLING_DEPENDENCY, "c"),
        ];
        assert_eq!(count_severity(&diagnostics, DiagnosticSeverity::Warn), 2);
        assert_eq!(count_severity(&diagnostics, DiagnosticSeverity::Error), 0);
    }
}
