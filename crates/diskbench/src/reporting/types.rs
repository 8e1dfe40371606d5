use crate::errors::{BenchError, FailureKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CaseOutcome {
    Passed,
    Failed { kind: FailureKind, message: String },
}

impl CaseOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, CaseOutcome::Passed)
    }
}

impl From<Result<(), BenchError>> for CaseOutcome {
    fn from(result: Result<(), BenchError>) -> Self {
        match result {
            Ok(()) => CaseOutcome::Passed,
            Err(e) => CaseOutcome::Failed {
                kind: e.failure_kind().unwrap_or(FailureKind::ToolExecution),
                message: e.to_string(),
            },
        }
    }
}

/// Result of one (device, mode) case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    pub device: String,
    pub mode: String,
    pub workload: String,
    pub command: String,
    pub exit_code: i32,
    pub outcome: CaseOutcome,
    /// Informational, never used for pass/fail
    pub iops: Option<String>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u128,
}

impl fmt::Display for CaseResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            CaseOutcome::Passed => write!(
                f,
                "{} [{}]: IOPS={}",
                self.device,
                self.mode,
                self.iops.as_deref().unwrap_or("?")
            ),
            CaseOutcome::Failed { kind, message } => {
                write!(f, "{} [{}]: {} ({})", self.device, self.mode, message, kind)
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub tool: String,
    pub passed: usize,
    pub failed: usize,
    pub cases: Vec<CaseResult>,
}

impl RunSummary {
    pub fn new(tool: String) -> Self {
        Self {
            started_at: Utc::now(),
            tool,
            passed: 0,
            failed: 0,
            cases: Vec::new(),
        }
    }

    pub fn add_case(&mut self, case: CaseResult) {
        if case.outcome.is_pass() {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        self.cases.push(case);
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &CaseResult> {
        self.cases.iter().filter(|c| !c.outcome.is_pass())
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} passed, {} failed ({} cases)",
            self.passed,
            self.failed,
            self.cases.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(outcome: CaseOutcome) -> CaseResult {
        CaseResult {
            device: "nvme0n1".to_string(),
            mode: "random write".to_string(),
            workload: "randwrite".to_string(),
            command: "fio".to_string(),
            exit_code: 0,
            outcome,
            iops: Some("500".to_string()),
            started_at: Utc::now(),
            duration_ms: 1,
        }
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = RunSummary::new("fio".to_string());
        summary.add_case(case(CaseOutcome::Passed));
        summary.add_case(case(CaseOutcome::Failed {
            kind: FailureKind::MissingMetric,
            message: "no iops".to_string(),
        }));

        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert!(!summary.all_passed());
        assert_eq!(summary.failures().count(), 1);
        assert_eq!(summary.to_string(), "1 passed, 1 failed (2 cases)");
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(CaseOutcome::Failed {
            kind: FailureKind::ToolExecution,
            message: "exit 2".to_string(),
        })
        .unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["kind"], "tool_execution");

        let json = serde_json::to_value(CaseOutcome::Passed).unwrap();
        assert_eq!(json["status"], "passed");
    }

    #[test]
    fn test_display() {
        assert_eq!(
            case(CaseOutcome::Passed).to_string(),
            "nvme0n1 [random write]: IOPS=500"
        );
    }
}
