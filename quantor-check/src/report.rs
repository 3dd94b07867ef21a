use std::fmt;
use std::time::Duration;

use quantor_eval::CounterexamplePath;
use serde::Serialize;

pub const REPORT_SCHEMA: &str = "quantor.check.v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckOutcome {
    Passed,
    Failed { counterexample: Vec<Assignment> },
    Unchecked,
    Error { message: String },
    Interrupted,
}

impl CheckOutcome {
    pub fn failed(path: &CounterexamplePath) -> Self {
        CheckOutcome::Failed {
            counterexample: path
                .bindings()
                .map(|(name, value)| Assignment { name, value })
                .collect(),
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, CheckOutcome::Passed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObligationReport {
    pub number: usize,
    pub kind: String,
    #[serde(flatten)]
    pub outcome: CheckOutcome,
    pub seconds: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_ranges: Vec<String>,
}

impl ObligationReport {
    pub fn new(number: usize, kind: impl Into<String>, outcome: CheckOutcome) -> Self {
        Self {
            number,
            kind: kind.into(),
            outcome,
            seconds: 0.0,
            missing_ranges: Vec::new(),
        }
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.seconds = elapsed.as_secs_f64();
        self
    }
}

impl fmt::Display for ObligationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.number;
        let secs = self.seconds;
        match &self.outcome {
            CheckOutcome::Passed => write!(f, "PO# {n}, PASSED in {secs:.3}s"),
            CheckOutcome::Failed { counterexample } => {
                write!(f, "PO# {n}, FAILED in {secs:.3}s")?;
                if counterexample.is_empty() {
                    return Ok(());
                }
                f.write_str(": Counterexample: ")?;
                for (i, a) in counterexample.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{} = {}", a.name, a.value)?;
                }
                Ok(())
            }
            CheckOutcome::Unchecked => write!(f, "PO# {n}, UNCHECKED"),
            CheckOutcome::Error { message } => write!(f, "PO# {n}, Error: {message}"),
            CheckOutcome::Interrupted => write!(f, "PO# {n}, INTERRUPTED"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckSummary {
    pub schema: &'static str,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub unchecked: usize,
    pub errors: usize,
    pub interrupted: usize,
    pub reports: Vec<ObligationReport>,
}

impl CheckSummary {
    pub fn from_reports(reports: Vec<ObligationReport>) -> Self {
        let mut summary = CheckSummary {
            schema: REPORT_SCHEMA,
            total: reports.len(),
            ..CheckSummary::default()
        };
        for r in &reports {
            match r.outcome {
                CheckOutcome::Passed => summary.passed += 1,
                CheckOutcome::Failed { .. } => summary.failed += 1,
                CheckOutcome::Unchecked => summary.unchecked += 1,
                CheckOutcome::Error { .. } => summary.errors += 1,
                CheckOutcome::Interrupted => summary.interrupted += 1,
            }
        }
        summary.reports = reports;
        summary
    }

    pub fn all_passed(&self) -> bool {
        self.passed + self.unchecked == self.total
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for CheckSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in &self.reports {
            writeln!(f, "{r}")?;
        }
        write!(
            f,
            "{} obligations: {} passed, {} failed, {} unchecked, {} errors",
            self.total, self.passed, self.failed, self.unchecked, self.errors
        )?;
        if self.interrupted > 0 {
            write!(f, ", {} interrupted", self.interrupted)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_report_renders_counterexample() {
        let report = ObligationReport::new(
            3,
            "subtype",
            CheckOutcome::Failed {
                counterexample: vec![Assignment {
                    name: "x".into(),
                    value: "1".into(),
                }],
            },
        )
        .with_elapsed(Duration::from_millis(2));
        assert_eq!(report.to_string(), "PO# 3, FAILED in 0.002s: Counterexample: x = 1");
    }

    #[test]
    fn failure_without_bindings_has_no_counterexample_suffix() {
        let report = ObligationReport::new(
            4,
            "satisfiability",
            CheckOutcome::Failed {
                counterexample: Vec::new(),
            },
        );
        assert_eq!(report.to_string(), "PO# 4, FAILED in 0.000s");
    }

    #[test]
    fn summary_serializes_with_flattened_status() {
        let summary = CheckSummary::from_reports(vec![
            ObligationReport::new(1, "subtype", CheckOutcome::Passed),
            ObligationReport::new(2, "total function", CheckOutcome::Unchecked),
        ]);
        assert!(summary.all_passed());
        let json: serde_json::Value =
            serde_json::from_str(&summary.to_json().expect("json")).expect("parse");
        assert_eq!(json["schema"], REPORT_SCHEMA);
        assert_eq!(json["reports"][0]["status"], "passed");
        assert_eq!(json["reports"][1]["status"], "unchecked");
        assert!(json["reports"][0].get("missing_ranges").is_none());
    }
}
