//! Diagnostic reports
//!
//! Every stage appends to one ordered list of reports that is handed back to
//! the caller together with the generated code.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportKind {
    Error,
    Warning,
    Log,
}

/// Pipeline stage that produced a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Optimization,
    Lowering,
    Backend,
}

/// A single diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub kind: ReportKind,
    pub stage: Stage,
    /// Source line, or -1 when the report is not tied to a position
    pub line: i32,
    /// Source column, or -1 when the report is not tied to a position
    pub column: i32,
    pub message: String,
}

impl Report {
    pub fn new(
        kind: ReportKind,
        stage: Stage,
        line: i32,
        column: i32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            stage,
            line,
            column,
            message: message.into(),
        }
    }

    /// Error report with no source position
    pub fn new_error(stage: Stage, message: impl Into<String>) -> Self {
        Self::new(ReportKind::Error, stage, -1, -1, message)
    }

    /// Informational report with no source position
    pub fn new_log(stage: Stage, message: impl Into<String>) -> Self {
        Self::new(ReportKind::Log, stage, -1, -1, message)
    }

    pub fn is_error(&self) -> bool {
        self.kind == ReportKind::Error
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::Error => write!(f, "ERROR"),
            ReportKind::Warning => write!(f, "WARNING"),
            ReportKind::Log => write!(f, "LOG"),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Optimization => write!(f, "optimization"),
            Stage::Lowering => write!(f, "lowering"),
            Stage::Backend => write!(f, "backend"),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}, line {}, col {}: {}",
            self.kind, self.stage, self.line, self.column, self.message
        )
    }
}
