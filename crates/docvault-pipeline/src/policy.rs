//! Per-stage failure policy
//!
//! Stages fail independently. Only extraction failures reach the user as an
//! error panel; upload and interpretation failures are logged and otherwise
//! leave the job where the status says it stopped.

use serde::Serialize;
use std::fmt::{Display, Formatter, Result as FmtResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Upload,
    Extract,
    Interpret,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Upload => "upload",
            Stage::Extract => "extract",
            Stage::Interpret => "interpret",
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Record an error panel on the job.
    Surface,
    /// Log and move to the failed status without a panel.
    LogOnly,
}

pub const fn failure_policy(stage: Stage) -> FailurePolicy {
    match stage {
        Stage::Upload => FailurePolicy::LogOnly,
        Stage::Extract => FailurePolicy::Surface,
        Stage::Interpret => FailurePolicy::LogOnly,
    }
}
