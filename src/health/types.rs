//! # Health Check Types
//!
//! Probe outcomes, recorded results and the aggregate summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Outcome of a single probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

impl CheckStatus {
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Pass => "✅",
            Self::Warn => "⚠️",
            Self::Fail => "❌",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Warn => write!(f, "warn"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

/// What a probe reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub status: CheckStatus,
    pub message: String,
    pub data: Value,
}

impl ProbeOutcome {
    pub fn new(status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            data: Value::Null,
        }
    }

    pub fn pass(message: impl Into<String>) -> Self {
        Self::new(CheckStatus::Pass, message)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(CheckStatus::Warn, message)
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::new(CheckStatus::Fail, message)
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

/// Recorded result of one probe execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub status: CheckStatus,
    pub message: String,
    pub data: Value,
    /// Wall-clock execution time in milliseconds
    pub execution_time_ms: f64,
}

impl CheckResult {
    pub fn from_outcome(outcome: ProbeOutcome, execution_time_ms: f64) -> Self {
        Self {
            status: outcome.status,
            message: outcome.message,
            data: outcome.data,
            execution_time_ms,
        }
    }

    /// Synthetic failure for a probe that errored, panicked or timed out
    pub fn failed(error: impl fmt::Display, execution_time_ms: f64) -> Self {
        Self {
            status: CheckStatus::Fail,
            message: format!("Check failed: {error}"),
            data: Value::Null,
            execution_time_ms,
        }
    }
}

/// Registered check metadata plus its latest result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheckInfo {
    pub name: String,
    pub critical: bool,
    pub last_run: Option<DateTime<Utc>>,
    pub last_result: Option<CheckResult>,
}

/// Overall site status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Healthy,
    Warning,
    Critical,
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Aggregate over the latest results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSummary {
    pub total: usize,
    pub passed: usize,
    pub warnings: usize,
    pub failed: usize,
    /// Rounded percentage of passed checks; 0 when nothing is registered
    pub score: u32,
    pub status: OverallStatus,
}

impl HealthSummary {
    /// Aggregate `statuses` against `total` registered checks
    pub fn from_statuses<I>(total: usize, statuses: I) -> Self
    where
        I: IntoIterator<Item = CheckStatus>,
    {
        let (mut passed, mut warnings, mut failed) = (0, 0, 0);
        for status in statuses {
            match status {
                CheckStatus::Pass => passed += 1,
                CheckStatus::Warn => warnings += 1,
                CheckStatus::Fail => failed += 1,
            }
        }

        let score = if total > 0 {
            ((passed as f64 / total as f64) * 100.0).round() as u32
        } else {
            0
        };

        let status = if failed > 0 {
            OverallStatus::Critical
        } else if warnings > 0 {
            OverallStatus::Warning
        } else {
            OverallStatus::Healthy
        };

        Self {
            total,
            passed,
            warnings,
            failed,
            score,
            status,
        }
    }
}
