use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lane a resolution request is queued in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Drained before any normal request
    High,
    #[default]
    Normal,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Normal => "normal",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "normal" => Ok(Self::Normal),
            other => Err(format!("Invalid priority: {other}. Must be one of: high, normal")),
        }
    }
}

/// Result delivered to callers awaiting a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "name", rename_all = "snake_case")]
pub enum ResolveOutcome {
    /// A display name is known, from cache or a fresh lookup
    Resolved(String),
    /// The resolver returned no name or errored
    Failed,
    /// Backoff is in effect for the handle; nothing was attempted
    Skipped,
}

impl ResolveOutcome {
    pub const fn status(&self) -> &'static str {
        match self {
            Self::Resolved(_) => "resolved",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Resolved(name) => Some(name),
            Self::Failed | Self::Skipped => None,
        }
    }
}

/// Lane and in-flight sizes of the fetch scheduler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerState {
    pub high_queued: usize,
    pub normal_queued: usize,
    pub in_flight: usize,
}

impl SchedulerState {
    pub const fn is_idle(&self) -> bool {
        self.high_queued == 0 && self.normal_queued == 0 && self.in_flight == 0
    }
}
