//! Worker lifecycle states, events and transition rules.
//!
//! ```text
//! Parsed ──Install──▶ Installing ──InstallSucceeded──▶ Installed
//!                         │                               │
//!                   InstallFailed                      Activate
//!                         ▼                               ▼
//!                     Redundant ◀──Supersede── Activated ◀──ActivationComplete── Activating
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::{LifecycleError, LifecycleResult};

/// Worker lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    /// Constructed, nothing cached yet
    #[default]
    Parsed,
    /// Populating the static partition
    Installing,
    /// App shell cached; waiting to take over
    Installed,
    /// Purging stale partitions
    Activating,
    /// Serving intercepted requests
    Activated,
    /// Install failed or a newer version took over
    Redundant,
}

impl WorkerState {
    /// Only an activated worker handles requests
    pub fn is_serving(&self) -> bool {
        matches!(self, Self::Activated)
    }

    /// No further transitions allowed
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Redundant)
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parsed => write!(f, "parsed"),
            Self::Installing => write!(f, "installing"),
            Self::Installed => write!(f, "installed"),
            Self::Activating => write!(f, "activating"),
            Self::Activated => write!(f, "activated"),
            Self::Redundant => write!(f, "redundant"),
        }
    }
}

/// Events that drive lifecycle transitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum LifecycleEvent {
    Install,
    InstallSucceeded,
    InstallFailed(String),
    Activate,
    ActivationComplete,
    Supersede,
}

impl LifecycleEvent {
    /// Get a string representation of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::InstallSucceeded => "install_succeeded",
            Self::InstallFailed(_) => "install_failed",
            Self::Activate => "activate",
            Self::ActivationComplete => "activation_complete",
            Self::Supersede => "supersede",
        }
    }
}

/// Determine the target state for an event
pub fn determine_target_state(
    current: WorkerState,
    event: &LifecycleEvent,
) -> LifecycleResult<WorkerState> {
    let target = match (current, event) {
        (WorkerState::Parsed, LifecycleEvent::Install) => WorkerState::Installing,
        (WorkerState::Installing, LifecycleEvent::InstallSucceeded) => WorkerState::Installed,
        (WorkerState::Installing, LifecycleEvent::InstallFailed(_)) => WorkerState::Redundant,
        (WorkerState::Installed, LifecycleEvent::Activate) => WorkerState::Activating,
        (WorkerState::Activating, LifecycleEvent::ActivationComplete) => WorkerState::Activated,
        (WorkerState::Installed | WorkerState::Activated, LifecycleEvent::Supersede) => {
            WorkerState::Redundant
        }
        (from, event) => {
            return Err(LifecycleError::InvalidTransition {
                from: from.to_string(),
                event: event.event_type().to_string(),
            })
        }
    };

    Ok(target)
}

/// Outcome of a successful install
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallResult {
    pub partition: String,
    pub cached_assets: usize,
    /// Take over from the previous instance without waiting for clients
    pub skip_waiting: bool,
}

/// Outcome of activation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActivateResult {
    pub deleted_partitions: Vec<String>,
    /// Partitions that could not be deleted, with the reason
    pub failed_deletions: Vec<(String, String)>,
    /// Open clients are controlled immediately
    pub clients_claimed: bool,
}
