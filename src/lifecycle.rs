//! Component lifecycle state machine.
//!
//! ```text
//! uninitialized --initialize--> ready --start--> running <--pause/resume--> paused
//!                                 ^                 |                          |
//!                                 +----reset---- stopped <-------stop----------+
//! any state except destroyed --destroy--> destroyed
//! ```
//!
//! Every transition is validated. A rejected action returns
//! [`EngineError::InvalidTransition`] and leaves the state unchanged.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Where a component is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Uninitialized,
    Ready,
    Running,
    Paused,
    Stopped,
    Destroyed,
}

impl LifecycleState {
    /// Lowercase name used in logs and errors.
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::Uninitialized => "uninitialized",
            LifecycleState::Ready => "ready",
            LifecycleState::Running => "running",
            LifecycleState::Paused => "paused",
            LifecycleState::Stopped => "stopped",
            LifecycleState::Destroyed => "destroyed",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A requested lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    Initialize,
    Start,
    Pause,
    Resume,
    Stop,
    Reset,
    Destroy,
}

impl LifecycleAction {
    /// Lowercase name used in logs and errors.
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleAction::Initialize => "initialize",
            LifecycleAction::Start => "start",
            LifecycleAction::Pause => "pause",
            LifecycleAction::Resume => "resume",
            LifecycleAction::Stop => "stop",
            LifecycleAction::Reset => "reset",
            LifecycleAction::Destroy => "destroy",
        }
    }

    /// State reached by applying this action in `from`, if allowed.
    pub fn target(self, from: LifecycleState) -> Option<LifecycleState> {
        use LifecycleAction as A;
        use LifecycleState as S;

        match (self, from) {
            (A::Initialize, S::Uninitialized) => Some(S::Ready),
            (A::Start, S::Ready) => Some(S::Running),
            (A::Pause, S::Running) => Some(S::Paused),
            (A::Resume, S::Paused) => Some(S::Running),
            (A::Stop, S::Running | S::Paused) => Some(S::Stopped),
            (A::Reset, S::Stopped) => Some(S::Ready),
            (A::Destroy, S::Destroyed) => None,
            (A::Destroy, _) => Some(S::Destroyed),
            _ => None,
        }
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated lifecycle for one named component.
///
/// # Examples
///
/// ```rust
/// use statforge::lifecycle::{Lifecycle, LifecycleAction, LifecycleState};
///
/// let mut lifecycle = Lifecycle::new("stats");
/// assert!(lifecycle.apply(LifecycleAction::Start).is_err());
/// assert_eq!(lifecycle.state(), LifecycleState::Uninitialized);
///
/// lifecycle.apply(LifecycleAction::Initialize).unwrap();
/// lifecycle.apply(LifecycleAction::Start).unwrap();
/// assert!(lifecycle.is_running());
/// ```
#[derive(Debug, Clone)]
pub struct Lifecycle {
    component: String,
    state: LifecycleState,
}

impl Lifecycle {
    /// A machine for `component`, starting uninitialized.
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            state: LifecycleState::Uninitialized,
        }
    }

    /// Current state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Whether resolution work is allowed.
    pub fn is_running(&self) -> bool {
        self.state == LifecycleState::Running
    }

    /// Apply `action`, returning the new state.
    pub fn apply(&mut self, action: LifecycleAction) -> Result<LifecycleState, EngineError> {
        let from = self.state;
        let to = action
            .target(from)
            .ok_or(EngineError::InvalidTransition { from, action })?;
        self.state = to;
        info!(component = %self.component, %action, %from, %to, "lifecycle transition");
        Ok(to)
    }
}
