//! Error types for the engine.
//!
//! Routine negative outcomes (failed eligibility, skill on cooldown) are
//! *not* errors; they come back as plain values. The enums here cover
//! boundary violations: unparseable category tags, illegal lifecycle
//! transitions, bad configuration and malformed skill catalogs.

use crate::ids::SkillId;
use crate::lifecycle::{LifecycleAction, LifecycleState};
use thiserror::Error;

/// Format a prerequisite cycle as a readable string.
fn format_cycle_path(path: &[SkillId]) -> String {
    if path.is_empty() {
        return String::from("(empty cycle)");
    }
    path.iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Errors raised by the stat engine and its boundaries.
///
/// # Examples
///
/// ```rust
/// use statforge::EngineError;
///
/// let err = EngineError::UnknownCategory("siege".into());
/// assert_eq!(err.to_string(), "Unknown attack category: siege");
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// A lifecycle action was attempted from a state that does not allow it.
    ///
    /// The component state is left unchanged.
    #[error("Cannot {action} while {from}")]
    InvalidTransition {
        from: LifecycleState,
        action: LifecycleAction,
    },

    /// The engine was asked to resolve while not running.
    #[error("Engine is not running (state: {0})")]
    NotRunning(LifecycleState),

    /// An attack or toughness category tag outside the closed set.
    #[error("Unknown attack category: {0}")]
    UnknownCategory(String),

    /// An attribute tag outside the closed set.
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    /// A derived stat tag outside the closed set.
    #[error("Unknown derived stat: {0}")]
    UnknownStat(String),

    /// Configuration failed to parse or validate.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors raised while assembling a skill catalog.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SkillError {
    /// Prerequisites form a cycle, so no skill on it could ever be learned.
    ///
    /// If A requires B and B requires A, the path is `[A, B, A]`.
    #[error("Prerequisite cycle detected: {}", format_cycle_path(.path))]
    PrerequisiteCycle { path: Vec<SkillId> },

    /// A skill names a prerequisite that is not in the catalog.
    #[error("Skill {skill} requires unknown skill {missing}")]
    UnknownPrerequisite { skill: SkillId, missing: SkillId },

    /// A skill with this id is already registered.
    #[error("Duplicate skill: {0}")]
    DuplicateSkill(SkillId),
}
