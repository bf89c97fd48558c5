//! Timed modifiers.
//!
//! A modifier adjusts one attribute (before derivation) or one derived stat
//! (after derivation). Modifiers are either additive (`value + magnitude`)
//! or percentage (`value * (1 + magnitude / 100)`). Within a pass, all
//! additive modifiers for a target are summed first, then percentage
//! modifiers multiply the running value one at a time in insertion order.
//!
//! Expiry is a pure comparison against a caller-supplied `now`:
//! a modifier with `duration > 0` is expired once `now - start_time > duration`.
//! A `duration <= 0` means permanent.

use crate::ids::{ModifierId, SkillId};
use crate::kinds::{AttributeKind, DerivedStatKind};
use serde::{Deserialize, Serialize};

/// How a modifier combines with the value it targets.
///
/// Variants are ordered by application phase: every additive modifier on a
/// target is applied before any percentage modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierKind {
    /// Adds `magnitude` to the value.
    Additive,
    /// Multiplies the value by `1 + magnitude / 100`.
    Percentage,
}

/// A timed adjustment to one target.
///
/// `K` is the target tag: [`AttributeKind`] for attribute modifiers,
/// [`DerivedStatKind`] for stat modifiers.
///
/// # Examples
///
/// ```rust
/// use statforge::{AttributeKind, AttributeModifier};
///
/// let buff = AttributeModifier::percentage("war-cry", AttributeKind::Strength, 50.0, "shout")
///     .lasting(5.0, 0.0);
/// assert!(!buff.is_expired(4.99));
/// assert!(buff.is_expired(5.01));
/// assert_eq!(buff.apply_to(20.0), 30.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier<K> {
    /// Unique id of this record within its ledger.
    pub id: ModifierId,
    /// What the modifier adjusts.
    pub target: K,
    /// Flat amount, or percent for [`ModifierKind::Percentage`].
    pub magnitude: f64,
    /// Free-form origin tag (item id, effect name, skill id).
    pub source: String,
    /// Lifetime in seconds; `<= 0` is permanent.
    pub duration: f64,
    /// Timestamp the modifier became active.
    pub start_time: f64,
    /// Combination rule.
    pub kind: ModifierKind,
}

/// Modifier applied to base attributes before derivation.
pub type AttributeModifier = Modifier<AttributeKind>;

/// Modifier applied to derived stats after derivation.
pub type StatModifier = Modifier<DerivedStatKind>;

impl<K> Modifier<K> {
    /// A permanent additive modifier.
    pub fn additive(
        id: impl Into<ModifierId>,
        target: K,
        magnitude: f64,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            target,
            magnitude,
            source: source.into(),
            duration: 0.0,
            start_time: 0.0,
            kind: ModifierKind::Additive,
        }
    }

    /// A permanent percentage modifier.
    pub fn percentage(
        id: impl Into<ModifierId>,
        target: K,
        magnitude: f64,
        source: impl Into<String>,
    ) -> Self {
        Self {
            kind: ModifierKind::Percentage,
            ..Self::additive(id, target, magnitude, source)
        }
    }

    /// Give the modifier a finite lifetime starting at `start_time`.
    pub fn lasting(mut self, duration: f64, start_time: f64) -> Self {
        self.duration = duration;
        self.start_time = start_time;
        self
    }

    /// Whether the modifier never expires.
    pub fn is_permanent(&self) -> bool {
        self.duration <= 0.0
    }

    /// Whether the modifier is a percentage modifier.
    pub fn is_percentage(&self) -> bool {
        self.kind == ModifierKind::Percentage
    }

    /// Whether the modifier has lapsed at `now`.
    ///
    /// The boundary is exclusive: at exactly `start_time + duration` the
    /// modifier is still active.
    pub fn is_expired(&self, now: f64) -> bool {
        self.duration > 0.0 && now - self.start_time > self.duration
    }

    /// Seconds left before expiry, or `None` for permanent modifiers.
    pub fn remaining(&self, now: f64) -> Option<f64> {
        if self.is_permanent() {
            None
        } else {
            Some((self.start_time + self.duration - now).max(0.0))
        }
    }

    /// Apply this modifier alone to `value`.
    pub fn apply_to(&self, value: f64) -> f64 {
        match self.kind {
            ModifierKind::Additive => value + self.magnitude,
            ModifierKind::Percentage => value * (1.0 + self.magnitude / 100.0),
        }
    }
}

/// Declared shape of a modifier that a skill grants on use.
///
/// Templates carry no id, source or start time; those are stamped by
/// [`ModifierTemplate::instantiate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierTemplate<K> {
    pub target: K,
    pub magnitude: f64,
    #[serde(default)]
    pub duration: f64,
    pub kind: ModifierKind,
}

impl<K: Copy> ModifierTemplate<K> {
    /// An additive template.
    pub fn additive(target: K, magnitude: f64, duration: f64) -> Self {
        Self {
            target,
            magnitude,
            duration,
            kind: ModifierKind::Additive,
        }
    }

    /// A percentage template.
    pub fn percentage(target: K, magnitude: f64, duration: f64) -> Self {
        Self {
            target,
            magnitude,
            duration,
            kind: ModifierKind::Percentage,
        }
    }

    /// Stamp a live modifier sourced from `skill` and starting at `now`.
    pub fn instantiate(&self, id: ModifierId, skill: &SkillId, now: f64) -> Modifier<K> {
        Modifier {
            id,
            target: self.target,
            magnitude: self.magnitude,
            source: skill.as_str().to_string(),
            duration: self.duration,
            start_time: now,
            kind: self.kind,
        }
    }
}
