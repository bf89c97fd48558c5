//! Base attribute profiles.
//!
//! An [`AttributeProfile`] is the per-entity snapshot of base attribute
//! values that external systems (character creation, levelling, equipment)
//! hand to the engine. Reads never fail: an attribute absent from the
//! profile reads as `0.0`.

use crate::kinds::AttributeKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value every attribute starts at in a default profile.
pub const DEFAULT_ATTRIBUTE_VALUE: f64 = 10.0;

/// Mapping from attribute to base value.
///
/// [`AttributeProfile::default`] populates all eight attributes with
/// [`DEFAULT_ATTRIBUTE_VALUE`]; [`AttributeProfile::empty`] starts with none.
///
/// # Examples
///
/// ```rust
/// use statforge::{AttributeKind, AttributeProfile};
///
/// let profile = AttributeProfile::default().with(AttributeKind::Strength, 15.0);
/// assert_eq!(profile.get(AttributeKind::Strength), 15.0);
/// assert_eq!(profile.get(AttributeKind::Luck), 10.0);
///
/// let sparse = AttributeProfile::empty().with(AttributeKind::Agility, 4.0);
/// assert_eq!(sparse.get(AttributeKind::Wisdom), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeProfile {
    values: BTreeMap<AttributeKind, f64>,
}

impl AttributeProfile {
    /// A profile with every attribute at the default value.
    pub fn new() -> Self {
        Self::default()
    }

    /// A profile with no attributes set.
    pub fn empty() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Build a profile from an explicit map.
    pub fn from_map(values: BTreeMap<AttributeKind, f64>) -> Self {
        Self { values }
    }

    /// Builder-style setter.
    pub fn with(mut self, kind: AttributeKind, value: f64) -> Self {
        self.set(kind, value);
        self
    }

    /// Set one attribute.
    pub fn set(&mut self, kind: AttributeKind, value: f64) {
        self.values.insert(kind, value);
    }

    /// Read one attribute; absent attributes read as `0.0`.
    pub fn get(&self, kind: AttributeKind) -> f64 {
        self.values.get(&kind).copied().unwrap_or(0.0)
    }

    /// Whether the attribute is explicitly present.
    pub fn contains(&self, kind: AttributeKind) -> bool {
        self.values.contains_key(&kind)
    }

    /// Present attributes in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (AttributeKind, f64)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }

    /// Number of explicitly present attributes.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no attribute is present.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Default for AttributeProfile {
    fn default() -> Self {
        Self {
            values: AttributeKind::ALL
                .iter()
                .map(|kind| (*kind, DEFAULT_ATTRIBUTE_VALUE))
                .collect(),
        }
    }
}

impl FromIterator<(AttributeKind, f64)> for AttributeProfile {
    fn from_iter<I: IntoIterator<Item = (AttributeKind, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
