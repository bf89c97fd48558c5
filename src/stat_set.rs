//! Derived stat sets.
//!
//! A [`DerivedStatSet`] holds one value per [`DerivedStatKind`]. Storage is a
//! dense array indexed by the kind, so a set is always fully populated and
//! lookups cannot miss.

use crate::kinds::DerivedStatKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A complete set of derived combat statistics.
///
/// This is read-only for consumers, cheap to copy, and serializes as a map
/// keyed by stat tag.
///
/// # Examples
///
/// ```rust
/// use statforge::{DerivedStatKind, DerivedStatSet};
///
/// let mut stats = DerivedStatSet::zeroed();
/// stats.set(DerivedStatKind::Health, 220.0);
/// assert_eq!(stats.get(DerivedStatKind::Health), 220.0);
/// assert_eq!(stats.get(DerivedStatKind::Mana), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(
    into = "BTreeMap<DerivedStatKind, f64>",
    from = "BTreeMap<DerivedStatKind, f64>"
)]
pub struct DerivedStatSet {
    values: [f64; DerivedStatKind::COUNT],
}

impl DerivedStatSet {
    /// A set with every stat at zero.
    pub fn zeroed() -> Self {
        Self {
            values: [0.0; DerivedStatKind::COUNT],
        }
    }

    /// Build a set by evaluating `f` once per stat.
    pub fn from_fn(mut f: impl FnMut(DerivedStatKind) -> f64) -> Self {
        let mut set = Self::zeroed();
        for kind in DerivedStatKind::ALL {
            set.values[kind.index()] = f(*kind);
        }
        set
    }

    /// Read one stat.
    pub fn get(&self, kind: DerivedStatKind) -> f64 {
        self.values[kind.index()]
    }

    /// Overwrite one stat.
    pub fn set(&mut self, kind: DerivedStatKind, value: f64) {
        self.values[kind.index()] = value;
    }

    /// Builder-style setter.
    pub fn with(mut self, kind: DerivedStatKind, value: f64) -> Self {
        self.set(kind, value);
        self
    }

    /// Mutable access to one stat.
    pub fn get_mut(&mut self, kind: DerivedStatKind) -> &mut f64 {
        &mut self.values[kind.index()]
    }

    /// All stats in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (DerivedStatKind, f64)> + '_ {
        DerivedStatKind::ALL
            .iter()
            .map(move |kind| (*kind, self.values[kind.index()]))
    }

    /// True when every value is bit-for-bit equal to `other`'s.
    ///
    /// Unlike `==`, this treats two NaNs with the same payload as equal and
    /// distinguishes `0.0` from `-0.0`.
    pub fn bit_identical(&self, other: &Self) -> bool {
        self.values
            .iter()
            .zip(other.values.iter())
            .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

impl Default for DerivedStatSet {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl From<BTreeMap<DerivedStatKind, f64>> for DerivedStatSet {
    fn from(map: BTreeMap<DerivedStatKind, f64>) -> Self {
        Self::from_fn(|kind| map.get(&kind).copied().unwrap_or(0.0))
    }
}

impl From<DerivedStatSet> for BTreeMap<DerivedStatKind, f64> {
    fn from(set: DerivedStatSet) -> Self {
        set.iter().collect()
    }
}
