//! Per-entity modifier ledger.
//!
//! A [`ModifierLedger`] owns the attribute and stat modifiers attached to
//! one entity as plain vectors of records with explicit ids. It applies them
//! in two passes:
//!
//! 1. **Attribute pass**: base profile → modified profile.
//! 2. **Stat pass**: derived stats → modified stats.
//!
//! Both passes use the same rule per target: sum the additive modifiers,
//! then apply each percentage modifier in insertion order. Expired modifiers
//! are filtered on every read, so results never depend on whether
//! [`ModifierLedger::prune`] has run.

use crate::ids::ModifierId;
use crate::kinds::{AttributeKind, DerivedStatKind};
use crate::modifier::{AttributeModifier, Modifier, ModifierKind, StatModifier};
use crate::profile::AttributeProfile;
use crate::stat_set::DerivedStatSet;
use tracing::{debug, warn};

/// Recommended number of pending modifiers per target before warning.
pub const DEFAULT_SOFT_CAP: usize = 50;

/// Fold every active modifier targeting `target` into `value`.
///
/// Returns the new value and how many modifiers contributed.
fn fold_target<K: Copy + Eq>(
    value: f64,
    target: K,
    modifiers: &[Modifier<K>],
    now: f64,
) -> (f64, usize) {
    let mut applied = 0;
    let active = || {
        modifiers
            .iter()
            .filter(move |m| m.target == target && !m.is_expired(now))
    };

    let mut flat = 0.0;
    for m in active().filter(|m| m.kind == ModifierKind::Additive) {
        flat += m.magnitude;
        applied += 1;
    }

    let mut current = value + flat;
    for m in active().filter(|m| m.kind == ModifierKind::Percentage) {
        current = m.apply_to(current);
        applied += 1;
    }

    (current, applied)
}

/// Run the attribute pass over `base`.
///
/// Attributes absent from `base` but targeted by an active modifier start
/// from `0.0`. Returns the modified profile and the number of modifier
/// applications.
///
/// # Examples
///
/// ```rust
/// use statforge::ledger::apply_attribute_pass;
/// use statforge::{AttributeKind, AttributeModifier, AttributeProfile};
///
/// let base = AttributeProfile::empty().with(AttributeKind::Strength, 10.0);
/// let mods = vec![
///     AttributeModifier::percentage("p", AttributeKind::Strength, 50.0, "buff"),
///     AttributeModifier::additive("a", AttributeKind::Strength, 10.0, "ring"),
/// ];
/// let (profile, applied) = apply_attribute_pass(&base, &mods, 0.0);
/// assert_eq!(profile.get(AttributeKind::Strength), 30.0); // (10 + 10) * 1.5
/// assert_eq!(applied, 2);
/// ```
pub fn apply_attribute_pass(
    base: &AttributeProfile,
    modifiers: &[AttributeModifier],
    now: f64,
) -> (AttributeProfile, usize) {
    let mut result = base.clone();
    let mut applied = 0;
    for kind in AttributeKind::ALL {
        let targeted = modifiers.iter().any(|m| m.target == *kind && !m.is_expired(now));
        if !targeted {
            continue;
        }
        let (value, n) = fold_target(base.get(*kind), *kind, modifiers, now);
        result.set(*kind, value);
        applied += n;
    }
    (result, applied)
}

/// Run the stat pass over `stats`.
pub fn apply_stat_pass(
    stats: &DerivedStatSet,
    modifiers: &[StatModifier],
    now: f64,
) -> (DerivedStatSet, usize) {
    let mut result = *stats;
    let mut applied = 0;
    for kind in DerivedStatKind::ALL {
        let (value, n) = fold_target(stats.get(*kind), *kind, modifiers, now);
        if n > 0 {
            result.set(*kind, value);
            applied += n;
        }
    }
    (result, applied)
}

/// Drop expired entries in place, preserving the order of the rest.
fn retain_active<K>(modifiers: &mut Vec<Modifier<K>>, now: f64) -> usize {
    let before = modifiers.len();
    modifiers.retain(|m| !m.is_expired(now));
    before - modifiers.len()
}

/// Insert or replace by id. Replacement keeps the original position.
fn upsert<K>(modifiers: &mut Vec<Modifier<K>>, modifier: Modifier<K>) -> Option<Modifier<K>> {
    match modifiers.iter().position(|m| m.id == modifier.id) {
        Some(idx) => Some(std::mem::replace(&mut modifiers[idx], modifier)),
        None => {
            modifiers.push(modifier);
            None
        }
    }
}

/// The modifiers attached to a single entity.
///
/// Ledgers are never shared between entities. They are not internally
/// synchronized; confine each one to a single owner at a time.
///
/// # Examples
///
/// ```rust
/// use statforge::{AttributeKind, AttributeModifier, AttributeProfile, ModifierLedger};
///
/// let mut ledger = ModifierLedger::new();
/// ledger.add_attribute_modifier(
///     AttributeModifier::additive("potion", AttributeKind::Vitality, 5.0, "potion")
///         .lasting(30.0, 0.0),
/// );
///
/// let profile = ledger.apply_attributes(&AttributeProfile::default(), 10.0);
/// assert_eq!(profile.get(AttributeKind::Vitality), 15.0);
///
/// assert_eq!(ledger.prune(31.0), 1);
/// assert!(ledger.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct ModifierLedger {
    attribute_modifiers: Vec<AttributeModifier>,
    stat_modifiers: Vec<StatModifier>,
    soft_cap: usize,
}

impl ModifierLedger {
    /// An empty ledger with the default soft cap.
    pub fn new() -> Self {
        Self::with_soft_cap(DEFAULT_SOFT_CAP)
    }

    /// An empty ledger that warns once a target exceeds `soft_cap` entries.
    pub fn with_soft_cap(soft_cap: usize) -> Self {
        Self {
            attribute_modifiers: Vec::new(),
            stat_modifiers: Vec::new(),
            soft_cap,
        }
    }

    /// Attach an attribute modifier.
    ///
    /// A modifier with an id already in the ledger replaces the old record,
    /// which is returned.
    pub fn add_attribute_modifier(
        &mut self,
        modifier: AttributeModifier,
    ) -> Option<AttributeModifier> {
        let target = modifier.target;
        let replaced = upsert(&mut self.attribute_modifiers, modifier);
        let count = self
            .attribute_modifiers
            .iter()
            .filter(|m| m.target == target)
            .count();
        self.check_soft_cap(target.as_str(), count);
        replaced
    }

    /// Attach a stat modifier.
    pub fn add_stat_modifier(&mut self, modifier: StatModifier) -> Option<StatModifier> {
        let target = modifier.target;
        let replaced = upsert(&mut self.stat_modifiers, modifier);
        let count = self
            .stat_modifiers
            .iter()
            .filter(|m| m.target == target)
            .count();
        self.check_soft_cap(target.as_str(), count);
        replaced
    }

    /// Attach a batch of modifiers, e.g. the ones granted by a skill use.
    pub fn extend(
        &mut self,
        attribute_modifiers: impl IntoIterator<Item = AttributeModifier>,
        stat_modifiers: impl IntoIterator<Item = StatModifier>,
    ) {
        for m in attribute_modifiers {
            self.add_attribute_modifier(m);
        }
        for m in stat_modifiers {
            self.add_stat_modifier(m);
        }
    }

    /// Remove a modifier of either kind by id.
    pub fn remove(&mut self, id: &ModifierId) -> bool {
        let before = self.len();
        self.attribute_modifiers.retain(|m| &m.id != id);
        self.stat_modifiers.retain(|m| &m.id != id);
        self.len() != before
    }

    /// Remove every modifier whose `source` matches.
    pub fn remove_by_source(&mut self, source: &str) -> usize {
        let before = self.len();
        self.attribute_modifiers.retain(|m| m.source != source);
        self.stat_modifiers.retain(|m| m.source != source);
        before - self.len()
    }

    /// Remove expired entries. Idempotent; returns how many were removed.
    pub fn prune(&mut self, now: f64) -> usize {
        let removed = retain_active(&mut self.attribute_modifiers, now)
            + retain_active(&mut self.stat_modifiers, now);
        if removed > 0 {
            debug!(removed, now, "pruned expired modifiers");
        }
        removed
    }

    /// All attribute modifiers in insertion order, expired ones included.
    pub fn attribute_modifiers(&self) -> &[AttributeModifier] {
        &self.attribute_modifiers
    }

    /// All stat modifiers in insertion order, expired ones included.
    pub fn stat_modifiers(&self) -> &[StatModifier] {
        &self.stat_modifiers
    }

    /// Attribute modifiers still active at `now`.
    pub fn active_attribute_modifiers(&self, now: f64) -> impl Iterator<Item = &AttributeModifier> {
        self.attribute_modifiers.iter().filter(move |m| !m.is_expired(now))
    }

    /// Stat modifiers still active at `now`.
    pub fn active_stat_modifiers(&self, now: f64) -> impl Iterator<Item = &StatModifier> {
        self.stat_modifiers.iter().filter(move |m| !m.is_expired(now))
    }

    /// Apply the attribute pass to `base`.
    pub fn apply_attributes(&self, base: &AttributeProfile, now: f64) -> AttributeProfile {
        apply_attribute_pass(base, &self.attribute_modifiers, now).0
    }

    /// Apply the stat pass to `stats`.
    pub fn apply_stats(&self, stats: &DerivedStatSet, now: f64) -> DerivedStatSet {
        apply_stat_pass(stats, &self.stat_modifiers, now).0
    }

    /// Total records held, expired ones included.
    pub fn len(&self) -> usize {
        self.attribute_modifiers.len() + self.stat_modifiers.len()
    }

    /// True when the ledger holds nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Per-target count above which additions log a warning.
    pub fn soft_cap(&self) -> usize {
        self.soft_cap
    }

    fn check_soft_cap(&self, target: &str, count: usize) {
        if count > self.soft_cap {
            warn!(
                target_key = target,
                count,
                soft_cap = self.soft_cap,
                "modifier soft cap exceeded"
            );
        }
    }
}

impl Default for ModifierLedger {
    fn default() -> Self {
        Self::new()
    }
}
