//! Stat resolution facade.
//!
//! [`StatResolutionFacade::resolve`] is the single entry point combat and
//! skills use to obtain an entity's stats:
//!
//! ```text
//! base profile --attribute pass--> profile --derive--> stats --stat pass--> result
//! ```
//!
//! Results are cached per `(entity, input hash)`. Each cache entry keeps the
//! full input fingerprint and a hit requires the fingerprint to match
//! exactly, so a hash collision can only cause a miss, never a stale result.
//! The fingerprint covers the base profile and the target, kind and
//! magnitude of every *active* modifier in order; expired modifiers do not
//! affect output and are left out.

use crate::config::EngineConfig;
use crate::derivation::{LinearDerivation, StatDeriver};
use crate::ids::EntityId;
use crate::kinds::{AttributeKind, DerivedStatKind};
use crate::ledger::{apply_attribute_pass, apply_stat_pass, ModifierLedger};
use crate::modifier::{AttributeModifier, Modifier, ModifierKind, StatModifier};
use crate::profile::AttributeProfile;
use crate::stat_set::DerivedStatSet;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use tracing::{debug, trace};

/// Running totals of facade activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionCounters {
    /// Times the derivation step actually ran.
    pub stat_calculations: u64,
    /// Resolves answered from the cache.
    pub cache_hits: u64,
    /// Resolves that had to compute while caching was enabled.
    pub cache_misses: u64,
    /// Individual modifier applications across both passes.
    pub modifier_applications: u64,
}

/// Exact, output-relevant inputs of one resolve call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct InputFingerprint {
    profile: Vec<(AttributeKind, u64)>,
    attribute_modifiers: Vec<(AttributeKind, ModifierKind, u64)>,
    stat_modifiers: Vec<(DerivedStatKind, ModifierKind, u64)>,
}

fn active_terms<K: Copy>(modifiers: &[Modifier<K>], now: f64) -> Vec<(K, ModifierKind, u64)> {
    modifiers
        .iter()
        .filter(|m| !m.is_expired(now))
        .map(|m| (m.target, m.kind, m.magnitude.to_bits()))
        .collect()
}

impl InputFingerprint {
    fn new(
        profile: &AttributeProfile,
        attribute_modifiers: &[AttributeModifier],
        stat_modifiers: &[StatModifier],
        now: f64,
    ) -> Self {
        Self {
            profile: profile.iter().map(|(k, v)| (k, v.to_bits())).collect(),
            attribute_modifiers: active_terms(attribute_modifiers, now),
            stat_modifiers: active_terms(stat_modifiers, now),
        }
    }

    fn structural_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    fingerprint: InputFingerprint,
    stats: DerivedStatSet,
}

/// Orchestrates modifier passes, derivation and caching.
///
/// Generic over the derivation step so it can be swapped or instrumented.
/// Not internally synchronized: resolving the same entity from two threads
/// at once needs external locking.
///
/// # Examples
///
/// ```rust
/// use statforge::{
///     AttributeKind, AttributeModifier, AttributeProfile, DerivedStatKind, EntityId,
///     StatResolutionFacade,
/// };
///
/// let mut facade = StatResolutionFacade::new();
/// let hero = EntityId::from("hero");
/// let mods = vec![AttributeModifier::additive("belt", AttributeKind::Vitality, 5.0, "belt")];
///
/// let stats = facade.resolve(&hero, &AttributeProfile::default(), &mods, &[], 0.0);
/// assert_eq!(stats.get(DerivedStatKind::Health), 270.0);
///
/// facade.resolve(&hero, &AttributeProfile::default(), &mods, &[], 1.0);
/// assert_eq!(facade.counters().cache_hits, 1);
/// ```
#[derive(Debug)]
pub struct StatResolutionFacade<D = LinearDerivation> {
    deriver: D,
    cache: HashMap<(EntityId, u64), CacheEntry>,
    cache_enabled: bool,
    sweep_interval: f64,
    last_sweep: Option<f64>,
    counters: ResolutionCounters,
}

impl StatResolutionFacade<LinearDerivation> {
    /// A facade with the standard formulas and default config.
    pub fn new() -> Self {
        Self::with_deriver(LinearDerivation)
    }

    /// A facade with the standard formulas and the cache settings of `config`.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::with_config(LinearDerivation, config)
    }
}

impl Default for StatResolutionFacade<LinearDerivation> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: StatDeriver> StatResolutionFacade<D> {
    /// A facade over a custom derivation step with default cache settings.
    pub fn with_deriver(deriver: D) -> Self {
        Self::with_config(deriver, &EngineConfig::default())
    }

    /// A facade over a custom derivation step using the cache settings of `config`.
    ///
    /// # Arguments
    ///
    /// * `deriver` - The attribute to stat derivation step
    /// * `config` - Supplies `cache_enabled` and `cache_sweep_interval`
    pub fn with_config(deriver: D, config: &EngineConfig) -> Self {
        Self {
            deriver,
            cache: HashMap::new(),
            cache_enabled: config.cache_enabled,
            sweep_interval: config.cache_sweep_interval,
            last_sweep: None,
            counters: ResolutionCounters::default(),
        }
    }

    /// Resolve an entity's stats at `now`.
    ///
    /// Runs the attribute pass, derivation and stat pass, or returns the
    /// cached result for identical inputs. Each call also drives the
    /// periodic sweep, and an entity keeps at most one cache entry: a miss
    /// replaces whatever was cached for it before. Expired modifiers are
    /// ignored and the input slices are never modified.
    ///
    /// # Arguments
    ///
    /// * `entity_id` - The entity being resolved, part of the cache key
    /// * `base_profile` - Attributes before any modifier
    /// * `attribute_modifiers` - Modifiers applied before derivation
    /// * `stat_modifiers` - Modifiers applied after derivation
    /// * `now` - Caller clock used for expiry and the sweep
    ///
    /// # Returns
    ///
    /// The fully populated [`DerivedStatSet`].
    pub fn resolve(
        &mut self,
        entity_id: &EntityId,
        base_profile: &AttributeProfile,
        attribute_modifiers: &[AttributeModifier],
        stat_modifiers: &[StatModifier],
        now: f64,
    ) -> DerivedStatSet {
        if !self.cache_enabled {
            return self.compute(base_profile, attribute_modifiers, stat_modifiers, now);
        }
        self.sweep(now);

        let fingerprint =
            InputFingerprint::new(base_profile, attribute_modifiers, stat_modifiers, now);
        let key = (entity_id.clone(), fingerprint.structural_hash());

        if let Some(entry) = self.cache.get(&key) {
            if entry.fingerprint == fingerprint {
                self.counters.cache_hits += 1;
                trace!(entity = %entity_id, "stat cache hit");
                return entry.stats;
            }
        }

        self.counters.cache_misses += 1;
        trace!(entity = %entity_id, "stat cache miss");
        let stats = self.compute(base_profile, attribute_modifiers, stat_modifiers, now);
        self.cache.retain(|(id, _), _| id != entity_id);
        self.cache.insert(key, CacheEntry { fingerprint, stats });
        stats
    }

    /// Resolve using the modifiers held in `ledger`.
    pub fn resolve_with_ledger(
        &mut self,
        entity_id: &EntityId,
        base_profile: &AttributeProfile,
        ledger: &ModifierLedger,
        now: f64,
    ) -> DerivedStatSet {
        self.resolve(
            entity_id,
            base_profile,
            ledger.attribute_modifiers(),
            ledger.stat_modifiers(),
            now,
        )
    }

    fn compute(
        &mut self,
        base_profile: &AttributeProfile,
        attribute_modifiers: &[AttributeModifier],
        stat_modifiers: &[StatModifier],
        now: f64,
    ) -> DerivedStatSet {
        let (profile, attribute_applied) =
            apply_attribute_pass(base_profile, attribute_modifiers, now);
        let derived = self.deriver.derive(&profile);
        let (stats, stat_applied) = apply_stat_pass(&derived, stat_modifiers, now);

        self.counters.stat_calculations += 1;
        self.counters.modifier_applications += (attribute_applied + stat_applied) as u64;
        stats
    }

    /// Periodic wholesale invalidation.
    ///
    /// The first call only starts the clock. Later calls clear the cache
    /// once `cache_sweep_interval` seconds have passed since the last
    /// sweep. Returns the number of entries dropped.
    pub fn sweep(&mut self, now: f64) -> usize {
        let Some(last) = self.last_sweep else {
            self.last_sweep = Some(now);
            return 0;
        };
        if now - last < self.sweep_interval {
            return 0;
        }
        self.last_sweep = Some(now);
        let dropped = self.cache.len();
        self.cache.clear();
        debug!(dropped, "stat cache swept");
        dropped
    }

    /// Drop every cached result for one entity, e.g. after its base
    /// profile changed. Returns the number of entries removed.
    pub fn invalidate(&mut self, entity_id: &EntityId) -> usize {
        let before = self.cache.len();
        self.cache.retain(|(id, _), _| id != entity_id);
        before - self.cache.len()
    }

    /// Drop every cached result.
    pub fn invalidate_all(&mut self) {
        self.cache.clear();
    }

    /// Turn caching on or off. Turning it off clears the cache.
    pub fn set_cache_enabled(&mut self, enabled: bool) {
        self.cache_enabled = enabled;
        if !enabled {
            self.cache.clear();
        }
    }

    /// Whether results are being cached.
    pub fn is_cache_enabled(&self) -> bool {
        self.cache_enabled
    }

    /// Number of cached entries, at most one per entity.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Snapshot of the activity counters.
    pub fn counters(&self) -> ResolutionCounters {
        self.counters
    }

    /// Zero every activity counter.
    pub fn reset_counters(&mut self) {
        self.counters = ResolutionCounters::default();
    }

    /// The derivation step in use.
    pub fn deriver(&self) -> &D {
        &self.deriver
    }
}
