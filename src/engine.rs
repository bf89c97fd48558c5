//! Lifecycle-managed stat engine.
//!
//! [`StatEngine`] wraps a [`StatResolutionFacade`] in a validated lifecycle
//! and owns the engine config. Resolution is only allowed while running.
//! The periodic cache sweep runs on every resolve and from
//! [`StatEngine::update`], so idle game loops still release memory.

use crate::config::EngineConfig;
use crate::derivation::{LinearDerivation, StatDeriver};
use crate::error::EngineError;
use crate::facade::{ResolutionCounters, StatResolutionFacade};
use crate::ids::EntityId;
use crate::ledger::ModifierLedger;
use crate::lifecycle::{Lifecycle, LifecycleAction, LifecycleState};
use crate::modifier::{AttributeModifier, StatModifier};
use crate::profile::AttributeProfile;
use crate::stat_set::DerivedStatSet;
use serde::{Deserialize, Serialize};

const COMPONENT: &str = "stat_engine";

/// Point-in-time view of an engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineInfo {
    pub state: LifecycleState,
    pub cache_enabled: bool,
    /// Cached stat sets, at most one per entity.
    pub cache_entries: usize,
    pub counters: ResolutionCounters,
}

/// The stat engine.
///
/// # Examples
///
/// ```rust
/// use statforge::{AttributeProfile, DerivedStatKind, EngineConfig, EntityId, StatEngine};
///
/// let mut engine = StatEngine::new(EngineConfig::default()).unwrap();
/// let hero = EntityId::from("hero");
/// assert!(engine.resolve(&hero, &AttributeProfile::default(), &[], &[], 0.0).is_err());
///
/// engine.initialize().unwrap();
/// engine.start().unwrap();
/// let stats = engine.resolve(&hero, &AttributeProfile::default(), &[], &[], 0.0).unwrap();
/// assert_eq!(stats.get(DerivedStatKind::Health), 220.0);
/// ```
#[derive(Debug)]
pub struct StatEngine<D = LinearDerivation> {
    config: EngineConfig,
    lifecycle: Lifecycle,
    facade: StatResolutionFacade<D>,
}

impl StatEngine<LinearDerivation> {
    /// Validate `config` and build an uninitialized engine.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        Self::with_deriver(config, LinearDerivation)
    }
}

impl<D: StatDeriver> StatEngine<D> {
    /// Validate `config` and build an uninitialized engine over a custom
    /// derivation step.
    ///
    /// # Returns
    ///
    /// * `Ok(StatEngine)` - In the `uninitialized` state
    /// * `Err(EngineError::InvalidConfig)` - If `config` fails validation
    pub fn with_deriver(config: EngineConfig, deriver: D) -> Result<Self, EngineError> {
        config.validate()?;
        let facade = StatResolutionFacade::with_config(deriver, &config);
        Ok(Self {
            config,
            lifecycle: Lifecycle::new(COMPONENT),
            facade,
        })
    }

    /// Move from `uninitialized` to `ready`.
    pub fn initialize(&mut self) -> Result<(), EngineError> {
        self.lifecycle.apply(LifecycleAction::Initialize).map(drop)
    }

    /// Move from `ready` to `running`. Rejected from any other state.
    pub fn start(&mut self) -> Result<(), EngineError> {
        self.lifecycle.apply(LifecycleAction::Start).map(drop)
    }

    /// Suspend a running engine. Resolution is refused while paused.
    pub fn pause(&mut self) -> Result<(), EngineError> {
        self.lifecycle.apply(LifecycleAction::Pause).map(drop)
    }

    /// Return a paused engine to `running`.
    pub fn resume(&mut self) -> Result<(), EngineError> {
        self.lifecycle.apply(LifecycleAction::Resume).map(drop)
    }

    /// Stop a running or paused engine. The cache is kept until `reset`.
    pub fn stop(&mut self) -> Result<(), EngineError> {
        self.lifecycle.apply(LifecycleAction::Stop).map(drop)
    }

    /// Return a stopped engine to ready, clearing cache and counters.
    pub fn reset(&mut self) -> Result<(), EngineError> {
        self.lifecycle.apply(LifecycleAction::Reset)?;
        self.facade.invalidate_all();
        self.facade.reset_counters();
        Ok(())
    }

    /// Tear the engine down for good. The cache is released.
    pub fn destroy(&mut self) -> Result<(), EngineError> {
        self.lifecycle.apply(LifecycleAction::Destroy)?;
        self.facade.invalidate_all();
        Ok(())
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// The validated config the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn ensure_running(&self) -> Result<(), EngineError> {
        if self.lifecycle.is_running() {
            Ok(())
        } else {
            Err(EngineError::NotRunning(self.lifecycle.state()))
        }
    }

    /// Resolve an entity's stats. Requires the engine to be running.
    ///
    /// # Returns
    ///
    /// * `Ok(DerivedStatSet)` - See [`StatResolutionFacade::resolve`]
    /// * `Err(EngineError::NotRunning)` - In any state other than `running`
    pub fn resolve(
        &mut self,
        entity_id: &EntityId,
        base_profile: &AttributeProfile,
        attribute_modifiers: &[AttributeModifier],
        stat_modifiers: &[StatModifier],
        now: f64,
    ) -> Result<DerivedStatSet, EngineError> {
        self.ensure_running()?;
        Ok(self
            .facade
            .resolve(entity_id, base_profile, attribute_modifiers, stat_modifiers, now))
    }

    /// Resolve with the modifiers held in `ledger`. Requires the engine to be running.
    pub fn resolve_with_ledger(
        &mut self,
        entity_id: &EntityId,
        base_profile: &AttributeProfile,
        ledger: &ModifierLedger,
        now: f64,
    ) -> Result<DerivedStatSet, EngineError> {
        self.ensure_running()?;
        Ok(self
            .facade
            .resolve_with_ledger(entity_id, base_profile, ledger, now))
    }

    /// Tick the engine. Runs the periodic cache sweep while running and
    /// returns the number of cache entries dropped.
    pub fn update(&mut self, now: f64) -> usize {
        if !self.lifecycle.is_running() {
            return 0;
        }
        self.facade.sweep(now)
    }

    /// A ledger using this engine's modifier soft cap.
    pub fn new_ledger(&self) -> ModifierLedger {
        ModifierLedger::with_soft_cap(self.config.modifier_soft_cap)
    }

    /// Drop cached results for one entity, e.g. after its base profile changed.
    pub fn invalidate(&mut self, entity_id: &EntityId) -> usize {
        self.facade.invalidate(entity_id)
    }

    /// Snapshot of the facade's activity counters.
    pub fn counters(&self) -> ResolutionCounters {
        self.facade.counters()
    }

    /// Zero the activity counters without touching the cache.
    pub fn reset_counters(&mut self) {
        self.facade.reset_counters();
    }

    /// State, cache size and counters in one value.
    pub fn info(&self) -> EngineInfo {
        EngineInfo {
            state: self.lifecycle.state(),
            cache_enabled: self.facade.is_cache_enabled(),
            cache_entries: self.facade.cache_len(),
            counters: self.facade.counters(),
        }
    }

    /// Read access to the wrapped facade.
    pub fn facade(&self) -> &StatResolutionFacade<D> {
        &self.facade
    }
}
