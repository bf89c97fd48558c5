//! # statforge - Deterministic Attribute, Stat and Combat Resolution
//!
//! An engine that turns base character attributes plus timed modifiers into
//! derived combat statistics, then uses those statistics to resolve single
//! attacks and skill activations:
//! - **Deterministic**: no wall clock, no global RNG; `now` and the roll
//!   source are always passed in
//! - **Closed tag sets**: attributes, stats and categories are enums, so a
//!   mistyped key does not compile
//! - **Order-aware modifiers**: additive first, then percentage in
//!   insertion order
//! - **Safe caching**: a cached result is only returned for identical inputs
//!
//! ## Pipeline
//!
//! ```text
//! [AttributeProfile] → attribute pass → derive → stat pass → [DerivedStatSet]
//!                                                                 │
//!                                       ┌─────────────────────────┤
//!                                       ▼                         ▼
//!                               [CombatResolver]         [SkillPowerResolver]
//! ```
//!
//! ## Example
//!
//! ```rust
//! use statforge::combat::{CombatResolver, Combatant};
//! use statforge::rng::SequenceRoller;
//! use statforge::*;
//!
//! let mut facade = StatResolutionFacade::new();
//! let (hero, wolf) = (EntityId::from("hero"), EntityId::from("wolf"));
//!
//! // +10 strength then +50%: (10 + 10) * 1.5 = 30
//! let buffs = vec![
//!     AttributeModifier::additive("ring", AttributeKind::Strength, 10.0, "ring"),
//!     AttributeModifier::percentage("rage", AttributeKind::Strength, 50.0, "rage"),
//! ];
//! let hero_stats = facade.resolve(&hero, &AttributeProfile::default(), &buffs, &[], 0.0);
//! assert_eq!(hero_stats.get(DerivedStatKind::PhysicalDamage), 80.0);
//!
//! let wolf_stats = facade.resolve(&wolf, &AttributeProfile::default(), &[], &[], 0.0);
//! let mut rolls = SequenceRoller::new(vec![0.99, 0.99, 0.5, 0.99]);
//! let outcome = CombatResolver.resolve_attack(
//!     Combatant::new(&hero, &hero_stats),
//!     Combatant::new(&wolf, &wolf_stats),
//!     AttackCategory::Melee,
//!     &mut rolls,
//! );
//! assert!(!outcome.is_dodged);
//! assert!(outcome.damage >= 1.0);
//! ```
//!
//! ## Modules
//!
//! - [`kinds`] - Attribute, stat and category tags
//! - [`profile`] / [`stat_set`] - Attribute profiles and derived stat sets
//! - [`derivation`] - Attribute → stat formulas
//! - [`modifier`] / [`ledger`] - Timed modifiers and their application
//! - [`facade`] - Cached resolution entry point
//! - [`combat`] - Attack resolution
//! - [`skill`] - Skill learning, power and prerequisites
//! - [`rng`] - Injected roll sources
//! - [`engine`] / [`lifecycle`] / [`config`] - Lifecycle-managed engine
//! - [`error`] - Error types

pub mod combat;
pub mod config;
pub mod derivation;
pub mod engine;
pub mod error;
pub mod facade;
pub mod ids;
pub mod kinds;
pub mod ledger;
pub mod lifecycle;
pub mod modifier;
pub mod profile;
pub mod rng;
pub mod skill;
pub mod stat_set;

pub use config::EngineConfig;
pub use engine::{EngineInfo, StatEngine};
pub use error::{EngineError, SkillError};
pub use facade::{ResolutionCounters, StatResolutionFacade};
pub use ids::{EntityId, ModifierId, SkillId};
pub use kinds::{AttackCategory, AttributeKind, DerivedStatKind, ToughnessCategory};
pub use lifecycle::{LifecycleAction, LifecycleState};
pub use profile::AttributeProfile;
pub use stat_set::DerivedStatSet;

pub use derivation::{derive_stats, LinearDerivation, StatDeriver};
pub use ledger::ModifierLedger;
pub use modifier::{AttributeModifier, Modifier, ModifierKind, ModifierTemplate, StatModifier};

pub use combat::{CombatOutcome, CombatResolver, Combatant};
pub use rng::{RandRoller, RollSource, SequenceRoller};
pub use skill::{
    LearnRejection, LearnedSkill, SkillBook, SkillCatalog, SkillDefinition, SkillPowerResolver,
    SkillResolutionResult, UseRejection,
};
