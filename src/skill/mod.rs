//! Skills: learning eligibility, power and granted modifiers.
//!
//! A [`SkillDefinition`] is static data. What an entity knows lives in its
//! [`SkillBook`] as [`LearnedSkill`] records. [`SkillPowerResolver`] checks
//! whether a skill can be learned, and on use computes a scalar power and
//! stamps the skill's modifier templates for the caster's own ledger.
//!
//! Failures here are values, not errors: `try_learn` returns `false` and a
//! rejected use comes back as a [`SkillResolutionResult`] with a
//! [`UseRejection`]. A failed call leaves the book and skill state untouched.

pub mod graph;

pub use graph::{PrerequisiteGraph, SkillCatalog};

use crate::ids::{EntityId, ModifierId, SkillId};
use crate::kinds::{AttributeKind, DerivedStatKind};
use crate::modifier::{AttributeModifier, ModifierTemplate, StatModifier};
use crate::profile::AttributeProfile;
use crate::stat_set::DerivedStatSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Default mastery cap for a skill.
pub const DEFAULT_MAX_LEVEL: u32 = 10;

/// Experience needed per level.
pub const EXPERIENCE_PER_LEVEL: f64 = 100.0;

/// Power bonus per level above 1.
pub const LEVEL_POWER_STEP: f64 = 0.2;

/// Upper bound on the cooldown fraction recovery speed can remove.
pub const MAX_COOLDOWN_REDUCTION: f64 = 0.75;

fn default_max_level() -> u32 {
    DEFAULT_MAX_LEVEL
}

fn default_prerequisite_level() -> u32 {
    1
}

/// Another skill that must be known, at `level` or higher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prerequisite {
    pub skill_id: SkillId,
    /// Minimum level; `1` when omitted.
    #[serde(default = "default_prerequisite_level")]
    pub level: u32,
}

/// Static description of a skill.
///
/// # Examples
///
/// ```rust
/// use statforge::skill::SkillDefinition;
/// use statforge::{AttributeKind, DerivedStatKind, ModifierTemplate};
///
/// let power_strike = SkillDefinition::new("power_strike")
///     .requires_attribute(AttributeKind::Strength, 15.0)
///     .scales_with_stat(DerivedStatKind::PhysicalDamage, 0.05)
///     .with_cooldown(3.0)
///     .grants_stat(ModifierTemplate::percentage(DerivedStatKind::AttackSpeed, 10.0, 5.0));
/// assert_eq!(power_strike.max_level, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDefinition {
    pub id: SkillId,
    /// Minimum base attribute values needed to learn the skill.
    #[serde(default)]
    pub attribute_requirements: BTreeMap<AttributeKind, f64>,
    /// Minimum resolved stat values needed to learn the skill.
    #[serde(default)]
    pub stat_requirements: BTreeMap<DerivedStatKind, f64>,
    #[serde(default)]
    pub prerequisites: Vec<Prerequisite>,
    /// Seconds that must pass between uses.
    #[serde(default)]
    pub cooldown: f64,
    /// How strongly `skill_recovery_speed` above `1.0` shortens the cooldown.
    /// Zero keeps the plain cooldown.
    #[serde(default)]
    pub recovery_scaling: f64,
    /// Power coefficient per base attribute point.
    #[serde(default)]
    pub attribute_scaling: BTreeMap<AttributeKind, f64>,
    /// Power coefficient per resolved stat point.
    #[serde(default)]
    pub stat_scaling: BTreeMap<DerivedStatKind, f64>,
    #[serde(default)]
    pub granted_attribute_modifiers: Vec<ModifierTemplate<AttributeKind>>,
    #[serde(default)]
    pub granted_stat_modifiers: Vec<ModifierTemplate<DerivedStatKind>>,
    #[serde(default = "default_max_level")]
    pub max_level: u32,
}

impl SkillDefinition {
    /// A skill with no requirements, no scaling and no cooldown.
    pub fn new(id: impl Into<SkillId>) -> Self {
        Self {
            id: id.into(),
            attribute_requirements: BTreeMap::new(),
            stat_requirements: BTreeMap::new(),
            prerequisites: Vec::new(),
            cooldown: 0.0,
            recovery_scaling: 0.0,
            attribute_scaling: BTreeMap::new(),
            stat_scaling: BTreeMap::new(),
            granted_attribute_modifiers: Vec::new(),
            granted_stat_modifiers: Vec::new(),
            max_level: DEFAULT_MAX_LEVEL,
        }
    }

    /// Require the base attribute `kind` to be at least `minimum`.
    pub fn requires_attribute(mut self, kind: AttributeKind, minimum: f64) -> Self {
        self.attribute_requirements.insert(kind, minimum);
        self
    }

    /// Require the resolved stat `kind` to be at least `minimum`.
    pub fn requires_stat(mut self, kind: DerivedStatKind, minimum: f64) -> Self {
        self.stat_requirements.insert(kind, minimum);
        self
    }

    /// Require another skill to be known at `level` or higher.
    pub fn requires_skill(mut self, skill_id: impl Into<SkillId>, level: u32) -> Self {
        self.prerequisites.push(Prerequisite {
            skill_id: skill_id.into(),
            level,
        });
        self
    }

    /// Set the seconds that must pass between uses.
    pub fn with_cooldown(mut self, cooldown: f64) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Let `skill_recovery_speed` shorten the cooldown.
    ///
    /// The cooldown shrinks by `coefficient * (skill_recovery_speed - 1)`,
    /// clamped to `[0, MAX_COOLDOWN_REDUCTION]`.
    pub fn with_recovery_scaling(mut self, coefficient: f64) -> Self {
        self.recovery_scaling = coefficient;
        self
    }

    /// Add `coefficient * attribute` to the base power.
    pub fn scales_with_attribute(mut self, kind: AttributeKind, coefficient: f64) -> Self {
        self.attribute_scaling.insert(kind, coefficient);
        self
    }

    /// Add `coefficient * stat` to the base power.
    pub fn scales_with_stat(mut self, kind: DerivedStatKind, coefficient: f64) -> Self {
        self.stat_scaling.insert(kind, coefficient);
        self
    }

    /// Grant an attribute modifier to the caster on each use.
    pub fn grants_attribute(mut self, template: ModifierTemplate<AttributeKind>) -> Self {
        self.granted_attribute_modifiers.push(template);
        self
    }

    /// Grant a stat modifier to the caster on each use.
    pub fn grants_stat(mut self, template: ModifierTemplate<DerivedStatKind>) -> Self {
        self.granted_stat_modifiers.push(template);
        self
    }

    /// Set the mastery cap.
    pub fn with_max_level(mut self, max_level: u32) -> Self {
        self.max_level = max_level;
        self
    }

    /// Fraction of the cooldown removed by the caster's recovery speed.
    pub fn cooldown_reduction(&self, stats: &DerivedStatSet) -> f64 {
        let surplus = stats.get(DerivedStatKind::SkillRecoverySpeed) - 1.0;
        (self.recovery_scaling * surplus).clamp(0.0, MAX_COOLDOWN_REDUCTION)
    }

    /// Cooldown after recovery-speed reduction for a caster with `stats`.
    pub fn effective_cooldown(&self, stats: &DerivedStatSet) -> f64 {
        self.cooldown * (1.0 - self.cooldown_reduction(stats))
    }
}

/// An entity's progress in one skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnedSkill {
    pub skill_id: SkillId,
    /// Mastery level, starting at 1.
    pub level: u32,
    /// Progress toward the next level, in `[0, 100)` below the cap.
    #[serde(default)]
    pub experience: f64,
    /// Locked skills are known but cannot be used.
    pub unlocked: bool,
    /// Timestamp of the last successful use.
    #[serde(default)]
    pub last_used: Option<f64>,
    /// Number of successful uses.
    #[serde(default)]
    pub uses: u64,
}

impl LearnedSkill {
    /// A freshly learned skill: level 1, unlocked, never used.
    pub fn new(skill_id: SkillId) -> Self {
        Self {
            skill_id,
            level: 1,
            experience: 0.0,
            unlocked: true,
            last_used: None,
            uses: 0,
        }
    }

    /// Add experience, gaining one level per 100 points up to `max_level`.
    ///
    /// Returns the number of levels gained. Non-finite or non-positive
    /// amounts are ignored.
    pub fn gain_experience(&mut self, amount: f64, max_level: u32) -> u32 {
        if !amount.is_finite() || amount <= 0.0 {
            return 0;
        }
        self.experience += amount;
        let steps = (self.experience / EXPERIENCE_PER_LEVEL).floor();
        self.experience -= steps * EXPERIENCE_PER_LEVEL;

        let room = max_level.saturating_sub(self.level);
        let gained = steps.min(room as f64) as u32;
        self.level += gained;
        gained
    }

    /// Seconds until the skill is usable again; `0` when ready.
    pub fn cooldown_remaining(&self, now: f64, cooldown: f64) -> f64 {
        match self.last_used {
            Some(last) => (cooldown - (now - last)).max(0.0),
            None => 0.0,
        }
    }
}

/// The skills one entity has learned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillBook {
    skills: BTreeMap<SkillId, LearnedSkill>,
}

impl SkillBook {
    /// An empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// The record for `id`, if learned.
    pub fn get(&self, id: &SkillId) -> Option<&LearnedSkill> {
        self.skills.get(id)
    }

    /// Mutable record for `id`, e.g. to grant experience.
    pub fn get_mut(&mut self, id: &SkillId) -> Option<&mut LearnedSkill> {
        self.skills.get_mut(id)
    }

    /// Whether `id` has been learned at any level.
    pub fn contains(&self, id: &SkillId) -> bool {
        self.skills.contains_key(id)
    }

    /// Whether `id` is known at `level` or higher.
    pub fn knows_at(&self, id: &SkillId, level: u32) -> bool {
        self.skills.get(id).is_some_and(|s| s.level >= level)
    }

    /// Insert or replace a record, returning the previous one.
    pub fn insert(&mut self, skill: LearnedSkill) -> Option<LearnedSkill> {
        self.skills.insert(skill.skill_id.clone(), skill)
    }

    /// Learned skills ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = &LearnedSkill> {
        self.skills.values()
    }

    /// Number of learned skills.
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    /// Whether nothing has been learned yet.
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

/// Why a skill cannot be learned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum LearnRejection {
    /// Learning again would reset progress, so it is refused.
    AlreadyLearned,
    AttributeTooLow {
        attribute: AttributeKind,
        required: f64,
        actual: f64,
    },
    StatTooLow {
        stat: DerivedStatKind,
        required: f64,
        actual: f64,
    },
    MissingPrerequisite { skill_id: SkillId, level: u32 },
}

/// Why a skill use was refused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum UseRejection {
    NotLearned,
    Locked,
    /// `remaining` seconds are left on the effective cooldown.
    OnCooldown { remaining: f64 },
}

/// Result of one skill use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillResolutionResult {
    /// `true` exactly when `rejection` is `None`.
    pub eligible: bool,
    /// Power multiplier; `0` when not eligible.
    pub power: f64,
    pub granted_attribute_modifiers: Vec<AttributeModifier>,
    pub granted_stat_modifiers: Vec<StatModifier>,
    pub rejection: Option<UseRejection>,
}

impl SkillResolutionResult {
    fn rejected(reason: UseRejection) -> Self {
        Self {
            eligible: false,
            power: 0.0,
            granted_attribute_modifiers: Vec::new(),
            granted_stat_modifiers: Vec::new(),
            rejection: Some(reason),
        }
    }
}

/// Eligibility and power calculations for skills.
///
/// # Examples
///
/// ```rust
/// use statforge::skill::{SkillBook, SkillDefinition, SkillPowerResolver};
/// use statforge::{derive_stats, AttributeKind, AttributeProfile, EntityId};
///
/// let skill = SkillDefinition::new("power_strike")
///     .requires_attribute(AttributeKind::Strength, 15.0);
/// let hero = EntityId::from("hero");
/// let mut book = SkillBook::new();
///
/// let weak = AttributeProfile::default().with(AttributeKind::Strength, 14.0);
/// let stats = derive_stats(&weak);
/// assert!(!SkillPowerResolver.try_learn(&hero, &skill, &weak, &stats, &mut book));
///
/// let strong = AttributeProfile::default().with(AttributeKind::Strength, 15.0);
/// let stats = derive_stats(&strong);
/// assert!(SkillPowerResolver.try_learn(&hero, &skill, &strong, &stats, &mut book));
/// assert!(book.contains(&skill.id));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SkillPowerResolver;

impl SkillPowerResolver {
    /// First reason `def` cannot be learned, or `None` if it can.
    ///
    /// Checks run in order: already known, attribute requirements, stat
    /// requirements, prerequisites.
    pub fn learn_rejection(
        def: &SkillDefinition,
        profile: &AttributeProfile,
        stats: &DerivedStatSet,
        book: &SkillBook,
    ) -> Option<LearnRejection> {
        if book.contains(&def.id) {
            return Some(LearnRejection::AlreadyLearned);
        }
        for (&attribute, &required) in &def.attribute_requirements {
            let actual = profile.get(attribute);
            if required > actual {
                return Some(LearnRejection::AttributeTooLow {
                    attribute,
                    required,
                    actual,
                });
            }
        }
        for (&stat, &required) in &def.stat_requirements {
            let actual = stats.get(stat);
            if required > actual {
                return Some(LearnRejection::StatTooLow {
                    stat,
                    required,
                    actual,
                });
            }
        }
        def.prerequisites
            .iter()
            .find(|p| !book.knows_at(&p.skill_id, p.level))
            .map(|p| LearnRejection::MissingPrerequisite {
                skill_id: p.skill_id.clone(),
                level: p.level,
            })
    }

    /// Learn `def` into `book` if every requirement holds.
    ///
    /// All-or-nothing: on `false` the book is unchanged.
    ///
    /// # Arguments
    ///
    /// * `entity_id` - The learner, used for logging
    /// * `def` - The skill to learn
    /// * `profile` - Base attributes checked against attribute requirements
    /// * `stats` - Resolved stats checked against stat requirements
    /// * `book` - The learner's skills; prerequisites are read from it
    ///
    /// # Returns
    ///
    /// `true` if a fresh level 1 record was inserted into `book`.
    pub fn try_learn(
        &self,
        entity_id: &EntityId,
        def: &SkillDefinition,
        profile: &AttributeProfile,
        stats: &DerivedStatSet,
        book: &mut SkillBook,
    ) -> bool {
        match Self::learn_rejection(def, profile, stats, book) {
            Some(reason) => {
                debug!(entity = %entity_id, skill = %def.id, ?reason, "skill not learnable");
                false
            }
            None => {
                book.insert(LearnedSkill::new(def.id.clone()));
                true
            }
        }
    }

    /// Power of `def` at `level` for the given attributes and stats.
    pub fn power(
        def: &SkillDefinition,
        level: u32,
        profile: &AttributeProfile,
        stats: &DerivedStatSet,
    ) -> f64 {
        let from_attributes: f64 = def
            .attribute_scaling
            .iter()
            .map(|(kind, coeff)| coeff * profile.get(*kind))
            .sum();
        let from_stats: f64 = def
            .stat_scaling
            .iter()
            .map(|(kind, coeff)| coeff * stats.get(*kind))
            .sum();
        let base = 1.0 + from_attributes + from_stats;
        base * (1.0 + LEVEL_POWER_STEP * (level.saturating_sub(1)) as f64)
    }

    /// Use a learned skill at `now`.
    ///
    /// On success `state.last_used` becomes `now` and the skill's modifier
    /// templates are returned stamped with `start_time = now` and the skill
    /// id as their source. A rejected use changes nothing.
    ///
    /// # Arguments
    ///
    /// * `entity_id` - The caster; granted modifier ids are prefixed with it
    /// * `def` - The skill being used
    /// * `state` - The caster's record for `def`
    /// * `profile` - Base attributes for attribute scaling
    /// * `stats` - Resolved stats for stat scaling and cooldown reduction
    /// * `now` - Caller clock
    ///
    /// # Returns
    ///
    /// A [`SkillResolutionResult`] carrying either the power and granted
    /// modifiers, or the [`UseRejection`] that stopped the use.
    pub fn use_skill(
        &self,
        entity_id: &EntityId,
        def: &SkillDefinition,
        state: &mut LearnedSkill,
        profile: &AttributeProfile,
        stats: &DerivedStatSet,
        now: f64,
    ) -> SkillResolutionResult {
        if let Some(reason) = Self::use_rejection(def, state, stats, now) {
            debug!(entity = %entity_id, skill = %def.id, ?reason, "skill use rejected");
            return SkillResolutionResult::rejected(reason);
        }

        let power = Self::power(def, state.level, profile, stats);
        let use_index = state.uses;
        let modifier_id = |slot: &str, idx: usize| {
            ModifierId::from(format!("{entity_id}:{}:{use_index}:{slot}{idx}", def.id))
        };

        let granted_attribute_modifiers = def
            .granted_attribute_modifiers
            .iter()
            .enumerate()
            .map(|(idx, t)| t.instantiate(modifier_id("a", idx), &def.id, now))
            .collect();
        let granted_stat_modifiers = def
            .granted_stat_modifiers
            .iter()
            .enumerate()
            .map(|(idx, t)| t.instantiate(modifier_id("s", idx), &def.id, now))
            .collect();

        state.last_used = Some(now);
        state.uses += 1;

        SkillResolutionResult {
            eligible: true,
            power,
            granted_attribute_modifiers,
            granted_stat_modifiers,
            rejection: None,
        }
    }

    /// Look `def` up in `book` and use it.
    ///
    /// Reports [`UseRejection::NotLearned`] when the book lacks the skill.
    pub fn use_from_book(
        &self,
        entity_id: &EntityId,
        def: &SkillDefinition,
        book: &mut SkillBook,
        profile: &AttributeProfile,
        stats: &DerivedStatSet,
        now: f64,
    ) -> SkillResolutionResult {
        match book.get_mut(&def.id) {
            Some(state) => self.use_skill(entity_id, def, state, profile, stats, now),
            None => {
                debug!(entity = %entity_id, skill = %def.id, "skill use rejected: not learned");
                SkillResolutionResult::rejected(UseRejection::NotLearned)
            }
        }
    }

    fn use_rejection(
        def: &SkillDefinition,
        state: &LearnedSkill,
        stats: &DerivedStatSet,
        now: f64,
    ) -> Option<UseRejection> {
        if state.skill_id != def.id {
            return Some(UseRejection::NotLearned);
        }
        if !state.unlocked {
            return Some(UseRejection::Locked);
        }
        let remaining = state.cooldown_remaining(now, def.effective_cooldown(stats));
        if remaining > 0.0 {
            return Some(UseRejection::OnCooldown { remaining });
        }
        None
    }
}
