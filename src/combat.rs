//! Single-attack resolution.
//!
//! [`CombatResolver::resolve_attack`] consumes two resolved stat sets and an
//! injected [`RollSource`]. Rolls are drawn in a fixed order: dodge, block,
//! damage variation, critical. A dodge draws one roll and stops; every other
//! attack draws exactly four.
//!
//! Damage pipeline after the dodge check:
//!
//! ```text
//! damage = damage_stat * category_mult * variation
//! if crit:    damage *= critical_damage
//! damage *= 1 - defense * 0.1
//! damage *= 1 - magic_resistance
//! if blocked: damage *= 0.5
//! damage  = max(damage, 1)
//! ```
//!
//! Toughness damage is computed independently from the attacker's damage
//! stat and is never affected by block, critical or defense.

use crate::ids::EntityId;
use crate::kinds::{AttackCategory, DerivedStatKind, ToughnessCategory};
use crate::rng::RollSource;
use crate::stat_set::DerivedStatSet;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Lower bound of the damage variation factor.
pub const VARIATION_LOW: f64 = 0.8;
/// Upper bound (exclusive) of the damage variation factor.
pub const VARIATION_HIGH: f64 = 1.2;
/// Damage reduction per point of defense.
pub const DEFENSE_FACTOR: f64 = 0.1;
/// Fraction of damage that gets through a block.
pub const BLOCK_MULTIPLIER: f64 = 0.5;
/// Floor for damage and toughness damage on a landed attack.
pub const MIN_DAMAGE: f64 = 1.0;
/// Toughness scaling per point of the attacker's damage stat.
pub const TOUGHNESS_SCALING: f64 = 0.01;

/// One side of an attack: who it is and their resolved stats.
#[derive(Debug, Clone, Copy)]
pub struct Combatant<'a> {
    pub id: &'a EntityId,
    /// Stats as returned by the resolution facade.
    pub stats: &'a DerivedStatSet,
}

impl<'a> Combatant<'a> {
    /// Pair an entity with its resolved stats.
    pub fn new(id: &'a EntityId, stats: &'a DerivedStatSet) -> Self {
        Self { id, stats }
    }
}

/// Result of one attack.
///
/// Built once per resolution and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatOutcome {
    /// Damage dealt; `0` on a dodge, otherwise at least `1`.
    pub damage: f64,
    pub attack_category: AttackCategory,
    pub is_critical: bool,
    pub is_blocked: bool,
    pub is_dodged: bool,
    /// Toughness damage; `0` on a dodge, otherwise at least `1`.
    pub toughness_damage: f64,
    pub toughness_category: ToughnessCategory,
    pub source_id: EntityId,
    pub target_id: EntityId,
}

impl CombatOutcome {
    /// Whether the attack connected.
    pub fn landed(&self) -> bool {
        !self.is_dodged
    }
}

/// Resolves attacks between two combatants.
///
/// Stateless; all randomness comes from the roll source passed to each call.
///
/// # Examples
///
/// ```rust
/// use statforge::combat::{CombatResolver, Combatant};
/// use statforge::rng::SequenceRoller;
/// use statforge::{AttackCategory, AttributeProfile, EntityId, derive_stats};
///
/// let stats = derive_stats(&AttributeProfile::default());
/// let (hero, wolf) = (EntityId::from("hero"), EntityId::from("wolf"));
///
/// // A first roll of 0.0 is always under a positive dodge chance.
/// let mut rolls = SequenceRoller::constant(0.0);
/// let outcome = CombatResolver.resolve_attack(
///     Combatant::new(&hero, &stats),
///     Combatant::new(&wolf, &stats),
///     AttackCategory::Melee,
///     &mut rolls,
/// );
/// assert!(outcome.is_dodged);
/// assert_eq!(outcome.damage, 0.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CombatResolver;

impl CombatResolver {
    /// Damage multiplier applied to the base damage stat.
    pub fn category_multiplier(category: AttackCategory) -> f64 {
        match category {
            AttackCategory::Melee => 1.0,
            AttackCategory::Ranged => 0.8,
            AttackCategory::Magic => 1.2,
            AttackCategory::Area => 0.6,
            AttackCategory::Special => 1.5,
        }
    }

    /// Base toughness damage before attacker scaling.
    pub fn toughness_base(category: AttackCategory) -> f64 {
        match category {
            AttackCategory::Melee => 10.0,
            AttackCategory::Ranged => 5.0,
            AttackCategory::Magic => 15.0,
            AttackCategory::Area => 8.0,
            AttackCategory::Special => 20.0,
        }
    }

    /// Toughness damage a landed attack of `category` inflicts.
    pub fn toughness_damage(attacker: &DerivedStatSet, category: AttackCategory) -> f64 {
        let scaling = 1.0 + TOUGHNESS_SCALING * attacker.get(category.damage_stat());
        (Self::toughness_base(category) * scaling).max(MIN_DAMAGE)
    }

    /// Resolve one attack.
    ///
    /// Stops after the dodge roll if the defender dodges. Block never stops
    /// the critical roll or toughness damage.
    ///
    /// # Arguments
    ///
    /// * `attacker` - Source of damage, critical chance and critical damage
    /// * `defender` - Source of dodge, block, defense and magic resistance
    /// * `category` - Picks the damage stat, multiplier and toughness tag
    /// * `rng` - Uniform `[0, 1)` rolls, drawn in the order listed above
    ///
    /// # Returns
    ///
    /// A fresh [`CombatOutcome`]. `damage` is `0` on a dodge and at least
    /// [`MIN_DAMAGE`] otherwise.
    pub fn resolve_attack<R: RollSource + ?Sized>(
        &self,
        attacker: Combatant<'_>,
        defender: Combatant<'_>,
        category: AttackCategory,
        rng: &mut R,
    ) -> CombatOutcome {
        let toughness_category = category.toughness_category();

        if rng.next_f64() < defender.stats.get(DerivedStatKind::DodgeChance) {
            let outcome = CombatOutcome {
                damage: 0.0,
                attack_category: category,
                is_critical: false,
                is_blocked: false,
                is_dodged: true,
                toughness_damage: 0.0,
                toughness_category,
                source_id: attacker.id.clone(),
                target_id: defender.id.clone(),
            };
            trace!(
                source = %attacker.id,
                target = %defender.id,
                category = %category,
                "attack dodged"
            );
            return outcome;
        }

        let is_blocked = rng.next_f64() < defender.stats.get(DerivedStatKind::BlockChance);

        let variation = rng.next_in(VARIATION_LOW, VARIATION_HIGH);
        let mut damage = attacker.stats.get(category.damage_stat())
            * Self::category_multiplier(category)
            * variation;

        let is_critical = rng.next_f64() < attacker.stats.get(DerivedStatKind::CriticalChance);
        if is_critical {
            damage *= attacker.stats.get(DerivedStatKind::CriticalDamage);
        }

        // Mitigation runs strictly after the critical multiplier.
        damage *= 1.0 - defender.stats.get(DerivedStatKind::Defense) * DEFENSE_FACTOR;
        damage *= 1.0 - defender.stats.get(DerivedStatKind::MagicResistance);
        if is_blocked {
            damage *= BLOCK_MULTIPLIER;
        }
        let damage = damage.max(MIN_DAMAGE);

        let outcome = CombatOutcome {
            damage,
            attack_category: category,
            is_critical,
            is_blocked,
            is_dodged: false,
            toughness_damage: Self::toughness_damage(attacker.stats, category),
            toughness_category,
            source_id: attacker.id.clone(),
            target_id: defender.id.clone(),
        };
        trace!(
            source = %attacker.id,
            target = %defender.id,
            category = %category,
            damage = outcome.damage,
            critical = outcome.is_critical,
            blocked = outcome.is_blocked,
            toughness = outcome.toughness_damage,
            "attack resolved"
        );
        outcome
    }
}
