//! Attribute → derived stat formulas.
//!
//! Derivation is pure: the same profile always yields the same
//! [`DerivedStatSet`]. Every derived stat is a base constant plus two
//! attribute terms; no clamping happens here.
//!
//! ```text
//! health               = 100  + 10   * vitality     + 2    * strength
//! mana                 = 50   + 8    * intelligence + 4    * wisdom
//! stamina              = 100  + 10   * endurance    + 3    * vitality
//! physical_damage      = 10   + 2    * strength     + 1    * agility
//! magical_damage       = 5    + 3    * intelligence + 1    * wisdom
//! defense              = 5    + 1    * vitality     + 1    * endurance
//! attack_speed         = 1.0  + 0.05 * agility      + 0.02 * strength
//! skill_recovery_speed = 1.0  + 0.03 * intelligence + 0.02 * wisdom
//! health_regen         = 1.0  + 0.5  * vitality     + 0.2  * endurance
//! mana_regen           = 2.0  + 0.4  * intelligence + 0.3  * wisdom
//! stamina_regen        = 3.0  + 0.6  * endurance    + 0.2  * vitality
//! critical_chance      = 0.05 + 0.01 * agility      + 0.02 * luck
//! critical_damage      = 1.5  + 0.05 * strength     + 0.03 * agility
//! dodge_chance         = 0.05 + 0.015* agility      + 0.01 * luck
//! block_chance         = 0.05 + 0.01 * strength     + 0.01 * endurance
//! magic_resistance     = 0    + 0.02 * wisdom       + 0.01 * intelligence
//! max_weight           = 50   + 5    * strength     + 2    * endurance
//! movement_speed       = 1.0  + 0.03 * agility      + 0.01 * endurance
//! toughness            = 100  + 8    * vitality     + 5    * endurance
//! toughness_recovery   = 10   + 0.8  * endurance    + 0.4  * vitality
//! ```

use crate::kinds::{AttributeKind, DerivedStatKind};
use crate::profile::AttributeProfile;
use crate::stat_set::DerivedStatSet;

/// Maps a (post-modifier) attribute profile to a full derived stat set.
///
/// The facade is generic over this trait so the derivation step can be
/// swapped or instrumented.
pub trait StatDeriver {
    /// Derive every stat from `profile`.
    fn derive(&self, profile: &AttributeProfile) -> DerivedStatSet;
}

/// A linear formula: `base + Σ coefficient * attribute`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFormula {
    pub base: f64,
    pub terms: [(AttributeKind, f64); 2],
}

impl LinearFormula {
    const fn new(base: f64, a: (AttributeKind, f64), b: (AttributeKind, f64)) -> Self {
        Self {
            base,
            terms: [a, b],
        }
    }

    /// Evaluate against a profile.
    pub fn evaluate(&self, profile: &AttributeProfile) -> f64 {
        self.terms
            .iter()
            .fold(self.base, |acc, (kind, coeff)| acc + coeff * profile.get(*kind))
    }
}

/// The standard formula table.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearDerivation;

impl LinearDerivation {
    /// The formula used for `kind`.
    pub fn formula(kind: DerivedStatKind) -> LinearFormula {
        use AttributeKind::*;
        use DerivedStatKind as S;

        match kind {
            S::Health => LinearFormula::new(100.0, (Vitality, 10.0), (Strength, 2.0)),
            S::Mana => LinearFormula::new(50.0, (Intelligence, 8.0), (Wisdom, 4.0)),
            S::Stamina => LinearFormula::new(100.0, (Endurance, 10.0), (Vitality, 3.0)),
            S::PhysicalDamage => LinearFormula::new(10.0, (Strength, 2.0), (Agility, 1.0)),
            S::MagicalDamage => LinearFormula::new(5.0, (Intelligence, 3.0), (Wisdom, 1.0)),
            S::Defense => LinearFormula::new(5.0, (Vitality, 1.0), (Endurance, 1.0)),
            S::AttackSpeed => LinearFormula::new(1.0, (Agility, 0.05), (Strength, 0.02)),
            S::SkillRecoverySpeed => {
                LinearFormula::new(1.0, (Intelligence, 0.03), (Wisdom, 0.02))
            }
            S::HealthRegen => LinearFormula::new(1.0, (Vitality, 0.5), (Endurance, 0.2)),
            S::ManaRegen => LinearFormula::new(2.0, (Intelligence, 0.4), (Wisdom, 0.3)),
            S::StaminaRegen => LinearFormula::new(3.0, (Endurance, 0.6), (Vitality, 0.2)),
            S::CriticalChance => LinearFormula::new(0.05, (Agility, 0.01), (Luck, 0.02)),
            S::CriticalDamage => LinearFormula::new(1.5, (Strength, 0.05), (Agility, 0.03)),
            S::DodgeChance => LinearFormula::new(0.05, (Agility, 0.015), (Luck, 0.01)),
            S::BlockChance => LinearFormula::new(0.05, (Strength, 0.01), (Endurance, 0.01)),
            S::MagicResistance => LinearFormula::new(0.0, (Wisdom, 0.02), (Intelligence, 0.01)),
            S::MaxWeight => LinearFormula::new(50.0, (Strength, 5.0), (Endurance, 2.0)),
            S::MovementSpeed => LinearFormula::new(1.0, (Agility, 0.03), (Endurance, 0.01)),
            S::Toughness => LinearFormula::new(100.0, (Vitality, 8.0), (Endurance, 5.0)),
            S::ToughnessRecovery => {
                LinearFormula::new(10.0, (Endurance, 0.8), (Vitality, 0.4))
            }
        }
    }
}

impl StatDeriver for LinearDerivation {
    fn derive(&self, profile: &AttributeProfile) -> DerivedStatSet {
        DerivedStatSet::from_fn(|kind| Self::formula(kind).evaluate(profile))
    }
}

/// Derive with the standard formulas.
///
/// # Examples
///
/// ```rust
/// use statforge::{derive_stats, AttributeProfile, DerivedStatKind};
///
/// let stats = derive_stats(&AttributeProfile::default());
/// assert_eq!(stats.get(DerivedStatKind::Health), 220.0);
/// ```
pub fn derive_stats(profile: &AttributeProfile) -> DerivedStatSet {
    LinearDerivation.derive(profile)
}
