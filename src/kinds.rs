//! Closed tag sets.
//!
//! Attributes, derived stats, attack categories and toughness categories are
//! fixed enums. Every formula and table in the crate is an exhaustive `match`
//! over them, so a mistyped key is a compile error rather than a silent zero.
//!
//! Each enum carries its wire tag (`as_str`), a `FromStr` impl that rejects
//! unknown tags, and a dense `index()` for array-backed storage.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! tag_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $err:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $tag:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $tag)] $variant, )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Number of variants.
            pub const COUNT: usize = $name::ALL.len();

            /// Dense position of this variant in [`Self::ALL`].
            pub fn index(self) -> usize {
                self as usize
            }

            /// Wire tag of this variant.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $tag,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = EngineError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($tag => Ok($name::$variant),)+
                    other => Err(EngineError::$err(other.to_string())),
                }
            }
        }
    };
}

tag_enum! {
    /// One of the eight base character attributes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statforge::AttributeKind;
    ///
    /// let kind: AttributeKind = "strength".parse().unwrap();
    /// assert_eq!(kind, AttributeKind::Strength);
    /// assert!("might".parse::<AttributeKind>().is_err());
    /// ```
    AttributeKind, UnknownAttribute {
        Strength => "strength",
        Agility => "agility",
        Intelligence => "intelligence",
        Vitality => "vitality",
        Wisdom => "wisdom",
        Charisma => "charisma",
        Luck => "luck",
        Endurance => "endurance",
    }
}

tag_enum! {
    /// One of the twenty combat statistics derived from attributes.
    DerivedStatKind, UnknownStat {
        Health => "health",
        Mana => "mana",
        Stamina => "stamina",
        PhysicalDamage => "physical_damage",
        MagicalDamage => "magical_damage",
        Defense => "defense",
        AttackSpeed => "attack_speed",
        SkillRecoverySpeed => "skill_recovery_speed",
        HealthRegen => "health_regen",
        ManaRegen => "mana_regen",
        StaminaRegen => "stamina_regen",
        CriticalChance => "critical_chance",
        CriticalDamage => "critical_damage",
        DodgeChance => "dodge_chance",
        BlockChance => "block_chance",
        MagicResistance => "magic_resistance",
        MaxWeight => "max_weight",
        MovementSpeed => "movement_speed",
        Toughness => "toughness",
        ToughnessRecovery => "toughness_recovery",
    }
}

tag_enum! {
    /// Category of a single attack.
    AttackCategory, UnknownCategory {
        Melee => "melee",
        Ranged => "ranged",
        Magic => "magic",
        Area => "area",
        Special => "special",
    }
}

tag_enum! {
    /// Tag carried by toughness damage.
    ///
    /// The penetrating tags bypass type-specific toughness pools in whatever
    /// subsystem consumes them.
    ToughnessCategory, UnknownCategory {
        Physical => "physical",
        PenetratingA => "penetrating-A",
        PenetratingUniversal => "penetrating-universal",
    }
}

impl AttackCategory {
    /// Toughness tag emitted for attacks of this category.
    pub fn toughness_category(self) -> ToughnessCategory {
        match self {
            AttackCategory::Melee | AttackCategory::Ranged => ToughnessCategory::Physical,
            AttackCategory::Magic => ToughnessCategory::PenetratingA,
            AttackCategory::Area | AttackCategory::Special => {
                ToughnessCategory::PenetratingUniversal
            }
        }
    }

    /// The attacker stat that drives damage for this category.
    pub fn damage_stat(self) -> DerivedStatKind {
        match self {
            AttackCategory::Magic => DerivedStatKind::MagicalDamage,
            AttackCategory::Melee
            | AttackCategory::Ranged
            | AttackCategory::Area
            | AttackCategory::Special => DerivedStatKind::PhysicalDamage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        assert_eq!(AttributeKind::COUNT, 8);
        assert_eq!(DerivedStatKind::COUNT, 20);
        assert_eq!(AttackCategory::COUNT, 5);
        assert_eq!(ToughnessCategory::COUNT, 3);
    }

    #[test]
    fn test_index_matches_position() {
        for (i, kind) in DerivedStatKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
        for (i, kind) in AttributeKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_tags_parse_back() {
        for kind in DerivedStatKind::ALL {
            assert_eq!(kind.as_str().parse::<DerivedStatKind>().unwrap(), *kind);
        }
        for cat in ToughnessCategory::ALL {
            assert_eq!(cat.as_str().parse::<ToughnessCategory>().unwrap(), *cat);
        }
    }

    #[test]
    fn test_unknown_tags_rejected() {
        assert_eq!(
            "siege".parse::<AttackCategory>(),
            Err(EngineError::UnknownCategory("siege".into()))
        );
        assert_eq!(
            "hp".parse::<DerivedStatKind>(),
            Err(EngineError::UnknownStat("hp".into()))
        );
        assert_eq!(
            "Strength".parse::<AttributeKind>(),
            Err(EngineError::UnknownAttribute("Strength".into()))
        );
    }

    #[test]
    fn test_toughness_category_mapping() {
        assert_eq!(AttackCategory::Melee.toughness_category(), ToughnessCategory::Physical);
        assert_eq!(AttackCategory::Ranged.toughness_category(), ToughnessCategory::Physical);
        assert_eq!(AttackCategory::Magic.toughness_category(), ToughnessCategory::PenetratingA);
        assert_eq!(
            AttackCategory::Area.toughness_category(),
            ToughnessCategory::PenetratingUniversal
        );
        assert_eq!(
            AttackCategory::Special.toughness_category(),
            ToughnessCategory::PenetratingUniversal
        );
    }

    #[test]
    fn test_serde_tags() {
        let json = serde_json::to_string(&DerivedStatKind::SkillRecoverySpeed).unwrap();
        assert_eq!(json, "\"skill_recovery_speed\"");
        let json = serde_json::to_string(&ToughnessCategory::PenetratingA).unwrap();
        assert_eq!(json, "\"penetrating-A\"");
    }
}
