use proptest::prelude::*;
use statforge::combat::{CombatResolver, Combatant};
use statforge::ledger::apply_attribute_pass;
use statforge::rng::SequenceRoller;
use statforge::*;
use std::cell::Cell;

#[derive(Default)]
struct CountingDeriver {
    calls: Cell<usize>,
}

impl StatDeriver for CountingDeriver {
    fn derive(&self, profile: &AttributeProfile) -> DerivedStatSet {
        self.calls.set(self.calls.get() + 1);
        LinearDerivation.derive(profile)
    }
}

fn profile_strategy() -> impl Strategy<Value = AttributeProfile> {
    bounded_profile(100.0)
}

fn bounded_profile(max: f64) -> impl Strategy<Value = AttributeProfile> {
    prop::collection::vec(0.0f64..max, AttributeKind::COUNT).prop_map(|values| {
        AttributeKind::ALL
            .iter()
            .copied()
            .zip(values)
            .collect::<AttributeProfile>()
    })
}

fn category_strategy() -> impl Strategy<Value = AttackCategory> {
    prop::sample::select(AttackCategory::ALL.to_vec())
}

fn rolls_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..1.0, 4)
}

fn attack(
    attacker: &DerivedStatSet,
    defender: &DerivedStatSet,
    category: AttackCategory,
    rolls: &mut SequenceRoller,
) -> CombatOutcome {
    let (a, d) = (EntityId::from("a"), EntityId::from("d"));
    CombatResolver.resolve_attack(
        Combatant::new(&a, attacker),
        Combatant::new(&d, defender),
        category,
        rolls,
    )
}

proptest! {
    /// Identical inputs and rolls give identical outcomes.
    #[test]
    fn prop_attack_is_deterministic(
        attacker in profile_strategy(),
        defender in profile_strategy(),
        category in category_strategy(),
        rolls in rolls_strategy(),
    ) {
        let (a, d) = (derive_stats(&attacker), derive_stats(&defender));
        let first = attack(&a, &d, category, &mut SequenceRoller::new(rolls.clone()));
        let second = attack(&a, &d, category, &mut SequenceRoller::new(rolls));
        prop_assert_eq!(first, second);
    }

    /// A zero first roll dodges and consumes nothing further.
    #[test]
    fn prop_dodge_short_circuits(
        attacker in profile_strategy(),
        defender in profile_strategy(),
        category in category_strategy(),
        mut rolls in rolls_strategy(),
    ) {
        // Non-negative attributes keep dodge_chance at or above its 0.05 base.
        rolls[0] = 0.0;
        let mut source = SequenceRoller::new(rolls);
        let outcome = attack(
            &derive_stats(&attacker),
            &derive_stats(&defender),
            category,
            &mut source,
        );
        prop_assert!(outcome.is_dodged);
        prop_assert_eq!(outcome.damage, 0.0);
        prop_assert_eq!(outcome.toughness_damage, 0.0);
        prop_assert_eq!(source.draws(), 1);
    }

    /// Landed attacks always deal at least one point of damage and toughness.
    #[test]
    fn prop_landed_damage_floor(
        attacker in profile_strategy(),
        // Attributes below 30 keep dodge_chance under 0.8.
        defender in bounded_profile(30.0),
        category in category_strategy(),
        mut rolls in rolls_strategy(),
    ) {
        rolls[0] = 0.9;
        let mut source = SequenceRoller::new(rolls);
        let outcome = attack(
            &derive_stats(&attacker),
            &derive_stats(&defender),
            category,
            &mut source,
        );
        prop_assert!(!outcome.is_dodged);
        prop_assert!(outcome.damage >= 1.0);
        prop_assert!(outcome.toughness_damage >= 1.0);
        prop_assert_eq!(source.draws(), 4);
    }

    /// A second resolve with the same inputs is a bit-identical cache hit.
    #[test]
    fn prop_cache_is_idempotent(
        profile in profile_strategy(),
        flat in -20.0f64..20.0,
        percent in -50.0f64..200.0,
        now in 0.0f64..1_000.0,
    ) {
        let mut facade = StatResolutionFacade::with_deriver(CountingDeriver::default());
        let hero = EntityId::from("hero");
        let attrs = vec![AttributeModifier::additive("f", AttributeKind::Agility, flat, "x")];
        let stats = vec![StatModifier::percentage("p", DerivedStatKind::Health, percent, "x")];

        let first = facade.resolve(&hero, &profile, &attrs, &stats, now);
        let second = facade.resolve(&hero, &profile, &attrs, &stats, now);

        prop_assert!(first.bit_identical(&second));
        prop_assert_eq!(facade.deriver().calls.get(), 1);
    }

    /// Additive modifiers are always summed before any percentage applies.
    #[test]
    fn prop_additive_then_percentage(
        base in 0.0f64..100.0,
        flat_a in -20.0f64..20.0,
        flat_b in -20.0f64..20.0,
        percent in -90.0f64..300.0,
    ) {
        let profile = AttributeProfile::empty().with(AttributeKind::Strength, base);
        let mods = vec![
            AttributeModifier::percentage("p", AttributeKind::Strength, percent, "x"),
            AttributeModifier::additive("a", AttributeKind::Strength, flat_a, "x"),
            AttributeModifier::additive("b", AttributeKind::Strength, flat_b, "x"),
        ];
        let (result, applied) = apply_attribute_pass(&profile, &mods, 0.0);
        let expected = (base + (flat_a + flat_b)) * (1.0 + percent / 100.0);
        prop_assert!((result.get(AttributeKind::Strength) - expected).abs() < 1e-9);
        prop_assert_eq!(applied, 3);
    }

    /// Pruning twice at the same instant removes nothing the second time.
    #[test]
    fn prop_prune_is_idempotent(
        durations in prop::collection::vec(-5.0f64..20.0, 0..30),
        now in 0.0f64..25.0,
    ) {
        let mut ledger = ModifierLedger::new();
        for (idx, duration) in durations.iter().enumerate() {
            ledger.add_stat_modifier(
                StatModifier::additive(format!("m{idx}"), DerivedStatKind::Mana, 1.0, "x")
                    .lasting(*duration, 0.0),
            );
        }
        let stats = derive_stats(&AttributeProfile::default());
        let before = ledger.apply_stats(&stats, now);

        ledger.prune(now);
        let remaining = ledger.len();
        prop_assert_eq!(ledger.prune(now), 0);
        prop_assert_eq!(ledger.len(), remaining);
        prop_assert!(ledger.apply_stats(&stats, now).bit_identical(&before));
    }
}
