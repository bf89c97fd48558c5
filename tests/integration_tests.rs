use statforge::combat::{CombatResolver, Combatant};
use statforge::rng::SequenceRoller;
use statforge::*;
use std::cell::Cell;

/// Derivation step that counts how often it runs.
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

/// Test the full attribute pass → derive → stat pass pipeline.
#[test]
fn test_complete_pipeline() {
    let mut facade = StatResolutionFacade::new();
    let hero = EntityId::from("hero");

    let mut ledger = ModifierLedger::new();
    // Vitality: (10 + 4) * 1.5 = 21
    ledger.add_attribute_modifier(AttributeModifier::percentage(
        "blessing",
        AttributeKind::Vitality,
        50.0,
        "shrine",
    ));
    ledger.add_attribute_modifier(AttributeModifier::additive(
        "amulet",
        AttributeKind::Vitality,
        4.0,
        "amulet",
    ));
    // Health after derivation: 100 + 10 * 21 + 2 * 10 = 330, then + 20
    ledger.add_stat_modifier(StatModifier::additive(
        "plate",
        DerivedStatKind::Health,
        20.0,
        "plate",
    ));

    let stats = facade.resolve_with_ledger(&hero, &AttributeProfile::default(), &ledger, 0.0);

    assert_eq!(stats.get(DerivedStatKind::Health), 350.0);
    // Defense: 5 + 21 + 10
    assert_eq!(stats.get(DerivedStatKind::Defense), 36.0);
    // Untouched stats come straight from the formulas
    assert_eq!(stats.get(DerivedStatKind::Mana), 170.0);
}

/// Test that additive modifiers are summed before percentages apply.
#[test]
fn test_additive_before_percentage() {
    let base = AttributeProfile::default();
    let mods = vec![
        AttributeModifier::percentage("p", AttributeKind::Strength, 50.0, "rage"),
        AttributeModifier::additive("a", AttributeKind::Strength, 10.0, "ring"),
    ];
    let (profile, _) = statforge::ledger::apply_attribute_pass(&base, &mods, 0.0);
    assert_eq!(profile.get(AttributeKind::Strength), 30.0);
}

/// Test that a stat modifier lapses strictly after its duration.
#[test]
fn test_stat_modifier_expiry() {
    let mut facade = StatResolutionFacade::new();
    let hero = EntityId::from("hero");
    let potion = vec![StatModifier::additive("potion", DerivedStatKind::Defense, 10.0, "potion")
        .lasting(5.0, 0.0)];

    let before = facade.resolve(&hero, &AttributeProfile::default(), &[], &potion, 4.99);
    let after = facade.resolve(&hero, &AttributeProfile::default(), &[], &potion, 5.01);

    assert_eq!(before.get(DerivedStatKind::Defense), 35.0);
    assert_eq!(after.get(DerivedStatKind::Defense), 25.0);
}

/// Test that expiry does not depend on pruning.
#[test]
fn test_expiry_without_prune() {
    let mut ledger = ModifierLedger::new();
    ledger.add_stat_modifier(
        StatModifier::percentage("haste", DerivedStatKind::MovementSpeed, 100.0, "haste")
            .lasting(2.0, 0.0),
    );

    let stats = derive_stats(&AttributeProfile::default());
    let boosted = ledger.apply_stats(&stats, 1.0);
    let lapsed = ledger.apply_stats(&stats, 3.0);

    assert!((boosted.get(DerivedStatKind::MovementSpeed) - 2.8).abs() < 1e-9);
    assert!(lapsed.bit_identical(&stats));
    assert_eq!(ledger.len(), 1);

    assert_eq!(ledger.prune(3.0), 1);
    assert_eq!(ledger.prune(3.0), 0);
}

/// Test that identical inputs hit the cache and skip derivation.
#[test]
fn test_idempotent_cache() {
    let mut facade = StatResolutionFacade::with_deriver(CountingDeriver::default());
    let hero = EntityId::from("hero");
    let profile = AttributeProfile::default().with(AttributeKind::Luck, 17.0);
    let mods = vec![AttributeModifier::additive("charm", AttributeKind::Luck, 3.0, "charm")];

    let first = facade.resolve(&hero, &profile, &mods, &[], 0.0);
    let second = facade.resolve(&hero, &profile, &mods, &[], 0.0);

    assert!(first.bit_identical(&second));
    assert_eq!(facade.deriver().calls.get(), 1);
}

/// Test that a changed base profile never returns a stale result.
#[test]
fn test_cache_never_stale() {
    let mut facade = StatResolutionFacade::with_deriver(CountingDeriver::default());
    let hero = EntityId::from("hero");

    let weak = facade.resolve(&hero, &AttributeProfile::default(), &[], &[], 0.0);
    let strong = facade.resolve(
        &hero,
        &AttributeProfile::default().with(AttributeKind::Strength, 20.0),
        &[],
        &[],
        0.0,
    );

    assert_eq!(weak.get(DerivedStatKind::PhysicalDamage), 40.0);
    assert_eq!(strong.get(DerivedStatKind::PhysicalDamage), 60.0);
    assert_eq!(facade.deriver().calls.get(), 2);
}

/// Test resolved stats feeding straight into combat.
#[test]
fn test_resolve_then_attack() {
    let mut facade = StatResolutionFacade::new();
    let (mage, golem) = (EntityId::from("mage"), EntityId::from("golem"));

    let mage_stats = facade.resolve(
        &mage,
        &AttributeProfile::default().with(AttributeKind::Intelligence, 30.0),
        &[],
        &[],
        0.0,
    );
    // A glass golem with no defenses so damage is easy to follow.
    let golem_stats = DerivedStatSet::zeroed();

    let mut rolls = SequenceRoller::new(vec![0.5, 0.5, 0.5, 0.99]);
    let outcome = CombatResolver.resolve_attack(
        Combatant::new(&mage, &mage_stats),
        Combatant::new(&golem, &golem_stats),
        AttackCategory::Magic,
        &mut rolls,
    );

    // magical_damage = 5 + 3 * 30 + 10 = 105, * 1.2 for magic
    assert!((outcome.damage - 105.0 * 1.2).abs() < 1e-9);
    assert!(!outcome.is_critical);
    // toughness = 15 * (1 + 0.01 * 105)
    assert!((outcome.toughness_damage - 15.0 * 2.05).abs() < 1e-9);
    assert_eq!(outcome.toughness_category, ToughnessCategory::PenetratingA);
}

/// Test skill modifiers flowing back into the caster's own ledger.
#[test]
fn test_skill_modifiers_round_trip_into_ledger() {
    let caster = EntityId::from("knight");
    let profile = AttributeProfile::default();
    let war_cry = SkillDefinition::new("war_cry")
        .grants_attribute(ModifierTemplate::percentage(AttributeKind::Strength, 50.0, 10.0))
        .with_cooldown(30.0);

    let mut facade = StatResolutionFacade::new();
    let mut ledger = ModifierLedger::new();
    let mut book = SkillBook::new();

    let stats = facade.resolve_with_ledger(&caster, &profile, &ledger, 0.0);
    assert!(SkillPowerResolver.try_learn(&caster, &war_cry, &profile, &stats, &mut book));

    let result =
        SkillPowerResolver.use_from_book(&caster, &war_cry, &mut book, &profile, &stats, 1.0);
    assert!(result.eligible);
    ledger.extend(result.granted_attribute_modifiers, result.granted_stat_modifiers);

    // Strength 15 while the cry lasts: physical_damage = 10 + 30 + 10
    let buffed = facade.resolve_with_ledger(&caster, &profile, &ledger, 5.0);
    assert_eq!(buffed.get(DerivedStatKind::PhysicalDamage), 50.0);

    // Lapsed once more than 10 seconds have passed since the cry at 1.0
    let lapsed = facade.resolve_with_ledger(&caster, &profile, &ledger, 11.5);
    assert_eq!(lapsed.get(DerivedStatKind::PhysicalDamage), 40.0);

    let again =
        SkillPowerResolver.use_from_book(&caster, &war_cry, &mut book, &profile, &stats, 11.5);
    assert!(!again.eligible);
}

/// Test the engine lifecycle around resolution.
#[test]
fn test_engine_lifecycle() {
    let config = EngineConfig::from_json_str(r#"{ "cache_sweep_interval": 10.0 }"#).unwrap();
    let mut engine = StatEngine::new(config).unwrap();
    let hero = EntityId::from("hero");
    let profile = AttributeProfile::default();

    assert!(matches!(
        engine.resolve(&hero, &profile, &[], &[], 0.0),
        Err(EngineError::NotRunning(LifecycleState::Uninitialized))
    ));

    engine.initialize().unwrap();
    engine.start().unwrap();
    engine.resolve(&hero, &profile, &[], &[], 0.0).unwrap();
    engine.update(0.0);
    assert_eq!(engine.update(10.0), 1);

    engine.stop().unwrap();
    assert!(engine.start().is_err());
    engine.reset().unwrap();
    engine.start().unwrap();
    engine.destroy().unwrap();
    assert_eq!(engine.state(), LifecycleState::Destroyed);
}

/// Test the plain data model round-trips through JSON for save systems.
#[test]
fn test_data_model_serde() {
    let profile = AttributeProfile::default().with(AttributeKind::Wisdom, 14.0);
    let json = serde_json::to_string(&profile).unwrap();
    let back: AttributeProfile = serde_json::from_str(&json).unwrap();
    assert_eq!(back, profile);

    let stats = derive_stats(&profile);
    let json = serde_json::to_string(&stats).unwrap();
    let back: DerivedStatSet = serde_json::from_str(&json).unwrap();
    for (kind, value) in stats.iter() {
        assert!((back.get(kind) - value).abs() < 1e-12, "{kind}");
    }

    let mut learned = LearnedSkill::new(SkillId::from_str("slash"));
    learned.last_used = Some(3.5);
    let json = serde_json::to_string(&learned).unwrap();
    let back: LearnedSkill = serde_json::from_str(&json).unwrap();
    assert_eq!(back, learned);
}
