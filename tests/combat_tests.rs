use statforge::combat::{CombatResolver, Combatant, DEFENSE_FACTOR};
use statforge::rng::{RandRoller, RollSource, SequenceRoller};
use statforge::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn attack(
    attacker: &DerivedStatSet,
    defender: &DerivedStatSet,
    category: AttackCategory,
    rng: &mut impl RollSource,
) -> CombatOutcome {
    let (a, d) = (EntityId::from("attacker"), EntityId::from("defender"));
    CombatResolver.resolve_attack(
        Combatant::new(&a, attacker),
        Combatant::new(&d, defender),
        category,
        rng,
    )
}

/// Test that a fixed roll sequence always produces the same outcome.
#[test]
fn test_determinism_with_seeded_rng() {
    let attacker = derive_stats(&AttributeProfile::default().with(AttributeKind::Strength, 25.0));
    let defender = derive_stats(&AttributeProfile::default());

    for category in AttackCategory::ALL {
        let first: Vec<CombatOutcome> = {
            let mut rng = RandRoller::seeded(2024);
            (0..50).map(|_| attack(&attacker, &defender, *category, &mut rng)).collect()
        };
        let second: Vec<CombatOutcome> = {
            let mut rng = RandRoller::seeded(2024);
            (0..50).map(|_| attack(&attacker, &defender, *category, &mut rng)).collect()
        };
        assert_eq!(first, second);
    }
}

/// Test that a first roll of 0.0 dodges regardless of attacker power.
#[test]
fn test_dodge_short_circuit() {
    let titan = derive_stats(
        &AttributeKind::ALL
            .iter()
            .map(|kind| (*kind, 1_000.0))
            .collect::<AttributeProfile>(),
    );
    let defender = derive_stats(&AttributeProfile::default());

    for category in AttackCategory::ALL {
        let mut rng = SequenceRoller::new(vec![0.0, 0.0, 0.0, 0.0]);
        let outcome = attack(&titan, &defender, *category, &mut rng);
        assert!(outcome.is_dodged);
        assert_eq!(outcome.damage, 0.0);
        assert_eq!(rng.draws(), 1);
    }
}

/// Test that the critical multiplier lands before defense and resistance.
#[test]
fn test_critical_ordering() {
    let attacker = DerivedStatSet::zeroed()
        .with(DerivedStatKind::PhysicalDamage, 60.0)
        .with(DerivedStatKind::CriticalChance, 0.5)
        .with(DerivedStatKind::CriticalDamage, 2.5);
    let defender = DerivedStatSet::zeroed()
        .with(DerivedStatKind::DodgeChance, 0.2)
        .with(DerivedStatKind::BlockChance, 0.2)
        .with(DerivedStatKind::Defense, 3.0)
        .with(DerivedStatKind::MagicResistance, 0.1);

    // dodge miss, block miss, variation roll 0.25, crit hit
    let mut rng = SequenceRoller::new(vec![0.9, 0.9, 0.25, 0.1]);
    let outcome = attack(&attacker, &defender, AttackCategory::Special, &mut rng);

    let variation = 0.8 + 0.4 * 0.25;
    let before_mitigation = 60.0 * 1.5 * variation * 2.5;
    let expected = before_mitigation * (1.0 - 3.0 * DEFENSE_FACTOR) * (1.0 - 0.1);
    assert!(outcome.is_critical);
    assert!(!outcome.is_blocked);
    assert!(approx(outcome.damage, expected));
}

/// Test that a block halves damage but still lets a critical through.
#[test]
fn test_block_does_not_prevent_critical() {
    let attacker = DerivedStatSet::zeroed()
        .with(DerivedStatKind::PhysicalDamage, 20.0)
        .with(DerivedStatKind::CriticalChance, 1.0)
        .with(DerivedStatKind::CriticalDamage, 2.0);
    let defender = DerivedStatSet::zeroed().with(DerivedStatKind::BlockChance, 1.0);

    let mut rng = SequenceRoller::new(vec![0.5, 0.5, 0.5, 0.5]);
    let outcome = attack(&attacker, &defender, AttackCategory::Melee, &mut rng);

    assert!(outcome.is_blocked);
    assert!(outcome.is_critical);
    assert!(approx(outcome.damage, 20.0 * 2.0 * 0.5));
    assert!(approx(outcome.toughness_damage, 10.0 * 1.2));
}

/// Test that probabilities above 1 and below 0 behave as certain and impossible.
#[test]
fn test_unclamped_probabilities() {
    let attacker = DerivedStatSet::zeroed()
        .with(DerivedStatKind::PhysicalDamage, 10.0)
        .with(DerivedStatKind::CriticalChance, -0.5);
    let slippery = DerivedStatSet::zeroed().with(DerivedStatKind::DodgeChance, 1.7);
    let clumsy = DerivedStatSet::zeroed().with(DerivedStatKind::DodgeChance, -0.2);

    let mut rng = RandRoller::seeded(7);
    for _ in 0..100 {
        assert!(attack(&attacker, &slippery, AttackCategory::Melee, &mut rng).is_dodged);
        let hit = attack(&attacker, &clumsy, AttackCategory::Melee, &mut rng);
        assert!(!hit.is_dodged);
        assert!(!hit.is_critical);
    }
}

/// Test that heavily armored targets still take the minimum damage.
#[test]
fn test_minimum_damage_floor() {
    let attacker = derive_stats(&AttributeProfile::default());
    // all-10s defense is 25, far past the point where mitigation goes negative
    let defender = derive_stats(&AttributeProfile::default());

    let mut rng = SequenceRoller::new(vec![0.99, 0.99, 0.5, 0.99]);
    let outcome = attack(&attacker, &defender, AttackCategory::Melee, &mut rng);
    assert_eq!(outcome.damage, 1.0);
    assert!(outcome.toughness_damage > 1.0);
}

/// Test that every category emits the right toughness tag.
#[test]
fn test_toughness_tags() {
    let attacker = derive_stats(&AttributeProfile::default());
    let defender = DerivedStatSet::zeroed();
    let expected = [
        (AttackCategory::Melee, ToughnessCategory::Physical),
        (AttackCategory::Ranged, ToughnessCategory::Physical),
        (AttackCategory::Magic, ToughnessCategory::PenetratingA),
        (AttackCategory::Area, ToughnessCategory::PenetratingUniversal),
        (AttackCategory::Special, ToughnessCategory::PenetratingUniversal),
    ];
    for (category, tag) in expected {
        let mut rng = SequenceRoller::constant(0.5);
        let outcome = attack(&attacker, &defender, category, &mut rng);
        assert_eq!(outcome.toughness_category, tag);
        assert_eq!(outcome.attack_category, category);
    }
}

/// Test that unknown category tags fail at the parsing boundary.
#[test]
fn test_unknown_category_rejected() {
    assert_eq!(
        "siege".parse::<AttackCategory>(),
        Err(EngineError::UnknownCategory("siege".into()))
    );
    assert!("penetrating-B".parse::<ToughnessCategory>().is_err());
    assert_eq!("magic".parse::<AttackCategory>(), Ok(AttackCategory::Magic));
}
