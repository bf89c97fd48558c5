//! Duel example: a knight and a mage trade blows until one falls
//!
//! This example demonstrates:
//! - Running a lifecycle-managed engine
//! - Skills granting timed modifiers into a ledger
//! - Seeded, replayable combat rolls
//!
//! Set `RUST_LOG=statforge=trace` to see every roll-level decision.

use statforge::combat::{CombatResolver, Combatant};
use statforge::*;
use std::error::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const TICK: f64 = 1.5;
const MAX_ROUNDS: usize = 40;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "statforge=debug".into()))
        .with(fmt::layer())
        .init();

    let mut engine = StatEngine::new(EngineConfig::default())?;
    engine.initialize()?;
    engine.start()?;

    let knight = EntityId::from("knight");
    let mage = EntityId::from("mage");
    let knight_base = AttributeProfile::default()
        .with(AttributeKind::Strength, 24.0)
        .with(AttributeKind::Vitality, 18.0);
    let mage_base = AttributeProfile::default()
        .with(AttributeKind::Intelligence, 28.0)
        .with(AttributeKind::Wisdom, 16.0);

    let war_cry = SkillDefinition::new("war_cry")
        .requires_attribute(AttributeKind::Strength, 20.0)
        .with_cooldown(12.0)
        .grants_attribute(ModifierTemplate::percentage(AttributeKind::Strength, 25.0, 6.0));

    let mut knight_ledger = engine.new_ledger();
    let mut knight_book = SkillBook::new();
    let knight_stats = engine.resolve_with_ledger(&knight, &knight_base, &knight_ledger, 0.0)?;
    let learned = SkillPowerResolver.try_learn(
        &knight,
        &war_cry,
        &knight_base,
        &knight_stats,
        &mut knight_book,
    );
    if !learned {
        println!("The knight is too weak for a war cry");
    }

    let mage_stats = engine.resolve(&mage, &mage_base, &[], &[], 0.0)?;
    let mut knight_health = knight_stats.get(DerivedStatKind::Health);
    let mut mage_health = mage_stats.get(DerivedStatKind::Health);

    println!("=== Duel ===\n");
    println!("Knight: {knight_health:.0} HP, Mage: {mage_health:.0} HP\n");

    let mut rng = RandRoller::seeded(42);
    let mut now = 0.0;

    for round in 1..=MAX_ROUNDS {
        now += TICK;
        engine.update(now);
        knight_ledger.prune(now);

        let result = SkillPowerResolver.use_from_book(
            &knight,
            &war_cry,
            &mut knight_book,
            &knight_base,
            &knight_stats,
            now,
        );
        if result.eligible {
            println!("[{now:>5.1}] Knight shouts a war cry (power {:.2})", result.power);
            knight_ledger.extend(result.granted_attribute_modifiers, result.granted_stat_modifiers);
        }

        let knight_now = engine.resolve_with_ledger(&knight, &knight_base, &knight_ledger, now)?;
        let mage_now = engine.resolve(&mage, &mage_base, &[], &[], now)?;

        let swing = CombatResolver.resolve_attack(
            Combatant::new(&knight, &knight_now),
            Combatant::new(&mage, &mage_now),
            AttackCategory::Melee,
            &mut rng,
        );
        mage_health -= swing.damage;
        report(round, now, "Knight", &swing);

        let bolt = CombatResolver.resolve_attack(
            Combatant::new(&mage, &mage_now),
            Combatant::new(&knight, &knight_now),
            AttackCategory::Magic,
            &mut rng,
        );
        knight_health -= bolt.damage;
        report(round, now, "Mage", &bolt);

        if knight_health <= 0.0 || mage_health <= 0.0 {
            break;
        }
    }

    println!();
    match (knight_health > 0.0, mage_health > 0.0) {
        (true, false) => println!("The knight wins with {knight_health:.0} HP left"),
        (false, true) => println!("The mage wins with {mage_health:.0} HP left"),
        _ => println!("Nobody wins (knight {knight_health:.0}, mage {mage_health:.0})"),
    }

    let info = engine.info();
    println!(
        "\nEngine: {} cached entries, {} hits, {} misses",
        info.cache_entries, info.counters.cache_hits, info.counters.cache_misses
    );

    engine.stop()?;
    engine.destroy()?;
    Ok(())
}

fn report(round: usize, now: f64, who: &str, outcome: &CombatOutcome) {
    let mut tags = Vec::new();
    if outcome.is_critical {
        tags.push("crit");
    }
    if outcome.is_blocked {
        tags.push("blocked");
    }
    if outcome.landed() {
        println!(
            "[{now:>5.1}] #{round:<2} {who} hits {} for {:.1} ({} toughness {:.1}) {}",
            outcome.target_id,
            outcome.damage,
            outcome.toughness_category,
            outcome.toughness_damage,
            tags.join(" ")
        );
    } else {
        println!("[{now:>5.1}] #{round:<2} {who} misses, {} dodged", outcome.target_id);
    }
}
