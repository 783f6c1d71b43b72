use game_core::combat::{crit_chance, interval_from_speed};
use game_core::{
    BattleEvent, BattlePhase, CombatConfig, CombatScheduler, CombatUnit, FixedRng, PcgRng,
    PlayerState, RngOracle, Side, Team, UnitTemplate, attack_order, compute_seed, resolve_attack,
};

fn golem() -> UnitTemplate {
    UnitTemplate {
        id: "golem".into(),
        name: "Stone Golem".into(),
        hp: 600,
        attack: 18,
        defense: 40,
        speed: 0.8,
        crit_rate: 6,
        crit_damage: 50,
        guard: Some(6),
        is_boss: true,
    }
}

fn striker() -> UnitTemplate {
    UnitTemplate {
        id: "striker".into(),
        name: "Striker Bot".into(),
        hp: 150,
        attack: 20,
        defense: 10,
        speed: 1.2,
        crit_rate: 4,
        crit_damage: 40,
        guard: None,
        is_boss: false,
    }
}

fn hero() -> PlayerState {
    PlayerState {
        name: "Hero".into(),
        hp: 400,
        max_hp: 400,
        attack: 45,
        defense: 30,
        attack_speed: 1.5,
        crit_rate: 12,
        crit_damage: 80,
        penetration_percent: 20.0,
        penetration_flat: 5.0,
        life_steal_percent: 10.0,
        ..PlayerState::default()
    }
}

fn grunt(id: &str, hp: u32, attack: u32) -> CombatUnit {
    CombatUnit {
        id: id.into(),
        name: id.into(),
        hp,
        max_hp: hp,
        attack,
        attack_interval_ms: 1_000,
        ..CombatUnit::default()
    }
}

#[test]
fn attack_order_is_always_a_permutation() {
    for slot in 0..6 {
        let order = attack_order(slot);
        let mut seen = [false; 6];
        for index in order {
            assert!(!seen[index], "slot {slot} repeats {index}");
            seen[index] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }
}

/// crit 50 against guard 5 → (50 - 5) / 7.5 = 6.0, clamped to 1.0.
#[test]
fn heavy_crit_always_crits() {
    let config = CombatConfig::default();
    assert_eq!(crit_chance(50, Some(5), &config), 1.0);

    let rng = PcgRng;
    for nonce in 0..200 {
        let mut attacker = CombatUnit {
            crit_rate: 50,
            crit_damage: 100,
            ..grunt("a", 10, 10)
        };
        let mut defender = CombatUnit {
            guard: Some(5),
            ..grunt("d", 1_000, 1)
        };
        let roll = rng.unit_f64(compute_seed(1, nonce, 0, 0));
        let outcome = resolve_attack(&mut attacker, &mut defender, None, roll, &config);
        assert!(outcome.is_crit);
        assert_eq!(outcome.damage, 20);
    }
}

#[test]
fn crit_chance_stays_in_unit_interval() {
    let config = CombatConfig::default();
    for crit in [0_u32, 1, 5, 6, 50, u32::MAX] {
        for guard in [None, Some(0), Some(1), Some(5), Some(u32::MAX)] {
            let chance = crit_chance(crit, guard, &config);
            assert!((0.0..=1.0).contains(&chance), "crit {crit} guard {guard:?}");
        }
    }
}

#[test]
fn damage_never_below_one() {
    let config = CombatConfig::default();
    let rng = PcgRng;
    for attack in [0_u32, 1, 3, 99, 5_000] {
        for defense in [0_u32, 10, 600, 60_000, u32::MAX] {
            let mut attacker = grunt("a", 10, attack);
            let mut defender = CombatUnit {
                defense,
                ..grunt("d", u32::MAX, 0)
            };
            let roll = rng.unit_f64(compute_seed(attack as u64, defense as u64, 0, 0));
            let outcome = resolve_attack(&mut attacker, &mut defender, None, roll, &config);
            assert!(outcome.damage >= 1);
        }
    }
}

/// Two allies each land a lethal hit on the last enemy in the same tick batch.
#[test]
fn simultaneous_lethal_hits_end_battle_once() {
    let config = CombatConfig::default();
    let mut player = PlayerState {
        attack: 10,
        crit_rate: 0,
        ..PlayerState::default()
    };
    let mut allies = Team::new();
    allies.place(0, player.to_unit(config.min_attack_interval_ms));
    allies.place(1, grunt("twin", 50, 10));

    let mut enemies = Team::new();
    enemies.place(0, grunt("slime", 10, 1));

    let rng = FixedRng(0.5);
    let mut scheduler = CombatScheduler::new(&mut player, allies, enemies, &config, &rng, 9);

    // ================================================================
    // One tick batch, then every timer fires again
    // ================================================================
    assert!(scheduler.player_tick());
    for _ in 0..3 {
        scheduler.player_tick();
        scheduler.enemy_tick();
        scheduler.cooldown_tick();
    }
    assert!(!scheduler.teardown());

    let events = scheduler.drain_events();
    let victories = events
        .iter()
        .filter(|event| {
            matches!(
                event,
                BattleEvent::Finished {
                    phase: BattlePhase::Victory
                }
            )
        })
        .count();
    let defeats = events
        .iter()
        .filter(|event| matches!(event, BattleEvent::UnitDefeated { side: Side::Enemies, .. }))
        .count();

    assert_eq!(victories, 1);
    assert_eq!(defeats, 1);
    assert_eq!(scheduler.phase(), BattlePhase::Victory);
    assert_eq!(scheduler.report().defeated_enemies, vec!["slime".to_string()]);
}

#[test]
fn boss_battle_from_templates() {
    let config = CombatConfig::default();
    let mut player = hero();
    let rng = PcgRng;

    // ================================================================
    // Setup: player + crew against a boss with rolled minions
    // ================================================================
    let crew = [striker(), striker()];
    let mut scheduler = CombatScheduler::start(&mut player, &crew, &golem(), &config, &rng, 2024);

    assert_eq!(scheduler.allies().alive_count(), 3);
    let minions = (3..6).filter(|&slot| scheduler.enemies().is_alive(slot)).count();
    assert!((2..=3).contains(&minions));
    assert_eq!(scheduler.cadence().player_ms, interval_from_speed(1.5, 200));
    assert_eq!(
        scheduler.cadence().enemy_ms,
        interval_from_speed(0.8, config.min_attack_interval_ms)
    );

    // ================================================================
    // Fight until someone falls
    // ================================================================
    let phase = scheduler.run_for(30 * 60 * 1_000);
    assert!(phase.is_terminal());

    let report = scheduler.report();
    let player_hp = scheduler.allies().get(0).map(|unit| unit.hp);
    drop(scheduler);

    assert_eq!(Some(player.hp), player_hp);
    if phase == BattlePhase::Victory {
        assert_eq!(report.defeated_bosses, vec!["golem".to_string()]);
        assert_eq!(report.defeated_enemies.len(), 1 + minions);
    } else {
        assert_eq!(phase, BattlePhase::Defeat);
        assert_eq!(player.hp, 0);
    }
}
