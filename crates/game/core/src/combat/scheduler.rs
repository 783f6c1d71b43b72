//! Battle state machine driven by three independent cadences.
//!
//! The scheduler owns both teams for one battle and borrows the persistent
//! [`PlayerState`] mutably for its whole lifetime. Every tick reads the live
//! player values first and writes hp/shield back afterwards, so nothing acts
//! on a stale copy no matter how the timers interleave.
//!
//! ```text
//!              ┌───────────── player_tick / enemy_tick / cooldown_tick ─┐
//!              ▼                                                        │
//!         Fighting ──(enemies wiped)──▶ Victory                         │
//!              │ ──(allies wiped)───▶ Defeat                            │
//!              └──(escape)──────────▶ Escaped                           │
//!                                       every terminal transition tears down
//!                                       all timers exactly once
//! ```
//!
//! Hosts either fire the timers themselves via [`CombatScheduler::fire`] or
//! let [`CombatScheduler::run_for`] merge them on a virtual clock.

use bitflags::bitflags;
use strum::IntoEnumIterator;

use crate::config::{CombatConfig, GameConfig};
use crate::env::{RngOracle, compute_seed};

use super::damage::{AttackOutcome, resolve_attack};
use super::encounter::{UnitTemplate, build_ally_team, build_enemy_team};
use super::events::{BattleEvent, BattlePhase, BattleReport, Side};
use super::player::PlayerState;
use super::skills::{SkillCooldownManager, SkillError, SkillOutcome};
use super::targeting::select_target;
use super::unit::{FALLBACK_INTERVAL_MS, Team, interval_from_speed};

/// Seed context used to roll the enemy team when starting from a template.
const ENCOUNTER_CONTEXT: u32 = 0xE4C0;

bitflags! {
    /// Timers that are still armed.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct TimerSet: u8 {
        const PLAYER = 1 << 0;
        const ENEMY = 1 << 1;
        const COOLDOWN = 1 << 2;
    }
}

/// The three battle timers. Iteration order is the tie-break order of
/// [`CombatScheduler::run_for`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum TimerKind {
    Player,
    Enemy,
    Cooldown,
}

impl TimerKind {
    pub fn flag(self) -> TimerSet {
        match self {
            Self::Player => TimerSet::PLAYER,
            Self::Enemy => TimerSet::ENEMY,
            Self::Cooldown => TimerSet::COOLDOWN,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Timer periods, fixed when the battle starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cadence {
    pub player_ms: u64,
    pub enemy_ms: u64,
    pub cooldown_ms: u64,
}

impl Cadence {
    /// Player cadence from attack speed, enemy cadence from the lead enemy.
    pub fn for_battle(player: &PlayerState, enemies: &Team, config: &CombatConfig) -> Self {
        let min = config.min_attack_interval_ms;
        let lead = enemies
            .get(0)
            .filter(|unit| unit.is_alive())
            .or_else(|| enemies.slots().iter().find(|unit| unit.is_alive()));

        Self {
            player_ms: interval_from_speed(player.attack_speed, min),
            enemy_ms: lead
                .map(|unit| unit.attack_interval_ms)
                .unwrap_or(FALLBACK_INTERVAL_MS)
                .max(min)
                .max(1),
            cooldown_ms: config.cooldown_tick_ms.max(1),
        }
    }

    pub fn period(&self, kind: TimerKind) -> u64 {
        match kind {
            TimerKind::Player => self.player_ms,
            TimerKind::Enemy => self.enemy_ms,
            TimerKind::Cooldown => self.cooldown_ms,
        }
    }
}

/// One battle between the player's side and an enemy side.
pub struct CombatScheduler<'a> {
    player: &'a mut PlayerState,
    rng: &'a dyn RngOracle,
    config: CombatConfig,
    allies: Team,
    enemies: Team,
    primary_slot: Option<usize>,
    skills: SkillCooldownManager,
    phase: BattlePhase,
    cadence: Cadence,
    armed: TimerSet,
    seed: u64,
    nonce: u64,
    clock_ms: u64,
    next_due: [u64; 3],
    events: Vec<BattleEvent>,
    report: BattleReport,
}

impl<'a> CombatScheduler<'a> {
    /// Arms all three timers for a battle between prepared teams.
    ///
    /// A side that starts empty ends the battle immediately.
    pub fn new(
        player: &'a mut PlayerState,
        allies: Team,
        enemies: Team,
        config: &CombatConfig,
        rng: &'a dyn RngOracle,
        seed: u64,
    ) -> Self {
        let cadence = Cadence::for_battle(player, &enemies, config);
        let skills = SkillCooldownManager::new(&player.skills);
        let primary_slot = allies.primary_slot();

        let mut scheduler = Self {
            player,
            rng,
            config: config.clone(),
            allies,
            enemies,
            primary_slot,
            skills,
            phase: BattlePhase::Fighting,
            cadence,
            armed: TimerSet::all(),
            seed,
            nonce: 0,
            clock_ms: 0,
            next_due: [cadence.player_ms, cadence.enemy_ms, cadence.cooldown_ms],
            events: Vec::new(),
            report: BattleReport::default(),
        };
        scheduler.check_terminal();
        scheduler
    }

    /// Builds both teams from templates and starts the battle.
    pub fn start(
        player: &'a mut PlayerState,
        crew: &[UnitTemplate],
        enemy: &UnitTemplate,
        config: &CombatConfig,
        rng: &'a dyn RngOracle,
        seed: u64,
    ) -> Self {
        let allies = build_ally_team(player, crew, config);
        let enemies = build_enemy_team(enemy, config, rng, compute_seed(seed, 0, 0, ENCOUNTER_CONTEXT));
        Self::new(player, allies, enemies, config, rng, seed)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn allies(&self) -> &Team {
        &self.allies
    }

    pub fn enemies(&self) -> &Team {
        &self.enemies
    }

    pub fn player(&self) -> &PlayerState {
        self.player
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    pub fn armed_timers(&self) -> TimerSet {
        self.armed
    }

    pub fn skills(&self) -> &SkillCooldownManager {
        &self.skills
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.clock_ms
    }

    /// Records elapsed battle time for hosts driving real timers.
    pub fn set_elapsed(&mut self, elapsed_ms: u64) {
        self.clock_ms = self.clock_ms.max(elapsed_ms);
        self.report.elapsed_ms = self.clock_ms;
    }

    pub fn report(&self) -> BattleReport {
        self.report.clone()
    }

    /// Takes every event produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.events)
    }

    // ========================================================================
    // Timers
    // ========================================================================

    /// Runs the callback for `kind`; false if that timer is no longer armed.
    pub fn fire(&mut self, kind: TimerKind) -> bool {
        if !self.armed.contains(kind.flag()) {
            return false;
        }
        match kind {
            TimerKind::Player => self.player_tick(),
            TimerKind::Enemy => self.enemy_tick(),
            TimerKind::Cooldown => self.cooldown_tick(),
        }
    }

    /// Every living ally attacks once, slot 0 first.
    pub fn player_tick(&mut self) -> bool {
        self.side_tick(Side::Allies)
    }

    /// Every living enemy attacks once, slot 0 first.
    pub fn enemy_tick(&mut self) -> bool {
        self.side_tick(Side::Enemies)
    }

    /// Decays cooldowns by one period, then auto-casts ready skills if enabled.
    pub fn cooldown_tick(&mut self) -> bool {
        if self.phase.is_terminal() {
            return false;
        }
        self.skills.tick(self.cadence.cooldown_ms);

        if self.player.auto_combat {
            for skill_id in self.auto_cast_candidates() {
                if self.phase.is_terminal() {
                    break;
                }
                // NoTarget and friends just mean "not this tick".
                let _ = self.cast_skill(&skill_id);
            }
        }
        true
    }

    /// Disarms all timers. Safe to call any number of times; returns true
    /// only on the call that actually disarmed something.
    pub fn teardown(&mut self) -> bool {
        let was_armed = !self.armed.is_empty();
        self.armed = TimerSet::empty();
        was_armed
    }

    /// Leaves the battle without a winner.
    pub fn escape(&mut self) -> bool {
        self.finish(BattlePhase::Escaped)
    }

    /// Merges the three cadences on a virtual clock for `duration_ms`.
    ///
    /// Timers due at the same instant fire player, enemy, cooldown. Stops
    /// early at a terminal phase.
    pub fn run_for(&mut self, duration_ms: u64) -> BattlePhase {
        let deadline = self.clock_ms.saturating_add(duration_ms);

        while !self.phase.is_terminal() && !self.armed.is_empty() {
            let due = self.next_due.iter().copied().min().unwrap_or(u64::MAX);
            if due > deadline {
                break;
            }
            self.clock_ms = due;
            self.report.elapsed_ms = due;

            for kind in TimerKind::iter() {
                let index = kind.index();
                if self.next_due[index] == due {
                    self.fire(kind);
                    self.next_due[index] = due.saturating_add(self.cadence.period(kind));
                }
            }
        }

        if !self.phase.is_terminal() {
            self.set_elapsed(deadline);
        }
        self.phase
    }

    // ========================================================================
    // Skills
    // ========================================================================

    /// Casts an equipped skill from the primary player's slot.
    pub fn cast_skill(&mut self, skill_id: &str) -> Result<SkillOutcome, SkillError> {
        if self.phase.is_terminal() {
            return Err(SkillError::BattleOver);
        }
        let slot = self.primary_slot.ok_or(SkillError::CasterDown)?;

        self.refresh_primary();
        let caster = self.allies.get_mut(slot).ok_or(SkillError::CasterDown)?;
        let result = self.skills.cast(skill_id, caster, slot, &mut self.enemies);
        self.commit_primary();
        let outcome = result?;

        self.report.damage_dealt += outcome.damage as u64;
        self.events.push(BattleEvent::SkillCast {
            outcome: outcome.clone(),
        });
        if let Some(target_slot) = outcome.target_slot.filter(|_| outcome.killed) {
            self.record_defeat(Side::Enemies, target_slot);
        }
        self.check_terminal();
        Ok(outcome)
    }

    /// Ready skills worth casting right now: heals wait until hp is missing.
    fn auto_cast_candidates(&self) -> Vec<String> {
        let wounded = self.player.hp < self.player.max_hp;
        self.skills
            .cooldowns()
            .iter()
            .filter(|cooldown| cooldown.is_ready())
            .filter(|cooldown| wounded || !cooldown.skill.effect.is_heal())
            .map(|cooldown| cooldown.skill.id.clone())
            .collect()
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn side_tick(&mut self, side: Side) -> bool {
        if self.phase.is_terminal() {
            return false;
        }
        self.refresh_primary();
        let offense = self.player.offense();

        for slot in 0..GameConfig::TEAM_SIZE {
            if self.phase.is_terminal() {
                break;
            }
            let acting = match side {
                Side::Allies => &self.allies,
                Side::Enemies => &self.enemies,
            };
            if !acting.is_alive(slot) {
                continue;
            }
            let roll = self.next_roll(side, slot);

            let (attackers, defenders) = match side {
                Side::Allies => (&mut self.allies, &mut self.enemies),
                Side::Enemies => (&mut self.enemies, &mut self.allies),
            };
            // No living target: nothing happens this tick.
            let Some(target_slot) = select_target(defenders, slot) else {
                break;
            };
            let (Some(attacker), Some(defender)) =
                (attackers.get_mut(slot), defenders.get_mut(target_slot))
            else {
                continue;
            };
            let traits = attacker.is_primary.then_some(&offense);
            let outcome = resolve_attack(attacker, defender, traits, roll, &self.config);

            self.record_attack(side, slot, target_slot, outcome);
            self.check_terminal();
        }

        self.commit_primary();
        true
    }

    fn record_attack(
        &mut self,
        side: Side,
        attacker_slot: usize,
        target_slot: usize,
        outcome: AttackOutcome,
    ) {
        match side {
            Side::Allies => self.report.damage_dealt += outcome.damage as u64,
            Side::Enemies => self.report.damage_taken += outcome.damage as u64,
        }
        self.events.push(BattleEvent::Attack {
            side,
            attacker_slot,
            target_slot,
            outcome,
        });
        if outcome.killed {
            self.record_defeat(side.opponent(), target_slot);
        }
    }

    fn record_defeat(&mut self, side: Side, slot: usize) {
        let team = match side {
            Side::Allies => &self.allies,
            Side::Enemies => &self.enemies,
        };
        let Some(unit) = team.get(slot) else {
            return;
        };
        let unit_id = unit.id.clone();

        if side == Side::Enemies {
            if unit.is_boss {
                self.report.defeated_bosses.push(unit_id.clone());
            }
            self.report.defeated_enemies.push(unit_id.clone());
        }
        self.events.push(BattleEvent::UnitDefeated { side, slot, unit_id });
    }

    /// Enters Victory/Defeat once a side is wiped.
    fn check_terminal(&mut self) -> bool {
        if self.enemies.is_wiped() {
            self.finish(BattlePhase::Victory)
        } else if self.allies.is_wiped() {
            self.finish(BattlePhase::Defeat)
        } else {
            false
        }
    }

    /// Single exit from `Fighting`. Later calls are no-ops.
    fn finish(&mut self, phase: BattlePhase) -> bool {
        if self.phase.is_terminal() || !phase.is_terminal() {
            return false;
        }
        self.phase = phase;
        self.report.phase = phase;
        self.report.elapsed_ms = self.clock_ms;
        self.teardown();
        self.commit_primary();
        self.events.push(BattleEvent::Finished { phase });
        true
    }

    fn refresh_primary(&mut self) {
        if let Some(unit) = self.primary_slot.and_then(|slot| self.allies.get_mut(slot)) {
            self.player.refresh_unit(unit);
        }
    }

    fn commit_primary(&mut self) {
        if let Some(unit) = self.primary_slot.and_then(|slot| self.allies.get(slot)) {
            self.player.commit_unit(unit);
        }
    }

    fn next_roll(&mut self, side: Side, slot: usize) -> f64 {
        let actor = match side {
            Side::Allies => slot,
            Side::Enemies => GameConfig::TEAM_SIZE + slot,
        };
        let seed = compute_seed(self.seed, self.nonce, actor as u32, 0);
        self.nonce += 1;
        self.rng.unit_f64(seed)
    }
}

impl std::fmt::Debug for CombatScheduler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombatScheduler")
            .field("phase", &self.phase)
            .field("cadence", &self.cadence)
            .field("armed", &self.armed)
            .field("clock_ms", &self.clock_ms)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use crate::combat::{CombatUnit, SkillDefinition, SkillEffect};
    use crate::env::{FixedRng, PcgRng};

    use super::*;

    fn player(attack: u32, hp: u32, speed: f64) -> PlayerState {
        PlayerState {
            hp,
            max_hp: hp,
            attack,
            attack_speed: speed,
            crit_rate: 0,
            ..PlayerState::default()
        }
    }

    fn enemy(id: &str, hp: u32, attack: u32) -> CombatUnit {
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

    fn solo(player: &PlayerState, config: &CombatConfig) -> Team {
        build_ally_team(player, &[], config)
    }

    fn foes(units: impl IntoIterator<Item = (usize, CombatUnit)>) -> Team {
        let mut team = Team::new();
        for (slot, unit) in units {
            team.place(slot, unit);
        }
        team
    }

    #[test]
    fn cadence_is_fixed_at_start() {
        let config = CombatConfig::default();
        let mut hero = player(10, 100, 2.0);
        let allies = solo(&hero, &config);
        let rng = FixedRng(0.5);
        let scheduler = CombatScheduler::new(
            &mut hero,
            allies,
            foes([(0, enemy("slime", 10, 1))]),
            &config,
            &rng,
            1,
        );

        assert_eq!(
            scheduler.cadence(),
            Cadence {
                player_ms: 500,
                enemy_ms: 1_000,
                cooldown_ms: 1_000
            }
        );
        assert_eq!(scheduler.armed_timers(), TimerSet::all());
    }

    #[test]
    fn virtual_run_reaches_victory_and_mirrors_hp() {
        let config = CombatConfig::default();
        let mut hero = player(30, 100, 2.0);
        let allies = solo(&hero, &config);
        let rng = FixedRng(0.5);
        let mut scheduler = CombatScheduler::new(
            &mut hero,
            allies,
            foes([(0, enemy("slime", 100, 5))]),
            &config,
            &rng,
            1,
        );

        assert_eq!(scheduler.run_for(60_000), BattlePhase::Victory);
        let report = scheduler.report();
        assert_eq!(report.elapsed_ms, 2_000);
        assert_eq!(report.damage_dealt, 120);
        assert_eq!(report.damage_taken, 5);
        assert_eq!(report.defeated_enemies, vec!["slime".to_string()]);
        assert!(scheduler.armed_timers().is_empty());
        drop(scheduler);

        assert_eq!(hero.hp, 95);
    }

    #[test]
    fn terminal_transition_fires_once() {
        let config = CombatConfig::default();
        let mut hero = player(10, 100, 1.0);
        let crew = [UnitTemplate {
            id: "bot".into(),
            name: "Bot".into(),
            hp: 50,
            attack: 10,
            defense: 0,
            speed: 1.0,
            crit_rate: 0,
            crit_damage: 0,
            guard: None,
            is_boss: false,
        }];
        let allies = build_ally_team(&hero, &crew, &config);
        let rng = FixedRng(0.5);
        let mut scheduler = CombatScheduler::new(
            &mut hero,
            allies,
            foes([(0, enemy("slime", 10, 1))]),
            &config,
            &rng,
            1,
        );

        assert!(scheduler.player_tick());
        assert_eq!(scheduler.phase(), BattlePhase::Victory);
        assert!(!scheduler.player_tick());
        assert!(!scheduler.enemy_tick());
        assert!(!scheduler.escape());
        assert!(!scheduler.teardown());

        let events = scheduler.drain_events();
        let finished = events
            .iter()
            .filter(|event| matches!(event, BattleEvent::Finished { .. }))
            .count();
        let attacks = events
            .iter()
            .filter(|event| matches!(event, BattleEvent::Attack { .. }))
            .count();
        assert_eq!(finished, 1);
        assert_eq!(attacks, 1);
    }

    #[test]
    fn defeat_persists_player_hp() {
        let config = CombatConfig::default();
        let mut hero = player(1, 20, 1.0);
        let allies = solo(&hero, &config);
        let rng = FixedRng(0.5);
        let mut scheduler = CombatScheduler::new(
            &mut hero,
            allies,
            foes([(0, enemy("ogre", 1_000, 50))]),
            &config,
            &rng,
            1,
        );

        assert_eq!(scheduler.run_for(10_000), BattlePhase::Defeat);
        drop(scheduler);
        assert_eq!(hero.hp, 0);
    }

    #[test]
    fn enemy_hits_land_on_player_state() {
        let config = CombatConfig::default();
        let mut hero = player(1, 100, 1.0);
        let allies = solo(&hero, &config);
        let rng = FixedRng(0.5);
        let mut scheduler = CombatScheduler::new(
            &mut hero,
            allies,
            foes([(0, enemy("ogre", 1_000, 10))]),
            &config,
            &rng,
            1,
        );

        scheduler.enemy_tick();
        assert_eq!(scheduler.player().hp, 90);
        scheduler.enemy_tick();
        assert_eq!(scheduler.allies().get(0).map(|u| u.hp), Some(80));
        assert_eq!(scheduler.player().hp, 80);
    }

    #[test]
    fn escape_tears_down_without_winner() {
        let config = CombatConfig::default();
        let mut hero = player(1, 100, 1.0);
        let allies = solo(&hero, &config);
        let rng = FixedRng(0.5);
        let mut scheduler = CombatScheduler::new(
            &mut hero,
            allies,
            foes([(0, enemy("ogre", 1_000, 1))]),
            &config,
            &rng,
            1,
        );

        assert!(scheduler.escape());
        assert_eq!(scheduler.phase(), BattlePhase::Escaped);
        assert!(!scheduler.fire(TimerKind::Player));
        assert_eq!(scheduler.run_for(10_000), BattlePhase::Escaped);
        assert_eq!(scheduler.report().damage_dealt, 0);
    }

    #[test]
    fn auto_combat_casts_on_cooldown_tick() {
        let config = CombatConfig::default();
        let mut hero = PlayerState {
            skills: vec![SkillDefinition {
                id: "nova".into(),
                name: "Nova".into(),
                cooldown_ms: 5_000,
                effect: SkillEffect::DamageFlat(500),
            }],
            ..player(1, 100, 1.0)
        };
        let allies = solo(&hero, &config);
        let rng = FixedRng(0.5);
        let mut scheduler = CombatScheduler::new(
            &mut hero,
            allies,
            foes([(0, enemy("slime", 100, 1))]),
            &config,
            &rng,
            1,
        );

        assert!(scheduler.cooldown_tick());
        assert_eq!(scheduler.phase(), BattlePhase::Victory);
        assert!(matches!(
            scheduler.cast_skill("nova"),
            Err(SkillError::BattleOver)
        ));
    }

    #[test]
    fn manual_cast_respects_cooldown() {
        let config = CombatConfig::default();
        let mut hero = PlayerState {
            auto_combat: false,
            skills: vec![SkillDefinition {
                id: "jab".into(),
                name: "Jab".into(),
                cooldown_ms: 2_000,
                effect: SkillEffect::DamageFlat(10),
            }],
            ..player(1, 100, 1.0)
        };
        let allies = solo(&hero, &config);
        let rng = FixedRng(0.5);
        let mut scheduler = CombatScheduler::new(
            &mut hero,
            allies,
            foes([(0, enemy("slime", 100, 1))]),
            &config,
            &rng,
            1,
        );

        assert_eq!(scheduler.cast_skill("jab").map(|o| o.damage), Ok(10));
        assert!(matches!(
            scheduler.cast_skill("jab"),
            Err(SkillError::OnCooldown { .. })
        ));
        scheduler.cooldown_tick();
        scheduler.cooldown_tick();
        assert!(scheduler.cast_skill("jab").is_ok());
        assert_eq!(scheduler.enemies().get(0).map(|u| u.hp), Some(80));
    }

    #[test]
    fn same_seed_same_battle() {
        let config = CombatConfig::default();
        let boss = UnitTemplate {
            id: "golem".into(),
            name: "Golem".into(),
            hp: 400,
            attack: 12,
            defense: 30,
            speed: 0.8,
            crit_rate: 8,
            crit_damage: 50,
            guard: Some(4),
            is_boss: true,
        };
        let run = |seed: u64| {
            let mut hero = PlayerState {
                crit_rate: 9,
                ..player(25, 300, 1.5)
            };
            let rng = PcgRng;
            let mut scheduler = CombatScheduler::start(&mut hero, &[], &boss, &config, &rng, seed);
            scheduler.run_for(120_000);
            let report = scheduler.report();
            drop(scheduler);
            (report, hero.hp)
        };

        assert_eq!(run(42), run(42));
    }

    #[test]
    fn empty_enemy_side_is_instant_victory() {
        let config = CombatConfig::default();
        let mut hero = player(1, 100, 1.0);
        let allies = solo(&hero, &config);
        let rng = FixedRng(0.5);
        let scheduler = CombatScheduler::new(&mut hero, allies, Team::new(), &config, &rng, 1);
        assert_eq!(scheduler.phase(), BattlePhase::Victory);
        assert!(scheduler.armed_timers().is_empty());
    }
}
