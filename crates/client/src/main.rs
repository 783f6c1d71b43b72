//! Idle game command-line client.
//!
//! Each invocation builds a runtime over the saved profile, runs one
//! command and saves on the way out.
//!
//! # Examples
//!
//! ```bash
//! idle collect robot_a gather
//! idle status
//! idle battle iron_golem
//! idle claim
//! idle rest
//! ```
//!
//! Configuration comes from the environment (see `RuntimeConfig::from_env`),
//! optionally through a `.env` file.
mod logging;

use anyhow::{Result, anyhow, bail};
use game_content::ContentBundle;
use game_core::{BattlePhase, CollectMode, Reward, material_lines};
use runtime::{BattleNotice, Event, Runtime, RuntimeConfig, RuntimeHandle, Topic};

const USAGE: &str = "usage: idle <status|sources|collect <source> [mode]|stop|claim|settle|estimate|battle <enemy>|rest>";

enum Command {
    Status,
    Sources,
    Collect { source_id: String, mode: CollectMode },
    Stop,
    Claim,
    Settle,
    Estimate,
    Battle { enemy_id: String },
    Rest,
}

impl Command {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let Some(name) = args.next() else {
            return Ok(Command::Status);
        };
        let command = match name.as_str() {
            "status" => Command::Status,
            "sources" => Command::Sources,
            "collect" => {
                let source_id = args.next().ok_or_else(|| anyhow!("collect needs a source id"))?;
                let mode = match args.next() {
                    Some(mode) => mode
                        .parse::<CollectMode>()
                        .map_err(|_| anyhow!("unknown mode '{}' (gather, combat, balanced)", mode))?,
                    None => CollectMode::default(),
                };
                Command::Collect { source_id, mode }
            }
            "stop" => Command::Stop,
            "claim" => Command::Claim,
            "settle" => Command::Settle,
            "estimate" => Command::Estimate,
            "rest" => Command::Rest,
            "battle" => {
                let enemy_id = args.next().ok_or_else(|| anyhow!("battle needs an enemy id"))?;
                Command::Battle { enemy_id }
            }
            other => bail!("unknown command '{}'\n{}", other, USAGE),
        };
        Ok(command)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();
    logging::setup_logging();

    let command = Command::parse(std::env::args().skip(1))?;

    let mut config = RuntimeConfig::from_env();
    // A one-shot CLI is useless without its save.
    config.enable_persistence = true;
    tracing::info!("Profile: {}", config.profile);

    let runtime = Runtime::builder().config(config).build().await?;
    let result = run(&runtime.handle(), command).await;

    runtime.shutdown().await?;
    result
}

async fn run(handle: &RuntimeHandle, command: Command) -> Result<()> {
    match command {
        Command::Status => {
            let status = handle.status().await?;
            match &status.source_id {
                Some(source_id) if status.is_collecting => println!(
                    "Collecting from {} ({}) for {:.2}h",
                    source_id,
                    status.mode,
                    status.collecting_duration_ms as f64 / 3_600_000.0
                ),
                _ => println!("Not collecting"),
            }
            println!("Daily hours left: {:.2}", status.remaining_daily_hours);
            println!(
                "Boss multiplier: x{:.2}, equipment bonus: {}%",
                status.boss_multiplier, status.bonus_percent
            );
            if !status.accumulated.is_empty() {
                println!("Unclaimed:");
                print_reward(handle.content(), &status.accumulated);
            }
            if let Some(player) = handle.player().await? {
                println!("{}: {}/{} hp", player.name, player.hp, player.max_hp);
            }
        }
        Command::Sources => {
            for row in handle.content().rewards.iter() {
                println!(
                    "{:<12} {:<16} {:>7.1} gold/h {:>7.1} exp/h",
                    row.id, row.name, row.gold_per_hour, row.exp_per_hour
                );
            }
            for enemy in &handle.content().enemies {
                let tag = if enemy.is_boss { " [boss]" } else { "" };
                println!("{:<12} {}{}", enemy.id, enemy.name, tag);
            }
        }
        Command::Collect { source_id, mode } => {
            handle.start_collect(&source_id, mode).await?;
            println!("Collecting from {} in {} mode", source_id, mode);
        }
        Command::Stop => {
            let reward = handle.stop_collect().await?;
            println!("Stopped. Final settlement:");
            print_reward(handle.content(), &reward);
        }
        Command::Claim => {
            let claim = handle.claim_rewards().await?;
            println!("Claimed:");
            print_reward(handle.content(), &claim.rewards);
            if claim.session_ended {
                println!("Session is over, start a new one with `collect`.");
            }
        }
        Command::Settle => {
            let report = handle.settle().await?;
            println!("Settled {:.2}h", report.hours);
            print_reward(handle.content(), &report.reward);
        }
        Command::Estimate => {
            let reward = handle.estimated_hourly_rewards().await?;
            println!("Per hour (average):");
            print_reward(handle.content(), &reward);
        }
        Command::Battle { enemy_id } => battle(handle, &enemy_id).await?,
        Command::Rest => {
            let player = handle.rest().await?;
            println!("{} rested: hp {}/{}", player.name, player.hp, player.max_hp);
        }
    }
    Ok(())
}

async fn battle(handle: &RuntimeHandle, enemy_id: &str) -> Result<()> {
    let mut notices = handle.subscribe(Topic::Battle);
    let battle = handle.start_battle(enemy_id).await?;

    let printer = tokio::spawn(async move {
        while let Ok(event) = notices.recv().await {
            match event {
                Event::Battle(BattleNotice::Combat(event)) => tracing::debug!("{:?}", event),
                Event::Battle(BattleNotice::Finished(_)) => break,
                _ => {}
            }
        }
    });

    let report = battle.join().await?;
    let _ = printer.await;

    println!(
        "{} after {:.1}s: dealt {}, took {}",
        report.phase,
        report.elapsed_ms as f64 / 1_000.0,
        report.damage_dealt,
        report.damage_taken
    );
    if !report.defeated_enemies.is_empty() {
        println!("Defeated: {}", report.defeated_enemies.join(", "));
    }
    for boss_id in &report.defeated_bosses {
        println!("Boss down: {}", boss_id);
    }
    if report.phase == BattlePhase::Defeat {
        println!("You are down. Run `idle rest` before the next battle.");
    }
    Ok(())
}

fn print_reward(content: &ContentBundle, reward: &Reward) {
    println!("  gold {:>8}", reward.gold);
    println!("  exp  {:>8}", reward.exp);
    if reward.enhance_currency > 0 {
        println!("  enhance currency {}", reward.enhance_currency);
    }
    for line in material_lines(reward, &content.items) {
        println!("  {} {} x{}", line.icon, line.name, line.quantity);
    }
}
