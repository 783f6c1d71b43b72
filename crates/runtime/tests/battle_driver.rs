use game_content::{ContentBundle, ContentFactory};
use game_core::{BattlePhase, CollectMode, ErrorKind, UnitTemplate};
use runtime::{
    AccrualEvent, BattleNotice, Event, FileSaveRepository, InMemorySaveRepo, Runtime,
    RuntimeConfig, RuntimeError, SaveRepository, Topic,
};

fn paper_tiger() -> UnitTemplate {
    UnitTemplate {
        id: "paper_tiger".into(),
        name: "Paper Tiger".into(),
        hp: 30,
        attack: 1,
        defense: 0,
        speed: 0.5,
        crit_rate: 0,
        crit_damage: 0,
        guard: None,
        is_boss: true,
    }
}

fn training_wall() -> UnitTemplate {
    UnitTemplate {
        id: "training_wall".into(),
        name: "Training Wall".into(),
        hp: 1_000_000,
        attack: 0,
        defense: 0,
        speed: 0.1,
        crit_rate: 0,
        crit_damage: 0,
        guard: None,
        is_boss: false,
    }
}

fn crusher() -> UnitTemplate {
    UnitTemplate {
        id: "crusher".into(),
        name: "Crusher".into(),
        hp: 1_000_000,
        attack: 100_000,
        defense: 0,
        speed: 5.0,
        crit_rate: 0,
        crit_damage: 0,
        guard: None,
        is_boss: false,
    }
}

fn content() -> ContentBundle {
    let mut content = ContentFactory::bundled().load_all().expect("bundled content");
    content.enemies.push(paper_tiger());
    content.enemies.push(training_wall());
    content.enemies.push(crusher());
    content
}

async fn start_runtime() -> Runtime {
    start_runtime_with(content()).await
}

async fn start_runtime_with(content: ContentBundle) -> Runtime {
    start_runtime_on(content, InMemorySaveRepo::new()).await
}

async fn start_runtime_on(
    content: ContentBundle,
    repository: impl SaveRepository + 'static,
) -> Runtime {
    let config = RuntimeConfig {
        seed: Some(1234),
        tick_interval_ms: 24 * 3_600_000,
        ..RuntimeConfig::default()
    };
    Runtime::builder()
        .config(config)
        .content(content)
        .repository(repository)
        .build()
        .await
        .expect("runtime builds")
}

#[tokio::test(start_paused = true)]
async fn crew_beats_rust_rat() {
    let runtime = start_runtime().await;
    let handle = runtime.handle();
    let mut notices = handle.subscribe(Topic::Battle);

    let battle = handle.start_battle("rust_rat").await.expect("battle starts");
    assert_eq!(battle.enemy_id(), "rust_rat");
    let report = battle.join().await.expect("battle ends");

    assert_eq!(report.phase, BattlePhase::Victory);
    assert!(report.defeated_enemies.contains(&"rust_rat".to_string()));
    assert!(report.defeated_bosses.is_empty());
    assert!(report.damage_dealt >= 80);

    // ================================================================
    // Player is back with the session worker
    // ================================================================
    let player = handle.player().await.expect("query").expect("player returned");
    assert!(player.hp > 0 && player.hp <= player.max_hp);

    let mut started = false;
    let mut finished = None;
    while let Ok(event) = notices.try_recv() {
        match event {
            Event::Battle(BattleNotice::Started { enemy_id, is_boss }) => {
                assert_eq!(enemy_id, "rust_rat");
                assert!(!is_boss);
                started = true;
            }
            Event::Battle(BattleNotice::Finished(report)) => finished = Some(report.phase),
            _ => {}
        }
    }
    assert!(started);
    assert_eq!(finished, Some(BattlePhase::Victory));

    runtime.shutdown().await.expect("shuts down");
}

#[tokio::test(start_paused = true)]
async fn boss_victory_raises_multiplier() {
    let runtime = start_runtime().await;
    let handle = runtime.handle();
    let mut accrual = handle.subscribe(Topic::Accrual);

    assert_eq!(handle.status().await.expect("status").boss_multiplier, 1.0);

    let report = handle
        .start_battle("paper_tiger")
        .await
        .expect("battle starts")
        .join()
        .await
        .expect("battle ends");
    assert_eq!(report.phase, BattlePhase::Victory);
    assert_eq!(report.defeated_bosses, vec!["paper_tiger".to_string()]);

    let status = handle.status().await.expect("status");
    assert!((status.boss_multiplier - 1.2).abs() < 1e-9);

    let recorded = std::iter::from_fn(|| accrual.try_recv().ok()).any(|event| {
        matches!(
            event,
            Event::Accrual(AccrualEvent::BossRecorded { ref boss_id, .. }) if boss_id == "paper_tiger"
        )
    });
    assert!(recorded);

    // A repeat kill of the same boss does not stack.
    let report = handle
        .start_battle("paper_tiger")
        .await
        .expect("battle starts")
        .join()
        .await
        .expect("battle ends");
    assert_eq!(report.phase, BattlePhase::Victory);
    let status = handle.status().await.expect("status");
    assert!((status.boss_multiplier - 1.2).abs() < 1e-9);

    runtime.shutdown().await.expect("shuts down");
}

#[tokio::test(start_paused = true)]
async fn escape_and_single_battle_rule() {
    let mut content = content();
    content.player.auto_combat = false;
    let runtime = start_runtime_with(content).await;
    let handle = runtime.handle();

    let battle = handle.start_battle("training_wall").await.expect("battle starts");

    // ================================================================
    // Only one battle at a time, and the player is checked out
    // ================================================================
    let second = handle.start_battle("rust_rat").await;
    assert!(matches!(second, Err(RuntimeError::BattleInProgress)));
    assert!(handle.player().await.expect("query").is_none());

    // ================================================================
    // Manual skill casts go through the cooldown gate
    // ================================================================
    battle.cast_skill("power_strike").await.expect("first cast");
    let again = battle.cast_skill("power_strike").await;
    assert!(matches!(again, Err(RuntimeError::Skill(_))));
    let unknown = battle.cast_skill("meteor").await;
    assert!(matches!(unknown, Err(RuntimeError::Skill(_))));

    battle.escape().await.expect("escape accepted");
    let report = battle.join().await.expect("battle ends");
    assert_eq!(report.phase, BattlePhase::Escaped);
    assert!(report.defeated_enemies.is_empty());

    let player = handle.player().await.expect("query").expect("player returned");
    assert!(player.hp > 0);

    runtime.shutdown().await.expect("shuts down");
}

#[tokio::test(start_paused = true)]
async fn unknown_enemy_is_rejected() {
    let runtime = start_runtime().await;
    let handle = runtime.handle();

    let result = handle.start_battle("dragon").await;
    assert!(matches!(
        result,
        Err(RuntimeError::UnknownEnemy { ref enemy_id }) if enemy_id == "dragon"
    ));
    assert!(handle.player().await.expect("query").is_some());

    runtime.shutdown().await.expect("shuts down");
}

#[tokio::test(start_paused = true)]
async fn save_and_shutdown_mid_battle_keep_progress() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut content = content();
    content.player.auto_combat = false;

    let repository = FileSaveRepository::new(dir.path()).expect("repo");
    let runtime = start_runtime_on(content.clone(), repository).await;
    let handle = runtime.handle();
    handle
        .start_collect("robot_a", CollectMode::Gather)
        .await
        .expect("starts");
    let battle = handle.start_battle("training_wall").await.expect("battle starts");

    // ================================================================
    // An explicit save while the battle runs writes the pre-battle player
    // ================================================================
    handle.save().await.expect("saves mid-battle");
    let saved = FileSaveRepository::new(dir.path())
        .expect("repo")
        .load("default")
        .expect("readable")
        .expect("save written");
    assert!(saved.accrual.state.is_collecting);
    assert_eq!(saved.accrual.state.source_id, "robot_a");
    assert_eq!(saved.player.hp, saved.player.max_hp);

    // ================================================================
    // Shutting down with the battle still open keeps the session
    // ================================================================
    runtime.shutdown().await.expect("shuts down mid-battle");
    drop(battle);

    let repository = FileSaveRepository::new(dir.path()).expect("repo");
    let runtime = start_runtime_on(content, repository).await;
    let handle = runtime.handle();
    let status = handle.status().await.expect("status");
    assert!(status.is_collecting);
    assert_eq!(status.source_id.as_deref(), Some("robot_a"));
    let player = handle.player().await.expect("query").expect("player restored");
    assert_eq!(player.hp, player.max_hp);

    runtime.shutdown().await.expect("shuts down");
}

#[tokio::test(start_paused = true)]
async fn downed_player_must_rest_before_fighting() {
    let runtime = start_runtime().await;
    let handle = runtime.handle();

    let report = handle
        .start_battle("crusher")
        .await
        .expect("battle starts")
        .join()
        .await
        .expect("battle ends");
    assert_eq!(report.phase, BattlePhase::Defeat);
    let player = handle.player().await.expect("query").expect("player returned");
    assert_eq!(player.hp, 0);

    let err = handle.start_battle("rust_rat").await.unwrap_err();
    assert!(matches!(err, RuntimeError::PlayerDown));
    assert_eq!(err.kind(), Some(ErrorKind::PreconditionFailed));

    let rested = handle.rest().await.expect("rests");
    assert_eq!(rested.hp, rested.max_hp);

    let report = handle
        .start_battle("rust_rat")
        .await
        .expect("battle starts after rest")
        .join()
        .await
        .expect("battle ends");
    assert_eq!(report.phase, BattlePhase::Victory);

    runtime.shutdown().await.expect("shuts down");
}
