use game_core::{AccrualSave, CollectMode, CollectionState, PlayerState, Timestamp};
use runtime::{FileSaveRepository, GameSave, RepositoryError, SaveRepository};

fn sample_save() -> GameSave {
    let accrual = AccrualSave {
        state: CollectionState {
            is_collecting: true,
            started_at: Timestamp(1_714_521_600_000),
            last_settled_at: Timestamp(1_714_525_200_000),
            source_id: "robot_b".into(),
            mode: CollectMode::Gather,
            ..CollectionState::default()
        },
        daily_collect_hours: 1.0,
        last_collect_date: "2024-05-01".into(),
        defeated_bosses: vec!["iron_golem".into()],
        ..AccrualSave::default()
    };
    let player = PlayerState {
        name: "Ada".into(),
        hp: 120,
        ..PlayerState::default()
    };
    GameSave::new(accrual, player)
}

#[test]
fn file_repository_round_trip_and_listing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repo = FileSaveRepository::new(dir.path()).expect("repo");

    assert!(repo.load("main").expect("load").is_none());
    assert!(!repo.exists("main"));

    let save = sample_save();
    repo.save("main", &save).expect("save");
    repo.save("alt-2", &save).expect("save");

    let loaded = repo.load("main").expect("load").expect("present");
    assert_eq!(loaded.accrual.state.source_id, "robot_b");
    assert_eq!(loaded.accrual.defeated_bosses, vec!["iron_golem".to_string()]);
    assert_eq!(loaded.player.hp, 120);

    let mut profiles = repo.list_profiles().expect("list");
    profiles.sort();
    assert_eq!(profiles, vec!["alt-2".to_string(), "main".to_string()]);

    // No temp files linger after the rename.
    let leftovers = std::fs::read_dir(dir.path())
        .expect("read dir")
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().to_string_lossy().ends_with(".tmp"))
        .count();
    assert_eq!(leftovers, 0);

    repo.delete("alt-2").expect("delete");
    assert!(!repo.exists("alt-2"));
}

#[test]
fn bad_profile_names_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repo = FileSaveRepository::new(dir.path()).expect("repo");

    let result = repo.save("../escape", &sample_save());
    assert!(matches!(result, Err(RepositoryError::InvalidProfile(_))));
    assert!(!repo.exists("../escape"));
}

#[test]
fn unreadable_file_is_corrupted_but_bad_fields_are_not() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repo = FileSaveRepository::new(dir.path()).expect("repo");

    std::fs::write(dir.path().join("broken.json"), "{ not json").expect("write");
    assert!(matches!(
        repo.load("broken"),
        Err(RepositoryError::CorruptedData(_))
    ));

    // Valid JSON with one wrong field keeps everything else.
    std::fs::write(
        dir.path().join("patchy.json"),
        r#"{
            "version": 1,
            "accrual": {
                "dailyCollectHours": "lots",
                "lastCollectDate": "2024-05-01",
                "defeatedBosses": ["storm_hydra"]
            },
            "player": { "name": "Ada", "hp": 50 }
        }"#,
    )
    .expect("write");

    let save = repo.load("patchy").expect("load").expect("present");
    assert_eq!(save.accrual.daily_collect_hours, 0.0);
    assert_eq!(save.accrual.last_collect_date, "2024-05-01");
    assert_eq!(save.accrual.defeated_bosses, vec!["storm_hydra".to_string()]);
    assert_eq!(save.player.name, "Ada");
    assert_eq!(save.player.hp, 50);
}
