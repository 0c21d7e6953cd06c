use go_gtp::core::analyze;
use go_gtp::core::results::ResultStore;
use go_gtp::{GtpSession, LocalClient, LocalStorage, MatchConfig, MatchRunner, Policy, RandomPlayer};
use tempfile::TempDir;

fn engine(label: &str, name: &str, policy: Policy, seed: u64) -> LocalClient<RandomPlayer> {
    let player = RandomPlayer::new(name, "1.0", policy, Some(seed));
    LocalClient::new(label, GtpSession::new(player, 7).unwrap())
}

fn config(games: usize) -> MatchConfig {
    let mut config = MatchConfig::new("go-gtp --name Go1 --policy random", "go-gtp --name Go2");
    config.game.games = Some(games);
    config.game.alternate = Some(true);
    config.results.sgf_prefix = Some("go1-vs-go2".to_string());
    config
}

#[tokio::test]
async fn test_full_match_writes_table_and_sgf() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let runner = MatchRunner::new(LocalStorage::new(output_path.clone()), config(4));
    let mut go1 = engine("black", "Go1", Policy::Random, 1);
    let mut go2 = engine("white", "Go2", Policy::NoEyeFill, 2);

    let report = runner.run(&mut go1, &mut go2).await.unwrap();
    assert_eq!(report.first_game, 0);
    assert_eq!(report.games_played, 4);
    assert_eq!(report.errors, 0);

    let records = runner.store().records().await.unwrap();
    assert_eq!(records.len(), 4);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.game, i);
        assert_eq!(record.is_alternated(), i % 2 == 1);
        assert!(!record.has_error());
        assert!(record.length >= 2 && record.length <= 27);
        // 兩個程式都不支援 final_score
        assert_eq!(record.result_black, "?");
        assert!(temp_dir.path().join(format!("go1-vs-go2-{}.sgf", i)).exists());
    }

    let header = runner.store().header().await.unwrap();
    assert_eq!(header.get("Black").map(String::as_str), Some("Go1"));
    assert_eq!(header.get("White").map(String::as_str), Some("Go2"));
    assert_eq!(header.get("Size").map(String::as_str), Some("3"));

    let sgf = std::fs::read_to_string(temp_dir.path().join("go1-vs-go2-1.sgf")).unwrap();
    assert!(sgf.contains("SZ[3]KM[0]PB[Go2]PW[Go1]"));

    // 比賽結束後兩個引擎都收到 quit
    assert!(go1.session().quit_requested());
    assert!(go2.session().quit_requested());
}

#[tokio::test]
async fn test_match_continues_existing_table() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let first = MatchRunner::new(LocalStorage::new(output_path.clone()), config(2));
    first
        .run(&mut engine("black", "Go1", Policy::Random, 3), &mut engine("white", "Go2", Policy::Random, 4))
        .await
        .unwrap();

    let second = MatchRunner::new(LocalStorage::new(output_path.clone()), config(3));
    let report = second
        .run(&mut engine("black", "Go1", Policy::Random, 5), &mut engine("white", "Go2", Policy::Random, 6))
        .await
        .unwrap();
    assert_eq!(report.first_game, 2);
    assert_eq!(report.games_played, 1);
    assert_eq!(second.store().records().await.unwrap().len(), 3);

    let mut forced = config(1);
    forced.game.force = Some(true);
    let third = MatchRunner::new(LocalStorage::new(output_path), forced);
    let report = third
        .run(&mut engine("black", "Go1", Policy::Random, 7), &mut engine("white", "Go2", Policy::Random, 8))
        .await
        .unwrap();
    assert_eq!(report.first_game, 0);
    assert_eq!(third.store().records().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_analyze_writes_summary() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let runner = MatchRunner::new(LocalStorage::new(output_path.clone()), config(2));
    runner
        .run(&mut engine("black", "Go1", Policy::Random, 9), &mut engine("white", "Go2", Policy::Random, 10))
        .await
        .unwrap();

    let store = ResultStore::new(LocalStorage::new(output_path), "go1-vs-go2.dat");
    let analysis = analyze::analyze(&store).await.unwrap();
    assert_eq!(analysis.games, 2);
    assert_eq!(analysis.unknown, 2);
    assert_eq!(analysis.black.name, "Go1");

    let summary = std::fs::read_to_string(temp_dir.path().join("go1-vs-go2.dat.summary.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&summary).unwrap();
    assert_eq!(json["games"], 2);
    assert_eq!(json["white"]["name"], "Go2");
}
