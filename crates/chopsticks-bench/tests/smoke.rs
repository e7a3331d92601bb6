use std::fs;
use std::path::Path;

use chopsticks_bench::config::BenchmarkConfig;
use chopsticks_bench::tournament::TournamentRunner;
use sha2::{Digest, Sha256};
use tempfile::tempdir;

fn load_config(output_dir: &Path) -> BenchmarkConfig {
    let yaml = format!(
        r#"
run_id: "test_smoke"
games:
  seed: 4242
  count: 3
  permutations: 2
  max_turns: 120
agents:
  - name: "hard"
    kind: "computer"
    params:
      difficulty: "hard"
  - name: "blend"
    kind: "computer"
    params:
      difficulty: -0.5
  - name: "random"
    kind: "computer"
    params:
      difficulty: "random"
outputs:
  jsonl: "{jsonl}"
  summary_md: "{summary}"
logging:
  enable_structured: false
"#,
        jsonl = output_dir.join("games.jsonl").display(),
        summary = output_dir.join("summary.md").display(),
    );

    let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("valid yaml");
    cfg.validate().expect("config validates");
    cfg
}

/// Runs a tournament into `dir` and hashes its JSONL with timings zeroed.
fn run_and_digest(dir: &Path) -> (String, Vec<serde_json::Value>) {
    let config = load_config(dir);
    let outputs = config.resolved_outputs();
    let runner = TournamentRunner::new(config, outputs).expect("runner created");
    let summary = runner.run().expect("tournament completes");

    assert_eq!(summary.games_played, 3);
    assert_eq!(summary.permutations, 2);
    assert_eq!(summary.rows_written, 3 * 2 * 3);
    assert!(summary.summary_path.exists(), "summary markdown missing");
    assert!(summary.telemetry_path.is_none());

    let jsonl = fs::read_to_string(&summary.jsonl_path).expect("jsonl readable");
    let mut normalized = String::new();
    let mut rows = Vec::new();
    for line in jsonl.lines() {
        let mut value: serde_json::Value = serde_json::from_str(line).expect("row decodes to JSON");
        if let Some(speed) = value.get_mut("speed_ms_turn") {
            *speed = serde_json::Value::from(0.0);
        }
        normalized.push_str(&serde_json::to_string(&value).expect("re-serialize normalized row"));
        normalized.push('\n');
        rows.push(value);
    }

    let digest = Sha256::digest(normalized.as_bytes());
    (hex::encode(digest), rows)
}

#[test]
fn identical_configs_produce_identical_jsonl() {
    let first_dir = tempdir().expect("temp dir");
    let second_dir = tempdir().expect("temp dir");

    let (first, rows) = run_and_digest(first_dir.path());
    let (second, _) = run_and_digest(second_dir.path());
    assert_eq!(first, second, "tournament output is not reproducible");

    // Every game has exactly one winner unless it ran into the turn limit.
    for game in rows.chunks(3) {
        let winners = game.iter().filter(|row| row["finish"] == "won").count();
        match game[0]["end_reason"].as_str() {
            Some("last_player_standing") => {
                assert_eq!(winners, 1);
                let eliminated = game.iter().filter(|row| row["finish"] == "eliminated").count();
                assert_eq!(eliminated, 2);
            }
            Some("turn_limit") => {
                assert_eq!(winners, 0);
                assert_eq!(game[0]["turns"], 120);
            }
            other => panic!("unexpected end reason {other:?}"),
        }
    }
}

#[test]
fn summary_lists_every_agent() {
    let dir = tempdir().expect("temp dir");
    let (_, _) = run_and_digest(dir.path());
    let markdown = fs::read_to_string(dir.path().join("summary.md")).expect("summary readable");
    assert!(markdown.starts_with("# Tournament Summary"));
    for agent in ["hard", "blend", "random"] {
        assert!(markdown.contains(&format!("| {agent} |")), "missing {agent}");
    }
}
