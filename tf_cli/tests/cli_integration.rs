//! End-to-end tests for the tf_cli binary
//!
//! Each test writes its inputs to a temp dir, runs the built binary and
//! inspects the JSON it produces.

#[cfg(test)]
mod cli_tests {
    use serde_json::Value;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::process::{Command, Output};
    use tempfile::TempDir;

    const TEAMS: &str = r#"[
        {"id": "north", "name": "North FC"},
        {"id": "south", "name": "South FC"},
        {"id": "east", "name": "East FC"},
        {"id": "west", "name": "West FC"}
    ]"#;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn run(args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_tf_cli"))
            .args(args)
            .env("RUST_LOG", "warn")
            .env_remove("TF_SEED")
            .output()
            .unwrap()
    }

    fn json(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    fn generate_league(dir: &Path) -> PathBuf {
        let teams = write(dir, "teams.json", TEAMS);
        let config = write(dir, "config.json", r#"{"phase_type": "league", "rounds": 2}"#);
        let fixtures = dir.join("fixtures.json");

        let output = run(&[
            "generate",
            "--teams",
            teams.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
            "--seed",
            "9",
            "--output",
            fixtures.to_str().unwrap(),
        ]);
        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
        fixtures
    }

    #[test]
    fn test_help() {
        let output = run(&["--help"]);
        assert!(output.status.success());
        let text = String::from_utf8_lossy(&output.stdout);
        assert!(text.contains("generate"));
        assert!(text.contains("standings"));
    }

    #[test]
    fn test_unknown_command_fails() {
        let output = run(&["shuffle"]);
        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("unknown command"));
    }

    #[test]
    fn test_generate_double_round_robin() {
        let dir = TempDir::new().unwrap();
        let fixtures = json(&generate_league(dir.path()));

        assert_eq!(fixtures["success"], Value::Bool(true));
        assert_eq!(fixtures["matches"].as_array().unwrap().len(), 12);
        assert_eq!(fixtures["metadata"]["total_rounds"], 6);
        assert_eq!(fixtures["matches"][0]["id"], "r1-l1-m1");
    }

    #[test]
    fn test_generate_knockout_rejects_three_teams() {
        let dir = TempDir::new().unwrap();
        let teams = write(
            dir.path(),
            "teams.json",
            r#"[{"id": "a", "name": "A"}, {"id": "b", "name": "B"}, {"id": "c", "name": "C"}]"#,
        );
        let config = write(dir.path(), "config.json", r#"{"phase_type": "knockout"}"#);

        let output = run(&[
            "generate",
            "--teams",
            teams.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ]);
        assert!(!output.status.success());

        let result: Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(result["success"], Value::Bool(false));
        assert!(result["matches"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_standings_after_results() {
        let dir = TempDir::new().unwrap();
        let fixtures = generate_league(dir.path());
        let generated = json(&fixtures);
        let first = &generated["matches"][0];
        let home = first["home_team_id"].as_str().unwrap().to_string();

        let results = write(
            dir.path(),
            "results.json",
            r#"[
                {"match_id": "r1-l1-m1", "home_score": 4, "away_score": 0, "status": "completed"},
                {"match_id": "r1-l1-m2", "home_score": 1, "away_score": 1, "status": "completed"}
            ]"#,
        );
        let table_path = dir.path().join("table.json");

        let output = run(&[
            "standings",
            "--fixtures",
            fixtures.to_str().unwrap(),
            "--results",
            results.to_str().unwrap(),
            "--teams",
            dir.path().join("teams.json").to_str().unwrap(),
            "--phase",
            "spring",
            "--output",
            table_path.to_str().unwrap(),
        ]);
        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

        let report = json(&table_path);
        assert_eq!(report["phase_id"], "spring");
        assert_eq!(report["results_recorded"], 2);
        let table = report["tables"][0]["standings"].as_array().unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table[0]["team_id"], home.as_str());
        assert_eq!(table[0]["points"], 3);
        assert_eq!(table[0]["goal_difference"], 4);
        assert_eq!(table[3]["position"], 4);
    }

    #[test]
    fn test_validate_reports_errors() {
        let dir = TempDir::new().unwrap();
        let plan = write(
            dir.path(),
            "plan.json",
            r#"{
                "tournament": {"name": "Cup", "start_date": "2025-09-01", "end_date": "2025-08-01"},
                "phases": [
                    {"id": "p1", "name": "League", "phase_type": "league", "phase_order": 1,
                     "participants": ["a", "b", "c", "d"]},
                    {"id": "p2", "name": "Playoffs", "phase_type": "knockout", "phase_order": 1,
                     "participants": ["a", "b"]}
                ]
            }"#,
        );

        let output = run(&["validate", "--tournament", plan.to_str().unwrap()]);
        assert!(!output.status.success());

        let result: Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(result["is_valid"], Value::Bool(false));
        let codes: Vec<&str> = result["errors"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|issue| issue["code"].as_str())
            .collect();
        assert!(codes.contains(&"INVALID_DATE_RANGE"));
        assert!(codes.contains(&"DUPLICATE_PHASE_ORDER"));
    }
}
