//! CLI integration tests for roster
//!
//! Runs the roster binary end-to-end using assert_cmd, each test against its
//! own database file and config directory.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Isolated database and config location for one test
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Roster command pointed at this sandbox
    #[allow(deprecated)]
    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("roster").unwrap();
        cmd.env("ROSTER_CONFIG_DIR", self.dir.path().join("config"));
        cmd.env_remove("RUST_LOG");
        cmd.arg("--db").arg(self.dir.path().join("roster.db"));
        cmd
    }

    fn run_json(&self, args: &[&str]) -> serde_json::Value {
        let output = self
            .cmd()
            .args(args)
            .args(["--format", "json"])
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "command {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }

    /// teamA: member1 (10), member2 (20); teamB: member3 (30), member4 (40)
    fn seed(&self) {
        let team_a = self.run_json(&["team", "add", "teamA"])["id"].to_string();
        let team_b = self.run_json(&["team", "add", "teamB"])["id"].to_string();

        for (name, age, team) in [
            ("member1", "10", &team_a),
            ("member2", "20", &team_a),
            ("member3", "30", &team_b),
            ("member4", "40", &team_b),
        ] {
            self.run_json(&["member", "add", name, "--age", age, "--team", team.as_str()]);
        }
    }
}

fn usernames(rows: &serde_json::Value) -> Vec<String> {
    rows.as_array()
        .unwrap()
        .iter()
        .map(|row| row["username"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_help_lists_commands() {
    Sandbox::new()
        .cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("member"))
        .stdout(predicate::str::contains("team"));
}

#[test]
fn test_team_and_member_text_output() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["team", "add", "teamA"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Team created: teamA"));

    sandbox
        .cmd()
        .args(["member", "add", "member1", "--age", "10", "--team", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Member created: member1"));

    sandbox
        .cmd()
        .args(["team", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Team: teamA"))
        .stdout(predicate::str::contains("Members: 1"));
}

#[test]
fn test_member_add_with_unknown_team_fails() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["member", "add", "ghost", "--team", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Team 42 not found"));
}

#[test]
fn test_member_show_missing_fails() {
    Sandbox::new()
        .cmd()
        .args(["member", "show", "7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Member 7 not found"));
}

#[test]
fn test_search_by_team_and_age_range() {
    let sandbox = Sandbox::new();
    sandbox.seed();

    let rows = sandbox.run_json(&[
        "search",
        "--team",
        "teamB",
        "--age-goe",
        "35",
        "--age-loe",
        "40",
    ]);

    assert_eq!(usernames(&rows), vec!["member4"]);
    assert_eq!(rows[0]["team_name"], "teamB");
}

#[test]
fn test_search_page_sorted_by_username() {
    let sandbox = Sandbox::new();
    sandbox.seed();

    let page = sandbox.run_json(&[
        "search", "--offset", "1", "--limit", "2", "--sort", "username",
    ]);

    assert_eq!(usernames(&page["items"]), vec!["member2", "member3"]);
    assert_eq!(page["total"], 4);
    assert_eq!(page["offset"], 1);
    assert_eq!(page["limit"], 2);
}

#[test]
fn test_search_page_with_forced_count() {
    let sandbox = Sandbox::new();
    sandbox.seed();

    let page = sandbox.run_json(&["search", "--limit", "10", "--forced-count"]);
    assert_eq!(page["items"].as_array().unwrap().len(), 4);
    assert_eq!(page["total"], 4);
}

#[test]
fn test_teamless_member_has_null_team_fields() {
    let sandbox = Sandbox::new();
    sandbox.seed();
    sandbox.run_json(&["member", "move", "1"]);

    let rows = sandbox.run_json(&["search", "--username", "member1"]);
    assert_eq!(usernames(&rows), vec!["member1"]);
    assert!(rows[0]["team_id"].is_null());
    assert!(rows[0]["team_name"].is_null());

    let rows = sandbox.run_json(&["search", "--team", "teamA"]);
    assert_eq!(usernames(&rows), vec!["member2"]);
}

#[test]
fn test_search_rejects_invalid_page() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["search", "--offset", "-1", "--limit", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid argument"));

    sandbox
        .cmd()
        .args(["search", "--limit", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid argument"));
}

#[test]
fn test_search_rejects_unknown_sort_key() {
    Sandbox::new()
        .cmd()
        .args(["search", "--sort", "height"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown sort key"));
}

#[test]
fn test_config_set_get_and_reset() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["config", "set", "search.default_limit", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set search.default_limit = 2"));

    sandbox
        .cmd()
        .args(["config", "get", "search.default_limit"])
        .assert()
        .success()
        .stdout(predicate::str::diff("2\n"));

    sandbox
        .cmd()
        .args(["config", "reset"])
        .assert()
        .success();

    sandbox
        .cmd()
        .args(["config", "get", "search.default_limit"])
        .assert()
        .success()
        .stdout(predicate::str::diff("20\n"));
}

#[test]
fn test_config_default_limit_applies_to_pages() {
    let sandbox = Sandbox::new();
    sandbox.seed();

    sandbox
        .cmd()
        .args(["config", "set", "search.default_limit", "3"])
        .assert()
        .success();

    let page = sandbox.run_json(&["search", "--offset", "0"]);
    assert_eq!(page["items"].as_array().unwrap().len(), 3);
    assert_eq!(page["limit"], 3);
    assert_eq!(page["total"], 4);
}

#[test]
fn test_config_rejects_unknown_key() {
    Sandbox::new()
        .cmd()
        .args(["config", "set", "search.colour", "blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}

#[test]
fn test_doctor_reports_schema() {
    let sandbox = Sandbox::new();

    let report = sandbox.run_json(&["doctor"]);
    assert_eq!(report["needs_migration"], false);
    assert_eq!(report["members"], 0);
}
