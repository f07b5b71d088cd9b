use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn setup_test_env() -> (TempDir, std::sync::MutexGuard<'static, ()>) {
    let guard = test_env::lock_test_env();
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let config_dir = temp_dir.path().join(".ripl");
    fs::create_dir_all(&config_dir).unwrap();
    let config_file = config_dir.join("rc");
    fs::write(&config_file, format!("data.location={}\n", db_path.display())).unwrap();
    std::env::set_var("HOME", temp_dir.path().to_str().unwrap());
    (temp_dir, guard)
}

fn ripl_cmd(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ripl").unwrap();
    cmd.env("HOME", temp_dir.path());
    cmd
}

fn stages_stdout(temp_dir: &TempDir) -> String {
    let output = ripl_cmd(temp_dir).args(["stages", "list"]).assert().success();
    String::from_utf8(output.get_output().stdout.clone()).unwrap()
}

#[test]
fn test_default_stages_bootstrap() {
    let (temp_dir, _guard) = setup_test_env();

    let stdout = stages_stdout(&temp_dir);
    for key in [
        "applied",
        "screening",
        "phone-interview",
        "interview",
        "assessment",
        "offer",
        "hired",
        "rejected",
    ] {
        assert!(stdout.contains(key), "default stages should include '{}'", key);
    }

    // Fixed placement: applied first, hired and rejected trailing
    let applied = stdout.find("applied").unwrap();
    let hired = stdout.find("hired").unwrap();
    let rejected = stdout.find("rejected").unwrap();
    assert!(applied < hired && hired < rejected);

    drop(temp_dir);
}

#[test]
fn test_stage_add_lands_before_hired() {
    let (temp_dir, _guard) = setup_test_env();

    ripl_cmd(&temp_dir)
        .args(["stages", "add", "Team", "Fit"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Added stage 'Team Fit'"));

    let stdout = stages_stdout(&temp_dir);
    let team_fit = stdout.find("team-fit").expect("new stage should be listed");
    let hired = stdout.find("hired").unwrap();
    let offer = stdout.find("offer").unwrap();
    assert!(offer < team_fit && team_fit < hired);

    drop(temp_dir);
}

#[test]
fn test_stage_add_persists_across_invocations() {
    let (temp_dir, _guard) = setup_test_env();

    ripl_cmd(&temp_dir)
        .args(["stages", "add", "Reference", "Check"])
        .assert()
        .success();

    // Fresh process, fresh registry load from the database
    let stdout = stages_stdout(&temp_dir);
    assert!(stdout.contains("reference-check"));

    drop(temp_dir);
}

#[test]
fn test_duplicate_stage_add_is_refused() {
    let (temp_dir, _guard) = setup_test_env();

    let before = stages_stdout(&temp_dir);

    ripl_cmd(&temp_dir)
        .args(["stages", "add", "Screening"])
        .assert()
        .success()
        .stdout(predicates::str::contains("already exists"));

    assert_eq!(stages_stdout(&temp_dir), before, "config must be unchanged");

    drop(temp_dir);
}

#[test]
fn test_remove_fixed_stage_is_refused() {
    let (temp_dir, _guard) = setup_test_env();

    for key in ["applied", "hired", "rejected"] {
        ripl_cmd(&temp_dir)
            .args(["stages", "remove", key])
            .assert()
            .failure()
            .stderr(predicates::str::contains("fixed"));
    }

    drop(temp_dir);
}

#[test]
fn test_remove_unknown_stage_is_refused() {
    let (temp_dir, _guard) = setup_test_env();

    ripl_cmd(&temp_dir)
        .args(["stages", "remove", "nope"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("No stage with key 'nope'"));

    drop(temp_dir);
}

#[test]
fn test_remove_empty_stage_commits_without_confirmation() {
    let (temp_dir, _guard) = setup_test_env();

    ripl_cmd(&temp_dir)
        .args(["stages", "remove", "assessment"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Removed stage 'assessment'"));

    assert!(!stages_stdout(&temp_dir).contains("assessment"));

    drop(temp_dir);
}

#[test]
fn test_destructive_remove_requires_confirmation() {
    let (temp_dir, _guard) = setup_test_env();

    ripl_cmd(&temp_dir).args(["add", "Ada", "Lovelace"]).assert().success();
    ripl_cmd(&temp_dir).args(["move", "1", "screening"]).assert().success();

    // Declining leaves the configuration and the candidate untouched
    ripl_cmd(&temp_dir)
        .args(["stages", "remove", "screening"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicates::str::contains("Cancelled"));
    assert!(stages_stdout(&temp_dir).contains("screening"));

    // Confirming commits and migrates the candidate back to Applied
    ripl_cmd(&temp_dir)
        .args(["stages", "remove", "screening", "--yes"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Moved 1 candidate(s) back to Applied"));
    assert!(!stages_stdout(&temp_dir).contains("screening"));

    let output = ripl_cmd(&temp_dir).args(["show", "1"]).assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("applied"));

    drop(temp_dir);
}

#[test]
fn test_stage_move_range_enforcement() {
    let (temp_dir, _guard) = setup_test_env();

    // First movable stage cannot go further up
    ripl_cmd(&temp_dir)
        .args(["stages", "move", "1", "up"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("editable range"));

    // Fixed stages never move
    ripl_cmd(&temp_dir)
        .args(["stages", "move", "0", "down"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("fixed"));

    // A middle stage swaps with its neighbor
    let output = ripl_cmd(&temp_dir)
        .args(["stages", "move", "2", "up"])
        .assert()
        .success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let phone = stdout.find("phone-interview").unwrap();
    let screening = stdout.find("screening").unwrap();
    assert!(phone < screening, "phone-interview should now precede screening");

    drop(temp_dir);
}

#[test]
fn test_stage_move_invalid_direction() {
    let (temp_dir, _guard) = setup_test_env();

    ripl_cmd(&temp_dir)
        .args(["stages", "move", "2", "sideways"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("Invalid direction"));

    drop(temp_dir);
}

#[test]
fn test_stages_reset_restores_defaults() {
    let (temp_dir, _guard) = setup_test_env();

    ripl_cmd(&temp_dir).args(["stages", "add", "Extra"]).assert().success();
    ripl_cmd(&temp_dir).args(["stages", "remove", "assessment"]).assert().success();

    ripl_cmd(&temp_dir)
        .args(["stages", "reset", "--yes"])
        .assert()
        .success()
        .stdout(predicates::str::contains("reset to defaults"));

    let stdout = stages_stdout(&temp_dir);
    assert!(stdout.contains("assessment"));
    assert!(!stdout.contains("extra"));

    drop(temp_dir);
}

#[test]
fn test_stages_list_json() {
    let (temp_dir, _guard) = setup_test_env();

    let output = ripl_cmd(&temp_dir)
        .args(["stages", "list", "--json"])
        .assert()
        .success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let stages = parsed.as_array().unwrap();
    assert_eq!(stages.len(), 8);
    assert_eq!(stages[0]["key"], "applied");

    drop(temp_dir);
}
