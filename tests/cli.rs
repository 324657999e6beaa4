#![forbid(unsafe_code)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn cli(agenda: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("planitrad-cli").unwrap();
    cmd.arg("--agenda").arg(agenda).arg("--today").arg("2026-09-07");
    cmd
}

#[test]
fn preview_prints_the_backward_plan() {
    let dir = tempdir().unwrap();
    let agenda = dir.path().join("agenda.json");

    cli(&agenda)
        .args(["add-translator", "--handle", "amelie", "--name", "Amélie"])
        .assert()
        .success();

    cli(&agenda)
        .args([
            "preview", "--handle", "amelie", "--hours", "14", "--due", "2026-09-11",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("2026-09-09 | 7.00h"))
        .stdout(predicate::str::contains("2026-09-10 | 7.00h"))
        .stdout(predicate::str::contains("total: 14.00h"));
}

#[test]
fn commit_persists_reservations_into_the_agenda_file() {
    let dir = tempdir().unwrap();
    let agenda = dir.path().join("agenda.json");

    cli(&agenda)
        .args(["add-translator", "--handle", "amelie", "--name", "Amélie"])
        .assert()
        .success();

    cli(&agenda)
        .args([
            "commit", "--handle", "amelie", "--hours", "7", "--due", "2026-09-11",
        ])
        .assert()
        .success();

    cli(&agenda)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("2026-09-10"))
        .stdout(predicate::str::contains("7.00h"));
}

#[test]
fn infeasible_allocation_fails_the_command() {
    let dir = tempdir().unwrap();
    let agenda = dir.path().join("agenda.json");

    cli(&agenda)
        .args(["add-translator", "--handle", "amelie", "--name", "Amélie"])
        .assert()
        .success();

    // 20 h d'ici mardi soir : 14 h disponibles au mieux.
    cli(&agenda)
        .args([
            "commit", "--handle", "amelie", "--hours", "20", "--due", "2026-09-08T17:00",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("infeasible"));
}

#[test]
fn check_reports_conflicts_with_exit_code_two() {
    let dir = tempdir().unwrap();
    let agenda = dir.path().join("agenda.json");

    cli(&agenda)
        .args(["add-translator", "--handle", "amelie", "--name", "Amélie"])
        .assert()
        .success();

    // Deux blocages jour entier le même jour : surallocation garantie.
    for _ in 0..2 {
        cli(&agenda)
            .args([
                "add-blockage", "--handle", "amelie", "--date", "2026-09-07",
                "--reason", "congé",
            ])
            .assert()
            .success();
    }

    cli(&agenda)
        .arg("check")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("surallocation"));
}

#[test]
fn check_is_quiet_on_a_clean_agenda() {
    let dir = tempdir().unwrap();
    let agenda = dir.path().join("agenda.json");

    cli(&agenda)
        .args(["add-translator", "--handle", "amelie", "--name", "Amélie"])
        .assert()
        .success();

    cli(&agenda)
        .args([
            "commit", "--handle", "amelie", "--hours", "10", "--due", "2026-09-11T17:00",
            "--mode", "forward",
        ])
        .assert()
        .success();

    cli(&agenda)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("OK: no conflicts"));
}

#[test]
fn corrupt_agenda_file_aborts_instead_of_resetting() {
    let dir = tempdir().unwrap();
    let agenda = dir.path().join("agenda.json");
    std::fs::write(&agenda, "{ pas du json").unwrap();

    cli(&agenda)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("parsing agenda"));

    // Le fichier corrompu est laissé intact pour inspection.
    assert_eq!(std::fs::read_to_string(&agenda).unwrap(), "{ pas du json");
}
