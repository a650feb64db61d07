// The binary explains itself without configuration or network access

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn test_no_subcommand_shows_how_to_start() {
    let dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("pesajes").unwrap();

    cmd.current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("pesajes console"))
        .stdout(predicate::str::contains("/start"));
}

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = Command::cargo_bin("pesajes").unwrap();

    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("console"))
        .stdout(predicate::str::contains("init-config"))
        .stdout(predicate::str::contains("recent"));
}

#[test]
fn test_init_config_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();

    Command::cargo_bin("pesajes")
        .unwrap()
        .current_dir(dir.path())
        .args(["init-config", "--path", "pesajes.toml"])
        .assert()
        .success();
    assert!(dir.path().join("pesajes.toml").exists());

    Command::cargo_bin("pesajes")
        .unwrap()
        .current_dir(dir.path())
        .args(["init-config", "--path", "pesajes.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn test_console_session_registers_a_weighing() {
    let dir = TempDir::new().unwrap();
    let photo = dir.path().join("bascula.jpg");
    std::fs::write(&photo, [0xFF, 0xD8, 0xFF]).unwrap();

    let script = format!(
        "/start\n1234567890\nNHU982\n4\n1\n320,5\n1\n15000\n/foto {}\n1\n/salir\n",
        photo.display()
    );

    Command::cargo_bin("pesajes")
        .unwrap()
        .current_dir(dir.path())
        .env_remove("DATABASE_URL")
        .arg("console")
        .write_stdin(script)
        .assert()
        .success()
        .stdout(predicate::str::contains("NUEVO REGISTRO DE PESAJE"))
        .stdout(predicate::str::contains("✅ Registro completado"));

    let stored = std::fs::read_to_string(dir.path().join(".pesajes/pesajes.jsonl")).unwrap();
    assert_eq!(stored.lines().count(), 1);
    assert!(stored.contains("\"fuel_type\":\"diesel\""));

    Command::cargo_bin("pesajes")
        .unwrap()
        .current_dir(dir.path())
        .env_remove("DATABASE_URL")
        .arg("recent")
        .assert()
        .success()
        .stdout(predicate::str::contains("NHU982"));
}
