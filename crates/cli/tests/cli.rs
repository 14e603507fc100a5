use assert_cmd::Command;

fn bookshelf() -> Command {
    let mut cmd = Command::cargo_bin("bookshelf").unwrap();
    cmd.env("BOOKSHELF_CONFIG_DIR", std::env::temp_dir().join("bookshelf-cli-no-config"))
        .env_remove("BOOKSHELF_ENV");
    cmd
}

#[test]
fn help_lists_subcommands() {
    let output = bookshelf().arg("--help").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("serve"));
    assert!(stdout.contains("config"));
}

#[test]
fn config_prints_resolved_settings() {
    let output = bookshelf()
        .arg("config")
        .env("BOOKSHELF_SERVER__PORT", "9191")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("port: 9191"));
    assert!(stdout.contains("Local"));
}

#[test]
fn unknown_environment_fails_fast() {
    bookshelf()
        .arg("config")
        .env("BOOKSHELF_ENV", "qa")
        .assert()
        .failure();
}
