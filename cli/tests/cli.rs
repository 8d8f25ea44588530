use assert_cmd::Command;
use predicates::prelude::*;

fn scout(dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("scout").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("ANTHROPIC_API_KEY")
        .env_remove("OPENAI_API_KEY")
        .env_remove("SCOUT_PROTOCOL")
        .env_remove("SCOUT_MODEL")
        .env_remove("SCOUT_BASE_URL")
        .env("XDG_CONFIG_HOME", dir.path().join("xdg"));
    cmd
}

#[test]
fn test_tools_needs_no_credentials() {
    let dir = tempfile::tempdir().unwrap();
    scout(&dir)
        .arg("tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("search_events"))
        .stdout(predicate::str::contains("search_news"))
        .stdout(predicate::str::contains("filter_by_budget"))
        .stdout(predicate::str::contains("save_results"))
        .stdout(predicate::str::contains("Find free jazz this weekend"));
}

#[test]
fn test_missing_credential_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("scout.json");
    std::fs::write(&config, r#"{"protocol": "anthropic"}"#).unwrap();

    scout(&dir)
        .args(["run", "--type", "events", "--interests", "jazz", "--no-save"])
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing credential"));

    assert!(!dir.path().read_dir().unwrap().any(|entry| entry
        .unwrap()
        .file_name()
        .to_string_lossy()
        .ends_with(".txt")));
}

#[test]
fn test_serve_refuses_to_start_without_credential() {
    let dir = tempfile::tempdir().unwrap();
    scout(&dir)
        .args(["serve", "--bind", "127.0.0.1:0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ANTHROPIC_API_KEY"));
}

#[test]
fn test_invalid_query_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    scout(&dir)
        .args(["run", "--type", "news", "--api-key", "sk-test"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("please enter a news topic"));
}
