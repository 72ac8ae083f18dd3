use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_mediadiary"))
}

struct Env {
    root: TempDir,
}

impl Env {
    fn new() -> Self {
        Self {
            root: tempfile::tempdir().expect("tempdir"),
        }
    }

    fn config_home(&self) -> PathBuf {
        self.root.path().join("c")
    }

    fn data_home(&self) -> PathBuf {
        self.root.path().join("d")
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(bin())
            .args(args)
            .env("HOME", self.root.path())
            .env("XDG_CONFIG_HOME", self.config_home())
            .env("XDG_DATA_HOME", self.data_home())
            .env_remove("MEDIADIARY_CONFIG")
            .env_remove("MEDIADIARY_STORE")
            .env_remove("MEDIADIARY_LOG")
            .output()
            .expect("run mediadiary")
    }

    fn ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "{:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).expect("utf8 stdout")
    }

    fn json(&self, args: &[&str]) -> Value {
        serde_json::from_str(&self.ok(args)).expect("json output")
    }

    fn signed_in(&self) -> &Self {
        self.ok(&["init"]);
        self.ok(&["login", "--uid", "u1", "--name", "Ada"]);
        self
    }

    fn seed(&self) -> &Self {
        self.ok(&[
            "add", "film", "Heat", "--date", "2023-03-01", "--rating", "4.5", "--released",
            "1995", "--genre", "Crime",
        ]);
        self.ok(&[
            "add", "tv", "Severance", "--date", "2023-05-02", "--rating", "5", "--released",
            "2022", "--genre", "Drama",
        ]);
        self.ok(&["add", "album", "Blue", "--date", "2022-01-01", "--logged-before"]);
        self
    }
}

fn titles(value: &Value) -> Vec<&str> {
    value
        .as_array()
        .expect("array")
        .iter()
        .map(|r| r["title"].as_str().expect("title"))
        .collect()
}

fn session_file(env: &Env) -> PathBuf {
    env.data_home().join("mediadiary").join("session.json")
}

fn exit_code(output: &Output) -> Option<i32> {
    output.status.code()
}

fn assert_exists(path: &Path) {
    assert!(path.exists(), "{} should exist", path.display());
}

#[test]
fn test_init_writes_config_and_store() {
    let env = Env::new();
    let stdout = env.ok(&["init"]);
    assert!(stdout.contains("Initialized media diary"));

    assert_exists(&env.config_home().join("mediadiary").join("config.toml"));
    assert_exists(&env.data_home().join("mediadiary").join("diary.sqlite3"));

    let again = env.run(&["init"]);
    assert_eq!(exit_code(&again), Some(4));
    env.ok(&["init", "--force"]);
}

#[test]
fn test_commands_without_config_point_at_init() {
    let env = Env::new();
    let output = env.run(&["list"]);
    assert_eq!(exit_code(&output), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("mediadiary init"));
}

#[test]
fn test_commands_require_login() {
    let env = Env::new();
    env.ok(&["init"]);
    let output = env.run(&["list"]);
    assert_eq!(exit_code(&output), Some(5));
    assert!(String::from_utf8_lossy(&output.stderr).contains("login"));
}

#[test]
fn test_first_login_gets_default_preferences() {
    let env = Env::new();
    env.signed_in();
    let prefs = env.json(&["prefs", "show", "--json"]);
    assert_eq!(prefs["theme"], "light");
    assert_eq!(prefs["year"], Value::Null);
    assert_eq!(prefs["mediaTypes"].as_array().map(|a| a.len()), Some(3));
    assert_exists(&session_file(&env));
}

#[test]
fn test_add_list_and_top() {
    let env = Env::new();
    env.signed_in().seed();

    let listed = env.json(&["list", "--json"]);
    assert_eq!(titles(&listed), vec!["Severance", "Heat", "Blue"]);

    let top = env.json(&["top", "--limit", "2", "--json"]);
    assert_eq!(titles(&top), vec!["Severance", "Heat"]);
    assert_eq!(top[1]["rating"], 9);
}

#[test]
fn test_facets_are_year_scoped() {
    let env = Env::new();
    env.signed_in().seed();

    let facets = env.json(&[
        "facets",
        "--year",
        "2023",
        "--dimension",
        "media-type",
        "--json",
    ]);
    let values: Vec<&str> = facets["media-type"]
        .as_array()
        .expect("media-type facet")
        .iter()
        .map(|c| c["value"].as_str().expect("value"))
        .collect();
    assert_eq!(values, vec!["film", "tv"]);

    let empty = env.json(&["facets", "--year", "1999", "--dimension", "genre", "--json"]);
    assert_eq!(empty, serde_json::json!({}));
}

#[test]
fn test_chart_applies_filter_conjunctively() {
    let env = Env::new();
    env.signed_in().seed();

    let films = env.json(&["chart", "--year", "2023", "--type", "film", "--json"]);
    assert_eq!(titles(&films), vec!["Heat"]);

    let both = env.json(&["chart", "--year", "2023", "-t", "film", "-t", "tv", "--json"]);
    assert_eq!(titles(&both), vec!["Severance", "Heat"]);

    let unrated = env.json(&["chart", "--rating", "none", "--json"]);
    assert_eq!(titles(&unrated), vec!["Blue"]);

    let rewatches = env.json(&["chart", "--logged-before", "true", "--json"]);
    assert_eq!(titles(&rewatches), vec!["Blue"]);
}

#[test]
fn test_chart_rejects_values_without_records() {
    let env = Env::new();
    env.signed_in().seed();

    let output = env.run(&["chart", "--year", "2022", "--type", "film"]);
    assert_eq!(exit_code(&output), Some(4));
    assert!(String::from_utf8_lossy(&output.stderr).contains("available: album"));
}

#[test]
fn test_preferences_survive_logout_and_login() {
    let env = Env::new();
    env.signed_in();

    env.ok(&["prefs", "set", "--theme", "dark", "--years", "2023,2024", "--track", "film,tv"]);
    env.ok(&["logout"]);
    assert!(!session_file(&env).exists());

    let output = env.run(&["prefs", "show"]);
    assert_eq!(exit_code(&output), Some(5));

    env.ok(&["login", "--uid", "u1"]);
    let prefs = env.json(&["prefs", "show", "--json"]);
    assert_eq!(prefs["theme"], "dark");
    assert_eq!(prefs["years"], serde_json::json!([2023, 2024]));
    assert_eq!(prefs["mediaTypes"], serde_json::json!(["film", "tv"]));
}

#[test]
fn test_preferences_are_per_user() {
    let env = Env::new();
    env.signed_in();
    env.ok(&["prefs", "set", "--theme", "dark"]);

    env.ok(&["login", "--uid", "u2"]);
    let prefs = env.json(&["prefs", "show", "--json"]);
    assert_eq!(prefs["theme"], "light");
}

#[test]
fn test_invalid_input_exit_codes() {
    let env = Env::new();
    env.signed_in();

    assert_eq!(exit_code(&env.run(&["add", "book", "Dune"])), Some(4));
    assert_eq!(
        exit_code(&env.run(&["add", "film", "Heat", "--rating", "4.2"])),
        Some(4)
    );
    assert_eq!(exit_code(&env.run(&["prefs", "set"])), Some(4));
    assert_eq!(
        exit_code(&env.run(&["facets", "--dimension", "colour"])),
        Some(4)
    );
}

#[test]
fn test_completions_generate() {
    let env = Env::new();
    let stdout = env.ok(&["completions", "bash"]);
    assert!(stdout.contains("mediadiary"));
}
