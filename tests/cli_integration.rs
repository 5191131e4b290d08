//! CLI integration tests for docsync
//!
//! Everything here runs without reaching the docs service: commands that
//! need the network are exercised up to the point where they fail early.

use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const REGISTRY: &str = r#"{
    "addon": { "name": "MyAddon", "package": "com.example.addon" },
    "accepting_registrations": false,
    "registered_addons": ["MyAddon"],
    "types": { "org.bukkit.inventory.ItemStack": "itemstack" },
    "sources": [
        {
            "kind": "element",
            "class": {
                "class_name": "com.example.addon.effects.EffGive",
                "markers": ["effect"],
                "name": "Give Item",
                "description": ["Gives an item to a player."],
                "since": "1.2"
            },
            "patterns": ["give %itemstack% to %player%", "(1¦hand|2¦throw) %itemstack% to %player%"]
        },
        {
            "kind": "element",
            "class": {
                "class_name": "com.example.addon.expressions.ExprHeld",
                "markers": ["expression"],
                "name": "Held Item",
                "accepted_changes": ["set", "delete"]
            },
            "patterns": ["held item of %player%"],
            "return_type": "org.bukkit.inventory.ItemStack"
        },
        {
            "kind": "event",
            "class": { "class_name": "com.example.addon.events.EvtHidden", "markers": ["event"] },
            "name": "Hidden",
            "description": ["NO_DOC"],
            "patterns": ["hidden"]
        },
        {
            "kind": "element",
            "class": {
                "class_name": "org.other.effects.EffKill",
                "markers": ["effect"],
                "name": "Kill"
            },
            "patterns": ["kill %entity%"]
        }
    ]
}"#;

/// Get a command instance for the docsync binary, isolated from user config
fn docsync_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("docsync"));
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("DOCSYNC_DATA_DIR")
        .env_remove("DOCSYNC_LOG");
    cmd
}

/// Temporary data directory with a registry snapshot in it
fn setup() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("registry.json"), REGISTRY).unwrap();
    dir
}

fn registry(dir: &TempDir) -> String {
    dir.path().join("registry.json").display().to_string()
}

// =============================================================================
// Init
// =============================================================================

#[test]
fn test_init_writes_config() {
    let dir = TempDir::new().unwrap();

    docsync_cmd(dir.path())
        .arg("--data-dir")
        .arg(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized docsync"))
        .stdout(predicate::str::contains("addon.key"));

    let content = fs::read_to_string(dir.path().join("docsync.toml")).unwrap();
    assert!(content.contains("api_url"));
    assert!(content.contains("owned_only = true"));
}

#[test]
fn test_init_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();

    docsync_cmd(dir.path())
        .arg("--data-dir")
        .arg(dir.path())
        .arg("init")
        .assert()
        .success();

    docsync_cmd(dir.path())
        .arg("--data-dir")
        .arg(dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    docsync_cmd(dir.path())
        .arg("--data-dir")
        .arg(dir.path())
        .args(["init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_init_json_reports_key() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("addon.key"), "secret\n").unwrap();

    let output = docsync_cmd(dir.path())
        .arg("--data-dir")
        .arg(dir.path())
        .args(["--format", "json", "init"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["key_present"], Value::Bool(true));
}

// =============================================================================
// Inspect
// =============================================================================

#[test]
fn test_inspect_lists_owned_records() {
    let dir = setup();

    docsync_cmd(dir.path())
        .arg("--data-dir")
        .arg(dir.path())
        .args(["inspect", "--registry", registry(&dir).as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Give Item"))
        .stdout(predicate::str::contains("Held Item"))
        .stdout(predicate::str::contains("Hidden").not())
        .stdout(predicate::str::contains("Kill").not())
        .stdout(predicate::str::contains("2 record(s)"));
}

#[test]
fn test_inspect_json_payloads() {
    let dir = setup();

    let output = docsync_cmd(dir.path())
        .arg("--data-dir")
        .arg(dir.path())
        .args(["--format", "json", "inspect", "--registry", registry(&dir).as_str()])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["addon"], "MyAddon");
    assert_eq!(json["count"], 2);

    let give = &json["records"][0];
    assert_eq!(give["doc"], "effects");
    assert_eq!(give["version"], "1.2");
    assert_eq!(give["addon"], "MyAddon");
    assert_eq!(
        give["pattern"],
        "give %itemstack% to %player%\n(hand|throw) %itemstack% to %player%"
    );
    assert!(give.get("id").is_none());

    let held = &json["records"][1];
    assert_eq!(held["doc"], "expressions");
    assert_eq!(held["version"], "1.0");
    assert_eq!(held["returntype"], "itemstack");
    assert_eq!(held["changers"], serde_json::json!(["set", "delete"]));
}

#[test]
fn test_inspect_respects_config() {
    let dir = setup();
    fs::write(
        dir.path().join("docsync.toml"),
        "owned_only = false\nfriendly_patterns = false\ncategories = [\"effect\"]\n",
    )
    .unwrap();

    let output = docsync_cmd(dir.path())
        .arg("--data-dir")
        .arg(dir.path())
        .args(["--format", "json", "inspect", "--registry", registry(&dir).as_str()])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<_> = json["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Give Item", "Kill"]);
    assert!(json["records"][0]["pattern"]
        .as_str()
        .unwrap()
        .contains("1¦hand"));
    // Foreign elements still get the default owner on the wire
    assert_eq!(json["records"][1]["addon"], "MyAddon");
}

#[test]
fn test_inspect_missing_registry() {
    let dir = TempDir::new().unwrap();

    docsync_cmd(dir.path())
        .arg("--data-dir")
        .arg(dir.path())
        .args(["inspect", "--registry", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load registry snapshot"));
}

#[test]
fn test_inspect_registry_without_addon() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("registry.json");
    fs::write(&path, r#"{ "sources": [] }"#).unwrap();

    docsync_cmd(dir.path())
        .arg("--data-dir")
        .arg(dir.path())
        .args(["inspect", "--registry"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not name an addon"));
}

// =============================================================================
// Key handling
// =============================================================================

#[test]
fn test_check_without_key() {
    let dir = TempDir::new().unwrap();

    docsync_cmd(dir.path())
        .arg("--data-dir")
        .arg(dir.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No API key found"));
}

#[test]
fn test_diff_and_sync_need_a_key() {
    let dir = setup();

    for command in ["diff", "sync"] {
        docsync_cmd(dir.path())
            .arg("--data-dir")
            .arg(dir.path())
            .args([command, "--registry", registry(&dir).as_str()])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No API key found"));
    }
}

#[test]
fn test_blank_key_file_counts_as_missing() {
    let dir = setup();
    fs::write(dir.path().join("addon.key"), "\n").unwrap();

    docsync_cmd(dir.path())
        .arg("--data-dir")
        .arg(dir.path())
        .args(["sync", "--registry", registry(&dir).as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No API key found"));
}

#[test]
fn test_check_unreachable_service() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("addon.key"), "secret\n").unwrap();
    fs::write(
        dir.path().join("docsync.toml"),
        "api_url = \"http://127.0.0.1:9/api/\"\ntimeout_secs = 2\n",
    )
    .unwrap();

    docsync_cmd(dir.path())
        .arg("--data-dir")
        .arg(dir.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to check the API key"));
}

// =============================================================================
// Config and flags
// =============================================================================

#[test]
fn test_invalid_config_is_reported() {
    let dir = setup();
    fs::write(dir.path().join("docsync.toml"), "timeout_secs = 0\n").unwrap();

    docsync_cmd(dir.path())
        .arg("--data-dir")
        .arg(dir.path())
        .args(["inspect", "--registry", registry(&dir).as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid addon config"));
}

#[test]
fn test_unparsable_config_is_reported() {
    let dir = setup();
    fs::write(dir.path().join("docsync.toml"), "categories = 3\n").unwrap();

    docsync_cmd(dir.path())
        .arg("--data-dir")
        .arg(dir.path())
        .args(["inspect", "--registry", registry(&dir).as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse addon config"));
}

#[test]
fn test_verbose_flag() {
    let dir = setup();

    docsync_cmd(dir.path())
        .arg("--data-dir")
        .arg(dir.path())
        .args(["--verbose", "inspect", "--registry", registry(&dir).as_str()])
        .assert()
        .success()
        .stderr(predicate::str::contains("[verbose:config]"));
}

#[test]
#[cfg(target_os = "linux")]
fn test_global_default_format() {
    let dir = setup();
    let config_dir = dir.path().join(".config").join("docsync");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "default_format = \"json\"\n").unwrap();

    let output = docsync_cmd(dir.path())
        .arg("--data-dir")
        .arg(dir.path())
        .args(["inspect", "--registry", registry(&dir).as_str()])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["count"], 2);
}
