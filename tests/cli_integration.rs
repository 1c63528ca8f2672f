/// CLI integration tests for pillroutine.
///
/// Each test spawns the compiled binary via the `assert_cmd::cargo_bin_cmd!`
/// macro and sets `PILLROUTINE_HOME` to a fresh `TempDir` so tests are fully
/// isolated from the developer's real `~/.pillroutine` data. Logging is
/// switched off so stderr carries only the JSON error envelope.
use assert_cmd::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

// ── helpers ──────────────────────────────────────────────────────────────────

/// Returns a `Command` with `PILLROUTINE_HOME` pointing at `dir`.
fn cmd_in(dir: &TempDir) -> assert_cmd::Command {
    let mut c = cargo_bin_cmd!("pillroutine");
    c.env("PILLROUTINE_HOME", dir.path());
    c.env("PILLROUTINE_LOG", "off");
    c
}

fn init_dir(dir: &TempDir) {
    cmd_in(dir).arg("init").assert().success();
}

/// Parse stdout JSON and return the root `Value`.
fn parse_json(output: &assert_cmd::assert::Assert) -> Value {
    let bytes = output.get_output().stdout.clone();
    serde_json::from_slice(&bytes).expect("stdout is not valid JSON")
}

/// Parse stderr JSON and return the root `Value`.
fn parse_stderr_json(output: &assert_cmd::assert::Assert) -> Value {
    let bytes = output.get_output().stderr.clone();
    serde_json::from_slice(&bytes).expect("stderr is not valid JSON")
}

/// Add a routine that runs through 2099 so no reminder is already in the past.
fn add_routine(dir: &TempDir, id: &str, times: &str, days: &str) -> Value {
    let out = cmd_in(dir)
        .args([
            "routine",
            "add",
            "vitamin d",
            "--id",
            id,
            "--times",
            times,
            "--days",
            days,
            "--start",
            "2099-01-01",
            "--end",
            "2099-12-31",
        ])
        .assert()
        .success();
    parse_json(&out)
}

fn notify_count(dir: &TempDir) -> u64 {
    let out = cmd_in(dir).args(["notify", "list"]).assert().success();
    parse_json(&out)["data"]["count"].as_u64().unwrap()
}

fn expect_error_code(out: assert_cmd::assert::Assert, code: &str) {
    let json = parse_stderr_json(&out);
    assert_eq!(json["status"], "error");
    assert_eq!(json["error"]["code"], code);
}

// ── init ─────────────────────────────────────────────────────────────────────

#[test]
fn test_init_creates_config_and_channel() {
    let dir = TempDir::new().unwrap();
    let out = cmd_in(&dir).arg("init").assert().success();
    let json = parse_json(&out);

    assert_eq!(json["status"], "ok");
    assert_eq!(json["command"], "init");
    assert_eq!(json["data"]["channel_id"], "pill-routine-channel");
    assert_eq!(json["data"]["permission"], "granted");
    assert!(dir.path().join("config.toml").exists());
    assert!(dir.path().join("data.db").exists());
}

#[test]
fn test_init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    init_dir(&dir);
    init_dir(&dir);
}

#[test]
fn test_init_human_output() {
    let dir = TempDir::new().unwrap();
    cmd_in(&dir)
        .args(["init", "--human"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config initialized"));
}

// ── routine add ──────────────────────────────────────────────────────────────

#[test]
fn test_add_daily_routine_registers_one_trigger_per_time() {
    let dir = TempDir::new().unwrap();
    init_dir(&dir);

    let json = add_routine(&dir, "vit", "08:00,20:00", "daily");
    assert_eq!(json["command"], "routine_add");
    assert_eq!(json["data"]["status"], "scheduled");
    assert_eq!(json["data"]["registered"], 2);
    assert_eq!(json["data"]["routine"]["id"], "vit");
    assert_eq!(json["data"]["report"]["outcomes"][0]["trigger_id"], "vit-0");
    assert_eq!(json["data"]["report"]["outcomes"][0]["repeat"], "daily");
    assert_eq!(notify_count(&dir), 2);
}

#[test]
fn test_add_partial_routine_registers_weekly_triggers() {
    let dir = TempDir::new().unwrap();
    init_dir(&dir);

    let json = add_routine(&dir, "vit", "08:00", "mon,wed,fri");
    assert_eq!(json["data"]["registered"], 3);
    let outcomes = json["data"]["report"]["outcomes"].as_array().unwrap();
    let ids: Vec<&str> = outcomes
        .iter()
        .map(|o| o["trigger_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["vit-0-day1", "vit-0-day3", "vit-0-day5"]);
    assert!(outcomes.iter().all(|o| o["repeat"] == "weekly"));
}

#[test]
fn test_add_without_init_works() {
    let dir = TempDir::new().unwrap();
    let json = add_routine(&dir, "vit", "08:00", "daily");
    assert_eq!(json["data"]["registered"], 1);
}

#[test]
fn test_add_twice_replaces_triggers() {
    let dir = TempDir::new().unwrap();
    init_dir(&dir);

    add_routine(&dir, "vit", "08:00,20:00", "daily");
    let json = add_routine(&dir, "vit", "08:00,20:00", "daily");
    assert_eq!(json["data"]["report"]["replaced"], 2);
    assert_eq!(notify_count(&dir), 2);
}

#[test]
fn test_add_twice_rejected_when_configured() {
    let dir = TempDir::new().unwrap();
    init_dir(&dir);
    cmd_in(&dir)
        .args(["config", "set", "scheduling.on_duplicate", "reject"])
        .assert()
        .success();

    add_routine(&dir, "vit", "08:00", "daily");
    let out = cmd_in(&dir)
        .args(["routine", "add", "vitamin d", "--id", "vit", "--times", "08:00"])
        .assert()
        .failure();
    expect_error_code(out, "validation_error");
    assert_eq!(notify_count(&dir), 1);
}

#[test]
fn test_add_invalid_time_fails() {
    let dir = TempDir::new().unwrap();
    init_dir(&dir);
    let out = cmd_in(&dir)
        .args(["routine", "add", "vitamin d", "--times", "25:00"])
        .assert()
        .failure();
    expect_error_code(out, "validation_error");
}

#[test]
fn test_add_invalid_weekday_fails() {
    let dir = TempDir::new().unwrap();
    init_dir(&dir);
    let out = cmd_in(&dir)
        .args(["routine", "add", "vitamin d", "--times", "08:00", "--days", "mon,funday"])
        .assert()
        .failure();
    expect_error_code(out, "validation_error");
}

#[test]
fn test_add_end_before_start_fails() {
    let dir = TempDir::new().unwrap();
    init_dir(&dir);
    let out = cmd_in(&dir)
        .args([
            "routine",
            "add",
            "vitamin d",
            "--times",
            "08:00",
            "--start",
            "2099-02-01",
            "--end",
            "2099-01-01",
        ])
        .assert()
        .failure();
    expect_error_code(out, "validation_error");
    assert_eq!(notify_count(&dir), 0);
}

#[test]
fn test_add_too_many_times_fails() {
    let dir = TempDir::new().unwrap();
    init_dir(&dir);
    let times = (0..11).map(|h| format!("{h:02}:00")).collect::<Vec<_>>().join(",");
    let out = cmd_in(&dir)
        .args(["routine", "add", "vitamin d", "--times", &times])
        .assert()
        .failure();
    expect_error_code(out, "validation_error");
}

#[test]
fn test_add_with_denied_permission_reports_it() {
    let dir = TempDir::new().unwrap();
    init_dir(&dir);
    cmd_in(&dir)
        .args(["config", "set", "platform.notifications_allowed", "false"])
        .assert()
        .success();

    let json = add_routine(&dir, "vit", "08:00", "daily");
    assert_eq!(json["data"]["status"], "permission_denied");
    assert_eq!(json["data"]["registered"], 1);
}

#[test]
fn test_add_human_output() {
    let dir = TempDir::new().unwrap();
    init_dir(&dir);
    cmd_in(&dir)
        .args([
            "routine",
            "add",
            "vitamin d",
            "--times",
            "08:00",
            "--start",
            "2099-01-01",
            "--human",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("vitamin d"));
}

// ── routine preview ──────────────────────────────────────────────────────────

#[test]
fn test_preview_does_not_register() {
    let dir = TempDir::new().unwrap();
    init_dir(&dir);

    let out = cmd_in(&dir)
        .args([
            "routine",
            "preview",
            "vitamin d",
            "--times",
            "08:00,13:00",
            "--days",
            "mon",
            "--start",
            "2099-01-01",
        ])
        .assert()
        .success();
    let json = parse_json(&out);

    assert_eq!(json["data"]["count"], 2);
    // 2099-01-01 is a Thursday; the first Monday is the 5th.
    assert_eq!(json["data"]["triggers"][0]["fire_at"], "2099-01-05T08:00:00");
    assert_eq!(notify_count(&dir), 0);
}

// ── routine list / show / cancel ─────────────────────────────────────────────

#[test]
fn test_list_shows_routines_with_trigger_counts() {
    let dir = TempDir::new().unwrap();
    init_dir(&dir);
    add_routine(&dir, "a", "08:00", "daily");
    add_routine(&dir, "b", "08:00,20:00", "weekends");

    let out = cmd_in(&dir).args(["routine", "list"]).assert().success();
    let json = parse_json(&out);
    assert_eq!(json["data"]["count"], 2);

    let rows = json["data"]["routines"].as_array().unwrap();
    let b = rows.iter().find(|r| r["routine"]["id"] == "b").unwrap();
    assert_eq!(b["triggers"], 4);
}

#[test]
fn test_list_empty_human() {
    let dir = TempDir::new().unwrap();
    init_dir(&dir);
    cmd_in(&dir)
        .args(["routine", "list", "--human"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No routines."));
}

#[test]
fn test_show_routine_and_handles() {
    let dir = TempDir::new().unwrap();
    init_dir(&dir);
    add_routine(&dir, "vit", "08:00", "tue,thu");

    let out = cmd_in(&dir).args(["routine", "show", "vit"]).assert().success();
    let json = parse_json(&out);
    assert_eq!(json["data"]["routine"]["name"], "vitamin d");
    assert_eq!(json["data"]["triggers"].as_array().unwrap().len(), 2);
}

#[test]
fn test_show_unknown_routine_fails() {
    let dir = TempDir::new().unwrap();
    init_dir(&dir);
    let out = cmd_in(&dir)
        .args(["routine", "show", "missing"])
        .assert()
        .failure();
    expect_error_code(out, "validation_error");
}

#[test]
fn test_cancel_removes_every_trigger_and_the_routine() {
    let dir = TempDir::new().unwrap();
    init_dir(&dir);
    add_routine(&dir, "vit", "08:00,20:00", "mon,wed,fri");
    add_routine(&dir, "other", "09:00", "daily");

    let out = cmd_in(&dir)
        .args(["routine", "cancel", "vit"])
        .assert()
        .success();
    let json = parse_json(&out);
    assert_eq!(json["data"]["cancelled"].as_array().unwrap().len(), 6);
    assert_eq!(json["data"]["removed"], true);

    assert_eq!(notify_count(&dir), 1);
    cmd_in(&dir)
        .args(["routine", "show", "vit"])
        .assert()
        .failure();
}

#[test]
fn test_cancel_unknown_routine_fails() {
    let dir = TempDir::new().unwrap();
    init_dir(&dir);
    let out = cmd_in(&dir)
        .args(["routine", "cancel", "missing"])
        .assert()
        .failure();
    expect_error_code(out, "validation_error");
}

// ── notify ───────────────────────────────────────────────────────────────────

#[test]
fn test_notify_list_empty() {
    let dir = TempDir::new().unwrap();
    init_dir(&dir);
    assert_eq!(notify_count(&dir), 0);
}

#[test]
fn test_notify_upcoming_lists_todays_routine() {
    let dir = TempDir::new().unwrap();
    init_dir(&dir);
    cmd_in(&dir)
        .args(["routine", "add", "vitamin d", "--times", "08:00"])
        .assert()
        .success();

    let out = cmd_in(&dir)
        .args(["notify", "upcoming", "--hours", "48"])
        .assert()
        .success();
    let json = parse_json(&out);
    assert_eq!(json["data"]["hours"], 48);
    assert!(json["data"]["count"].as_u64().unwrap() >= 1);
    assert_eq!(json["data"]["firings"][0]["body"], "Time to take vitamin d!");
}

#[test]
fn test_notify_upcoming_skips_far_future_routine() {
    let dir = TempDir::new().unwrap();
    init_dir(&dir);
    add_routine(&dir, "vit", "08:00", "daily");

    let out = cmd_in(&dir).args(["notify", "upcoming"]).assert().success();
    assert_eq!(parse_json(&out)["data"]["count"], 0);
}

#[test]
fn test_notify_upcoming_rejects_out_of_range_hours() {
    let dir = TempDir::new().unwrap();
    init_dir(&dir);
    for hours in ["0", "8761", "100000"] {
        cmd_in(&dir)
            .args(["notify", "upcoming", "--hours", hours])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--hours"));
    }
    cmd_in(&dir)
        .args(["notify", "upcoming", "--hours", "8760"])
        .assert()
        .success();
}

#[test]
fn test_notify_test_displays_notification() {
    let dir = TempDir::new().unwrap();
    init_dir(&dir);
    let out = cmd_in(&dir)
        .args(["notify", "test", "omega 3"])
        .assert()
        .success();
    let json = parse_json(&out);
    assert_eq!(json["data"]["displayed"], true);
    assert_eq!(json["data"]["body"], "Time to take omega 3!");
}

#[test]
fn test_notify_test_respects_denied_permission() {
    let dir = TempDir::new().unwrap();
    init_dir(&dir);
    cmd_in(&dir)
        .args(["config", "set", "platform.notifications_allowed", "false"])
        .assert()
        .success();

    let out = cmd_in(&dir)
        .args(["notify", "test", "omega 3"])
        .assert()
        .success();
    assert_eq!(parse_json(&out)["data"]["displayed"], false);
}

#[test]
fn test_notify_cancel_all() {
    let dir = TempDir::new().unwrap();
    init_dir(&dir);
    add_routine(&dir, "a", "08:00", "daily");
    add_routine(&dir, "b", "09:00", "daily");

    let out = cmd_in(&dir)
        .args(["notify", "cancel-all", "--yes"])
        .assert()
        .success();
    assert_eq!(parse_json(&out)["data"]["released_handles"], 2);
    assert_eq!(notify_count(&dir), 0);
}

#[test]
fn test_notify_cancel_all_aborts_without_confirmation() {
    let dir = TempDir::new().unwrap();
    init_dir(&dir);
    add_routine(&dir, "a", "08:00", "daily");

    cmd_in(&dir)
        .args(["notify", "cancel-all"])
        .write_stdin("n\n")
        .assert()
        .failure();
    assert_eq!(notify_count(&dir), 1);
}

#[test]
fn test_notify_sweep_only_when_enforced() {
    let dir = TempDir::new().unwrap();
    init_dir(&dir);
    cmd_in(&dir)
        .args([
            "routine",
            "add",
            "vitamin d",
            "--id",
            "old",
            "--times",
            "08:00",
            "--start",
            "2020-01-01",
            "--end",
            "2020-01-31",
        ])
        .assert()
        .success();

    let out = cmd_in(&dir).args(["notify", "sweep"]).assert().success();
    let json = parse_json(&out);
    assert_eq!(json["data"]["enforced"], false);
    assert!(json["data"]["routines"].as_array().unwrap().is_empty());
    assert_eq!(notify_count(&dir), 1);

    cmd_in(&dir)
        .args(["config", "set", "scheduling.enforce_end_date", "true"])
        .assert()
        .success();
    let out = cmd_in(&dir).args(["notify", "sweep"]).assert().success();
    let json = parse_json(&out);
    assert_eq!(json["data"]["enforced"], true);
    assert_eq!(json["data"]["routines"][0]["cancelled"][0], "old-0");
    assert_eq!(notify_count(&dir), 0);
}

// ── config ───────────────────────────────────────────────────────────────────

#[test]
fn test_config_show_defaults() {
    let dir = TempDir::new().unwrap();
    init_dir(&dir);
    let out = cmd_in(&dir).args(["config", "show"]).assert().success();
    let json = parse_json(&out);
    let config = &json["data"]["config"];
    assert_eq!(config["notifications"]["channel_id"], "pill-routine-channel");
    assert_eq!(config["scheduling"]["on_duplicate"], "replace");
    assert_eq!(config["scheduling"]["enforce_end_date"], false);
}

#[test]
fn test_config_set_body_template_is_used() {
    let dir = TempDir::new().unwrap();
    init_dir(&dir);
    cmd_in(&dir)
        .args(["config", "set", "notifications.body", "Take your {name} now"])
        .assert()
        .success();

    let out = cmd_in(&dir)
        .args(["notify", "test", "iron"])
        .assert()
        .success();
    assert_eq!(parse_json(&out)["data"]["body"], "Take your iron now");
}

#[test]
fn test_config_set_unknown_key_fails() {
    let dir = TempDir::new().unwrap();
    init_dir(&dir);
    let out = cmd_in(&dir)
        .args(["config", "set", "nope.key", "1"])
        .assert()
        .failure();
    expect_error_code(out, "general_error");
}

// ── completions ──────────────────────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    let dir = TempDir::new().unwrap();
    cmd_in(&dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pillroutine"));
}
