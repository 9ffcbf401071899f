use assert_cmd::Command;
use predicates::str::contains as str_contains;
use tempfile::NamedTempFile;

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.write_stdin(script.to_string()).assert()
}

#[test]
fn cli_rejects_out_of_range_policy_values() {
    run_cli("policy set interval_minutes 4\nquit\n")
        .success()
        .stdout(str_contains(
            "interval_minutes 4 is outside the valid range [5, 1500]",
        ));
}

#[test]
fn cli_compute_prints_summary_and_table() {
    run_cli("add 100 09:00\nadd 250 09:30\ncompute\nquit\n")
        .success()
        .stdout(str_contains("Computed (intervals=2, calls=350"))
        .stdout(str_contains("peak_at=09:30"))
        .stdout(str_contains("required_agents"));
}

#[test]
fn cli_solve_zero_calls_needs_no_agents() {
    run_cli("solve 0\nquit\n")
        .success()
        .stdout(str_contains("required_agents=0"));
}

#[test]
fn cli_delete_command_removes_interval() {
    run_cli("add 100\nadd 50\ndelete 1\nquit\n")
        .success()
        .stdout(str_contains("Deleted interval 1."));
}

#[test]
fn cli_save_and_load_json_round_trip() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let path = tmp.path().to_string_lossy().replace('\\', "\\\\");
    let script = format!(
        "add 100 09:00\nsave json {}\nadd 999\nload json {}\nshow\nquit\n",
        path, path
    );
    let assert = run_cli(&script).success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(
        output.contains("Plan loaded from"),
        "expected output to mention load completion"
    );
    assert!(
        output.contains("09:00"),
        "expected persisted interval to remain"
    );
    let after_reload = output.split("Plan loaded from").last().unwrap_or_default();
    assert!(
        !after_reload.contains("999"),
        "extra interval should not appear after reload:\n{}",
        after_reload
    );
}

#[test]
fn cli_policy_show_lists_all_parameters() {
    run_cli("policy show\nquit\n")
        .success()
        .stdout(str_contains("interval_minutes"))
        .stdout(str_contains("shrinkage"));
}
