use ghdash::runtime::{
    DashRuntime, FakeClock, FakeFileSystem, FakeProcessRunner, FakeTerminal, ProcessOutput,
};
use std::ffi::OsString;
use std::sync::Arc;

fn args(extra: &[&str]) -> Vec<OsString> {
    let mut all = vec![OsString::from("ghdash")];
    all.extend(extra.iter().map(OsString::from));
    all
}

fn runtime(runner: FakeProcessRunner, terminal: FakeTerminal) -> DashRuntime {
    DashRuntime {
        clock: Arc::new(FakeClock::default()),
        file_system: Arc::new(FakeFileSystem::default()),
        process_runner: Arc::new(runner),
        terminal: Arc::new(terminal),
    }
}

fn ok_json(body: &str) -> ProcessOutput {
    ProcessOutput {
        exit_code: 0,
        stdout: body.to_string(),
        stderr: String::new(),
    }
}

#[test]
fn failed_credential_check_keeps_tabs_locked_and_exits_nonzero() {
    let runner = FakeProcessRunner::default();
    runner.push_output_for(
        "user",
        ProcessOutput {
            exit_code: 1,
            stdout: String::new(),
            stderr: "HTTP 401: Unauthorized".to_string(),
        },
    );
    runner.push_output_for(
        "releases/latest",
        ok_json("{\"tag_name\":\"v0.1.0\",\"html_url\":\"https://example.com/r\"}"),
    );
    let terminal = FakeTerminal::new(true);
    let rt = runtime(runner, terminal.clone());

    let code = ghdash::run_with_runtime(&args(&["--startup-only"]), &rt).expect("run");
    assert_eq!(code, 1);

    let frames = terminal.drawn_frames();
    let last = frames.last().expect("at least one frame");
    assert!(last.contains("[locked]"));
    assert!(last.contains("failed to verify credentials"));
    assert!(frames.iter().all(|frame| !frame.contains("Welcome")));
}

#[test]
fn update_notice_and_unlock_when_both_checks_succeed() {
    let runner = FakeProcessRunner::default();
    runner.push_output_for("user", ok_json("{\"login\":\"octocat\"}"));
    runner.push_output_for(
        "releases/latest",
        ok_json("{\"tag_name\":\"v2.3.0\",\"html_url\":\"https://example.com/r\"}"),
    );
    let terminal = FakeTerminal::new(true);
    let rt = runtime(runner, terminal.clone());

    let code = ghdash::run_with_runtime(&args(&["--startup-only"]), &rt).expect("run");
    assert_eq!(code, 0);

    let frames = terminal.drawn_frames();
    let last = frames.last().expect("at least one frame");
    assert!(last.contains("Welcome, octocat!"));
    assert!(last.contains("2.3.0"));
    assert!(!last.contains("[locked]"));
}

#[test]
fn up_to_date_install_shows_no_update_banner() {
    let runner = FakeProcessRunner::default();
    runner.push_output_for("user", ok_json("{\"login\":\"octocat\"}"));
    // Matches the crate's own version, so no update is announced.
    let release = format!(
        "{{\"tag_name\":\"v{}\",\"html_url\":\"https://example.com/r\"}}",
        env!("CARGO_PKG_VERSION")
    );
    runner.push_output_for("releases/latest", ok_json(&release));
    let terminal = FakeTerminal::new(true);
    let rt = runtime(runner, terminal.clone());

    let code = ghdash::run_with_runtime(&args(&["--startup-only"]), &rt).expect("run");
    assert_eq!(code, 0);

    let last = terminal.drawn_frames().last().cloned().expect("frame");
    assert!(last.contains("Welcome, octocat!"));
    assert!(!last.contains("New version available"));
    assert!(!last.contains("[locked]"));
}

#[test]
fn version_check_failure_is_informational_only() {
    let runner = FakeProcessRunner::default();
    runner.push_output_for("user", ok_json("{\"login\":\"octocat\"}"));
    runner.push_output_for(
        "releases/latest",
        ProcessOutput {
            exit_code: 1,
            stdout: String::new(),
            stderr: "HTTP 403: rate limited".to_string(),
        },
    );
    let terminal = FakeTerminal::new(true);
    let rt = runtime(runner, terminal.clone());

    // The gating check passed, so the failure still exits zero and unlocks.
    let code = ghdash::run_with_runtime(&args(&["--startup-only"]), &rt).expect("run");
    assert_eq!(code, 0);

    let last = terminal.drawn_frames().last().cloned().expect("frame");
    assert!(!last.contains("[locked]"));
    assert!(last.contains("failed to check updates"));
}

#[test]
fn non_tty_run_reports_through_structured_lines() {
    let runner = FakeProcessRunner::default();
    runner.push_output_for("user", ok_json("{\"login\":\"octocat\"}"));
    runner.push_output_for(
        "releases/latest",
        ok_json("{\"tag_name\":\"v0.1.0\",\"html_url\":\"https://example.com/r\"}"),
    );
    let terminal = FakeTerminal::new(false);
    let rt = runtime(runner, terminal.clone());

    let code = ghdash::run_with_runtime(&args(&["--startup-only"]), &rt).expect("run");
    assert_eq!(code, 0);

    let lines = terminal.written_lines();
    assert!(lines.iter().any(|line| line.contains("state=locked")));
    assert!(lines
        .iter()
        .any(|line| line.contains("state=unlocked") && line.contains("Welcome")));
}
