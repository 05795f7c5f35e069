use assert_cmd::cargo::cargo_bin_cmd;

#[test]
fn help_lists_dashboard_flags() {
    let mut cmd = cargo_bin_cmd!("ghdash");
    cmd.arg("--help");
    let out = cmd.assert().success();
    let stdout = String::from_utf8(out.get_output().stdout.clone()).expect("utf8");

    assert!(stdout.contains("--startup-only"));
    assert!(stdout.contains("--check-timeout"));
    assert!(stdout.contains("--owner"));
    assert!(stdout.contains("--repo"));
}

#[test]
fn missing_config_file_exits_nonzero() {
    let mut cmd = cargo_bin_cmd!("ghdash");
    cmd.arg("--startup-only")
        .arg("--config")
        .arg("does-not-exist.toml");
    cmd.assert().failure();
}

#[test]
fn unknown_flag_exits_nonzero() {
    let mut cmd = cargo_bin_cmd!("ghdash");
    cmd.arg("--definitely-not-a-flag");
    cmd.assert().failure();
}

#[test]
fn invalid_config_values_exit_nonzero() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("ghdash.toml");
    std::fs::write(&path, "[checks]\ntimeout_seconds = 0\n").expect("write config");

    let mut cmd = cargo_bin_cmd!("ghdash");
    cmd.arg("--startup-only").arg("--config").arg(&path);
    cmd.assert().failure();
}
