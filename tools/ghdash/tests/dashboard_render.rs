use ghdash::tui::{render_dashboard, DashboardView};

fn view() -> DashboardView {
    DashboardView {
        tabs: vec![
            "Status".to_string(),
            "Workflows".to_string(),
            "History".to_string(),
        ],
        active_tab: 0,
        tabs_locked: false,
        description: "GitHub Actions Dashboard (0.1.0)".to_string(),
        update_notice: String::new(),
        status_line: "Welcome, octocat!".to_string(),
        legend: "Keys: q quit  ] next tab  [ prev tab".to_string(),
    }
}

#[test]
fn render_dashboard_zero_width_zero_height() {
    let frame = render_dashboard(&view(), 0, 0);
    assert!(frame.is_empty());
}

#[test]
fn render_dashboard_width_1_height_1() {
    let frame = render_dashboard(&view(), 1, 1);
    assert!(!frame.is_empty());
}

#[test]
fn long_update_notice_still_renders_other_sections() {
    let mut long = view();
    long.update_notice = format!(
        "New version available: 99.99.99\nPlease visit: https://example.com/{}",
        "x".repeat(500)
    );
    let frame = render_dashboard(&long, 60, 16);
    assert!(frame.contains("Status"));
    assert!(frame.contains("Welcome, octocat!"));
}

#[test]
fn locked_and_unlocked_frames_differ_only_in_the_gate_marker() {
    let unlocked = render_dashboard(&view(), 80, 20);
    let mut locked_view = view();
    locked_view.tabs_locked = true;
    let locked = render_dashboard(&locked_view, 80, 20);

    assert!(!unlocked.contains("[locked]"));
    assert!(locked.contains("[locked]"));
}
