use ratatui::backend::TestBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Terminal;

pub const APP_TITLE: &str = "GitHub Actions Dashboard";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub tabs: Vec<String>,
    pub active_tab: usize,
    pub tabs_locked: bool,
    pub description: String,
    pub update_notice: String,
    pub status_line: String,
    pub legend: String,
}

pub fn render_dashboard(view: &DashboardView, width: u16, height: u16) -> String {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).expect("terminal");
    terminal
        .draw(|frame| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(1),
                    Constraint::Min(5),
                    Constraint::Length(3),
                    Constraint::Length(1),
                ])
                .split(frame.area());

            let mut tab_spans = Vec::new();
            for (idx, tab) in view.tabs.iter().enumerate() {
                let style = if idx == view.active_tab {
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else if view.tabs_locked && idx != 0 {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default()
                };
                tab_spans.push(Span::styled(format!(" {tab} "), style));
                tab_spans.push(Span::raw("|"));
            }
            if view.tabs_locked {
                tab_spans.push(Span::styled(
                    " [locked]",
                    Style::default().fg(Color::Yellow),
                ));
            }
            frame.render_widget(Paragraph::new(Line::from(tab_spans)), chunks[0]);

            let mut body = vec![
                Line::from(Span::styled(
                    APP_TITLE,
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(view.description.clone()),
            ];
            for notice_line in view.update_notice.lines() {
                body.push(Line::from(Span::styled(
                    notice_line.to_string(),
                    Style::default().fg(Color::Yellow),
                )));
            }
            frame.render_widget(
                Paragraph::new(body)
                    .alignment(Alignment::Center)
                    .block(Block::default().borders(Borders::ALL)),
                chunks[1],
            );

            frame.render_widget(
                Paragraph::new(view.status_line.clone())
                    .block(Block::default().borders(Borders::ALL).title("Status")),
                chunks[2],
            );

            frame.render_widget(Paragraph::new(view.legend.clone()), chunks[3]);
        })
        .expect("draw");

    let buffer = terminal.backend().buffer().clone();
    let mut out = String::new();
    for y in 0..height {
        for x in 0..width {
            out.push_str(buffer[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{render_dashboard, DashboardView, APP_TITLE};

    fn view() -> DashboardView {
        DashboardView {
            tabs: vec![
                "Status".to_string(),
                "Workflows".to_string(),
                "History".to_string(),
            ],
            active_tab: 0,
            tabs_locked: true,
            description: "GitHub Actions Dashboard (1.0.0)".to_string(),
            update_notice: "New version available: 2.3.0\nPlease visit: example.com".to_string(),
            status_line: "| Checking your credentials...".to_string(),
            legend: "Keys: q quit".to_string(),
        }
    }

    #[test]
    fn frame_contains_tabs_status_and_notice() {
        let frame = render_dashboard(&view(), 80, 20);
        assert!(frame.contains("Status"));
        assert!(frame.contains("Workflows"));
        assert!(frame.contains("[locked]"));
        assert!(frame.contains(APP_TITLE));
        assert!(frame.contains("2.3.0"));
        assert!(frame.contains("Checking your credentials..."));
        assert!(frame.contains("q quit"));
    }

    #[test]
    fn unlocked_frame_drops_the_lock_marker() {
        let mut unlocked = view();
        unlocked.tabs_locked = false;
        unlocked.status_line = "Welcome, octocat!".to_string();
        let frame = render_dashboard(&unlocked, 80, 20);
        assert!(!frame.contains("[locked]"));
        assert!(frame.contains("Welcome, octocat!"));
    }
}
