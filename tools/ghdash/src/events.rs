use crate::config::AppConfig;
use crate::errors::GhdashError;
use crate::github::GhClient;
use crate::hotkeys::{action_for_key, controls_legend, HotkeyAction};
use crate::lock::TabLock;
use crate::logging::structured_fallback_line;
use crate::runtime::{DashRuntime, Terminal};
use crate::startup::{CheckOutcome, GateState, ReadyFlag, StartupCoordinator};
use crate::status::StatusReporter;
use crate::tui::{render_dashboard, DashboardView, APP_TITLE};
use crate::version;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Room for both check outcomes plus queued ticks and keys; senders never
/// rendezvous with the receiver, so a slow render cannot deadlock a check.
pub const INBOX_CAPACITY: usize = 64;

pub const TAB_TITLES: [&str; 3] = ["Status", "Workflows", "History"];

/// Everything that reaches the single-threaded event loop, including the
/// typed results computed by the startup check threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashMsg {
    Tick,
    Key(char),
    Check(CheckOutcome),
}

/// Single-threaded owner of all UI state. Background threads only ever talk
/// to it through the inbox.
pub struct DashShell {
    tabs: Vec<String>,
    active_tab: usize,
    current_version: String,
    pub lock: TabLock,
    pub reporter: StatusReporter,
    coordinator: StartupCoordinator,
    ready: ReadyFlag,
    quit: bool,
}

impl DashShell {
    pub fn new(current_version: String, release_url: String) -> Self {
        let (coordinator, ready) = StartupCoordinator::new(current_version.clone(), release_url);
        Self {
            tabs: TAB_TITLES.iter().map(|t| t.to_string()).collect(),
            active_tab: 0,
            current_version,
            lock: TabLock::new_locked(),
            reporter: StatusReporter::new(),
            coordinator,
            ready,
            quit: false,
        }
    }

    pub fn start_checks(&mut self, client: &GhClient, timeout: Duration, tx: &mpsc::Sender<DashMsg>) {
        self.coordinator
            .start(client, timeout, &mut self.reporter, &self.lock, tx);
    }

    pub fn handle_message(&mut self, msg: &DashMsg) {
        self.coordinator
            .handle_message(msg, &mut self.reporter, &self.lock);
        if let DashMsg::Key(key) = msg {
            if let Some(action) = action_for_key(*key) {
                self.handle_action(action);
            }
        }
    }

    /// Tab navigation is refused while the gate is locked; the user stays on
    /// the status tab until the credential check resolves.
    fn handle_action(&mut self, action: HotkeyAction) {
        match action {
            HotkeyAction::Quit => self.quit = true,
            HotkeyAction::NextTab => {
                if !self.lock.is_locked() {
                    self.active_tab = (self.active_tab + 1) % self.tabs.len();
                }
            }
            HotkeyAction::PrevTab => {
                if !self.lock.is_locked() {
                    self.active_tab = (self.active_tab + self.tabs.len() - 1) % self.tabs.len();
                }
            }
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn gate(&self) -> GateState {
        self.coordinator.gate()
    }

    pub fn ready(&mut self) -> bool {
        self.ready.poll_ready()
    }

    pub fn all_checks_resolved(&self) -> bool {
        self.coordinator.all_checks_resolved()
    }

    pub fn active_tab(&self) -> usize {
        self.active_tab
    }

    pub fn view(&self) -> DashboardView {
        DashboardView {
            tabs: self.tabs.clone(),
            active_tab: self.active_tab,
            tabs_locked: self.lock.is_locked(),
            description: format!("{APP_TITLE} ({})", self.current_version),
            update_notice: self.coordinator.update_notice().to_string(),
            status_line: self.reporter.status_line(),
            legend: controls_legend(),
        }
    }
}

/// Runs the dashboard event loop until quit, or until the startup gate
/// resolves when `startup_only` is set (exit 0 on ready, 1 on a failed
/// credential check).
pub fn run_dashboard(
    runtime: &DashRuntime,
    cfg: &AppConfig,
    startup_only: bool,
) -> Result<i32, GhdashError> {
    let (tx, mut rx) = mpsc::channel::<DashMsg>(INBOX_CAPACITY);
    let client = GhClient::new(
        Arc::clone(&runtime.process_runner),
        Arc::clone(&runtime.clock),
        cfg.github.clone(),
    );
    let mut shell = DashShell::new(version::current_version(), cfg.github.release_url.clone());

    let tick_tx = tx.clone();
    let tick_interval = Duration::from_millis(cfg.ui.tick_millis);
    std::thread::spawn(move || {
        while tick_tx.blocking_send(DashMsg::Tick).is_ok() {
            std::thread::sleep(tick_interval);
        }
    });

    if runtime.terminal.stdin_is_tty() && !startup_only {
        spawn_key_reader(tx.clone());
    }

    let timeout = Duration::from_secs(cfg.checks.timeout_seconds);
    shell.start_checks(&client, timeout, &tx);
    render(runtime.terminal.as_ref(), &shell.view(), cfg)?;

    while let Some(msg) = rx.blocking_recv() {
        shell.handle_message(&msg);
        render(runtime.terminal.as_ref(), &shell.view(), cfg)?;

        if shell.should_quit() {
            return Ok(0);
        }
        if startup_only && shell.all_checks_resolved() {
            let code = if shell.ready() { 0 } else { 1 };
            return Ok(code);
        }
    }

    Err(GhdashError::Channel("dashboard inbox closed".to_string()))
}

fn spawn_key_reader(tx: mpsc::Sender<DashMsg>) {
    std::thread::spawn(move || loop {
        match crossterm::event::read() {
            Ok(crossterm::event::Event::Key(key)) => {
                if key.kind != crossterm::event::KeyEventKind::Press {
                    continue;
                }
                if let crossterm::event::KeyCode::Char(ch) = key.code {
                    if tx.blocking_send(DashMsg::Key(ch)).is_err() {
                        break;
                    }
                }
            }
            Ok(_) => {}
            Err(_) => break,
        }
    });
}

fn render(
    terminal: &dyn Terminal,
    view: &DashboardView,
    cfg: &AppConfig,
) -> Result<(), GhdashError> {
    if terminal.stdin_is_tty() {
        let frame = render_dashboard(view, cfg.ui.frame_width, cfg.ui.frame_height);
        terminal.draw(&frame)
    } else {
        terminal.write_line(&structured_fallback_line(
            "status",
            if view.tabs_locked { "locked" } else { "unlocked" },
            &view.status_line,
        ))
    }
}
