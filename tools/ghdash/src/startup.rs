use crate::events::DashMsg;
use crate::github::{AuthUser, GhClient};
use crate::lock::TabLock;
use crate::logging::append_run_log;
use crate::status::StatusReporter;
use crate::version::{is_newer, VersionInfo};
use serde_json::json;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

pub const PROGRESS_CHECKING_CREDENTIALS: &str = "Checking your credentials...";
pub const AUTH_FAILED_MESSAGE: &str =
    "failed to verify credentials, check your token and permissions";
pub const VERSION_CHECK_FAILED_MESSAGE: &str = "failed to check for updates";

/// Startup checks come in two flavors with different post-conditions. The
/// table below is what decides lock and ready-signal behavior; adding a
/// third check means picking a kind, not duplicating transition logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    Informational,
    Gating,
}

impl CheckKind {
    pub fn locks_on_failure(self) -> bool {
        matches!(self, Self::Gating)
    }

    pub fn unlocks_on_success(self) -> bool {
        matches!(self, Self::Gating)
    }

    pub fn signals_ready_on_success(self) -> bool {
        matches!(self, Self::Gating)
    }
}

/// Result computed by a background check thread and posted into the event
/// loop inbox. Checks never mutate shared display state directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Version(Result<VersionInfo, String>),
    Auth(Result<AuthUser, String>),
}

impl CheckOutcome {
    pub fn kind(&self) -> CheckKind {
        match self {
            Self::Version(_) => CheckKind::Informational,
            Self::Auth(_) => CheckKind::Gating,
        }
    }
}

/// Gating-check state machine. `Failed` is terminal until the process
/// restarts; there is no retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Pending,
    Checking,
    Failed,
    Ready,
}

/// One-shot completion flag held by the shell. Latches true the first time
/// the ready signal fires and stays observable on every later poll, so the
/// terminal marker never has to be re-posted through the inbox.
pub struct ReadyFlag {
    rx: Option<oneshot::Receiver<()>>,
    latched: bool,
}

impl ReadyFlag {
    pub fn poll_ready(&mut self) -> bool {
        if self.latched {
            return true;
        }
        if let Some(rx) = &mut self.rx {
            if rx.try_recv().is_ok() {
                self.latched = true;
                self.rx = None;
            }
        }
        self.latched
    }
}

pub struct StartupCoordinator {
    gate: GateState,
    current_version: String,
    release_url: String,
    version_info: Option<VersionInfo>,
    version_resolved: bool,
    update_notice: String,
    ready_tx: Option<oneshot::Sender<()>>,
}

impl StartupCoordinator {
    pub fn new(current_version: String, release_url: String) -> (Self, ReadyFlag) {
        let (ready_tx, ready_rx) = oneshot::channel();
        (
            Self {
                gate: GateState::Pending,
                current_version,
                release_url,
                version_info: None,
                version_resolved: false,
                update_notice: String::new(),
                ready_tx: Some(ready_tx),
            },
            ReadyFlag {
                rx: Some(ready_rx),
                latched: false,
            },
        )
    }

    pub fn gate(&self) -> GateState {
        self.gate
    }

    pub fn version_info(&self) -> Option<&VersionInfo> {
        self.version_info.as_ref()
    }

    /// Informational banner for the renderer: update available, check
    /// failure fallback, or empty.
    pub fn update_notice(&self) -> &str {
        &self.update_notice
    }

    /// True once both checks have reported, whatever their outcomes.
    pub fn all_checks_resolved(&self) -> bool {
        self.version_resolved && matches!(self.gate, GateState::Failed | GateState::Ready)
    }

    /// Launches both startup checks. Runs on the event loop thread; the lock
    /// and progress state are asserted here, before either worker can
    /// observe the gate, so the tabs are locked at the instant the gating
    /// check starts. Returns immediately.
    pub fn start(
        &mut self,
        client: &GhClient,
        timeout: Duration,
        reporter: &mut StatusReporter,
        lock: &TabLock,
        tx: &mpsc::Sender<DashMsg>,
    ) {
        if self.gate != GateState::Pending {
            return;
        }
        self.gate = GateState::Checking;

        reporter.enable_spinner();
        reporter.set_progress_message(PROGRESS_CHECKING_CREDENTIALS);
        lock.lock();
        append_run_log("info", "startup.checks.started", json!({}));

        let version_client = client.clone();
        let version_tx = tx.clone();
        let current_version = self.current_version.clone();
        std::thread::spawn(move || {
            let result = version_client
                .latest_release(timeout)
                .map(|release| VersionInfo {
                    update_available: is_newer(&current_version, &release.tag_name),
                    latest_version: Some(release.tag_name),
                    current_version,
                })
                .map_err(|e| e.to_string());
            let _ = version_tx.blocking_send(DashMsg::Check(CheckOutcome::Version(result)));
        });

        let auth_client = client.clone();
        let auth_tx = tx.clone();
        std::thread::spawn(move || {
            let result = auth_client.auth_user(timeout).map_err(|e| e.to_string());
            let _ = auth_tx.blocking_send(DashMsg::Check(CheckOutcome::Auth(result)));
        });
    }

    /// Invoked by the event loop for every inbox message, including ones the
    /// coordinator does not care about; ticks always reach the reporter so
    /// the spinner keeps animating.
    pub fn handle_message(
        &mut self,
        msg: &DashMsg,
        reporter: &mut StatusReporter,
        lock: &TabLock,
    ) {
        match msg {
            DashMsg::Check(outcome) => self.apply_outcome(outcome, reporter, lock),
            DashMsg::Tick => reporter.tick(),
            DashMsg::Key(_) => {}
        }
    }

    fn apply_outcome(
        &mut self,
        outcome: &CheckOutcome,
        reporter: &mut StatusReporter,
        lock: &TabLock,
    ) {
        let kind = outcome.kind();
        match outcome {
            CheckOutcome::Version(Ok(info)) => {
                self.version_resolved = true;
                self.update_notice = if info.update_available {
                    let latest = info.latest_version.as_deref().unwrap_or("unknown");
                    append_run_log(
                        "info",
                        "startup.version.update_available",
                        json!({ "latest": latest }),
                    );
                    format!(
                        "New version available: {latest}\nPlease visit: {}",
                        self.release_url
                    )
                } else {
                    String::new()
                };
                self.version_info = Some(info.clone());
            }
            CheckOutcome::Version(Err(error)) => {
                self.version_resolved = true;
                append_run_log("warn", "startup.version.failed", json!({ "error": error }));
                reporter.set_error(error);
                reporter.set_error_message(VERSION_CHECK_FAILED_MESSAGE);
                self.update_notice = format!(
                    "failed to check updates.\nPlease visit: {}",
                    self.release_url
                );
            }
            CheckOutcome::Auth(result) => {
                if matches!(self.gate, GateState::Failed | GateState::Ready) {
                    return;
                }
                match result {
                    Ok(user) => {
                        append_run_log(
                            "info",
                            "startup.auth.succeeded",
                            json!({ "login": user.login }),
                        );
                        reporter.reset();
                        reporter.set_success_message(format!("Welcome, {}!", user.login));
                        if kind.unlocks_on_success() {
                            lock.unlock();
                        }
                        self.gate = GateState::Ready;
                        if kind.signals_ready_on_success() {
                            if let Some(tx) = self.ready_tx.take() {
                                let _ = tx.send(());
                            }
                        }
                    }
                    Err(error) => {
                        append_run_log("error", "startup.auth.failed", json!({ "error": error }));
                        reporter.set_error(error);
                        reporter.set_error_message(AUTH_FAILED_MESSAGE);
                        if kind.locks_on_failure() {
                            lock.lock();
                        }
                        self.gate = GateState::Failed;
                    }
                }
            }
        }
    }
}
