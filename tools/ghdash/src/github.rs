use crate::config::GithubConfig;
use crate::errors::GhdashError;
use crate::logging::append_run_log;
use crate::runtime::{Clock, ProcessOutput, ProcessRequest, ProcessRunner};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthUser {
    pub login: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseView {
    pub tag_name: String,
    pub html_url: String,
}

/// GitHub access goes through the `gh` CLI so credentials stay in the user's
/// existing `gh auth` setup. Held behind `Arc` because both startup checks
/// run on background threads.
#[derive(Clone)]
pub struct GhClient {
    runner: Arc<dyn ProcessRunner>,
    clock: Arc<dyn Clock>,
    github: GithubConfig,
}

impl GhClient {
    pub fn new(runner: Arc<dyn ProcessRunner>, clock: Arc<dyn Clock>, github: GithubConfig) -> Self {
        Self {
            runner,
            clock,
            github,
        }
    }

    /// Credential probe: `gh api user`. Fails when the token is missing,
    /// expired, or lacks scopes.
    pub fn auth_user(&self, timeout: Duration) -> Result<AuthUser, GhdashError> {
        append_run_log("info", "github.auth.started", json!({}));
        let out = self.run_bounded(
            ProcessRequest {
                program: "gh".to_string(),
                args: vec!["api".to_string(), "user".to_string()],
                cwd: None,
            },
            timeout,
        )?;
        let user: AuthUser = serde_json::from_str(&out.stdout)
            .map_err(|e| GhdashError::Api(format!("invalid gh api user json: {e}")))?;
        append_run_log(
            "info",
            "github.auth.succeeded",
            json!({ "login": user.login }),
        );
        Ok(user)
    }

    /// Latest published release of the dashboard itself.
    pub fn latest_release(&self, timeout: Duration) -> Result<ReleaseView, GhdashError> {
        let path = format!(
            "repos/{}/{}/releases/latest",
            self.github.owner, self.github.repo
        );
        append_run_log("info", "github.release.started", json!({ "path": path }));
        let out = self.run_bounded(
            ProcessRequest {
                program: "gh".to_string(),
                args: vec!["api".to_string(), path],
                cwd: None,
            },
            timeout,
        )?;
        let release: ReleaseView = serde_json::from_str(&out.stdout)
            .map_err(|e| GhdashError::Api(format!("invalid gh release json: {e}")))?;
        append_run_log(
            "info",
            "github.release.fetched",
            json!({ "tag_name": release.tag_name }),
        );
        Ok(release)
    }

    /// Runs the request with a hard deadline: a watchdog thread kills the
    /// child when the timeout expires, so a wedged network call cannot hold a
    /// startup check open forever.
    fn run_bounded(
        &self,
        request: ProcessRequest,
        timeout: Duration,
    ) -> Result<ProcessOutput, GhdashError> {
        let handle = self.runner.spawn(request)?;
        let deadline = self.clock.now() + timeout;

        let watchdog_runner = Arc::clone(&self.runner);
        let watchdog_clock = Arc::clone(&self.clock);
        std::thread::spawn(move || {
            let _ = watchdog_clock.sleep_until(deadline);
            // Unknown-handle errors mean the call already finished.
            let _ = watchdog_runner.kill(handle);
        });

        let out = match self.runner.wait(handle) {
            Ok(out) => out,
            Err(GhdashError::Timeout(_)) => {
                append_run_log(
                    "error",
                    "github.call.timed_out",
                    json!({ "timeout_seconds": timeout.as_secs() }),
                );
                return Err(GhdashError::Timeout(format!(
                    "gh call timed out after {}s",
                    timeout.as_secs()
                )));
            }
            Err(other) => return Err(other),
        };
        if out.exit_code != 0 {
            append_run_log(
                "error",
                "github.call.failed",
                json!({
                    "exit_code": out.exit_code,
                    "stderr": out.stderr
                }),
            );
            return Err(GhdashError::Api(format!("gh call failed: {}", out.stderr)));
        }
        Ok(out)
    }
}
