pub mod config;
pub mod errors;
pub mod events;
pub mod github;
pub mod hotkeys;
pub mod lock;
pub mod logging;
pub mod runtime;
pub mod startup;
pub mod status;
pub mod tui;
pub mod version;

use clap::{error::ErrorKind, Parser};
use config::{load_config, CliOverrides};
use errors::GhdashError;
use events::run_dashboard;
use runtime::DashRuntime;

#[derive(Debug, Clone, Parser)]
#[command(name = "ghdash")]
#[command(about = "Terminal dashboard for GitHub Actions")]
pub struct Cli {
    #[arg(long)]
    pub config: Option<std::path::PathBuf>,
    #[arg(long)]
    pub owner: Option<String>,
    #[arg(long)]
    pub repo: Option<String>,
    #[arg(long = "check-timeout")]
    pub check_timeout_seconds: Option<u64>,
    /// Run the startup checks, draw the final frame, and exit: 0 once the
    /// credential check passes, 1 when it fails.
    #[arg(long, default_value_t = false)]
    pub startup_only: bool,
}

pub fn run() -> Result<i32, GhdashError> {
    let args = std::env::args_os().collect::<Vec<_>>();
    let runtime = DashRuntime::new();
    run_with_runtime(&args, &runtime)
}

pub fn run_with_runtime(
    args: &[std::ffi::OsString],
    runtime: &DashRuntime,
) -> Result<i32, GhdashError> {
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => match error.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{error}");
                return Ok(0);
            }
            _ => return Err(GhdashError::Cli(error.to_string())),
        },
    };

    let overrides = CliOverrides {
        config_path: cli.config.clone(),
        owner: cli.owner.clone(),
        repo: cli.repo.clone(),
        check_timeout_seconds: cli.check_timeout_seconds,
        startup_only: cli.startup_only,
    };

    let cfg = load_config(&overrides, runtime.file_system.as_ref())?;
    run_dashboard(runtime, &cfg, cli.startup_only)
}
