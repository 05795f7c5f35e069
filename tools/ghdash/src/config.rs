use crate::errors::GhdashError;
use crate::runtime::FileSystem;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub check_timeout_seconds: Option<u64>,
    pub startup_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    pub github: GithubConfig,
    pub checks: ChecksConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GithubConfig {
    pub owner: String,
    pub repo: String,
    pub release_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChecksConfig {
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UiConfig {
    pub tick_millis: u64,
    pub frame_width: u16,
    pub frame_height: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            github: GithubConfig {
                owner: "ghdash-dev".to_string(),
                repo: "ghdash".to_string(),
                release_url: "https://github.com/ghdash-dev/ghdash/releases".to_string(),
            },
            checks: ChecksConfig {
                timeout_seconds: 20,
            },
            ui: UiConfig {
                tick_millis: 100,
                frame_width: 120,
                frame_height: 30,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialAppConfig {
    github: Option<PartialGithubConfig>,
    checks: Option<PartialChecksConfig>,
    ui: Option<PartialUiConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialGithubConfig {
    owner: Option<String>,
    repo: Option<String>,
    release_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialChecksConfig {
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialUiConfig {
    tick_millis: Option<u64>,
    frame_width: Option<u16>,
    frame_height: Option<u16>,
}

pub fn load_config(
    overrides: &CliOverrides,
    fs: &dyn FileSystem,
) -> Result<AppConfig, GhdashError> {
    let mut cfg = AppConfig::default();

    if let Some(path) = &overrides.config_path {
        let file_contents = fs.read_to_string(path)?;
        let partial: PartialAppConfig = toml::from_str(&file_contents)
            .map_err(|e| GhdashError::ConfigParse(e.to_string()))?;
        merge_partial_config(&mut cfg, partial);
    }

    apply_cli_overrides(&mut cfg, overrides);
    validate_config(&cfg)?;
    Ok(cfg)
}

fn merge_partial_config(cfg: &mut AppConfig, partial: PartialAppConfig) {
    if let Some(github) = partial.github {
        if let Some(owner) = github.owner {
            cfg.github.owner = owner;
        }
        if let Some(repo) = github.repo {
            cfg.github.repo = repo;
        }
        if let Some(release_url) = github.release_url {
            cfg.github.release_url = release_url;
        }
    }

    if let Some(checks) = partial.checks {
        if let Some(timeout_seconds) = checks.timeout_seconds {
            cfg.checks.timeout_seconds = timeout_seconds;
        }
    }

    if let Some(ui) = partial.ui {
        if let Some(tick_millis) = ui.tick_millis {
            cfg.ui.tick_millis = tick_millis;
        }
        if let Some(frame_width) = ui.frame_width {
            cfg.ui.frame_width = frame_width;
        }
        if let Some(frame_height) = ui.frame_height {
            cfg.ui.frame_height = frame_height;
        }
    }
}

fn apply_cli_overrides(cfg: &mut AppConfig, overrides: &CliOverrides) {
    if let Some(owner) = &overrides.owner {
        cfg.github.owner = owner.clone();
    }
    if let Some(repo) = &overrides.repo {
        cfg.github.repo = repo.clone();
    }
    if let Some(timeout) = overrides.check_timeout_seconds {
        cfg.checks.timeout_seconds = timeout;
    }
}

fn validate_config(cfg: &AppConfig) -> Result<(), GhdashError> {
    if cfg.github.owner.trim().is_empty() {
        return Err(GhdashError::InvalidConfig(
            "github.owner must not be empty".to_string(),
        ));
    }
    if cfg.github.repo.trim().is_empty() {
        return Err(GhdashError::InvalidConfig(
            "github.repo must not be empty".to_string(),
        ));
    }
    if cfg.checks.timeout_seconds == 0 {
        return Err(GhdashError::InvalidConfig(
            "checks.timeout_seconds must be greater than zero".to_string(),
        ));
    }
    if cfg.ui.tick_millis == 0 {
        return Err(GhdashError::InvalidConfig(
            "ui.tick_millis must be greater than zero".to_string(),
        ));
    }
    if cfg.ui.frame_width == 0 || cfg.ui.frame_height == 0 {
        return Err(GhdashError::InvalidConfig(
            "ui frame dimensions must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
