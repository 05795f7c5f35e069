use thiserror::Error;

#[derive(Debug, Error)]
pub enum GhdashError {
    #[error("io error: {0}")]
    Io(String),
    #[error("config parse error: {0}")]
    ConfigParse(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("cli error: {0}")]
    Cli(String),
    #[error("process error: {0}")]
    Process(String),
    #[error("timed out: {0}")]
    Timeout(String),
    #[error("github api error: {0}")]
    Api(String),
    #[error("channel error: {0}")]
    Channel(String),
}
