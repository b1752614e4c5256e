use clap::{ArgAction, Parser as ClapParser};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{EnvFilter, filter::Directive};

#[allow(clippy::upper_case_acronyms)]
#[derive(ClapParser, Debug, Clone)]
#[command(
    name = "growth-agent",
    version,
    about = "Collects project growth metrics once and broadcasts a summary"
)]
pub struct CLI {
    #[arg(
        long = "datadir",
        value_name = "DATA_DIRECTORY",
        default_value = "data",
        help = "Directory holding the metric series, CSV mirrors and milestone state.",
        env = "GROWTH_AGENT_DATA_DIR"
    )]
    pub datadir: PathBuf,
    #[arg(
        long = "log.level",
        default_value_t = Level::INFO,
        value_name = "LOG_LEVEL",
        help = "The verbosity level used for logs.",
        long_help = "Possible values: info, debug, trace, warn, error",
        env = "GROWTH_AGENT_LOG_LEVEL"
    )]
    pub log_level: Level,
    #[arg(
        long = "dry-run",
        action = ArgAction::SetTrue,
        help = "Log the messages instead of sending them to chat destinations.",
        long_help = "Metrics are still fetched and stored; only delivery is replaced.",
        env = "GROWTH_AGENT_DRY_RUN"
    )]
    pub dry_run: bool,
}

impl CLI {
    pub fn milestones_path(&self) -> PathBuf {
        self.datadir.join("milestones.json")
    }
}

pub fn init_tracing(log_level: Level) {
    let filter = EnvFilter::builder()
        .with_default_directive(Directive::from(log_level))
        .from_env_lossy();

    let include_target = matches!(log_level, Level::DEBUG | Level::TRACE);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(include_target)
        .init();
}
