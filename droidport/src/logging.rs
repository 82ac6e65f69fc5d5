use droidport_core::error::{PortError, Result};
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_ENV: &str = "DROIDPORT_LOG";

/// Flag-chosen level, if the user passed -v/-q.
pub fn flag_level(verbose: u8, quiet: bool) -> Option<&'static str> {
    match (quiet, verbose) {
        (true, _) => Some("error"),
        (false, 0) => None,
        (false, 1) => Some("debug"),
        (false, _) => Some("trace"),
    }
}

/// Flags beat `DROIDPORT_LOG`, which beats the settings file; default `info`.
fn build_env_filter(flag: Option<&str>, configured: Option<&str>) -> Result<EnvFilter> {
    if let Some(level) = flag {
        return Ok(EnvFilter::new(level));
    }
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }
    let level = configured.unwrap_or("info");
    EnvFilter::try_new(level)
        .map_err(|e| PortError::Config(format!("invalid log_level {level:?}: {e}")))
}

/// Install the global subscriber; logs go to stderr.
pub fn init_logging(flag: Option<&str>, configured: Option<&str>) -> Result<()> {
    let filter = build_env_filter(flag, configured)?;
    Registry::default()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| PortError::Config(format!("logging already initialised: {e}")))
}
