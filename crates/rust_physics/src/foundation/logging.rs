//! Logging setup

pub use log::{debug, error, info, trace, warn};

/// Initialize logging with a fallback filter used when `RUST_LOG` is unset.
///
/// Returns an error if a logger was already installed, which lets tests and
/// demo binaries call this more than once without panicking.
pub fn try_init_with_default(filter: &str) -> Result<(), log::SetLoggerError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp_millis()
        .try_init()
}
