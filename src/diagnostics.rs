use tracing_subscriber::EnvFilter;

use crate::models::config::LoggingSettings;

/// Install the stderr `tracing` subscriber. `PILLROUTINE_LOG` overrides the
/// configured level. Safe to call more than once; later calls are ignored.
pub fn init(settings: &LoggingSettings) {
    let filter = EnvFilter::try_from_env("PILLROUTINE_LOG")
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
