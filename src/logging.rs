//! Log output for the runner's step log

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::LOG_ENV;

/// Install the global subscriber writing plain lines to stdout.
///
/// The filter comes from `SETUP_TOR_LOG` and defaults to `info`. Keep the
/// returned guard alive until the process exits so buffered lines are flushed.
pub fn init_logging() -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(std::env::var(LOG_ENV).ok().as_deref()))
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .init();

    guard
}

fn env_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}
