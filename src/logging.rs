//! Log setup. The terminal belongs to the UI, so events go to a file.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Environment variable holding a filter directive, e.g. `vidshelf=debug`.
pub const LOG_ENV: &str = "VIDSHELF_LOG";

/// The directive in effect: `VIDSHELF_LOG` when set and non-empty, else the
/// configured level.
fn directive(from_env: Option<String>, configured: &str) -> String {
    from_env
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| configured.to_string())
}

fn build_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber, appending to `path` from a background
/// writer. Keep the returned guard alive until exit so buffered lines are
/// flushed.
pub fn init(path: &Path, configured_level: &str) -> Result<WorkerGuard, InitError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "vidshelf.log".to_string());

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(dir)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let directive = directive(std::env::var(LOG_ENV).ok(), configured_level);

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(build_filter(&directive))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .ok();
    Ok(guard)
}
