use std::fs;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "STRATAMIND_LOG";
const LOG_FILE_NAME: &str = "stratamind.log";

/// Commands keep stderr quiet unless asked; the TUI log file records the full session.
const COMMAND_FILTER: &str = "warn";
const TUI_FILTER: &str = "info,stratamind_core=debug,stratamind=debug";

fn env_filter(default_filter: &str) -> EnvFilter {
    filter_directives(
        std::env::var(LOG_ENV).ok(),
        std::env::var(EnvFilter::DEFAULT_ENV).ok(),
        default_filter,
    )
}

/// First parseable value wins: `STRATAMIND_LOG`, then `RUST_LOG`, then the default.
fn filter_directives(app_env: Option<String>, rust_log: Option<String>, default_filter: &str) -> EnvFilter {
    [app_env, rust_log]
        .into_iter()
        .flatten()
        .find_map(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(default_filter))
}

/// Log to stderr. Used by the one-shot commands, which keep stdout for the transcript.
pub fn init_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(COMMAND_FILTER))
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .try_init();
}

/// Log to a file, since the terminal UI owns the screen.
///
/// The returned guard flushes the background writer and must be held until exit.
pub fn init_file() -> Option<WorkerGuard> {
    let dir = log_directory()?;
    fs::create_dir_all(&dir).ok()?;

    let file_appender = tracing_appender::rolling::never(&dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(TUI_FILTER))
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .ok()?;

    Some(guard)
}

pub fn log_directory() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("stratamind"))
}
