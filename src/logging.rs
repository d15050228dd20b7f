//! Optional `tracing` scaffolding a caller may invoke once at process start.
//! The library itself only ever emits events through `tracing`; it never
//! installs a global subscriber on its own.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::error::{DmdError, Result};

/// Install a `tracing` subscriber. If `log_path` is given, logs go to a
/// non-blocking file appender (rolled on each run) behind an `EnvFilter`;
/// otherwise a plain stderr subscriber is installed. Returns the appender's
/// `WorkerGuard` when one was created — drop it only at process exit, or
/// buffered log lines can be lost.
pub fn init_tracing(log_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    match log_path {
        Some(path) => {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| DmdError::InvalidConfig("log path has no file name".into()))?;
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let result = tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .with_writer(writer)
                .try_init();
            if result.is_err() {
                // A subscriber is already installed (e.g. a test harness ran
                // first); keep the guard's drop semantics but don't treat
                // this as fatal.
                return Ok(Some(guard));
            }
            Ok(Some(guard))
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .try_init();
            Ok(None)
        }
    }
}
