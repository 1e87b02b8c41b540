// Copyright (c) 2026 rezky_nightky

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Keeps the background log writer alive; logs are flushed when dropped.
pub struct LogGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join(concat!(env!("CARGO_PKG_NAME"), ".log"))
}

/// Sends all tracing output to `path`. The terminal is busy drawing rain, so
/// nothing goes to stdout or stderr. `RUST_LOG` overrides the `info` default.
pub fn init_file_logging(path: &Path) -> Result<LogGuard> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(LogGuard { _guard: guard })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_is_in_temp_dir() {
        let p = default_log_path();
        assert!(p.starts_with(std::env::temp_dir()));
        assert_eq!(p.file_name().unwrap(), "glyphrain.log");
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no/such/dir/x.log");
        assert!(init_file_logging(&missing).is_err());
    }
}
