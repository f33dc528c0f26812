//! Logging and tracing configuration
//!
//! Runs log to stderr and, when the data directory is writable, to a log file
//! that `orbit-e2e logs` can show after the fact.

use std::fs::File;
use std::path::PathBuf;

use tracing::Subscriber;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt, EnvFilter, Layer,
};

use super::paths;

/// Initialize tracing for the CLI (stderr + file logging)
///
/// Logs are controlled by the `RUST_LOG` environment variable.
/// Default level is INFO for this crate, WARN for dependencies.
/// Returns the path of the log file when file logging could be set up.
pub fn init_cli() -> Option<PathBuf> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("orbit_e2e=info,warn"));

    let (file, log_path) = match open_log_file() {
        Some((file, path)) => (Some(file), Some(path)),
        None => (None, None),
    };

    subscriber(filter, file).init();
    log_path
}

fn open_log_file() -> Option<(File, PathBuf)> {
    let log_dir = paths::log_dir()?;
    std::fs::create_dir_all(&log_dir).ok()?;
    let log_file = log_dir.join(paths::LOG_FILE_NAME);

    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)
    {
        Ok(file) => Some((file, log_file)),
        Err(e) => {
            eprintln!("Warning: Could not open log file: {}", e);
            None
        }
    }
}

/// Registry with the stderr layer and, when given a file, the file layer
fn subscriber(filter: EnvFilter, file: Option<File>) -> impl Subscriber + Send + Sync + 'static {
    // File logging with full details
    let file_layer = file.map(|file| {
        fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer())
}

fn stderr_layer<S>() -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
}

/// Read the last `lines` lines of the run log
pub fn tail_log(lines: usize) -> std::io::Result<Vec<String>> {
    let Some(path) = paths::log_path() else {
        return Ok(Vec::new());
    };
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(&path)?;
    let all: Vec<&str> = content.lines().collect();
    let start = all.len().saturating_sub(lines);
    Ok(all[start..].iter().map(|l| l.to_string()).collect())
}

/// Truncate the run log file
pub fn truncate_log() -> std::io::Result<()> {
    if let Some(path) = paths::log_path() {
        if path.exists() {
            std::fs::write(&path, "")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_layer_receives_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(paths::LOG_FILE_NAME);
        let file = File::create(&path).unwrap();

        let subscriber = subscriber(EnvFilter::new("info"), Some(file));
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(fragment = "MoveTab", "Executing fragment");
            tracing::debug!("filtered out");
        });

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Executing fragment"), "{content}");
        assert!(content.contains("fragment=\"MoveTab\""), "{content}");
        assert!(!content.contains("filtered out"));
    }

    #[test]
    fn test_stderr_only_subscriber() {
        let subscriber = subscriber(EnvFilter::new("warn"), None);
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("stderr only");
        });
    }
}
