use std::fs;
use std::path::Path;

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, EnvFilter};

use crate::errors::{RelayError, RelayResult};

/// Initialize logging to the file at `path`, appending to what is there.
///
/// `RUST_LOG` takes precedence over `level`. Must be called once at
/// startup; the returned guard flushes pending lines when dropped, so keep
/// it alive until the run is over.
pub fn init_logging(path: &Path, level: &str) -> RelayResult<WorkerGuard> {
    let file_name = path
        .file_name()
        .ok_or_else(|| RelayError::Logging(format!("{} is not a file path", path.display())))?;
    let dir = log_directory(path);
    fs::create_dir_all(dir)?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(dir)
        .map_err(|e| RelayError::Logging(e.to_string()))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| RelayError::Logging(format!("invalid log level {:?}: {}", level, e)))?;

    fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| RelayError::Logging(e.to_string()))?;

    info!("Logging initialized");
    Ok(guard)
}

fn log_directory(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_file_name_logs_to_working_directory() {
        assert_eq!(log_directory(Path::new("feed-relay.log")), Path::new("."));
        assert_eq!(
            log_directory(Path::new("/var/log/relay/feed-relay.log")),
            Path::new("/var/log/relay")
        );
    }

    #[test]
    fn test_directory_path_rejected() {
        let result = init_logging(Path::new("/"), "info");
        assert!(matches!(result, Err(RelayError::Logging(_))));
    }
}
