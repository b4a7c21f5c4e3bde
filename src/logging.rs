use std::path::PathBuf;

use tracing::level_filters::LevelFilter;
use tracing::Subscriber;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};

use crate::domain::AppError;

/// Where and how much to log
#[derive(Debug, Clone)]
pub struct LogSettings {
    pub directory: PathBuf,
    pub file_name: String,
    pub level: LevelFilter,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            directory: std::env::temp_dir().join("ytdlp-gui"),
            file_name: "ytdlp-gui.log".to_string(),
            level: LevelFilter::DEBUG,
        }
    }
}

impl LogSettings {
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

/// Keeps the background writer alive. Dropping it flushes pending records.
pub struct LogGuard {
    _worker: WorkerGuard,
}

/// Formatted subscriber writing timestamped, leveled records to `writer`
pub fn file_subscriber(writer: NonBlocking, level: LevelFilter) -> impl Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_max_level(level)
        .finish()
}

/// Open the log file and its background writer.
pub fn open(settings: &LogSettings) -> Result<(NonBlocking, WorkerGuard), AppError> {
    std::fs::create_dir_all(&settings.directory).map_err(|e| {
        AppError::Logging(format!(
            "Failed to create log directory {}: {}",
            settings.directory.display(),
            e
        ))
    })?;

    let appender = tracing_appender::rolling::never(&settings.directory, &settings.file_name);
    Ok(tracing_appender::non_blocking(appender))
}

/// Install the file subscriber as the process-wide default.
pub fn init(settings: &LogSettings) -> Result<LogGuard, AppError> {
    let (writer, worker) = open(settings)?;
    tracing::subscriber::set_global_default(file_subscriber(writer, settings.level))
        .map_err(|e| AppError::Logging(e.to_string()))?;

    Ok(LogGuard { _worker: worker })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(dir: &std::path::Path) -> LogSettings {
        LogSettings {
            directory: dir.join("logs"),
            file_name: "test.log".to_string(),
            level: LevelFilter::INFO,
        }
    }

    #[test]
    fn test_records_written_to_file() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = settings(tmp.path());

        let (writer, worker) = open(&settings).unwrap();
        tracing::subscriber::with_default(file_subscriber(writer, settings.level), || {
            tracing::info!("completed with exit code 0");
            tracing::debug!("filtered out");
            tracing::error!("could not launch `yt-dlp`");
        });
        drop(worker);

        let contents = std::fs::read_to_string(settings.path()).unwrap();
        assert!(contents.contains("INFO"));
        assert!(contents.contains("completed with exit code 0"));
        assert!(contents.contains("ERROR"));
        assert!(!contents.contains("filtered out"));
        assert!(!contents.contains('\u{1b}'));
    }

    #[test]
    fn test_default_path() {
        let settings = LogSettings::default();
        assert!(settings.path().ends_with("ytdlp-gui/ytdlp-gui.log"));
    }
}
