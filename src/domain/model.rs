use std::fmt;
use std::path::{Path, PathBuf};

use super::AppError;

/// One download as requested by the user. Built per click, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    url: String,
    format: String,
    output_dir: Option<PathBuf>,
}

impl DownloadRequest {
    /// Trims the URL and rejects it when nothing is left.
    pub fn new(
        url: &str,
        format: impl Into<String>,
        output_dir: Option<PathBuf>,
    ) -> Result<Self, AppError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(AppError::InvalidInput);
        }

        Ok(Self {
            url: url.to_string(),
            format: format.into(),
            output_dir: output_dir.filter(|dir| !dir.as_os_str().is_empty()),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }
}

/// Format selectors offered in the UI. The downloader accepts any selector string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatPreset {
    #[default]
    Best,
    Worst,
    BestVideo,
    BestAudio,
    Mp4,
    Webm,
}

impl FormatPreset {
    pub const ALL: [FormatPreset; 6] = [
        FormatPreset::Best,
        FormatPreset::Worst,
        FormatPreset::BestVideo,
        FormatPreset::BestAudio,
        FormatPreset::Mp4,
        FormatPreset::Webm,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FormatPreset::Best => "best",
            FormatPreset::Worst => "worst",
            FormatPreset::BestVideo => "bestvideo",
            FormatPreset::BestAudio => "bestaudio",
            FormatPreset::Mp4 => "mp4",
            FormatPreset::Webm => "webm",
        }
    }
}

impl fmt::Display for FormatPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadPhase {
    #[default]
    Idle,
    Building,
    Spawning,
    Streaming,
    Completed(Option<i32>),
    Failed,
    Cancelled,
}

impl DownloadPhase {
    /// While busy the trigger stays disabled.
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            DownloadPhase::Building | DownloadPhase::Spawning | DownloadPhase::Streaming
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_trims_url() {
        let request = DownloadRequest::new("  https://example.com/v \n", "mp4", None).unwrap();
        assert_eq!(request.url(), "https://example.com/v");
        assert_eq!(request.format(), "mp4");
        assert_eq!(request.output_dir(), None);
    }

    #[test]
    fn test_request_rejects_blank_url() {
        assert_eq!(
            DownloadRequest::new("", "best", None),
            Err(AppError::InvalidInput)
        );
        assert_eq!(
            DownloadRequest::new(" \t ", "best", None),
            Err(AppError::InvalidInput)
        );
    }

    #[test]
    fn test_request_drops_empty_dir() {
        let request =
            DownloadRequest::new("https://example.com/v", "best", Some(PathBuf::new())).unwrap();
        assert_eq!(request.output_dir(), None);
    }

    #[test]
    fn test_request_accepts_unknown_format() {
        let request =
            DownloadRequest::new("https://example.com/v", "bestvideo[height<=720]", None).unwrap();
        assert_eq!(request.format(), "bestvideo[height<=720]");
    }

    #[test]
    fn test_preset_names() {
        let names: Vec<_> = FormatPreset::ALL.iter().map(|p| p.to_string()).collect();
        assert_eq!(
            names,
            ["best", "worst", "bestvideo", "bestaudio", "mp4", "webm"]
        );
        assert_eq!(FormatPreset::default(), FormatPreset::Best);
    }

    #[test]
    fn test_busy_phases() {
        assert!(DownloadPhase::Spawning.is_busy());
        assert!(DownloadPhase::Streaming.is_busy());
        assert!(!DownloadPhase::Idle.is_busy());
        assert!(!DownloadPhase::Completed(Some(1)).is_busy());
        assert!(!DownloadPhase::Failed.is_busy());
        assert!(!DownloadPhase::Cancelled.is_busy());
    }
}
