use std::path::PathBuf;

use futures::future::{AbortHandle, Abortable};
use futures::stream::BoxStream;
use futures::StreamExt;
use tracing::{debug, info, warn};

use crate::{
    domain::{AppError, DownloadRequest},
    utils::is_absolute_url,
    ytdlp::{ProcessEvent, YtDlpClient, YtDlpError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DownloadId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadEvent {
    Started,
    Output(String),
    Exited(Option<i32>),
    Failed(AppError),
}

impl From<ProcessEvent> for DownloadEvent {
    fn from(event: ProcessEvent) -> Self {
        match event {
            ProcessEvent::Started { pid } => {
                debug!(pid = ?pid, "downloader process running");
                DownloadEvent::Started
            }
            ProcessEvent::Line(line) => DownloadEvent::Output(line),
            ProcessEvent::Exited { code } => DownloadEvent::Exited(code),
            ProcessEvent::Failed(e @ YtDlpError::Spawn { .. }) => {
                DownloadEvent::Failed(AppError::Spawn(e.to_string()))
            }
            ProcessEvent::Failed(e) => DownloadEvent::Failed(AppError::Process(e.to_string())),
        }
    }
}

struct ActiveDownload {
    id: DownloadId,
    abort: AbortHandle,
}

/// Owns the single download slot. A second start while one runs is rejected.
pub struct DownloadCoordinator {
    client: YtDlpClient,
    active: Option<ActiveDownload>,
    next_id: u64,
}

impl DownloadCoordinator {
    pub fn new(client: YtDlpClient) -> Self {
        Self {
            client,
            active: None,
            next_id: 0,
        }
    }

    pub fn prepare(
        &self,
        url: &str,
        format: &str,
        folder: &str,
    ) -> Result<DownloadRequest, AppError> {
        let folder = folder.trim();
        let output_dir = (!folder.is_empty()).then(|| PathBuf::from(folder));
        let request = DownloadRequest::new(url, format, output_dir)?;

        if !is_absolute_url(request.url()) {
            warn!(url = %request.url(), "input is not an absolute URL, passing it through");
        }

        Ok(request)
    }

    pub fn command_line(&self, request: &DownloadRequest) -> Vec<String> {
        self.client.build_command(request)
    }

    pub fn start(
        &mut self,
        request: &DownloadRequest,
    ) -> Result<(DownloadId, BoxStream<'static, DownloadEvent>), AppError> {
        if let Some(active) = &self.active {
            warn!(active = ?active.id, url = %request.url(), "download already running, start rejected");
            return Err(AppError::Busy);
        }

        let id = DownloadId(self.next_id);
        self.next_id += 1;

        let (abort, registration) = AbortHandle::new_pair();
        let events = Abortable::new(self.client.run(request), registration)
            .map(DownloadEvent::from)
            .boxed();

        info!(id = ?id, url = %request.url(), format = %request.format(), "download queued");
        self.active = Some(ActiveDownload { id, abort });

        Ok((id, events))
    }

    /// Abort the in-flight download, killing its process.
    pub fn cancel(&mut self) -> Option<DownloadId> {
        let active = self.active.take()?;
        active.abort.abort();
        info!(id = ?active.id, "download cancelled");
        Some(active.id)
    }

    /// Release the slot held by `id`. Returns false for stale ids.
    pub fn finish(&mut self, id: DownloadId) -> bool {
        if self.is_current(id) {
            self.active = None;
            true
        } else {
            false
        }
    }

    pub fn is_current(&self, id: DownloadId) -> bool {
        self.active.as_ref().is_some_and(|active| active.id == id)
    }

    pub fn active_id(&self) -> Option<DownloadId> {
        self.active.as_ref().map(|active| active.id)
    }

    pub async fn choose_folder(start: Option<PathBuf>) -> Option<PathBuf> {
        let mut dialog = rfd::AsyncFileDialog::new().set_title("Choose download folder");
        if let Some(dir) = start.filter(|dir| dir.is_dir()) {
            dialog = dialog.set_directory(dir);
        }

        dialog
            .pick_folder()
            .await
            .map(|handle| handle.path().to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ytdlp::YtDlpConfig;
    use std::time::Duration;

    fn coordinator(program: &str, base_args: &[&str]) -> DownloadCoordinator {
        DownloadCoordinator::new(YtDlpClient::new(YtDlpConfig {
            program: program.to_string(),
            base_args: base_args.iter().map(|a| a.to_string()).collect(),
        }))
    }

    #[test]
    fn test_prepare_blank_url() {
        let coordinator = coordinator("yt-dlp", &[]);
        assert_eq!(
            coordinator.prepare("   ", "best", ""),
            Err(AppError::InvalidInput)
        );
    }

    #[test]
    fn test_prepare_folder() {
        let coordinator = coordinator("yt-dlp", &[]);
        let request = coordinator
            .prepare(" https://example.com/v ", "mp4", "  ")
            .unwrap();
        assert_eq!(
            coordinator.command_line(&request),
            ["yt-dlp", "-f", "mp4", "https://example.com/v"]
        );

        let request = coordinator
            .prepare("https://example.com/v", "mp4", " /data/videos ")
            .unwrap();
        assert_eq!(
            coordinator.command_line(&request),
            [
                "yt-dlp",
                "-f",
                "mp4",
                "--paths",
                "/data/videos",
                "https://example.com/v"
            ]
        );
    }

    #[test]
    fn test_second_start_rejected() {
        let mut coordinator = coordinator("yt-dlp", &[]);
        let request = coordinator.prepare("https://example.com/v", "best", "").unwrap();

        let (first, _events) = coordinator.start(&request).unwrap();
        assert!(matches!(coordinator.start(&request), Err(AppError::Busy)));
        assert_eq!(coordinator.active_id(), Some(first));

        assert!(coordinator.finish(first));
        let (second, _events) = coordinator.start(&request).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_finish_ignores_stale_id() {
        let mut coordinator = coordinator("yt-dlp", &[]);
        let request = coordinator.prepare("https://example.com/v", "best", "").unwrap();

        let (first, _events) = coordinator.start(&request).unwrap();
        assert_eq!(coordinator.cancel(), Some(first));
        let (second, _events) = coordinator.start(&request).unwrap();

        assert!(!coordinator.finish(first));
        assert!(coordinator.is_current(second));
    }

    #[tokio::test]
    async fn test_spawn_failure_event() {
        let mut coordinator = coordinator("definitely-not-a-real-downloader-7f3a", &[]);
        let request = coordinator.prepare("https://example.com/v", "best", "").unwrap();
        let (_, events) = coordinator.start(&request).unwrap();

        let events: Vec<_> = events.collect().await;
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], DownloadEvent::Failed(AppError::Spawn(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cancel_ends_stream() {
        let mut coordinator = coordinator("sh", &["-c", "echo started; sleep 30", "sh"]);
        let request = coordinator.prepare("https://example.com/v", "best", "").unwrap();
        let (_, mut events) = coordinator.start(&request).unwrap();

        assert_eq!(events.next().await, Some(DownloadEvent::Started));
        assert_eq!(
            events.next().await,
            Some(DownloadEvent::Output("started".to_string()))
        );

        coordinator.cancel();
        let next = tokio::time::timeout(Duration::from_secs(5), events.next())
            .await
            .unwrap();
        assert_eq!(next, None);
        assert_eq!(coordinator.active_id(), None);
    }
}
