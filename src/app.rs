use crate::application::{DownloadCoordinator, DownloadEvent, DownloadId};
use crate::domain::{AppError, DownloadPhase};
use crate::ui::{DownloadMessage, DownloadView};
use crate::utils::parse_progress;
use crate::ytdlp::{YtDlpClient, YtDlpConfig};
use iced::Task;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

pub struct DownloaderApp {
    view: DownloadView,
    coordinator: DownloadCoordinator,
}

impl Default for DownloaderApp {
    fn default() -> Self {
        Self::new(YtDlpConfig::default())
    }
}

impl DownloaderApp {
    pub fn new(config: YtDlpConfig) -> Self {
        Self {
            view: DownloadView::default(),
            coordinator: DownloadCoordinator::new(YtDlpClient::new(config)),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(DownloadMessage),
    FolderSelected(Option<PathBuf>),
    /// Event from the running downloader, tagged with the download it belongs to
    Download(DownloadId, DownloadEvent),
}

pub fn update(app: &mut DownloaderApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => {
            app.view.update(ui_msg.clone());

            match ui_msg {
                DownloadMessage::DownloadPressed => return start_download(app),
                DownloadMessage::CancelPressed => {
                    if app.coordinator.cancel().is_some() {
                        app.view.phase = DownloadPhase::Cancelled;
                        app.view.download_progress = 0.0;
                        app.view.status_message = "Download cancelled".to_string();
                    }
                }
                DownloadMessage::BrowsePressed => {
                    let folder = app.view.folder.trim();
                    let start = (!folder.is_empty()).then(|| PathBuf::from(folder));
                    return Task::perform(
                        DownloadCoordinator::choose_folder(start),
                        Message::FolderSelected,
                    );
                }
                _ => {}
            }
        }
        Message::FolderSelected(folder) => {
            if let Some(folder) = folder {
                app.view.folder = folder.display().to_string();
            }
        }
        Message::Download(id, event) => {
            if !app.coordinator.is_current(id) {
                debug!(id = ?id, "dropping event from inactive download");
                return Task::none();
            }
            handle_download_event(app, id, event);
        }
    }
    Task::none()
}

fn start_download(app: &mut DownloaderApp) -> Task<Message> {
    let previous = app.view.phase;
    if !previous.is_busy() {
        app.view.phase = DownloadPhase::Building;
    }

    let request = match app.coordinator.prepare(
        &app.view.url,
        app.view.format.as_str(),
        &app.view.folder,
    ) {
        Ok(request) => request,
        Err(e) => {
            app.view.phase = previous;
            app.view.output.push(e.to_string());
            return Task::none();
        }
    };

    debug!(command = ?app.coordinator.command_line(&request), "download requested");

    match app.coordinator.start(&request) {
        Ok((id, events)) => {
            app.view.output.clear();
            app.view.download_progress = 0.0;
            app.view.phase = DownloadPhase::Spawning;
            app.view.status_message = format!("Starting: {}", request.url());

            // Runs on the iced executor, results come back through update()
            Task::stream(events).map(move |event| Message::Download(id, event))
        }
        Err(e) => {
            // Only reachable while another download holds the slot
            warn!("{}", e);
            app.view.phase = previous;
            app.view.status_message = e.to_string();
            Task::none()
        }
    }
}

fn handle_download_event(app: &mut DownloaderApp, id: DownloadId, event: DownloadEvent) {
    match event {
        DownloadEvent::Started => {
            app.view.phase = DownloadPhase::Streaming;
            app.view.status_message = "Downloading...".to_string();
        }
        DownloadEvent::Output(line) => {
            if let Some(progress) = parse_progress(&line) {
                app.view.download_progress = progress;
                app.view.status_message = format!("Downloading: {:.1}%", progress * 100.0);
            }
            app.view.output.push(line);
        }
        DownloadEvent::Exited(code) => {
            app.coordinator.finish(id);
            app.view.phase = DownloadPhase::Completed(code);
            app.view.status_message = match code {
                Some(code) => format!("Completed with exit code {}", code),
                None => "Completed (terminated by signal)".to_string(),
            };
            info!(id = ?id, "{}", app.view.status_message);
        }
        DownloadEvent::Failed(e) => {
            app.coordinator.finish(id);
            error!(id = ?id, "download failed: {}", e);
            app.view.phase = DownloadPhase::Failed;
            app.view.download_progress = 0.0;
            app.view.output.push(format!("Error: {}", e));
            app.view.status_message = match e {
                AppError::Spawn(_) => "Could not start the downloader".to_string(),
                _ => "Download failed".to_string(),
            };
        }
    }
}

pub fn view(app: &DownloaderApp) -> iced::Element<'_, Message> {
    app.view.view().map(Message::UiMessage)
}
