use std::collections::VecDeque;

use iced::{
    widget::{
        button, column, container, pick_list, progress_bar, row, scrollable, text, text_input,
        Text,
    },
    Element, Font, Length,
};

use crate::domain::{DownloadPhase, FormatPreset};

const MAX_OUTPUT_LINES: usize = 5_000;

/// Scrollback for the downloader's console output.
///
/// The joined text is kept alongside the lines so rendering never rebuilds it.
#[derive(Debug, Default)]
pub struct OutputLog {
    lines: VecDeque<String>,
    text: String,
}

impl OutputLog {
    pub fn push(&mut self, line: impl Into<String>) {
        if self.lines.len() == MAX_OUTPUT_LINES {
            if let Some(oldest) = self.lines.pop_front() {
                self.text.replace_range(..oldest.len() + 1, "");
            }
        }
        let line = line.into();
        self.text.push_str(&line);
        self.text.push('\n');
        self.lines.push_back(line);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.text.clear();
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn contents(&self) -> &str {
        &self.text
    }
}

fn label(content: &str) -> Text<'_> {
    text(content).size(16).width(Length::Fixed(140.0))
}

/// Main view state
pub struct DownloadView {
    pub url: String,
    pub format: FormatPreset,
    pub folder: String,
    pub phase: DownloadPhase,
    pub status_message: String,
    pub download_progress: f32,
    pub output: OutputLog,
}

impl Default for DownloadView {
    fn default() -> Self {
        Self {
            url: String::new(),
            format: FormatPreset::default(),
            folder: String::new(),
            phase: DownloadPhase::Idle,
            status_message: "Enter a video URL to download".to_string(),
            download_progress: 0.0,
            output: OutputLog::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum DownloadMessage {
    UrlChanged(String),
    FormatSelected(FormatPreset),
    FolderChanged(String),
    BrowsePressed,
    DownloadPressed,
    CancelPressed,
}

impl DownloadView {
    pub fn update(&mut self, message: DownloadMessage) {
        match message {
            DownloadMessage::UrlChanged(url) => {
                self.url = url;
            }
            DownloadMessage::FormatSelected(format) => {
                self.format = format;
            }
            DownloadMessage::FolderChanged(folder) => {
                self.folder = folder;
            }
            DownloadMessage::BrowsePressed
            | DownloadMessage::DownloadPressed
            | DownloadMessage::CancelPressed => {
                // Will be handled by the app
            }
        }
    }

    pub fn trigger_enabled(&self) -> bool {
        !self.phase.is_busy()
    }

    pub fn view(&self) -> Element<'_, DownloadMessage> {
        let busy = self.phase.is_busy();

        let url_row = row![
            label("Video URL:"),
            text_input("https://...", &self.url)
                .on_input(DownloadMessage::UrlChanged)
                .on_submit(DownloadMessage::DownloadPressed)
                .padding(8),
        ]
        .spacing(10);

        let format_row = row![
            label("Format:"),
            pick_list(
                &FormatPreset::ALL[..],
                Some(self.format),
                DownloadMessage::FormatSelected
            )
            .width(Length::Fill),
        ]
        .spacing(10);

        let folder_row = row![
            label("Download Folder:"),
            text_input("Default folder", &self.folder)
                .on_input(DownloadMessage::FolderChanged)
                .padding(8),
            button("Browse...")
                .on_press_maybe((!busy).then_some(DownloadMessage::BrowsePressed))
                .padding([8, 16]),
        ]
        .spacing(10);

        let actions = row![
            button("Download")
                .on_press_maybe(self.trigger_enabled().then_some(DownloadMessage::DownloadPressed))
                .padding([10, 20]),
            button("Cancel")
                .on_press_maybe(busy.then_some(DownloadMessage::CancelPressed))
                .padding([10, 20]),
            text(&self.status_message).size(14),
        ]
        .spacing(10);

        let output = scrollable(
            container(text(self.output.contents()).font(Font::MONOSPACE).size(13))
                .width(Length::Fill)
                .padding(8),
        )
        .anchor_bottom()
        .height(Length::Fill);

        column![
            url_row,
            format_row,
            folder_row,
            actions,
            progress_bar(0.0..=1.0, self.download_progress),
            output,
        ]
        .padding(20)
        .spacing(10)
        .into()
    }
}
