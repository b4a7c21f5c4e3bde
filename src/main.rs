mod app;
mod application;
mod domain;
mod logging;
mod ui;
mod utils;
mod ytdlp;

use std::process::ExitCode;

use tracing::{error, info};

fn main() -> ExitCode {
    let settings = logging::LogSettings::default();
    let _log_guard = match logging::init(&settings) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("{}, continuing without a log file", e);
            None
        }
    };

    // Record panics anywhere in the app before the default hook reports them
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        error!("unhandled panic: {}", info);
        default_hook(info);
    }));

    info!(log = %settings.path().display(), "ytdlp-gui v{} starting", env!("CARGO_PKG_VERSION"));

    let result = iced::application(app::DownloaderApp::default, app::update, app::view)
        .title("yt-dlp Downloader")
        .window_size((650.0, 400.0))
        .run();

    match result {
        Ok(()) => {
            info!("ytdlp-gui exiting");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("application error: {}", e);
            ExitCode::FAILURE
        }
    }
}
