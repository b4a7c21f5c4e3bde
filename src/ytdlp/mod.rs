pub mod client;
pub mod models;

pub use client::{YtDlpClient, YtDlpError};
pub use models::{ProcessEvent, YtDlpConfig};
