use super::client::YtDlpError;

/// Configuration for the yt-dlp client
#[derive(Debug, Clone)]
pub struct YtDlpConfig {
    /// Executable to launch, looked up on `PATH` when not a path
    pub program: String,
    /// Arguments placed before the format selector, e.g. `["-m", "yt_dlp"]` for `python`
    pub base_args: Vec<String>,
}

impl Default for YtDlpConfig {
    fn default() -> Self {
        Self {
            program: "yt-dlp".to_string(),
            base_args: Vec::new(),
        }
    }
}

/// A fully built command line, program first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

/// Events emitted while a yt-dlp process runs
#[derive(Debug)]
pub enum ProcessEvent {
    Started { pid: Option<u32> },
    /// One line of merged stdout/stderr, terminator stripped
    Line(String),
    /// `code` is `None` when the process was killed by a signal
    Exited { code: Option<i32> },
    Failed(YtDlpError),
}
