use std::sync::LazyLock;

use regex::Regex;

static PROGRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[download\]\s+(\d{1,3}(?:\.\d+)?)%").expect("progress pattern is valid")
});

/// Extract the completion ratio (0.0 to 1.0) from a yt-dlp progress line
pub fn parse_progress(line: &str) -> Option<f32> {
    let caps = PROGRESS_RE.captures(line.trim_start())?;
    let percent: f32 = caps[1].parse().ok()?;
    Some((percent / 100.0).clamp(0.0, 1.0))
}

/// Whether the input parses as an absolute URL
pub fn is_absolute_url(input: &str) -> bool {
    url::Url::parse(input).is_ok()
}

/// Splits raw console bytes into lines.
///
/// `\n`, `\r\n` and a lone `\r` all terminate a line, so progress bars that
/// redraw with carriage returns come through one update per line. Bytes are
/// decoded lossily.
#[derive(Debug, Default)]
pub struct ConsoleLines {
    buf: Vec<u8>,
    after_cr: bool,
}

impl ConsoleLines {
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &byte in bytes {
            match byte {
                b'\n' if self.after_cr => self.after_cr = false,
                b'\n' | b'\r' => {
                    lines.push(self.take_line());
                    self.after_cr = byte == b'\r';
                }
                _ => {
                    self.after_cr = false;
                    self.buf.push(byte);
                }
            }
        }
        lines
    }

    /// Flush a trailing line that had no terminator.
    pub fn finish(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            None
        } else {
            Some(self.take_line())
        }
    }

    fn take_line(&mut self) -> String {
        let line = String::from_utf8_lossy(&self.buf).into_owned();
        self.buf.clear();
        line
    }
}
