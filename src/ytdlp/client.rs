use std::process::Stdio;

use futures::stream::{self, BoxStream};
use futures::StreamExt;
use thiserror::Error;
use std::io::PipeReader;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tracing::{debug, error, info, warn};

use super::models::{Invocation, ProcessEvent, YtDlpConfig};
use crate::domain::DownloadRequest;
use crate::utils::ConsoleLines;

const FORMAT_FLAG: &str = "-f";
const PATHS_FLAG: &str = "--paths";
const READ_CHUNK: usize = 4096;

#[derive(Error, Debug)]
pub enum YtDlpError {
    #[error("could not launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not create output pipe: {0}")]
    Pipe(#[source] std::io::Error),

    #[error("failed waiting for process: {0}")]
    Wait(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, YtDlpError>;

#[derive(Clone)]
pub struct YtDlpClient {
    config: YtDlpConfig,
}

impl YtDlpClient {
    pub fn new(config: YtDlpConfig) -> Self {
        Self { config }
    }

    /// `program [base_args] -f <format> [--paths <dir>] <url>`
    pub fn invocation(&self, request: &DownloadRequest) -> Invocation {
        let mut args = self.config.base_args.clone();
        args.push(FORMAT_FLAG.to_string());
        args.push(request.format().to_string());
        if let Some(dir) = request.output_dir() {
            args.push(PATHS_FLAG.to_string());
            args.push(dir.to_string_lossy().into_owned());
        }
        args.push(request.url().to_string());

        Invocation {
            program: self.config.program.clone(),
            args,
        }
    }

    /// Argument vector for the request, program name first
    pub fn build_command(&self, request: &DownloadRequest) -> Vec<String> {
        self.invocation(request).argv()
    }

    /// Run the downloader and stream its merged output.
    ///
    /// Nothing is spawned until the stream is polled. Dropping the stream kills
    /// the child.
    pub fn run(&self, request: &DownloadRequest) -> BoxStream<'static, ProcessEvent> {
        stream::unfold(
            RunState::Start {
                invocation: self.invocation(request),
            },
            |state| async move {
                match state {
                    RunState::Start { invocation } => match spawn(&invocation) {
                        Ok((child, output)) => {
                            let pid = child.id();
                            info!(pid = ?pid, command = ?invocation.argv(), "downloader started");
                            Some((
                                ProcessEvent::Started { pid },
                                RunState::Streaming {
                                    child,
                                    lines: pipe_lines(output),
                                },
                            ))
                        }
                        Err(e) => {
                            error!(command = ?invocation.argv(), "{}", e);
                            Some((ProcessEvent::Failed(e), RunState::Finished))
                        }
                    },
                    RunState::Streaming {
                        mut child,
                        mut lines,
                    } => match lines.next().await {
                        Some(line) => {
                            debug!(target: "ytdlp_gui::output", "{}", line);
                            Some((
                                ProcessEvent::Line(line),
                                RunState::Streaming { child, lines },
                            ))
                        }
                        None => match child.wait().await {
                            Ok(status) => {
                                let code = status.code();
                                match code {
                                    Some(code) => info!("completed with exit code {}", code),
                                    None => info!("completed without exit code ({})", status),
                                }
                                Some((ProcessEvent::Exited { code }, RunState::Finished))
                            }
                            Err(e) => {
                                error!("failed waiting for downloader: {}", e);
                                Some((
                                    ProcessEvent::Failed(YtDlpError::Wait(e)),
                                    RunState::Finished,
                                ))
                            }
                        },
                    },
                    RunState::Finished => None,
                }
            },
        )
        .boxed()
    }
}

enum RunState {
    Start {
        invocation: Invocation,
    },
    Streaming {
        child: Child,
        lines: BoxStream<'static, String>,
    },
    Finished,
}

/// Spawn with stdout and stderr sharing one pipe, so lines keep the order the
/// tool wrote them in. Returns the read end.
fn spawn(invocation: &Invocation) -> Result<(Child, tokio::fs::File)> {
    let (reader, writer) = std::io::pipe().map_err(YtDlpError::Pipe)?;
    let stderr = writer.try_clone().map_err(YtDlpError::Pipe)?;

    // The command and its copies of the write end drop at the end of this
    // function, so the reader sees EOF once the child side closes.
    let child = Command::new(&invocation.program)
        .args(&invocation.args)
        .stdin(Stdio::null())
        .stdout(writer)
        .stderr(stderr)
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| YtDlpError::Spawn {
            program: invocation.program.clone(),
            source,
        })?;

    Ok((child, tokio::fs::File::from_std(into_file(reader))))
}

#[cfg(unix)]
fn into_file(reader: PipeReader) -> std::fs::File {
    std::os::fd::OwnedFd::from(reader).into()
}

#[cfg(windows)]
fn into_file(reader: PipeReader) -> std::fs::File {
    std::os::windows::io::OwnedHandle::from(reader).into()
}

/// Lines read from one pipe until EOF. A read error ends the pipe.
fn pipe_lines<R>(pipe: R) -> BoxStream<'static, String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    stream::unfold(Some((pipe, ConsoleLines::default())), |state| async move {
        let (mut pipe, mut lines) = state?;
        let mut chunk = [0u8; READ_CHUNK];
        match pipe.read(&mut chunk).await {
            Ok(0) => Some((lines.finish().into_iter().collect::<Vec<_>>(), None)),
            Ok(n) => {
                let complete = lines.push(&chunk[..n]);
                Some((complete, Some((pipe, lines))))
            }
            Err(e) => {
                warn!("error reading downloader output: {}", e);
                Some((lines.finish().into_iter().collect::<Vec<_>>(), None))
            }
        }
    })
    .flat_map(stream::iter)
    .boxed()
}
