use std::ffi::OsStr;
use std::process::Stdio;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use crate::core::config::Config;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::Line;
use crate::ingest::session::SharedSession;

const READER_CAPACITY: usize = 64 * 1024;

/// Notifications sent to the presentation layer while ingesting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestEvent {
    Line(Line),
    Finished(IngestSummary),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestEnd {
    EndOfStream,
    Cancelled,
    TooManyErrors,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    pub lines: usize,
    pub read_errors: usize,
    pub end: IngestEnd,
}

/// Reads lines from a child process (or any async reader) into a session.
pub struct Ingestor {
    pub session: SharedSession,
    pub config: Config,
    pub cancel: CancellationToken,
    pub events: Option<UnboundedSender<IngestEvent>>,
}

impl Ingestor {
    pub fn new(session: SharedSession, config: Config) -> Self {
        Ingestor {
            session,
            config,
            cancel: CancellationToken::new(),
            events: None,
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_events(mut self, events: UnboundedSender<IngestEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Token that stops the read loop (and kills the child) when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Spawns `program` with piped stdout and ingests its output until end
    /// of stream or cancellation. The child is killed before returning.
    pub async fn run_command<P, I, A>(&self, program: P, args: I) -> Result<IngestSummary>
    where
        P: AsRef<OsStr>,
        I: IntoIterator<Item = A>,
        A: AsRef<OsStr>,
    {
        let program = program.as_ref();
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::new(
                ErrorKind::Spawn,
                format!("failed to spawn {}: {}", program.to_string_lossy(), e),
            ))?;

        info!(pid = ?child.id(), program = %program.to_string_lossy(), "child process started");

        let stdout = child.stdout.take()
            .ok_or_else(|| Error::new(ErrorKind::Internal, "child stdout was not captured"))?;

        let summary = self.ingest_stream(BufReader::with_capacity(READER_CAPACITY, stdout)).await;
        terminate(&mut child).await;

        Ok(summary)
    }

    /// Read loop: one line per iteration until end of stream, cancellation or
    /// too many consecutive read errors. A failed read is ingested as a
    /// `failed to read: ...` line instead of stopping the session.
    pub async fn ingest_stream<R>(&self, mut reader: R) -> IngestSummary
    where
        R: AsyncBufRead + Unpin,
    {
        let mut buf = Vec::with_capacity(4096);
        let mut lines = 0;
        let mut read_errors = 0;
        let mut consecutive_errors = 0;

        let end = loop {
            buf.clear();
            let read = tokio::select! {
                biased;
                () = self.cancel.cancelled() => break IngestEnd::Cancelled,
                read = reader.read_until(b'\n', &mut buf) => read,
            };

            match read {
                Ok(0) => break IngestEnd::EndOfStream,
                Ok(_) => {
                    consecutive_errors = 0;
                    self.normalize(&mut buf);
                }
                Err(err) => {
                    warn!(error = %err, "failed to read line");
                    read_errors += 1;
                    consecutive_errors += 1;
                    buf.clear();
                    buf.extend_from_slice(format!("failed to read: {}\n", err).as_bytes());
                }
            }

            let line = self.session.lock().ingest(&buf);
            lines += 1;
            self.emit(IngestEvent::Line(line));

            if consecutive_errors >= self.config.max_consecutive_read_errors.max(1) {
                warn!(consecutive_errors, "giving up after repeated read errors");
                break IngestEnd::TooManyErrors;
            }
        };

        let summary = IngestSummary { lines, read_errors, end };
        info!(lines, read_errors, end = ?end, "ingestion finished");
        self.emit(IngestEvent::Finished(summary.clone()));
        summary
    }

    /// Strips the line terminator, caps the line length and terminates the
    /// line with a single `\n`.
    fn normalize(&self, buf: &mut Vec<u8>) {
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        if buf.len() > self.config.max_line_size {
            debug!(len = buf.len(), max = self.config.max_line_size, "truncating long line");
            buf.truncate(self.config.max_line_size);
        }
        buf.push(b'\n');
    }

    fn emit(&self, event: IngestEvent) {
        if let Some(events) = &self.events {
            // The receiver may already be gone during shutdown
            let _ = events.send(event);
        }
    }
}

async fn terminate(child: &mut Child) {
    match child.try_wait() {
        Ok(Some(status)) => info!(%status, "child process exited"),
        _ => match child.kill().await {
            Ok(()) => info!("child process terminated"),
            Err(err) => warn!(error = %err, "failed to terminate child process"),
        },
    }
}
