//! Runs a command, tails its output and answers field queries over it.

use std::io::{BufRead, IsTerminal, Write};
use clap::{Parser, ValueEnum};
use clog::console::{self, Command, HELP};
use clog::core::config::Config;
use clog::core::error::{Error, ErrorKind, Result};
use clog::core::types::Line;
use clog::ingest::pipeline::{IngestEvent, Ingestor};
use clog::ingest::session::Session;
use clog::parse::strategy::ParseStrategy;
use clog::query::parser::QueryParser;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Auto,
    Json,
    Text,
}

#[derive(Clone, Debug, Parser)]
#[command(version, about = "Tail a command's output and query its lines by field", long_about = None)]
struct Args {
    /// Line format, `auto` picks it from the first line
    #[arg(long, value_enum, default_value_t = Format::Auto, env = "CLOG_FORMAT")]
    format: Format,

    /// Longest line kept, longer lines are truncated
    #[arg(long, default_value_t = 1_000_000, env = "CLOG_MAX_LINE_SIZE")]
    max_line_size: usize,

    /// Initial raw buffer capacity in bytes
    #[arg(long, default_value_t = 1_000_000, env = "CLOG_BUFFER_CAPACITY")]
    buffer_capacity: usize,

    /// Capacity hint for the distinct values of each field key
    #[arg(long, default_value_t = 10_000, env = "CLOG_VALUES_CAPACITY")]
    values_capacity: usize,

    /// Consecutive read errors tolerated before ingestion stops
    #[arg(long, default_value_t = 16, env = "CLOG_MAX_READ_ERRORS")]
    max_read_errors: usize,

    /// Do not echo the command's output
    #[arg(short, long)]
    quiet: bool,

    /// Exit as soon as the command's output ends
    #[arg(long)]
    exit_on_eof: bool,

    /// Command to run, followed by its arguments
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true, num_args = 1..)]
    command: Vec<String>,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            max_line_size: self.max_line_size,
            buffer_capacity: self.buffer_capacity,
            values_capacity: self.values_capacity,
            max_consecutive_read_errors: self.max_read_errors,
            format: match self.format {
                Format::Auto => None,
                Format::Json => Some(ParseStrategy::Json),
                Format::Text => Some(ParseStrategy::Text),
            },
            ..Config::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never mix with the echoed lines
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    run(args).await
}

async fn run(args: Args) -> Result<()> {
    let config = args.config();
    let session = Session::new(&config).shared();
    let cancel = CancellationToken::new();
    let (events_tx, mut events) = mpsc::unbounded_channel();

    let ingestor = Ingestor::new(session.clone(), config)
        .with_cancellation(cancel.clone())
        .with_events(events_tx);

    let (program, program_args) = args.command.split_first()
        .ok_or_else(|| Error::invalid_input("missing command"))?;
    let program = program.clone();
    let program_args = program_args.to_vec();
    let mut ingest = tokio::spawn(async move {
        ingestor.run_command(program, program_args).await
    });

    // Piped commands are answered against the complete output
    let scripted = !std::io::stdin().is_terminal();
    let mut commands = read_commands()?;

    let parser = QueryParser::new();
    let echo = |line: Line| -> Result<()> {
        if !args.quiet {
            let session = session.lock();
            console::write_lines(&session, &[line], &mut std::io::stdout().lock())?;
        }
        Ok(())
    };

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut events_open = true;
    let mut stdin_open = true;
    let mut ingest_running = true;
    let mut interruptible = true;

    while events_open || stdin_open || ingest_running {
        tokio::select! {
            biased;

            event = events.recv(), if events_open => match event {
                Some(IngestEvent::Line(line)) => echo(line)?,
                Some(IngestEvent::Finished(summary)) => {
                    info!(lines = summary.lines, end = ?summary.end, "command output ended");
                }
                None => events_open = false,
            },

            result = &mut ingest, if ingest_running => {
                ingest_running = false;
                let summary = result
                    .map_err(|e| Error::new(ErrorKind::Internal, format!("ingestion task failed: {}", e)))??;
                if summary.read_errors > 0 {
                    warn!(read_errors = summary.read_errors, "command output had read errors");
                }
                if args.exit_on_eof {
                    // Drain lines still queued for echoing
                    while let Ok(IngestEvent::Line(line)) = events.try_recv() {
                        echo(line)?;
                    }
                    break;
                }
            },

            input = commands.recv(), if stdin_open && !(scripted && ingest_running) => match input {
                Some(input) => {
                    if input.trim().is_empty() {
                        continue;
                    }
                    match Command::parse(&input, &parser) {
                        Ok(Command::Quit) => break,
                        Ok(command) => {
                            let session = session.lock();
                            let mut out = std::io::stdout().lock();
                            console::execute(&session, &command, &mut out)?;
                            out.flush()?;
                        }
                        Err(err) => eprintln!("{}\n{}", err.context, HELP),
                    }
                }
                None => stdin_open = false,
            },

            signal = &mut ctrl_c, if interruptible => match signal {
                Ok(()) => {
                    info!("interrupted");
                    break;
                }
                Err(err) => {
                    warn!(error = %err, "failed to listen for ctrl-c");
                    interruptible = false;
                }
            },
        }
    }

    cancel.cancel();
    if ingest_running {
        match ingest.await {
            Ok(Ok(summary)) => info!(lines = summary.lines, "ingestion stopped"),
            Ok(Err(err)) => return Err(err),
            Err(err) => return Err(Error::new(ErrorKind::Internal, format!("ingestion task failed: {}", err))),
        }
    }

    Ok(())
}

/// Reads console commands on a plain thread. A pending read on it never
/// holds up shutdown, unlike a read on the runtime's blocking pool.
fn read_commands() -> Result<mpsc::UnboundedReceiver<String>> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::Builder::new()
        .name("clog-stdin".to_string())
        .spawn(move || {
            for input in std::io::stdin().lock().lines() {
                match input {
                    Ok(input) => {
                        if tx.send(input).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, "failed to read commands from stdin");
                        break;
                    }
                }
            }
        })?;
    Ok(rx)
}
