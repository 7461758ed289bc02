//! Line-oriented front end: echoes ingested lines and answers commands typed
//! on stdin.

use std::io::{self, Write};
use crate::core::error::{Error, Result};
use crate::core::types::{Field, Line};
use crate::ingest::session::Session;
use crate::query::parser::QueryParser;

/// Lines shown by `:tail` without an argument
pub const DEFAULT_TAIL: usize = 10;

pub const HELP: &str = "\
commands:
  key=value [key=value ...]  lines matching every pair
  :stats [json]              buffer and index statistics
  :tail [n]                  last n lines (default 10)
  :fields                    fields of the most recent line
  :help                      this text
  :quit                      stop the child and exit
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Find(Vec<Field<'static>>),
    Stats,
    StatsJson,
    Tail(usize),
    Fields,
    Help,
    Quit,
}

impl Command {
    pub fn parse(input: &str, parser: &QueryParser) -> Result<Command> {
        let input = input.trim();
        let Some(rest) = input.strip_prefix(':') else {
            return parser.parse(input).map(Command::Find);
        };

        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let command = match name {
            "stats" => match parts.next() {
                Some("json") => Command::StatsJson,
                Some(other) => {
                    return Err(Error::invalid_input(format!("unknown stats format {:?}", other)));
                }
                None => Command::Stats,
            },
            "tail" => match parts.next() {
                Some(n) => Command::Tail(n.parse().map_err(|_| {
                    Error::invalid_input(format!("invalid line count {:?}", n))
                })?),
                None => Command::Tail(DEFAULT_TAIL),
            },
            "fields" => Command::Fields,
            "help" | "h" => Command::Help,
            "quit" | "q" => Command::Quit,
            other => return Err(Error::invalid_input(format!("unknown command :{}", other))),
        };

        if parts.next().is_some() {
            return Err(Error::invalid_input(format!("too many arguments for :{}", name)));
        }
        Ok(command)
    }
}

/// Runs `command` against `session`, writing its output to `out`.
pub fn execute<W: Write>(session: &Session, command: &Command, out: &mut W) -> io::Result<()> {
    match command {
        Command::Find(fields) => {
            let lines = session.find(fields);
            write_lines(session, &lines, out)?;
            writeln!(out, "-- {} matching of {} lines", lines.len(), session.line_count())
        }
        Command::Stats => {
            let report = session.report();
            writeln!(out, "{}", report.session)?;
            if let Some(format) = &report.format {
                writeln!(out, "Format: {}", format)?;
            }
            writeln!(out)?;
            write!(out, "{}", report.index)
        }
        Command::StatsJson => {
            serde_json::to_writer_pretty(&mut *out, &session.report())?;
            writeln!(out)
        }
        Command::Tail(n) => {
            let lines = session.tail(*n);
            write_lines(session, lines, out)?;
            let count = session.line_count();
            writeln!(out, "-- lines {} to {} of {}", count - lines.len(), count, count)
        }
        Command::Fields => {
            for field in session.last_fields() {
                writeln!(out, "{}", field)?;
            }
            Ok(())
        }
        Command::Help => out.write_all(HELP.as_bytes()),
        Command::Quit => Ok(()),
    }
}

/// Writes the raw text of `lines` as ingested
pub fn write_lines<W: Write>(session: &Session, lines: &[Line], out: &mut W) -> io::Result<()> {
    for line in lines {
        if let Some(text) = session.resolve(line) {
            out.write_all(text)?;
        }
    }
    Ok(())
}
