//! Turns lines typed during a session into [Action]s. Every line is parsed as a small clap
//! command, so `help` and argument errors look the same as for the regular cli.

use std::future;

use clap::{Parser, Subcommand};
use futures::{Stream, StreamExt};
use thiserror::Error;
use tokio::io::{stdin, AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::LinesStream;
use tracing::{debug, error};

use crate::{
    model::{BinDefinition, BinUpdate},
    session::{action::DEFAULT_HISTORY, Action},
};

#[derive(Debug, Parser)]
#[command(
    name = "session",
    multicall = true,
    disable_help_subcommand = true,
    about = "Commands available during a session"
)]
pub struct SessionLine {
    #[command(subcommand)]
    command: LineCommand,
}

#[derive(Debug, Subcommand)]
enum LineCommand {
    #[command(about = "Log a unit of time into a bin, found by name or nice name")]
    Log { bin: String },
    #[command(about = "Show today's report and the most recent ones")]
    Report {
        #[arg(help = "Number of past reports to show")]
        history: Option<usize>,
    },
    #[command(about = "Show settings and bins")]
    Settings,
    #[command(about = "Change a setting")]
    Set {
        #[command(subcommand)]
        setting: SetCommand,
    },
    #[command(about = "Add a bin")]
    Add {
        name: String,
        nice_name: String,
        description: Option<String>,
    },
    #[command(about = "Edit a bin")]
    Edit {
        #[arg(value_name = "NAME")]
        bin: String,
        #[arg(long = "name")]
        new_name: Option<String>,
        #[arg(long)]
        nice_name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    #[command(about = "Delete a bin. Reports keep what was logged into it")]
    Delete { name: String },
    #[command(about = "Show this help")]
    Help,
    #[command(about = "Leave the session", visible_alias = "quit")]
    Exit,
}

#[derive(Debug, Subcommand)]
enum SetCommand {
    #[command(about = "Length of the working day in hours")]
    TotalHours {
        #[arg(allow_negative_numbers = true)]
        value: f64,
    },
    #[command(about = "Minutes between reminders")]
    ReminderMinutes {
        #[arg(allow_negative_numbers = true)]
        value: f64,
    },
}

impl From<LineCommand> for Action {
    fn from(value: LineCommand) -> Self {
        match value {
            LineCommand::Log { bin } => Action::Log(bin),
            LineCommand::Report { history } => Action::Report {
                history: history.unwrap_or(DEFAULT_HISTORY),
            },
            LineCommand::Settings => Action::Settings,
            LineCommand::Set {
                setting: SetCommand::TotalHours { value },
            } => Action::SetTotalHours(value),
            LineCommand::Set {
                setting: SetCommand::ReminderMinutes { value },
            } => Action::SetReminderMinutes(value),
            LineCommand::Add {
                name,
                nice_name,
                description,
            } => Action::AddBin(BinDefinition::new(
                name,
                nice_name,
                description.unwrap_or_default(),
            )),
            LineCommand::Edit {
                bin,
                new_name,
                nice_name,
                description,
            } => Action::EditBin {
                key: bin,
                update: BinUpdate {
                    name: new_name,
                    nice_name,
                    description,
                },
            },
            LineCommand::Delete { name } => Action::DeleteBin(name),
            LineCommand::Help => Action::Help,
            LineCommand::Exit => Action::Exit,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unclosed quote")]
pub struct UnclosedQuote;

/// Splits a line on whitespace. Double quotes group words, `\"` inside quotes is a literal quote.
pub fn split_words(line: &str) -> Result<Vec<String>, UnclosedQuote> {
    let mut words = Vec::new();
    let mut current: Option<String> = None;
    let mut quoted = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                quoted = !quoted;
                current.get_or_insert_with(String::new);
            }
            '\\' if quoted => {
                if let Some(next) = chars.next() {
                    current.get_or_insert_with(String::new).push(next);
                }
            }
            c if c.is_whitespace() && !quoted => words.extend(current.take()),
            c => current.get_or_insert_with(String::new).push(c),
        }
    }

    if quoted {
        return Err(UnclosedQuote);
    }
    words.extend(current);
    Ok(words)
}

/// Result of parsing a single line.
#[derive(Debug, PartialEq)]
pub enum ParsedLine {
    Empty,
    Action(Action),
    /// Help or usage error rendered by clap, meant to be shown as is.
    Rejected(String),
}

pub fn parse_line(line: &str) -> ParsedLine {
    let words = match split_words(line) {
        Ok(words) if words.is_empty() => return ParsedLine::Empty,
        Ok(words) => words,
        Err(e) => return ParsedLine::Rejected(e.to_string()),
    };

    match SessionLine::try_parse_from(words) {
        Ok(parsed) => ParsedLine::Action(parsed.command.into()),
        Err(e) => ParsedLine::Rejected(e.render().to_string().trim_end().to_owned()),
    }
}

/// Actions typed into stdin. The stream ends with the input or on a read error. Rejected lines
/// are printed right away and never reach the session.
pub fn stdin_actions() -> impl Stream<Item = Action> + Unpin {
    let lines = LinesStream::new(BufReader::new(stdin()).lines());
    Box::pin(
        lines
            .take_while(|line| {
                if let Err(e) = line {
                    error!("Failed to read input {e:?}");
                }
                future::ready(line.is_ok())
            })
            .filter_map(|line| {
                let parsed = line.map(|v| parse_line(&v)).unwrap_or(ParsedLine::Empty);
                debug!("Parsed input {parsed:?}");
                future::ready(match parsed {
                    ParsedLine::Action(action) => Some(action),
                    ParsedLine::Rejected(message) => {
                        eprintln!("{message}");
                        None
                    }
                    ParsedLine::Empty => None,
                })
            }),
    )
}
