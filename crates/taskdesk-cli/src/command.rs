//! Line -> Command parsing for the REPL.

use chrono::{DateTime, Duration, Utc};
use taskdesk_core::Priority;
use taskdesk_core::domain::ParsePriorityError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),

    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),

    #[error("invalid deadline '{0}' (use RFC 3339 or +<n>d / +<n>h / +<n>m)")]
    InvalidDeadline(String),

    #[error(transparent)]
    Priority(#[from] ParsePriorityError),
}

/// Absolute deadline, or an offset resolved against the clock when applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineSpec {
    At(DateTime<Utc>),
    In(Duration),
}

impl DeadlineSpec {
    pub fn resolve(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            DeadlineSpec::At(at) => at,
            DeadlineSpec::In(offset) => now.checked_add_signed(offset).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    fn parse(raw: &str) -> Result<Self, CommandError> {
        let invalid = || CommandError::InvalidDeadline(raw.to_string());

        if let Some(rest) = raw.strip_prefix('+') {
            let unit = rest.chars().last().ok_or_else(invalid)?;
            let amount: i64 = rest[..rest.len() - unit.len_utf8()]
                .parse()
                .map_err(|_| invalid())?;
            let offset = match unit {
                'd' => Duration::try_days(amount),
                'h' => Duration::try_hours(amount),
                'm' => Duration::try_minutes(amount),
                _ => None,
            }
            .ok_or_else(invalid)?;
            return Ok(DeadlineSpec::In(offset));
        }

        DateTime::parse_from_rfc3339(raw)
            .map(|at| DeadlineSpec::At(at.with_timezone(&Utc)))
            .map_err(|_| invalid())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List { json: bool },
    New,
    Edit(String),
    Title(String),
    Desc(String),
    Deadline(DeadlineSpec),
    Priority(Priority),
    Submit,
    Cancel,
    Toggle(String),
    Delete(String),
    Help,
    Quit,
}

impl Command {
    /// `None` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim_start();
        if line.trim().is_empty() {
            return Ok(None);
        }

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest),
            None => (line.trim_end(), ""),
        };
        let arg = rest.trim();

        let command = match verb {
            "list" | "ls" => Command::List { json: arg == "json" },
            "new" => Command::New,
            "edit" => Command::Edit(required(arg, "edit")?),
            // title/desc keep inner whitespace as typed; blank checks happen on submit
            "title" => Command::Title(rest.to_string()),
            "desc" => Command::Desc(rest.to_string()),
            "deadline" => Command::Deadline(DeadlineSpec::parse(&required(arg, "deadline")?)?),
            "priority" => Command::Priority(required(arg, "priority")?.parse()?),
            "submit" => Command::Submit,
            "cancel" => Command::Cancel,
            "toggle" | "done" => Command::Toggle(required(arg, "toggle")?),
            "delete" | "rm" => Command::Delete(required(arg, "delete")?),
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

fn required(arg: &str, verb: &'static str) -> Result<String, CommandError> {
    if arg.is_empty() {
        Err(CommandError::MissingArgument(verb))
    } else {
        Ok(arg.to_string())
    }
}

pub const HELP: &str = "\
commands:
  list [json]            show the task table
  new                    open the create form
  edit <title>           open the edit form for a task
  title <text>           set the draft title (create only)
  desc <text>            set the draft description
  deadline <when>        RFC 3339 timestamp or +<n>d / +<n>h / +<n>m
  priority <level>       low | medium | high
  submit                 validate and save the open form
  cancel                 close the open form
  toggle <title>         flip completion
  delete <title>         delete a task
  quit                   leave";
