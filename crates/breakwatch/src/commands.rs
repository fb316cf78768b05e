//! Line-based terminal commands

use thiserror::Error;

/// What to do with one tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabAction {
    Start,
    End,
    Cancel,
    Reason(String),
    Reload,
}

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Act on the tab with this zero-based index
    Tab { index: usize, action: TabAction },
    Show,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command '{0}', type 'help'")]
    Unknown(String),

    #[error("Tab numbers start at 1: '{0}'")]
    InvalidTab(String),

    #[error("Missing action for tab {0}")]
    MissingAction(usize),

    #[error("Unknown action '{0}'")]
    UnknownAction(String),
}

pub const HELP: &str = "\
commands:
  <n> start          start a break in tab n
  <n> end            ask tab n to end its break
  <n> reason <text>  submit the reason prompt of tab n
  <n> cancel         dismiss the reason prompt of tab n
  <n> reload         reconcile tab n with the server again
  show               print every tab
  help               print this help
  quit               close every tab and exit";

/// Parse one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    let Some(first) = line.split_whitespace().next() else {
        return Ok(None);
    };

    let command = match first {
        "show" | "ls" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        _ if first.chars().all(|c| c.is_ascii_digit()) => parse_tab_command(first, &line[first.len()..])?,
        _ => return Err(CommandError::Unknown(first.to_string())),
    };

    Ok(Some(command))
}

fn parse_tab_command(number: &str, rest: &str) -> Result<Command, CommandError> {
    let index = match number.parse::<usize>() {
        Ok(n) if n >= 1 => n - 1,
        _ => return Err(CommandError::InvalidTab(number.to_string())),
    };

    let rest = rest.trim_start();
    let (verb, argument) = match rest.split_once(char::is_whitespace) {
        Some((verb, argument)) => (verb, argument),
        None => (rest, ""),
    };

    let action = match verb {
        "" => return Err(CommandError::MissingAction(index + 1)),
        "start" => TabAction::Start,
        "end" | "stop" => TabAction::End,
        "cancel" => TabAction::Cancel,
        "reload" => TabAction::Reload,
        // Left untrimmed: the controller decides what counts as blank
        "reason" => TabAction::Reason(argument.to_string()),
        other => return Err(CommandError::UnknownAction(other.to_string())),
    };

    Ok(Command::Tab { index, action })
}
