//! Imperative commands recognised in user input.

use serde::{Deserialize, Serialize};

/// A directive extracted from free text.
///
/// Input that is not a command is represented as `Option::None` by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// `öffne <programm>`
    OpenProgram(String),
    /// `öffne url <adresse>`
    OpenUrl(String),
    /// `suche <begriff>`
    Search(String),
    Help,
    ClearChat,
    Exit,
}

impl Command {
    /// Commands that touch the outside world (process launch, browser)
    pub fn is_action(&self) -> bool {
        matches!(
            self,
            Command::OpenProgram(_) | Command::OpenUrl(_) | Command::Search(_)
        )
    }

    pub fn argument(&self) -> Option<&str> {
        match self {
            Command::OpenProgram(arg) | Command::OpenUrl(arg) | Command::Search(arg) => {
                Some(arg.as_str())
            }
            _ => None,
        }
    }
}
