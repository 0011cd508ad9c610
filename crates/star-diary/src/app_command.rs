use crate::{AppError, AppResult};

use std::panic::Location;

use error_location::ErrorLocation;

/// Help text listing every command.
pub(crate) const HELP: &str = "\
Commands:
  signup <email> <password>   create an account and sign in
  signin [email] <password>   sign in (email defaults to the last one used)
  signout                     end the session
  record                      start recording, or stop and make a star
  play <n>                    play star n, or stop it if it is playing
  list                        draw the sky
  whoami                      show the signed-in account
  help                        show this help
  quit                        leave";

/// Commands sent from the command reader to the main application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Create an account.
    SignUp {
        /// Account email.
        email: String,
        /// Account password.
        password: String,
    },
    /// Sign in to an existing account.
    SignIn {
        /// Account email; `None` uses the remembered one.
        email: Option<String>,
        /// Account password.
        password: String,
    },
    /// End the session.
    SignOut,
    /// Start or stop a recording.
    ToggleRecording,
    /// Select a star by its 1-based position in the list.
    Play {
        /// Position as shown by `list`.
        index: usize,
    },
    /// Render the sky.
    List,
    /// Show the current account.
    WhoAmI,
    /// Show the command list.
    Help,
    /// Request application shutdown.
    Quit,
}

impl AppCommand {
    /// Parse one input line. Blank lines yield `None`.
    ///
    /// # Errors
    ///
    /// `InvalidCommand` for unknown verbs or wrong arguments.
    #[track_caller]
    pub fn parse(line: &str) -> AppResult<Option<Self>> {
        let location = Location::caller();
        let invalid = |reason: &str| AppError::InvalidCommand {
            reason: reason.to_string(),
            location: ErrorLocation::from(location),
        };

        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((verb, args)) = words.split_first() else {
            return Ok(None);
        };

        let command = match (verb.to_ascii_lowercase().as_str(), args) {
            ("signup", [email, password]) => AppCommand::SignUp {
                email: email.to_string(),
                password: password.to_string(),
            },
            ("signup", _) => return Err(invalid("Usage: signup <email> <password>")),
            ("signin", [password]) => AppCommand::SignIn {
                email: None,
                password: password.to_string(),
            },
            ("signin", [email, password]) => AppCommand::SignIn {
                email: Some(email.to_string()),
                password: password.to_string(),
            },
            ("signin", _) => return Err(invalid("Usage: signin [email] <password>")),
            ("signout", []) => AppCommand::SignOut,
            ("record" | "r", []) => AppCommand::ToggleRecording,
            ("play" | "p", [index]) => match index.parse::<usize>() {
                Ok(index) if index > 0 => AppCommand::Play { index },
                _ => return Err(invalid("Star numbers start at 1.")),
            },
            ("play" | "p", _) => return Err(invalid("Usage: play <n>")),
            ("list" | "ls", []) => AppCommand::List,
            ("whoami", []) => AppCommand::WhoAmI,
            ("help" | "?", []) => AppCommand::Help,
            ("quit" | "exit", []) => AppCommand::Quit,
            ("signout" | "record" | "r" | "list" | "ls" | "whoami" | "help" | "?" | "quit"
            | "exit", _) => {
                return Err(invalid(&format!("'{}' takes no arguments.", verb)));
            }
            _ => return Err(invalid(&format!("Unknown command '{}'. Try 'help'.", verb))),
        };

        Ok(Some(command))
    }
}
