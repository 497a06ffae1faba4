//! Parsing of terminal commands.

use otpi_core::Tab;
use thiserror::Error;

/// A line typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `request <email>`
    Request {
        /// Address to send the code to
        email: String,
    },
    /// `verify <email> <code>`
    Verify {
        /// Address the code was sent to
        email: String,
        /// The code as typed
        code: String,
    },
    /// `resend <email>`
    Resend {
        /// Address to send the new code to
        email: String,
    },
    /// `register <email> [name...]`
    Register {
        /// Address to register
        email: String,
        /// Display name, possibly empty
        name: String,
    },
    /// `tab login|register`
    Tab(Tab),
    /// `logout`
    Logout,
    /// `status`
    Status,
    /// `help`
    Help,
    /// `quit`
    Quit,
}

/// Why a line could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Blank line
    #[error("empty input")]
    Empty,

    /// First word is not a known command
    #[error("unknown command '{0}', type 'help' for the list")]
    UnknownCommand(String),

    /// `tab` with a missing or unknown form name
    #[error("unknown tab '{0}', expected 'login' or 'register'")]
    UnknownTab(String),
}

/// Usage text printed by `help`.
pub const HELP: &str = "\
commands:
  request <email>            send a one-time code
  verify <email> <code>      sign in with the code
  resend <email>             send a new code after the old one expired
  register <email> [name]    create an account
  tab login|register         switch forms
  logout                     sign out
  status                     show the current state
  help                       show this list
  quit                       exit";

/// Parse one input line.
///
/// Missing arguments parse as empty strings so the controller reports them
/// with its own validation message.
pub fn parse(line: &str) -> Result<Command, ParseError> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Err(ParseError::Empty);
    };
    let command = match name.to_ascii_lowercase().as_str() {
        "request" => Command::Request { email: arg(&mut words) },
        "verify" => {
            let email = arg(&mut words);
            let code = arg(&mut words);
            Command::Verify { email, code }
        }
        "resend" => Command::Resend { email: arg(&mut words) },
        "register" | "signup" => {
            let email = arg(&mut words);
            let name = words.collect::<Vec<_>>().join(" ");
            Command::Register { email, name }
        }
        "tab" => {
            let tab = arg(&mut words);
            Command::Tab(Tab::from_name(&tab).ok_or(ParseError::UnknownTab(tab))?)
        }
        "logout" => Command::Logout,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };
    Ok(command)
}

fn arg<'a>(words: &mut impl Iterator<Item = &'a str>) -> String {
    words.next().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_and_verify() {
        assert_eq!(
            parse("request user@example.com"),
            Ok(Command::Request {
                email: "user@example.com".to_string()
            })
        );
        assert_eq!(
            parse("  VERIFY user@example.com 123456  "),
            Ok(Command::Verify {
                email: "user@example.com".to_string(),
                code: "123456".to_string()
            })
        );
    }

    #[test]
    fn test_missing_arguments_are_empty() {
        assert_eq!(
            parse("verify user@example.com"),
            Ok(Command::Verify {
                email: "user@example.com".to_string(),
                code: String::new()
            })
        );
        assert_eq!(
            parse("resend"),
            Ok(Command::Resend {
                email: String::new()
            })
        );
    }

    #[test]
    fn test_register_joins_name() {
        assert_eq!(
            parse("register lee@example.com Lee Ji Eun"),
            Ok(Command::Register {
                email: "lee@example.com".to_string(),
                name: "Lee Ji Eun".to_string()
            })
        );
        assert_eq!(
            parse("register lee@example.com"),
            Ok(Command::Register {
                email: "lee@example.com".to_string(),
                name: String::new()
            })
        );
    }

    #[test]
    fn test_tab() {
        assert_eq!(parse("tab register"), Ok(Command::Tab(Tab::Register)));
        assert_eq!(parse("tab login"), Ok(Command::Tab(Tab::Login)));
        assert_eq!(
            parse("tab dashboard"),
            Err(ParseError::UnknownTab("dashboard".to_string()))
        );
        assert_eq!(parse("tab"), Err(ParseError::UnknownTab(String::new())));
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse("logout"), Ok(Command::Logout));
        assert_eq!(parse("status"), Ok(Command::Status));
        assert_eq!(parse("?"), Ok(Command::Help));
        assert_eq!(parse("exit"), Ok(Command::Quit));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse("   "), Err(ParseError::Empty));
        assert_eq!(
            parse("login user@example.com"),
            Err(ParseError::UnknownCommand("login".to_string()))
        );
    }
}
