//! Command parser for the interactive workspace shell
//!
//! Each input line is one command. Command names are case-insensitive; an
//! optional leading `/` is accepted so the shell feels like a chat prompt.

use thiserror::Error;

/// Errors that can occur when parsing shell commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType 'help' to see available commands")]
    UnknownCommand(String),

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },

    /// Argument was not a valid id
    #[error("Invalid id for {command}: {arg}")]
    InvalidId { command: String, arg: String },
}

/// Commands accepted by the workspace shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// List materials with selection marks
    Materials,
    /// List sessions
    Sessions,
    /// Toggle one or more materials in the selection
    Toggle(Vec<i64>),
    /// Set the new session title
    Title(String),
    /// Set the new session objective (empty clears it)
    Objective(String),
    /// Show the form and current selection
    Form,
    /// Submit the form
    Create,
    /// Make a session active
    Select(i64),
    /// Print the active session's tree
    Tree,
    /// Re-fetch lists and the active session
    Refresh,
    /// Log out and leave the shell
    Logout,
    /// Show help
    Help,
    /// Leave the shell
    Exit,
    /// Blank line
    Empty,
}

/// Parse one line of shell input
///
/// # Errors
///
/// Returns [`CommandError`] for unknown commands, missing arguments or
/// non-numeric ids.
pub fn parse_shell_command(input: &str) -> Result<ShellCommand, CommandError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(ShellCommand::Empty);
    }

    let trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);
    let (name, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (trimmed, ""),
    };
    let name = name.to_lowercase();

    match name.as_str() {
        "materials" | "m" => Ok(ShellCommand::Materials),
        "sessions" | "s" => Ok(ShellCommand::Sessions),
        "toggle" | "t" => {
            if rest.is_empty() {
                return Err(missing(&name, "toggle <material-id>..."));
            }
            rest.split_whitespace()
                .map(|arg| parse_id(&name, arg))
                .collect::<Result<Vec<_>, _>>()
                .map(ShellCommand::Toggle)
        }
        "title" => {
            if rest.is_empty() {
                return Err(missing(&name, "title <text>"));
            }
            Ok(ShellCommand::Title(rest.to_string()))
        }
        "objective" => Ok(ShellCommand::Objective(rest.to_string())),
        "form" => Ok(ShellCommand::Form),
        "create" => Ok(ShellCommand::Create),
        "select" | "open" => {
            if rest.is_empty() {
                return Err(missing(&name, "select <session-id>"));
            }
            parse_id(&name, rest).map(ShellCommand::Select)
        }
        "tree" => Ok(ShellCommand::Tree),
        "refresh" | "r" => Ok(ShellCommand::Refresh),
        "logout" => Ok(ShellCommand::Logout),
        "help" | "h" | "?" => Ok(ShellCommand::Help),
        "exit" | "quit" | "q" => Ok(ShellCommand::Exit),
        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

fn missing(command: &str, usage: &str) -> CommandError {
    CommandError::MissingArgument {
        command: command.to_string(),
        usage: usage.to_string(),
    }
}

fn parse_id(command: &str, arg: &str) -> Result<i64, CommandError> {
    arg.parse().map_err(|_| CommandError::InvalidId {
        command: command.to_string(),
        arg: arg.to_string(),
    })
}

/// Print shell help
pub fn print_help() {
    println!(
        r#"
Workspace Commands
==================

BROWSING:
  materials (m)        - List uploaded materials and the current selection
  sessions (s)         - List learning sessions
  select <id>          - Open a session and show its prerequisite tree
  tree                 - Show the active session's tree again
  refresh (r)          - Re-fetch materials, sessions and the active session

NEW SESSION:
  toggle <id>... (t)   - Select or deselect materials
  title <text>         - Set the session title
  objective [text]     - Set the objective (omit text to clear it)
  form                 - Show the title, objective and selection
  create               - Create the session

ACCOUNT:
  logout               - Log out and leave the workspace
  exit (q)             - Leave the workspace
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_shell_command("materials"), Ok(ShellCommand::Materials));
        assert_eq!(parse_shell_command("/SESSIONS"), Ok(ShellCommand::Sessions));
        assert_eq!(parse_shell_command("  r "), Ok(ShellCommand::Refresh));
        assert_eq!(parse_shell_command("quit"), Ok(ShellCommand::Exit));
        assert_eq!(parse_shell_command(""), Ok(ShellCommand::Empty));
    }

    #[test]
    fn test_parse_toggle_multiple_ids() {
        assert_eq!(
            parse_shell_command("toggle 3 5  8"),
            Ok(ShellCommand::Toggle(vec![3, 5, 8]))
        );
    }

    #[test]
    fn test_parse_toggle_rejects_bad_id() {
        assert_eq!(
            parse_shell_command("t 3 x"),
            Err(CommandError::InvalidId {
                command: "t".to_string(),
                arg: "x".to_string()
            })
        );
    }

    #[test]
    fn test_parse_title_keeps_spacing_inside() {
        assert_eq!(
            parse_shell_command("title  Linear   Algebra "),
            Ok(ShellCommand::Title("Linear   Algebra".to_string()))
        );
    }

    #[test]
    fn test_parse_objective_may_be_empty() {
        assert_eq!(
            parse_shell_command("objective"),
            Ok(ShellCommand::Objective(String::new()))
        );
    }

    #[test]
    fn test_parse_missing_arguments() {
        assert!(matches!(
            parse_shell_command("select"),
            Err(CommandError::MissingArgument { .. })
        ));
        assert!(matches!(
            parse_shell_command("title"),
            Err(CommandError::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(
            parse_shell_command("frobnicate now"),
            Err(CommandError::UnknownCommand("frobnicate now".to_string()))
        );
    }
}
