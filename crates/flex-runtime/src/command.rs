//! Operator command surface.
//!
//! Console lines such as `reload all` or `reset "name"` are split shell-style
//! and parsed with clap:
//!
//! ```text
//! reload <slot|all>    re-read slot files, keeping the old config on failure
//! reset <slot|all>     restore built-in defaults on disk and in memory
//! list-handlers        print every handler id the active model resolves
//! ```
//!
//! Execution lives on [`FlexRuntime::execute`](crate::FlexRuntime::execute);
//! this module only parses and formats.

use std::fmt;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};

use crate::runtime::SlotReport;
use crate::store::SlotTarget;

/// Manage Flex slot configurations.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "flex", no_binary_name = true, arg_required_else_help = true)]
pub struct OperatorCommand {
    #[command(subcommand)]
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Action {
    /// Reload slot configurations from disk
    Reload {
        /// name, chat, join, left or all
        target: SlotTarget,
    },
    /// List every handler id the active resolution model can resolve
    ListHandlers,
    /// Overwrite slot configurations with the built-in defaults
    Reset {
        /// name, chat, join, left or all
        target: SlotTarget,
    },
}

impl OperatorCommand {
    /// Parses one console line.
    pub fn parse_line(line: &str) -> Result<Self, clap::Error> {
        Self::try_parse_from(shell_split(line))
    }
}

/// Result of one operator command, ready to print.
#[derive(Debug)]
pub enum CommandOutcome {
    Reloaded(Vec<SlotReport>),
    Reset(Vec<SlotReport>),
    Handlers(Vec<String>),
    /// Help requested, or the line did not parse.
    Usage { text: String, is_error: bool },
}

impl CommandOutcome {
    pub(crate) fn from_clap(err: clap::Error) -> Self {
        let is_error = !matches!(
            err.kind(),
            ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        );
        Self::Usage {
            text: err.render().to_string(),
            is_error,
        }
    }

    /// Returns `true` if the command failed, entirely or for any slot.
    pub fn is_error(&self) -> bool {
        match self {
            Self::Reloaded(reports) | Self::Reset(reports) => {
                reports.iter().any(|report| report.result.is_err())
            }
            Self::Handlers(_) => false,
            Self::Usage { is_error, .. } => *is_error,
        }
    }
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reloaded(reports) => write_reports(f, "Reloaded", "reload", reports),
            Self::Reset(reports) => write_reports(f, "Reset", "reset", reports),
            Self::Handlers(ids) => {
                writeln!(f, "{} handler(s):", ids.len())?;
                for id in ids {
                    writeln!(f, "  {id}")?;
                }
                Ok(())
            }
            Self::Usage { text, .. } => f.write_str(text.trim_end()),
        }
    }
}

fn write_reports(
    f: &mut fmt::Formatter<'_>,
    done: &str,
    verb: &str,
    reports: &[SlotReport],
) -> fmt::Result {
    for report in reports {
        match &report.result {
            Ok(count) => writeln!(f, "{done} {} ({count} component(s))", report.slot)?,
            Err(err) => writeln!(f, "Failed to {verb} {}: {err}", report.slot)?,
        }
    }
    Ok(())
}

/// Splits a line into arguments, honoring single and double quotes.
fn shell_split(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_single_quote = false;
    let mut in_double_quote = false;
    let mut escape_next = false;

    for ch in input.chars() {
        if escape_next {
            current.push(ch);
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_double_quote => escape_next = true,
            '\'' if !in_double_quote => in_single_quote = !in_single_quote,
            '"' if !in_single_quote => in_double_quote = !in_double_quote,
            c if c.is_whitespace() && !in_single_quote && !in_double_quote => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(ch),
        }
    }

    if !current.is_empty() {
        args.push(current);
    }

    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Slot;

    #[test]
    fn test_shell_split() {
        assert_eq!(shell_split("reload  all"), vec!["reload", "all"]);
        assert_eq!(shell_split(r#"reset "name""#), vec!["reset", "name"]);
        assert_eq!(shell_split("reload 'chat'\t"), vec!["reload", "chat"]);
        assert!(shell_split("   ").is_empty());
    }

    #[test]
    fn test_parse_subcommands() {
        assert_eq!(
            OperatorCommand::parse_line("reload all").unwrap().action,
            Action::Reload {
                target: SlotTarget::All
            }
        );
        assert_eq!(
            OperatorCommand::parse_line("reset JOIN").unwrap().action,
            Action::Reset {
                target: SlotTarget::One(Slot::Join)
            }
        );
        assert_eq!(
            OperatorCommand::parse_line("list-handlers").unwrap().action,
            Action::ListHandlers
        );
    }

    #[test]
    fn test_parse_errors_are_usage() {
        let err = OperatorCommand::parse_line("reload sideways").unwrap_err();
        let outcome = CommandOutcome::from_clap(err);
        assert!(outcome.is_error());
        assert!(outcome.to_string().contains("sideways"));

        let help = CommandOutcome::from_clap(OperatorCommand::parse_line("--help").unwrap_err());
        assert!(!help.is_error());
        assert!(help.to_string().contains("list-handlers"));

        let empty = CommandOutcome::from_clap(OperatorCommand::parse_line("").unwrap_err());
        assert!(!empty.is_error());
    }

    #[test]
    fn test_handlers_display() {
        let outcome = CommandOutcome::Handlers(vec!["a".into(), "b".into()]);
        assert_eq!(outcome.to_string(), "2 handler(s):\n  a\n  b\n");
    }
}
