//! Chat-style command protocol: `/start` and `/menu <dish>, <dish>, ...`.

use core::fmt;
use std::path::Path;

use crate::menu_data::{MenuTable, UnknownDishes};
use crate::settings::OutputFormat;

const MENU_PREFIX: &str = "/menu";
const START: &str = "/start";

/// Prefix on every reply sent back to the user.
pub const REPLY_PREFIX: &str = "Bot: ";

pub const WELCOME_TEXT: &str = "Welcome to MenuBot 📝\n\
Send /menu followed by dish names separated by commas.\n\
Example: /menu Rosół, Schabowy, Sernik";

/// Parsed user command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuCommand {
    Start,
    /// Requested dish names, trimmed, in the order given.
    Menu(Vec<String>),
}

impl MenuCommand {
    /// Parse one line of user input.
    pub fn parse(input: &str) -> Result<Self, CommandError> {
        let input = input.trim();
        if input == START {
            return Ok(Self::Start);
        }
        let Some(rest) = input.strip_prefix(MENU_PREFIX) else {
            return Err(CommandError::UnknownCommand);
        };
        let dishes: Vec<String> = rest
            .split(',')
            .map(str::trim)
            .filter(|dish| !dish.is_empty())
            .map(str::to_string)
            .collect();
        if dishes.is_empty() {
            return Err(CommandError::NoDishes);
        }
        Ok(Self::Menu(dishes))
    }

    /// Check a `/menu` request against the table; `/start` passes through.
    pub fn validate(self, table: &MenuTable) -> Result<Self, CommandError> {
        if let Self::Menu(dishes) = &self {
            table.select(dishes)?;
        }
        Ok(self)
    }
}

/// Shorthand for [`MenuCommand::parse`].
pub fn parse_command(input: &str) -> Result<MenuCommand, CommandError> {
    MenuCommand::parse(input)
}

/// Acknowledgement sent before rendering starts.
pub fn accepted_reply(dishes: &[String]) -> String {
    format!(
        "{REPLY_PREFIX}Got it! Generating menu with dishes: {}",
        dishes.join(", ")
    )
}

/// Confirmation sent after the output file is written.
pub fn ready_reply(path: &Path, format: OutputFormat) -> String {
    let detail = match format {
        OutputFormat::Png => "PNG, max quality",
        OutputFormat::Pdf => "PDF",
    };
    format!(
        "{REPLY_PREFIX}Menu ready! Saved as {} ({detail})",
        path.display()
    )
}

/// Command rejected before any rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandError {
    UnknownCommand,
    NoDishes,
    UnknownDishes(UnknownDishes),
}

impl CommandError {
    /// User-facing message with the reply prefix.
    pub fn reply(&self) -> String {
        format!("{REPLY_PREFIX}{self}")
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCommand => write!(f, "Unknown command. Use /menu <dish names>"),
            Self::NoDishes => write!(
                f,
                "Please specify dish names. Example: /menu Rosół, Schabowy, Sernik"
            ),
            Self::UnknownDishes(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UnknownDishes(err) => Some(err),
            _ => None,
        }
    }
}

impl From<UnknownDishes> for CommandError {
    fn from(value: UnknownDishes) -> Self {
        Self::UnknownDishes(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use menu_render_layout::MenuEntry;

    fn table() -> MenuTable {
        MenuTable::from_entries([
            MenuEntry::new("Rosół", "Zupy", "Bulion"),
            MenuEntry::new("Schabowy", "Dania główne", "Kotlet"),
            MenuEntry::new("Sernik", "Desery", ""),
        ])
    }

    #[test]
    fn menu_names_are_split_trimmed_and_empties_dropped() {
        let cmd = parse_command("/menu  Rosół ,, Sernik ,").unwrap();
        assert_eq!(
            cmd,
            MenuCommand::Menu(vec!["Rosół".to_string(), "Sernik".to_string()])
        );
    }

    #[test]
    fn start_is_recognized() {
        assert_eq!(parse_command(" /start ").unwrap(), MenuCommand::Start);
        assert!(WELCOME_TEXT.starts_with("Welcome to MenuBot"));
    }

    #[test]
    fn other_input_is_an_unknown_command() {
        let err = parse_command("hello").unwrap_err();
        assert_eq!(err, CommandError::UnknownCommand);
        assert_eq!(err.reply(), "Bot: Unknown command. Use /menu <dish names>");
    }

    #[test]
    fn bare_menu_asks_for_dishes() {
        for input in ["/menu", "/menu   ", "/menu , ,"] {
            assert_eq!(parse_command(input).unwrap_err(), CommandError::NoDishes);
        }
        assert_eq!(
            CommandError::NoDishes.reply(),
            "Bot: Please specify dish names. Example: /menu Rosół, Schabowy, Sernik"
        );
    }

    #[test]
    fn validate_lists_unknown_and_available_dishes() {
        let err = parse_command("/menu Soup, Rosół")
            .unwrap()
            .validate(&table())
            .unwrap_err();
        assert_eq!(
            err.reply(),
            "Bot: Unknown dish: Soup. Available: Rosół, Schabowy, Sernik"
        );
    }

    #[test]
    fn validate_accepts_known_dishes() {
        let cmd = parse_command("/menu Sernik, Rosół").unwrap();
        assert_eq!(cmd.clone().validate(&table()).unwrap(), cmd);
    }

    #[test]
    fn replies_describe_progress() {
        let dishes = vec!["Rosół".to_string(), "Sernik".to_string()];
        assert_eq!(
            accepted_reply(&dishes),
            "Bot: Got it! Generating menu with dishes: Rosół, Sernik"
        );
        assert_eq!(
            ready_reply(Path::new("menu_output.png"), OutputFormat::Png),
            "Bot: Menu ready! Saved as menu_output.png (PNG, max quality)"
        );
    }
}
