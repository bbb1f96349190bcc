//! REPL input parsing.

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ask(String),
    ToggleSearch,
    History,
    Help,
    Quit,
    Unknown(String),
}

/// Slash commands offered for completion.
pub const COMMANDS: &[&str] = &["/search", "/history", "/help", "/quit"];

impl Command {
    /// Parses a line; `None` for blank input.
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }

        let command = match trimmed {
            "/search" => Command::ToggleSearch,
            "/history" => Command::History,
            "/help" => Command::Help,
            "/quit" | "/exit" | "quit" | "exit" => Command::Quit,
            other if other.starts_with('/') => Command::Unknown(other.to_string()),
            question => Command::Ask(question.to_string()),
        };
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines_are_ignored() {
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("   \t"), None);
    }

    #[test]
    fn test_slash_commands() {
        assert_eq!(Command::parse("/search"), Some(Command::ToggleSearch));
        assert_eq!(Command::parse(" /history "), Some(Command::History));
        assert_eq!(Command::parse("/help"), Some(Command::Help));
        assert_eq!(Command::parse("exit"), Some(Command::Quit));
        assert_eq!(Command::parse("/plan"), Some(Command::Unknown("/plan".into())));
    }

    #[test]
    fn test_questions_are_trimmed() {
        assert_eq!(
            Command::parse("  What is 2+2?  "),
            Some(Command::Ask("What is 2+2?".into()))
        );
    }

    #[test]
    fn test_completion_list_parses_to_known_commands() {
        for name in COMMANDS {
            assert!(!matches!(Command::parse(name), Some(Command::Unknown(_)) | None));
        }
    }
}
