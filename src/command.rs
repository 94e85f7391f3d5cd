//! Input classification and the `!` command grammar.

/// Leading character that marks a line as a command.
pub const SENTINEL: char = '!';

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `!quit` or `!exit`
    Quit,
    Help,
    /// `!model` reports the current model; `!model <name>` switches.
    Model(Option<String>),
    History,
    Clear,
    Save,
    /// Anything else after the sentinel. Holds the lowercased verb.
    Unknown(String),
}

/// What a line of user input turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Blank or whitespace only.
    Empty,
    Command(Command),
    Question(String),
}

impl Input {
    /// Classify a raw line. Surrounding whitespace is ignored.
    pub fn parse(line: &str) -> Input {
        let line = line.trim();
        if line.is_empty() {
            return Input::Empty;
        }
        match line.strip_prefix(SENTINEL) {
            Some(rest) => Input::Command(Command::parse(rest)),
            None => Input::Question(line.to_string()),
        }
    }
}

impl Command {
    /// Parse the text after the sentinel.
    fn parse(rest: &str) -> Command {
        let mut parts = rest.split_whitespace();
        let verb = parts.next().unwrap_or_default().to_lowercase();

        match verb.as_str() {
            "quit" | "exit" => Command::Quit,
            "help" => Command::Help,
            "model" => Command::Model(parts.next().map(str::to_string)),
            "history" => Command::History,
            "clear" => Command::Clear,
            "save" => Command::Save,
            _ => Command::Unknown(verb),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(Input::parse(""), Input::Empty);
        assert_eq!(Input::parse("   \t "), Input::Empty);
    }

    #[test]
    fn test_question() {
        assert_eq!(
            Input::parse("  what is a list? "),
            Input::Question("what is a list?".to_string())
        );
    }

    #[test]
    fn test_sentinel_only_inside_is_question() {
        assert_eq!(
            Input::parse("why is x != y"),
            Input::Question("why is x != y".to_string())
        );
    }

    #[test]
    fn test_verbs_are_case_insensitive() {
        assert_eq!(Input::parse("!QUIT"), Input::Command(Command::Quit));
        assert_eq!(Input::parse("!Exit"), Input::Command(Command::Quit));
        assert_eq!(Input::parse("!help"), Input::Command(Command::Help));
        assert_eq!(Input::parse("!History"), Input::Command(Command::History));
        assert_eq!(Input::parse("!clear"), Input::Command(Command::Clear));
        assert_eq!(Input::parse("!save"), Input::Command(Command::Save));
    }

    #[test]
    fn test_model_arguments() {
        assert_eq!(Input::parse("!model"), Input::Command(Command::Model(None)));
        assert_eq!(
            Input::parse("!model  GPT  extra"),
            Input::Command(Command::Model(Some("GPT".to_string())))
        );
    }

    #[test]
    fn test_unknown_verbs() {
        assert_eq!(
            Input::parse("!Frobnicate now"),
            Input::Command(Command::Unknown("frobnicate".to_string()))
        );
        assert_eq!(
            Input::parse("!"),
            Input::Command(Command::Unknown(String::new()))
        );
    }
}
