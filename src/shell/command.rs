// ABOUTME: Command line parsing — whitespace tokenization and dispatch to the five shell commands.
// ABOUTME: No quoting or escapes; extra arguments after the first are ignored.

/// A recognized command with enough arguments to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    Ls,
    Cd { target: String },
    Rm { target: String },
    Tree,
}

impl Command {
    /// Text recorded in the action log for this command.
    pub fn log_text(&self) -> String {
        match self {
            Command::Exit => "exit".to_string(),
            Command::Ls => "ls".to_string(),
            Command::Cd { target } => format!("cd {target}"),
            Command::Rm { target } => format!("rm {target}"),
            Command::Tree => "tree".to_string(),
        }
    }
}

/// The outcome of parsing one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// Blank line.
    Empty,
    Command(Command),
    /// A known command missing its required argument.
    MissingArgument { usage: &'static str },
    Unknown(String),
}

pub const CD_USAGE: &str = "Usage: cd <directory>";
pub const RM_USAGE: &str = "Usage: rm <file/directory>";

/// Parse a line into a command. Matching is exact and case-sensitive.
pub fn parse_line(line: &str) -> ParsedLine {
    let mut tokens = line.split_whitespace();
    let Some(name) = tokens.next() else {
        return ParsedLine::Empty;
    };
    let arg = tokens.next().map(str::to_string);

    let command = match (name, arg) {
        ("exit", _) => Command::Exit,
        ("ls", _) => Command::Ls,
        ("tree", _) => Command::Tree,
        ("cd", Some(target)) => Command::Cd { target },
        ("rm", Some(target)) => Command::Rm { target },
        ("cd", None) => return ParsedLine::MissingArgument { usage: CD_USAGE },
        ("rm", None) => return ParsedLine::MissingArgument { usage: RM_USAGE },
        (other, _) => return ParsedLine::Unknown(other.to_string()),
    };
    ParsedLine::Command(command)
}
