// Script line and directive definitions

use std::fmt;

/// Execution context a directive targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Environment {
    Wsl,
    Ps,
}

impl Environment {
    pub const ALL: [Environment; 2] = [Environment::Wsl, Environment::Ps];

    /// Keyword that introduces this environment in a script line
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Environment::Wsl => "RUN_WSL",
            Environment::Ps => "RUN_PS",
        }
    }

    /// Normalised tag passed to the engine and echoed in reports
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Environment::Wsl => "WSL",
            Environment::Ps => "PS",
        }
    }

    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|env| env.keyword() == keyword)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A validated script instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub environment: Environment,
    /// Text between the first and last quote, exactly as written. May be empty.
    pub raw_command: String,
}

/// Engine-ready form of a directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRequest {
    environment: Environment,
    encoded_command: String,
}

impl EncodedRequest {
    pub(crate) fn new(environment: Environment, encoded_command: String) -> Self {
        Self {
            environment,
            encoded_command,
        }
    }

    #[must_use]
    pub fn environment(&self) -> Environment {
        self.environment
    }

    #[must_use]
    pub fn encoded_command(&self) -> &str {
        &self.encoded_command
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Comment,
    Directive(Directive),
    Malformed,
}

/// One input line after classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine<'a> {
    /// 1-based position in the script
    pub number: usize,
    /// Line text with surrounding whitespace removed
    pub text: &'a str,
    pub kind: LineKind,
}

impl ScriptLine<'_> {
    /// Whether this line occupies a slot in the report
    #[must_use]
    pub fn is_reportable(&self) -> bool {
        matches!(self.kind, LineKind::Directive(_) | LineKind::Malformed)
    }
}
