//! Line-level validation of generated install scripts

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::script::grammar::CommandGrammar;

/// Separator of chained commands on one line
const CHAIN_OPERATOR: &str = "&&";

/// Shell the script is written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShellDialect {
    #[default]
    Posix,
    Windows,
}

impl From<bool> for ShellDialect {
    /// `true` selects [`ShellDialect::Windows`]
    fn from(is_windows: bool) -> Self {
        if is_windows {
            ShellDialect::Windows
        } else {
            ShellDialect::Posix
        }
    }
}

/// A rejected command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// 1-based line number in the script
    pub line: usize,
    /// The offending (sub-)command, trimmed
    pub command: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.command)
    }
}

/// Outcome of validating a script
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    /// Every rejected command, in script order
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            is_valid: violations.is_empty(),
            violations,
        }
    }
}

/// Checks scripts against the command allowlist
///
/// Holds only its grammars; safe to share and call concurrently.
#[derive(Debug, Clone)]
pub struct CommandValidator {
    grammar: CommandGrammar,
    windows_exceptions: CommandGrammar,
}

impl CommandValidator {
    pub fn new() -> Self {
        Self::with_grammar(CommandGrammar::new())
    }

    pub fn with_grammar(grammar: CommandGrammar) -> Self {
        Self {
            grammar,
            windows_exceptions: CommandGrammar::windows_exceptions(),
        }
    }

    pub fn grammar(&self) -> &CommandGrammar {
        &self.grammar
    }

    /// Validate every command of `script`
    pub fn validate(&self, script: &str, dialect: ShellDialect) -> ValidationResult {
        let mut violations = Vec::new();

        for (index, raw_line) in script.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || is_comment(line, dialect) {
                continue;
            }

            for command in line.split(CHAIN_OPERATOR).map(str::trim) {
                if !self.is_permitted(command, dialect) {
                    violations.push(Violation {
                        line: index + 1,
                        command: command.to_string(),
                    });
                }
            }
        }

        if violations.is_empty() {
            debug!("Script accepted");
        } else {
            warn!("Script rejected with {} violation(s)", violations.len());
        }

        ValidationResult::from_violations(violations)
    }

    fn is_permitted(&self, command: &str, dialect: ShellDialect) -> bool {
        let grammars = match dialect {
            ShellDialect::Windows => [Some(&self.windows_exceptions), Some(&self.grammar)],
            ShellDialect::Posix => [None, Some(&self.grammar)],
        };

        match grammars.into_iter().flatten().find_map(|g| g.describe(command)) {
            Some(description) => {
                debug!("Accepted {:?} ({})", command, description);
                true
            }
            None => false,
        }
    }
}

impl Default for CommandValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn is_comment(line: &str, dialect: ShellDialect) -> bool {
    if line.starts_with('#') {
        return true;
    }

    match dialect {
        ShellDialect::Posix => false,
        ShellDialect::Windows => {
            let lower = line.to_ascii_lowercase();
            line.starts_with("::") || lower == "rem" || lower.starts_with("rem ")
        }
    }
}
