//! Allowlist of permitted command shapes
//!
//! Each entry is an anchored pattern for one command shape plus a short
//! description. A command is allowed iff at least one pattern matches; the
//! order of entries never changes the outcome. Permitting a new shape means
//! appending an entry.
//!
//! Patterns constrain command structure only. Quoted values may contain any
//! text except a double quote or an escape character, so a quoted value ends
//! where the shell ends it.

use regex::Regex;

/// A quoted value; backslashes are excluded since POSIX shells read `\"` as
/// a literal quote
const QUOTED: &str = r#""[^"\\]*""#;

/// An unquoted value: no whitespace, quotes or shell metacharacters
const BARE: &str = r#"[^\s"'`&|;<>$()]+"#;

/// A package identifier
const PACKAGE_ID: &str = r"[A-Za-z0-9_.\-]+";

/// A version or version range
const VERSION: &str = r"[A-Za-z0-9_.\-+*\[\],]+";

/// Shapes of the commands an install script may contain
fn default_entries() -> Vec<(String, &'static str)> {
    let value = format!("(?:{QUOTED}|{BARE})");
    let version = format!("(?:{QUOTED}|{VERSION})");

    vec![
        (
            format!(r"^dotnet new (?:install|-i) {PACKAGE_ID}(?:::{VERSION})?(?: --force)?$"),
            "Install a template package",
        ),
        (
            format!(r"^dotnet new sln(?: (?:-n|--name|-o|--output) {value})*$"),
            "Create a solution file",
        ),
        (
            format!(r"^dotnet new [A-Za-z0-9][A-Za-z0-9_.\-]*(?: --?[A-Za-z][A-Za-z0-9\-]*(?: {value})?)*$"),
            "Create a project from a template",
        ),
        (
            format!(r"^dotnet sln(?: {value})? add {value}$"),
            "Add a project to the solution",
        ),
        (
            format!(r"^dotnet add(?: {value})? package {PACKAGE_ID}(?: (?:--version|-v) {version}| --prerelease)*$"),
            "Add a package reference",
        ),
        (
            format!(r"^dotnet run(?: --project {value})?$"),
            "Run the project",
        ),
        (
            format!(r"^dotnet build(?: {value})?$"),
            "Build the project",
        ),
        (
            format!(r"^dotnet restore(?: {value})?$"),
            "Restore project dependencies",
        ),
    ]
}

/// Statements only permitted in Windows scripts
fn windows_entries() -> Vec<(String, &'static str)> {
    vec![
        (r"(?i)^@echo off$".to_string(), "Suppress command echo"),
        (
            r#"(?i)^set [A-Za-z_][A-Za-z0-9_]*=(?:"[^"]*"|[^\s"&|;<>]*)$"#.to_string(),
            "Set an environment variable (cmd)",
        ),
        (
            r#"^\$env:[A-Za-z_][A-Za-z0-9_]*\s*=\s*(?:"[^"`]*"|'[^']*'|[^\s"'`&|;<>]+)$"#
                .to_string(),
            "Set an environment variable (PowerShell)",
        ),
    ]
}

#[derive(Debug, Clone)]
struct CommandPattern {
    pattern: Regex,
    description: String,
}

/// Immutable, ordered set of permitted command shapes
#[derive(Debug, Clone)]
pub struct CommandGrammar {
    patterns: Vec<CommandPattern>,
}

impl CommandGrammar {
    /// The install-script allowlist
    pub fn new() -> Self {
        Self::compile(default_entries())
    }

    /// Dialect-specific statements accepted in Windows scripts
    pub fn windows_exceptions() -> Self {
        Self::compile(windows_entries())
    }

    /// Build a grammar from `(pattern, description)` pairs
    pub fn from_patterns<P, D>(entries: &[(P, D)]) -> Result<Self, regex::Error>
    where
        P: AsRef<str>,
        D: AsRef<str>,
    {
        let patterns = entries
            .iter()
            .map(|(pattern, description)| {
                Ok(CommandPattern {
                    pattern: Regex::new(pattern.as_ref())?,
                    description: description.as_ref().to_string(),
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        Ok(Self { patterns })
    }

    fn compile(entries: Vec<(String, &'static str)>) -> Self {
        Self::from_patterns(entries.as_slice()).expect("built-in command patterns must compile")
    }

    /// True if `command` matches any permitted shape
    pub fn is_allowed(&self, command: &str) -> bool {
        self.patterns.iter().any(|p| p.pattern.is_match(command))
    }

    /// Description of the first shape matching `command`
    pub fn describe(&self, command: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|p| p.pattern.is_match(command))
            .map(|p| p.description.as_str())
    }

    /// `(pattern, description)` pairs in table order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.patterns
            .iter()
            .map(|p| (p.pattern.as_str(), p.description.as_str()))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for CommandGrammar {
    fn default() -> Self {
        Self::new()
    }
}
