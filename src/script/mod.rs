//! Install-script validation
//!
//! Generated scripts are checked line by line against a fixed allowlist of
//! command shapes before they may be executed.
//!
//! - [`grammar`]: the allowlist of permitted command shapes
//! - [`validator`]: line-level validation and diagnostics

pub mod grammar;
pub mod validator;

pub use grammar::CommandGrammar;
pub use validator::{CommandValidator, ShellDialect, ValidationResult, Violation};
