use std::fmt;
use std::io;
use thiserror::Error;

/// Custom error types for grammar construction, conversion and parsing
#[derive(Error, Debug)]
pub enum GrammarError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid grammar: {0}")]
    InvalidGrammar(String),

    #[error("Rule {rule} is not in Chomsky normal form: {violation}")]
    NotChomskyNormalForm { rule: String, violation: CnfViolation },

    #[error("Membership and parsing require a grammar in Chomsky normal form; convert it first")]
    WrongGrammarKind,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Generation exceeded the limit of {0} expansions")]
    ExpansionLimit(usize),

    #[error("Internal inconsistency: {0}")]
    InternalInconsistency(String),
}

/// The Chomsky normal form invariant a rule breaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CnfViolation {
    /// More than two symbols on the right-hand side
    TooLong,
    /// A two-symbol alternative containing a terminal
    TerminalInBinary,
    /// A single variable on the right-hand side
    UnitProduction,
    /// An epsilon alternative on a variable other than the start symbol
    MisplacedEpsilon,
    /// The start symbol derives epsilon but also appears on a right-hand side
    StartOnRightHandSide,
}

impl fmt::Display for CnfViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CnfViolation::TooLong => "alternative longer than two symbols",
            CnfViolation::TerminalInBinary => "binary alternative contains a terminal",
            CnfViolation::UnitProduction => "unit production",
            CnfViolation::MisplacedEpsilon => "epsilon alternative outside the start symbol",
            CnfViolation::StartOnRightHandSide => {
                "start symbol derives epsilon and appears on a right-hand side"
            }
        };
        f.write_str(text)
    }
}

/// Result type for grammar operations
pub type Result<T> = std::result::Result<T, GrammarError>;

/// Trait extension for Option<T> to convert to GrammarError
pub trait OptionExt<T> {
    fn ok_or_grammar_err<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_grammar_err<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.ok_or_else(|| GrammarError::InvalidGrammar(f()))
    }
}
