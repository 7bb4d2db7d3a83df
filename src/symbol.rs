//! Terminals, variables and the symbol sequences built from them.

use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

/// A terminal symbol, identified by its name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Terminal(String);

impl Terminal {
    pub fn new(name: impl Into<String>) -> Self {
        Terminal(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A variable (non-terminal) symbol.
///
/// Variables named by the user and variables introduced while transforming a
/// grammar live in separate variants, so a fresh variable can never be equal
/// to a user-supplied one regardless of the names involved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Variable {
    /// A variable named in the source grammar
    Named(String),
    /// A variable introduced by a transformation stage
    Fresh { base: String, id: u32 },
}

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Variable::Named(name.into())
    }

    /// The user-visible stem of this variable's name
    pub fn base(&self) -> &str {
        match self {
            Variable::Named(name) => name,
            Variable::Fresh { base, .. } => base,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, Variable::Fresh { .. })
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variable::Named(name) => f.write_str(name),
            Variable::Fresh { base, id } => write!(f, "{}'{}", base, id),
        }
    }
}

impl Serialize for Variable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The base unit of a grammar rule
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Terminal(Terminal),
    Variable(Variable),
}

impl Symbol {
    pub fn terminal(name: impl Into<String>) -> Self {
        Symbol::Terminal(Terminal::new(name))
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Symbol::Variable(Variable::new(name))
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Symbol::Variable(v) => Some(v),
            Symbol::Terminal(_) => None,
        }
    }

    pub fn as_terminal(&self) -> Option<&Terminal> {
        match self {
            Symbol::Terminal(t) => Some(t),
            Symbol::Variable(_) => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }
}

impl From<Terminal> for Symbol {
    fn from(t: Terminal) -> Self {
        Symbol::Terminal(t)
    }
}

impl From<Variable> for Symbol {
    fn from(v: Variable) -> Self {
        Symbol::Variable(v)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Terminal(t) => t.fmt(f),
            Symbol::Variable(v) => v.fmt(f),
        }
    }
}

/// An ordered list of symbols; the empty sequence stands for epsilon
pub type Sequence = Vec<Symbol>;

/// Formats a sequence the way rules are printed, with `ε` for the empty one
pub fn display_sequence(sequence: &[Symbol]) -> String {
    if sequence.is_empty() {
        return "ε".to_string();
    }
    sequence
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Hands out fresh variables whose ids do not clash with any fresh variable
/// already present in a grammar.
#[derive(Debug, Clone)]
pub struct FreshVariables {
    next_id: u32,
}

impl FreshVariables {
    /// Continue numbering after the largest fresh id in `variables`
    pub fn after(variables: &BTreeSet<Variable>) -> Self {
        let next_id = variables
            .iter()
            .filter_map(|v| match v {
                Variable::Fresh { id, .. } => Some(*id),
                Variable::Named(_) => None,
            })
            .max()
            .map_or(1, |max| max + 1);
        FreshVariables { next_id }
    }

    pub fn next(&mut self, base: &str) -> Variable {
        let id = self.next_id;
        self.next_id += 1;
        Variable::Fresh {
            base: base.to_string(),
            id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_kinds_never_compare_equal() {
        assert_ne!(Symbol::terminal("a"), Symbol::variable("a"));

        let mut set = BTreeSet::new();
        set.insert(Symbol::terminal("x"));
        set.insert(Symbol::variable("x"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_fresh_disjoint_from_named() {
        let fresh = Variable::Fresh {
            base: "S".to_string(),
            id: 1,
        };
        // Same rendering, different identity
        assert_eq!(fresh.to_string(), "S'1");
        assert_ne!(fresh, Variable::new("S'1"));
        assert!(fresh.is_fresh());
        assert_eq!(fresh.base(), "S");
    }

    #[test]
    fn test_fresh_numbering_continues() {
        let mut variables = BTreeSet::new();
        variables.insert(Variable::new("S"));
        let mut fresh = FreshVariables::after(&variables);
        let x1 = fresh.next("X");
        let x2 = fresh.next("X");
        assert_eq!(x1.to_string(), "X'1");
        assert_eq!(x2.to_string(), "X'2");

        variables.insert(x1);
        variables.insert(x2);
        let mut fresh = FreshVariables::after(&variables);
        assert_eq!(fresh.next("Y").to_string(), "Y'3");
    }

    #[test]
    fn test_display_sequence() {
        assert_eq!(display_sequence(&[]), "ε");
        let seq = vec![Symbol::variable("A"), Symbol::terminal("b")];
        assert_eq!(display_sequence(&seq), "A b");
    }
}
