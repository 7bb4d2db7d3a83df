use serde::Serialize;
use std::fmt;

use crate::symbol::{Terminal, Variable};

/// A derivation tree over a grammar in Chomsky normal form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ParseTree {
    /// The start symbol deriving the empty input
    Epsilon { variable: Variable },
    /// `variable -> terminal`
    Leaf { variable: Variable, terminal: Terminal },
    /// `variable -> left right`
    Node {
        variable: Variable,
        left: Box<ParseTree>,
        right: Box<ParseTree>,
    },
}

impl ParseTree {
    /// The variable labelling the root of this tree
    pub fn variable(&self) -> &Variable {
        match self {
            ParseTree::Epsilon { variable }
            | ParseTree::Leaf { variable, .. }
            | ParseTree::Node { variable, .. } => variable,
        }
    }

    /// The terminals at the leaves, left to right
    pub fn leaves(&self) -> Vec<&Terminal> {
        let mut leaves = Vec::new();
        let mut stack = vec![self];
        while let Some(tree) = stack.pop() {
            match tree {
                ParseTree::Epsilon { .. } => {}
                ParseTree::Leaf { terminal, .. } => leaves.push(terminal),
                ParseTree::Node { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        leaves
    }

    /// The leaves joined with single spaces
    pub fn yield_string(&self) -> String {
        self.leaves()
            .iter()
            .map(|t| t.name())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn depth(&self) -> usize {
        match self {
            ParseTree::Epsilon { .. } | ParseTree::Leaf { .. } => 1,
            ParseTree::Node { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

impl fmt::Display for ParseTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseTree::Epsilon { variable } => write!(f, "({} ε)", variable),
            ParseTree::Leaf { variable, terminal } => write!(f, "({} {})", variable, terminal),
            ParseTree::Node {
                variable,
                left,
                right,
            } => write!(f, "({} {} {})", variable, left, right),
        }
    }
}
