use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::grammar::Grammar;
use crate::symbol::{Symbol, Terminal, Variable, display_sequence};
use crate::utils::{CnfViolation, GrammarError, OptionExt, Result};

/// A binary rule `lhs -> left right`, by dense variable index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BinaryRule {
    pub lhs: usize,
    pub left: usize,
    pub right: usize,
}

/// A grammar in Chomsky normal form.
///
/// Every alternative is a single terminal or a pair of variables. The start
/// symbol may additionally derive epsilon. The shape is checked when the
/// value is built, so holding a `CnfGrammar` is proof of it.
#[derive(Debug, Clone)]
pub struct CnfGrammar {
    grammar: Grammar,
    variables: Vec<Variable>,
    positions: BTreeMap<Variable, usize>,
    unary: HashMap<Terminal, Vec<usize>>,
    binary: Vec<BinaryRule>,
    start: usize,
}

fn cnf_violation(lhs: &Variable, sequence: &[Symbol], violation: CnfViolation) -> GrammarError {
    GrammarError::NotChomskyNormalForm {
        rule: format!("{} -> {}", lhs, display_sequence(sequence)),
        violation,
    }
}

fn accepts_empty(grammar: &Grammar) -> bool {
    grammar
        .alternatives(grammar.start())
        .is_some_and(|alternatives| alternatives.contains(&Vec::new()))
}

impl CnfGrammar {
    /// Validate `grammar` and index its rules.
    ///
    /// The start symbol may derive epsilon only if it appears on no
    /// right-hand side.
    pub fn new(grammar: Grammar) -> Result<Self> {
        let variables: Vec<Variable> = grammar.variables().iter().cloned().collect();
        let positions: BTreeMap<Variable, usize> = variables
            .iter()
            .enumerate()
            .map(|(index, variable)| (variable.clone(), index))
            .collect();
        let index_of = |variable: &Variable| {
            positions
                .get(variable)
                .copied()
                .ok_or_grammar_err(|| format!("variable {} is not declared", variable))
        };

        let mut unary: HashMap<Terminal, Vec<usize>> = HashMap::new();
        let mut binary = Vec::new();

        for (lhs, alternatives) in grammar.rules() {
            let lhs_index = index_of(lhs)?;
            for sequence in alternatives {
                match sequence.as_slice() {
                    [] if lhs == grammar.start() => {}
                    [] => {
                        return Err(cnf_violation(lhs, sequence, CnfViolation::MisplacedEpsilon));
                    }
                    [Symbol::Terminal(t)] => unary.entry(t.clone()).or_default().push(lhs_index),
                    [Symbol::Variable(_)] => {
                        return Err(cnf_violation(lhs, sequence, CnfViolation::UnitProduction));
                    }
                    [Symbol::Variable(left), Symbol::Variable(right)] => binary.push(BinaryRule {
                        lhs: lhs_index,
                        left: index_of(left)?,
                        right: index_of(right)?,
                    }),
                    [_, _] => {
                        return Err(cnf_violation(lhs, sequence, CnfViolation::TerminalInBinary));
                    }
                    _ => return Err(cnf_violation(lhs, sequence, CnfViolation::TooLong)),
                }
            }
        }

        let start = index_of(grammar.start())?;
        if binary.iter().any(|rule| rule.left == start || rule.right == start)
            && accepts_empty(&grammar)
        {
            let start_symbol = Symbol::Variable(grammar.start().clone());
            let offending = grammar
                .rules()
                .iter()
                .flat_map(|(lhs, alternatives)| alternatives.iter().map(move |seq| (lhs, seq)))
                .find(|(_, sequence)| sequence.contains(&start_symbol));
            if let Some((lhs, sequence)) = offending {
                return Err(cnf_violation(lhs, sequence, CnfViolation::StartOnRightHandSide));
            }
        }

        Ok(CnfGrammar {
            grammar,
            variables,
            positions,
            unary,
            binary,
            start,
        })
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn into_grammar(self) -> Grammar {
        self.grammar
    }

    /// Whether the start symbol has an epsilon alternative
    pub fn accepts_empty(&self) -> bool {
        accepts_empty(&self.grammar)
    }

    pub(crate) fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub(crate) fn variable_at(&self, index: usize) -> &Variable {
        &self.variables[index]
    }

    pub(crate) fn position(&self, variable: &Variable) -> Option<usize> {
        self.positions.get(variable).copied()
    }

    pub(crate) fn start_index(&self) -> usize {
        self.start
    }

    /// Variables with an alternative `V -> terminal`
    pub(crate) fn producers(&self, terminal: &Terminal) -> &[usize] {
        self.unary.get(terminal).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn binary_rules(&self) -> &[BinaryRule] {
        &self.binary
    }
}

impl AsRef<Grammar> for CnfGrammar {
    fn as_ref(&self) -> &Grammar {
        &self.grammar
    }
}

impl TryFrom<Grammar> for CnfGrammar {
    type Error = GrammarError;

    fn try_from(grammar: Grammar) -> Result<Self> {
        CnfGrammar::new(grammar)
    }
}

impl fmt::Display for CnfGrammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.grammar.fmt(f)
    }
}
