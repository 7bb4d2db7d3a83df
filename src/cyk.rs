//! CYK membership testing and parse tree recovery.
//!
//! The table is triangular: one cell per span `(i, j)` with `i <= j`, each
//! cell holding one flag per variable. Cells are stored contiguously, grouped
//! by span length, so all spans of one length sit next to each other.

use crate::grammar::Grammar;
use crate::normal_form::CnfGrammar;
use crate::parse_tree::ParseTree;
use crate::symbol::{Terminal, Variable};
use crate::utils::{GrammarError, Result};

/// A filled CYK table for one input
#[derive(Debug, Clone)]
pub struct CykTable<'a> {
    grammar: &'a CnfGrammar,
    input: &'a [Terminal],
    width: usize,
    cells: Vec<bool>,
}

impl<'a> CykTable<'a> {
    /// Fill the table bottom-up, shortest spans first
    pub fn build(grammar: &'a CnfGrammar, input: &'a [Terminal]) -> Self {
        let n = input.len();
        let width = grammar.variable_count();
        let mut table = CykTable {
            grammar,
            input,
            width,
            cells: vec![false; n * (n + 1) / 2 * width],
        };

        for (i, terminal) in input.iter().enumerate() {
            for &variable in grammar.producers(terminal) {
                table.set(i, i, variable);
            }
        }

        // Spans of one length only read strictly shorter spans
        for length in 2..=n {
            for i in 0..=n - length {
                let j = i + length - 1;
                for k in i..j {
                    for rule in grammar.binary_rules() {
                        if table.get(i, k, rule.left) && table.get(k + 1, j, rule.right) {
                            table.set(i, j, rule.lhs);
                        }
                    }
                }
            }
            log::trace!("CYK: filled spans of length {}/{}", length, n);
        }

        table
    }

    fn offset(&self, i: usize, j: usize) -> usize {
        let n = self.input.len();
        let shorter = j - i;
        (shorter * (n + 1) - shorter * (shorter + 1) / 2 + i) * self.width
    }

    fn get(&self, i: usize, j: usize, variable: usize) -> bool {
        self.cells[self.offset(i, j) + variable]
    }

    fn set(&mut self, i: usize, j: usize, variable: usize) {
        let index = self.offset(i, j) + variable;
        self.cells[index] = true;
    }

    pub fn len(&self) -> usize {
        self.input.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    /// Whether `variable` derives exactly the input span `i..=j`
    pub fn derives(&self, i: usize, j: usize, variable: &Variable) -> bool {
        if i > j || j >= self.len() {
            return false;
        }
        self.grammar
            .position(variable)
            .is_some_and(|index| self.get(i, j, index))
    }

    /// Whether the start symbol derives the whole input
    pub fn accepts(&self) -> bool {
        match self.len() {
            0 => self.grammar.accepts_empty(),
            n => self.get(0, n - 1, self.grammar.start_index()),
        }
    }

    /// Rebuild one derivation of the input, if there is any
    pub fn parse_tree(&self) -> Result<Option<ParseTree>> {
        if !self.accepts() {
            return Ok(None);
        }
        let start = self.grammar.start_index();
        if self.is_empty() {
            return Ok(Some(ParseTree::Epsilon {
                variable: self.grammar.variable_at(start).clone(),
            }));
        }
        self.backtrack(0, self.len() - 1, start).map(Some)
    }

    fn backtrack(&self, start: usize, end: usize, variable: usize) -> Result<ParseTree> {
        let label = self.grammar.variable_at(variable);

        if start == end {
            let terminal = &self.input[start];
            if self.grammar.producers(terminal).contains(&variable) {
                return Ok(ParseTree::Leaf {
                    variable: label.clone(),
                    terminal: terminal.clone(),
                });
            }
        } else {
            for k in start..end {
                let split = self
                    .grammar
                    .binary_rules()
                    .iter()
                    .filter(|rule| rule.lhs == variable)
                    .find(|rule| self.get(start, k, rule.left) && self.get(k + 1, end, rule.right));

                if let Some(rule) = split {
                    return Ok(ParseTree::Node {
                        variable: label.clone(),
                        left: Box::new(self.backtrack(start, k, rule.left)?),
                        right: Box::new(self.backtrack(k + 1, end, rule.right)?),
                    });
                }
            }
        }

        Err(GrammarError::InternalInconsistency(format!(
            "table claims {} derives span {}..={} but no rule confirms it",
            label, start, end
        )))
    }
}

/// Membership queries and parse trees over whitespace-free terminal names
pub trait Recognizer {
    fn is_member<S: AsRef<str>>(&self, words: &[S]) -> Result<bool>;

    fn parse_tree<S: AsRef<str>>(&self, words: &[S]) -> Result<Option<ParseTree>>;

    /// Split `text` on whitespace and test the resulting terminals
    fn is_member_str(&self, text: &str) -> Result<bool> {
        let words: Vec<&str> = text.split_whitespace().collect();
        self.is_member(&words)
    }

    fn parse_tree_str(&self, text: &str) -> Result<Option<ParseTree>> {
        let words: Vec<&str> = text.split_whitespace().collect();
        self.parse_tree(&words)
    }
}

impl Recognizer for Grammar {
    fn is_member<S: AsRef<str>>(&self, _words: &[S]) -> Result<bool> {
        Err(GrammarError::WrongGrammarKind)
    }

    fn parse_tree<S: AsRef<str>>(&self, _words: &[S]) -> Result<Option<ParseTree>> {
        Err(GrammarError::WrongGrammarKind)
    }
}

impl CnfGrammar {
    /// Map input words onto this grammar's terminals
    pub fn terminals_of<S: AsRef<str>>(&self, words: &[S]) -> Result<Vec<Terminal>> {
        words
            .iter()
            .map(|word| {
                let terminal = Terminal::new(word.as_ref());
                if self.grammar().terminals().contains(&terminal) {
                    Ok(terminal)
                } else {
                    Err(GrammarError::InvalidArgument(format!(
                        "{:?} is not a terminal of the grammar",
                        word.as_ref()
                    )))
                }
            })
            .collect()
    }
}

impl Recognizer for CnfGrammar {
    fn is_member<S: AsRef<str>>(&self, words: &[S]) -> Result<bool> {
        let input = self.terminals_of(words)?;
        Ok(CykTable::build(self, &input).accepts())
    }

    fn parse_tree<S: AsRef<str>>(&self, words: &[S]) -> Result<Option<ParseTree>> {
        let input = self.terminals_of(words)?;
        CykTable::build(self, &input).parse_tree()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarBuilder;
    use pretty_assertions::assert_eq;

    fn chain_grammar() -> CnfGrammar {
        GrammarBuilder::new("S")
            .rule("S", &["<A>", "<B>", "<C>"])
            .rule("A", &["a", "<B>"])
            .rule("B", &["b", "<C>"])
            .rule("C", &["c"])
            .build()
            .unwrap()
            .to_cnf()
            .unwrap()
    }

    fn anbn() -> CnfGrammar {
        GrammarBuilder::new("S")
            .rule("S", &["a", "<S>", "b"])
            .epsilon("S")
            .build()
            .unwrap()
            .to_cnf()
            .unwrap()
    }

    #[test]
    fn test_membership() {
        let cnf = chain_grammar();
        assert!(cnf.is_member(&["a", "b", "c", "b", "c", "c"]).unwrap());
        assert!(!cnf.is_member(&["a", "b", "c"]).unwrap());
        assert!(!cnf.is_member_str("").unwrap());
    }

    #[test]
    fn test_empty_input() {
        let cnf = anbn();
        let empty: [&str; 0] = [];
        assert!(cnf.is_member(&empty).unwrap());
        assert!(cnf.is_member_str("a a b b").unwrap());
        assert!(!cnf.is_member_str("a b b").unwrap());

        let tree = cnf.parse_tree(&empty).unwrap().unwrap();
        assert!(matches!(tree, ParseTree::Epsilon { .. }));
    }

    #[test]
    fn test_unknown_terminal_rejected() {
        let result = chain_grammar().is_member(&["a", "z"]);
        assert!(matches!(result, Err(GrammarError::InvalidArgument(_))));
    }

    #[test]
    fn test_plain_grammar_refuses() {
        let grammar = GrammarBuilder::new("S").rule("S", &["a"]).build().unwrap();
        assert!(matches!(
            grammar.is_member(&["a"]),
            Err(GrammarError::WrongGrammarKind)
        ));
        assert!(matches!(
            grammar.parse_tree_str("a"),
            Err(GrammarError::WrongGrammarKind)
        ));
    }

    #[test]
    fn test_table_cells() {
        let grammar = GrammarBuilder::new("S")
            .rule("S", &["<A>", "<B>"])
            .rule("A", &["a"])
            .rule("B", &["b"])
            .rule("B", &["<B>", "<B>"])
            .build()
            .unwrap();
        let cnf = CnfGrammar::new(grammar).unwrap();
        let input = cnf.terminals_of(&["a", "b", "b"]).unwrap();
        let table = CykTable::build(&cnf, &input);

        let (s, a, b) = (Variable::new("S"), Variable::new("A"), Variable::new("B"));
        assert!(table.derives(0, 0, &a));
        assert!(table.derives(1, 2, &b));
        assert!(table.derives(0, 1, &s));
        assert!(table.derives(0, 2, &s));
        assert!(!table.derives(0, 2, &b));
        assert!(!table.derives(2, 1, &b));
        assert!(!table.derives(0, 3, &s));
        assert!(table.accepts());
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_parse_tree_yields_input() {
        let cnf = chain_grammar();
        let words = ["a", "b", "c", "b", "c", "c"];
        let tree = cnf.parse_tree(&words).unwrap().unwrap();
        assert_eq!(tree.yield_string(), words.join(" "));
        assert_eq!(tree.variable(), cnf.grammar().start());

        assert_eq!(cnf.parse_tree(&["a", "b", "c"]).unwrap(), None);
    }

    #[test]
    fn test_parse_tree_shape() {
        let grammar = GrammarBuilder::new("S")
            .rule("S", &["<A>", "<B>"])
            .rule("A", &["a"])
            .rule("B", &["<C>", "<D>"])
            .rule("C", &["c"])
            .rule("D", &["d"])
            .build()
            .unwrap();
        let cnf = CnfGrammar::new(grammar).unwrap();
        let tree = cnf.parse_tree_str("a c d").unwrap().unwrap();
        assert_eq!(tree.to_string(), "(S (A a) (B (C c) (D d)))");
    }
}
