use rand::Rng;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::LazyLock;

use crate::cnf;
use crate::normal_form::CnfGrammar;
use crate::symbol::{Sequence, Symbol, Terminal, Variable, display_sequence};
use crate::utils::{GrammarError, OptionExt, Result};

/// The right-hand-side alternatives of one variable
pub type Alternatives = BTreeSet<Sequence>;

/// Mapping from each variable to its alternatives
pub type Rules = BTreeMap<Variable, Alternatives>;

static VARIABLE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<([^<>]+)>$").expect("variable token pattern is valid"));

/// Configuration options for random generation
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Maximum number of variable expansions per sample; `None` never gives up
    pub max_expansions: Option<usize>,
    /// Text placed between terminals when joining a sample into a string
    pub separator: String,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        GenerateConfig {
            max_expansions: None,
            separator: " ".to_string(),
        }
    }
}

/// The raw components of a grammar, as consumed and produced by the
/// normal form stages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarParts {
    pub variables: BTreeSet<Variable>,
    pub terminals: BTreeSet<Terminal>,
    pub start: Variable,
    pub rules: Rules,
}

impl GrammarParts {
    /// Validate the parts and turn them into a grammar
    pub fn into_grammar(self) -> Result<Grammar> {
        Grammar::new(self.variables, self.terminals, self.start, self.rules)
    }
}

/// A context-free grammar.
///
/// Grammars are immutable once built: every transformation returns a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    variables: BTreeSet<Variable>,
    terminals: BTreeSet<Terminal>,
    start: Variable,
    rules: Rules,
}

impl Grammar {
    /// Build a grammar, checking that the start symbol is declared and that
    /// every rule only mentions declared symbols
    pub fn new(
        variables: BTreeSet<Variable>,
        terminals: BTreeSet<Terminal>,
        start: Variable,
        rules: Rules,
    ) -> Result<Self> {
        if !variables.contains(&start) {
            return Err(GrammarError::InvalidGrammar(format!(
                "start symbol {} is not a declared variable",
                start
            )));
        }

        for (lhs, alternatives) in &rules {
            if !variables.contains(lhs) {
                return Err(GrammarError::InvalidGrammar(format!(
                    "rule for undeclared variable {}",
                    lhs
                )));
            }
            for sequence in alternatives {
                for symbol in sequence {
                    let declared = match symbol {
                        Symbol::Variable(v) => variables.contains(v),
                        Symbol::Terminal(t) => terminals.contains(t),
                    };
                    if !declared {
                        return Err(GrammarError::InvalidGrammar(format!(
                            "rule {} -> {} references undeclared symbol {}",
                            lhs,
                            display_sequence(sequence),
                            symbol
                        )));
                    }
                }
            }
        }

        Ok(Grammar {
            variables,
            terminals,
            start,
            rules,
        })
    }

    pub fn variables(&self) -> &BTreeSet<Variable> {
        &self.variables
    }

    pub fn terminals(&self) -> &BTreeSet<Terminal> {
        &self.terminals
    }

    pub fn start(&self) -> &Variable {
        &self.start
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// The alternatives of `variable`, if it has a rule
    pub fn alternatives(&self, variable: &Variable) -> Option<&Alternatives> {
        self.rules.get(variable)
    }

    /// Total number of alternatives across all rules
    pub fn rule_count(&self) -> usize {
        self.rules.values().map(BTreeSet::len).sum()
    }

    pub fn into_parts(self) -> GrammarParts {
        GrammarParts {
            variables: self.variables,
            terminals: self.terminals,
            start: self.start,
            rules: self.rules,
        }
    }

    /// Convert to Chomsky normal form
    pub fn to_cnf(&self) -> Result<CnfGrammar> {
        cnf::to_chomsky_normal_form(self)
    }

    /// Derive a random terminal sequence by repeatedly expanding the leftmost variable
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<Terminal>> {
        self.generate_with(rng, &GenerateConfig::default())
    }

    pub fn generate_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        config: &GenerateConfig,
    ) -> Result<Vec<Terminal>> {
        // Symbols still to expand, leftmost on top. Everything already in
        // `output` lies left of the leftmost remaining variable.
        let mut pending: Vec<Symbol> = vec![Symbol::Variable(self.start.clone())];
        let mut output = Vec::new();
        let mut expansions = 0usize;

        while let Some(symbol) = pending.pop() {
            let variable = match symbol {
                Symbol::Terminal(t) => {
                    output.push(t);
                    continue;
                }
                Symbol::Variable(v) => v,
            };

            if let Some(limit) = config.max_expansions {
                if expansions >= limit {
                    return Err(GrammarError::ExpansionLimit(limit));
                }
            }
            expansions += 1;

            let alternatives = self
                .rules
                .get(&variable)
                .filter(|alternatives| !alternatives.is_empty())
                .ok_or_grammar_err(|| {
                    format!("variable {} has no alternatives to expand", variable)
                })?;

            let index = rng.gen_range(0..alternatives.len());
            if let Some(chosen) = alternatives.iter().nth(index) {
                pending.extend(chosen.iter().rev().cloned());
            }
        }

        Ok(output)
    }

    /// Generate one sample and join its terminals with single spaces
    pub fn generate_string<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<String> {
        self.generate_string_with(rng, &GenerateConfig::default())
    }

    pub fn generate_string_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        config: &GenerateConfig,
    ) -> Result<String> {
        let terminals = self.generate_with(rng, config)?;
        Ok(terminals
            .iter()
            .map(Terminal::name)
            .collect::<Vec<_>>()
            .join(&config.separator))
    }

    /// Generate `count` independent samples
    pub fn generate_strings<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        count: usize,
    ) -> Result<Vec<String>> {
        self.generate_strings_with(rng, count, &GenerateConfig::default())
    }

    pub fn generate_strings_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        count: usize,
        config: &GenerateConfig,
    ) -> Result<Vec<String>> {
        if count == 0 {
            return Err(GrammarError::InvalidArgument(
                "number of strings to generate must be greater than 0".to_string(),
            ));
        }
        (0..count)
            .map(|_| self.generate_string_with(rng, config))
            .collect()
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ordered = self
            .rules
            .get_key_value(&self.start)
            .into_iter()
            .chain(self.rules.iter().filter(|(lhs, _)| **lhs != self.start));

        for (lhs, alternatives) in ordered {
            let rhs = alternatives
                .iter()
                .map(|sequence| display_sequence(sequence))
                .collect::<Vec<_>>()
                .join(" | ");
            writeln!(f, "{} -> {}", lhs, rhs)?;
        }
        Ok(())
    }
}

/// Builder for constructing Grammar instances
///
/// Tokens written as `<name>` are variables, anything else is a terminal.
#[derive(Debug, Clone)]
pub struct GrammarBuilder {
    start: Variable,
    variables: BTreeSet<Variable>,
    terminals: BTreeSet<Terminal>,
    rules: Rules,
}

impl GrammarBuilder {
    pub fn new(start_symbol: &str) -> Self {
        let start = Variable::new(start_symbol);
        GrammarBuilder {
            variables: BTreeSet::from([start.clone()]),
            start,
            terminals: BTreeSet::new(),
            rules: Rules::new(),
        }
    }

    /// Add an alternative for `lhs`; an empty token list adds epsilon
    pub fn rule(mut self, lhs: &str, tokens: &[&str]) -> Self {
        let lhs = Variable::new(lhs);
        let sequence: Sequence = tokens.iter().map(|token| self.symbol(token)).collect();
        self.variables.insert(lhs.clone());
        self.rules.entry(lhs).or_default().insert(sequence);
        self
    }

    pub fn epsilon(self, lhs: &str) -> Self {
        self.rule(lhs, &[])
    }

    fn symbol(&mut self, token: &str) -> Symbol {
        match VARIABLE_TOKEN.captures(token) {
            Some(captures) => {
                let variable = Variable::new(&captures[1]);
                self.variables.insert(variable.clone());
                Symbol::Variable(variable)
            }
            None => {
                let terminal = Terminal::new(token);
                self.terminals.insert(terminal.clone());
                Symbol::Terminal(terminal)
            }
        }
    }

    pub fn build(self) -> Result<Grammar> {
        Grammar::new(self.variables, self.terminals, self.start, self.rules)
    }
}
