//! Conversion of arbitrary context-free grammars to Chomsky normal form.
//!
//! The conversion runs five stages in a fixed order. Each stage takes the
//! grammar's parts by value and returns new parts; later stages rely on the
//! invariants established by earlier ones:
//!
//! 1. [`isolate_start`]: the start symbol never appears on a right-hand side.
//! 2. [`remove_epsilon`]: only the start symbol may derive epsilon directly.
//! 3. [`remove_unit_productions`]: no `A -> B` rules remain.
//! 4. [`decompose_long_productions`]: every alternative has at most two symbols.
//! 5. [`isolate_terminals`]: two-symbol alternatives hold only variables.

mod epsilon;
mod long;
mod start;
mod terminal;
mod unit;

pub use crate::grammar::GrammarParts;
pub use epsilon::{null_definite_variables, nullable_variables, remove_epsilon};
pub use long::decompose_long_productions;
pub use start::isolate_start;
pub use terminal::isolate_terminals;
pub use unit::{remove_unit_productions, unit_closure};

use crate::grammar::Grammar;
use crate::normal_form::CnfGrammar;
use crate::utils::Result;

/// A single normal form stage
pub type Stage = fn(GrammarParts) -> GrammarParts;

/// The stages in the order they must run
pub const STAGES: [(&str, Stage); 5] = [
    ("start isolation", isolate_start),
    ("epsilon elimination", remove_epsilon),
    ("unit production elimination", remove_unit_productions),
    ("long production decomposition", decompose_long_productions),
    ("terminal isolation", isolate_terminals),
];

fn rule_count(parts: &GrammarParts) -> usize {
    parts.rules.values().map(|alternatives| alternatives.len()).sum()
}

/// Convert `grammar` into an equivalent grammar in Chomsky normal form
pub fn to_chomsky_normal_form(grammar: &Grammar) -> Result<CnfGrammar> {
    log::info!(
        "Converting grammar to Chomsky normal form ({} variables, {} rules)",
        grammar.variables().len(),
        grammar.rule_count()
    );

    let mut parts = grammar.clone().into_parts();
    for (name, stage) in STAGES {
        parts = stage(parts);
        log::debug!(
            "After {}: {} variables, {} rules, start {}",
            name,
            parts.variables.len(),
            rule_count(&parts),
            parts.start
        );
    }

    let cnf = CnfGrammar::new(parts.into_grammar()?)?;
    log::info!(
        "Conversion complete ({} variables, {} rules)",
        cnf.grammar().variables().len(),
        cnf.grammar().rule_count()
    );
    Ok(cnf)
}
