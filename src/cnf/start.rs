use std::collections::BTreeSet;

use crate::grammar::GrammarParts;
use crate::symbol::{FreshVariables, Symbol};

/// Stage 1: make sure the start symbol never appears on a right-hand side.
///
/// If it does, a fresh variable becomes the new start with the single rule
/// `start' -> start`.
pub fn isolate_start(parts: GrammarParts) -> GrammarParts {
    let GrammarParts {
        mut variables,
        terminals,
        start,
        mut rules,
    } = parts;

    let start_symbol = Symbol::Variable(start.clone());
    let referenced = rules
        .values()
        .flatten()
        .any(|sequence| sequence.contains(&start_symbol));

    if !referenced {
        return GrammarParts {
            variables,
            terminals,
            start,
            rules,
        };
    }

    let new_start = FreshVariables::after(&variables).next(start.base());
    log::trace!("Start symbol {} is referenced; introducing {}", start, new_start);
    variables.insert(new_start.clone());
    rules.insert(new_start.clone(), BTreeSet::from([vec![start_symbol]]));

    GrammarParts {
        variables,
        terminals,
        start: new_start,
        rules,
    }
}
