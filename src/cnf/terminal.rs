use std::collections::BTreeSet;

use crate::grammar::{GrammarParts, Rules};
use crate::symbol::{FreshVariables, Sequence, Symbol};

const TERMINAL_BASE: &str = "Y";

/// Stage 5: in two-symbol alternatives, replace every terminal occurrence
/// with a fresh variable that derives just that terminal.
pub fn isolate_terminals(parts: GrammarParts) -> GrammarParts {
    let GrammarParts {
        mut variables,
        terminals,
        start,
        rules,
    } = parts;

    let mut fresh = FreshVariables::after(&variables);
    let mut isolated = Rules::new();

    for (lhs, alternatives) in rules {
        let mut rewritten = BTreeSet::new();
        for sequence in alternatives {
            if sequence.len() != 2 {
                rewritten.insert(sequence);
                continue;
            }
            let binary: Sequence = sequence
                .into_iter()
                .map(|symbol| match symbol {
                    Symbol::Terminal(_) => {
                        let proxy = fresh.next(TERMINAL_BASE);
                        variables.insert(proxy.clone());
                        isolated.insert(proxy.clone(), BTreeSet::from([vec![symbol]]));
                        Symbol::Variable(proxy)
                    }
                    Symbol::Variable(_) => symbol,
                })
                .collect();
            rewritten.insert(binary);
        }
        isolated.insert(lhs, rewritten);
    }

    GrammarParts {
        variables,
        terminals,
        start,
        rules: isolated,
    }
}
