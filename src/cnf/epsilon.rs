use std::collections::BTreeSet;

use crate::grammar::{Alternatives, GrammarParts, Rules};
use crate::symbol::{Sequence, Symbol, Variable};

fn within(symbol: &Symbol, set: &BTreeSet<Variable>) -> bool {
    symbol.as_variable().is_some_and(|v| set.contains(v))
}

/// Variables whose every derivation yields only the empty string.
///
/// A variable without any alternatives derives nothing at all and is never
/// null-definite.
pub fn null_definite_variables(rules: &Rules) -> BTreeSet<Variable> {
    let epsilon_only: Alternatives = BTreeSet::from([Sequence::new()]);
    let mut found: BTreeSet<Variable> = rules
        .iter()
        .filter(|(_, alternatives)| **alternatives == epsilon_only)
        .map(|(variable, _)| variable.clone())
        .collect();

    loop {
        let before = found.len();
        for (variable, alternatives) in rules {
            if found.contains(variable) || alternatives.is_empty() {
                continue;
            }
            let only_empty = alternatives
                .iter()
                .all(|sequence| sequence.iter().all(|symbol| within(symbol, &found)));
            if only_empty {
                found.insert(variable.clone());
            }
        }
        if found.len() == before {
            return found;
        }
    }
}

/// Variables with at least one derivation of the empty string
pub fn nullable_variables(rules: &Rules) -> BTreeSet<Variable> {
    let mut found: BTreeSet<Variable> = rules
        .iter()
        .filter(|(_, alternatives)| alternatives.contains(&Sequence::new()))
        .map(|(variable, _)| variable.clone())
        .collect();

    loop {
        let before = found.len();
        for (variable, alternatives) in rules {
            if found.contains(variable) {
                continue;
            }
            let derives_empty = alternatives
                .iter()
                .any(|sequence| sequence.iter().all(|symbol| within(symbol, &found)));
            if derives_empty {
                found.insert(variable.clone());
            }
        }
        if found.len() == before {
            return found;
        }
    }
}

/// Every way of keeping or dropping each occurrence of `target`, minus the
/// empty sequence
fn drop_occurrences(sequence: &[Symbol], target: &Symbol) -> BTreeSet<Sequence> {
    let mut variants: Vec<Sequence> = vec![Sequence::new()];
    for symbol in sequence {
        if symbol == target {
            let dropped = variants.clone();
            for variant in &mut variants {
                variant.push(symbol.clone());
            }
            variants.extend(dropped);
        } else {
            for variant in &mut variants {
                variant.push(symbol.clone());
            }
        }
    }
    variants.into_iter().filter(|v| !v.is_empty()).collect()
}

/// Stage 2: remove epsilon alternatives while preserving the language.
///
/// Null-definite variables are deleted outright. Each occurrence of a
/// nullable variable is then made optional, and epsilon alternatives are
/// stripped everywhere except on a nullable start symbol.
pub fn remove_epsilon(parts: GrammarParts) -> GrammarParts {
    let GrammarParts {
        variables,
        terminals,
        start,
        rules,
    } = parts;

    let null_definite = null_definite_variables(&rules);
    if null_definite.contains(&start) {
        log::debug!("Start symbol {} only derives the empty string", start);
        let rules = Rules::from([(start.clone(), BTreeSet::from([Sequence::new()]))]);
        return GrammarParts {
            variables: BTreeSet::from([start.clone()]),
            terminals,
            start,
            rules,
        };
    }

    let variables: BTreeSet<Variable> = variables.difference(&null_definite).cloned().collect();
    let mut rules: Rules = rules
        .into_iter()
        .filter(|(variable, _)| !null_definite.contains(variable))
        .map(|(variable, alternatives)| {
            let spliced = alternatives
                .into_iter()
                .map(|sequence| {
                    sequence
                        .into_iter()
                        .filter(|symbol| !within(symbol, &null_definite))
                        .collect()
                })
                .collect();
            (variable, spliced)
        })
        .collect();

    let nullable = nullable_variables(&rules);
    for target in &nullable {
        let target = Symbol::Variable(target.clone());
        for alternatives in rules.values_mut() {
            let expanded: Vec<Sequence> = alternatives
                .iter()
                .filter(|sequence| sequence.contains(&target))
                .flat_map(|sequence| drop_occurrences(sequence, &target))
                .collect();
            alternatives.extend(expanded);
        }
    }

    for variable in &nullable {
        if let Some(alternatives) = rules.get_mut(variable) {
            alternatives.remove(&Sequence::new());
        }
    }
    if nullable.contains(&start) {
        rules.entry(start.clone()).or_default().insert(Sequence::new());
    }

    GrammarParts {
        variables,
        terminals,
        start,
        rules,
    }
}
