use std::collections::{BTreeMap, BTreeSet};

use crate::grammar::{GrammarParts, Rules};
use crate::symbol::{Sequence, Symbol, Variable};

fn unit_target(sequence: &Sequence) -> Option<&Variable> {
    match sequence.as_slice() {
        [Symbol::Variable(v)] => Some(v),
        _ => None,
    }
}

/// For every variable, the variables reachable through one or more unit
/// productions. A variable only reaches itself through a cycle.
pub fn unit_closure(rules: &Rules) -> BTreeMap<Variable, BTreeSet<Variable>> {
    let direct: BTreeMap<&Variable, BTreeSet<&Variable>> = rules
        .iter()
        .map(|(lhs, alternatives)| (lhs, alternatives.iter().filter_map(unit_target).collect()))
        .collect();

    direct
        .iter()
        .map(|(&lhs, successors)| {
            let mut reached: BTreeSet<&Variable> = BTreeSet::new();
            let mut frontier: Vec<&Variable> = successors.iter().copied().collect();
            while let Some(next) = frontier.pop() {
                if !reached.insert(next) {
                    continue;
                }
                if let Some(more) = direct.get(next) {
                    frontier.extend(more.iter().copied());
                }
            }
            (lhs.clone(), reached.into_iter().cloned().collect())
        })
        .collect()
}

/// Stage 3: replace unit productions `A -> B` by the non-unit alternatives
/// of everything `A` reaches through unit chains.
pub fn remove_unit_productions(parts: GrammarParts) -> GrammarParts {
    let closure = unit_closure(&parts.rules);
    let mut rules = parts.rules.clone();

    for (lhs, reachable) in &closure {
        let copied: Vec<Sequence> = reachable
            .iter()
            .filter(|target| *target != lhs)
            .filter_map(|target| parts.rules.get(target))
            .flatten()
            .filter(|sequence| unit_target(sequence).is_none())
            .cloned()
            .collect();
        rules.entry(lhs.clone()).or_default().extend(copied);
    }

    for alternatives in rules.values_mut() {
        alternatives.retain(|sequence| unit_target(sequence).is_none());
    }

    GrammarParts { rules, ..parts }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarBuilder;
    use pretty_assertions::assert_eq;

    fn var(name: &str) -> Variable {
        Variable::new(name)
    }

    #[test]
    fn test_unit_chain_collapses() {
        let parts = GrammarBuilder::new("S")
            .rule("S", &["<A>"])
            .rule("A", &["<B>"])
            .rule("B", &["x"])
            .build()
            .unwrap()
            .into_parts();

        let closure = unit_closure(&parts.rules);
        assert_eq!(closure[&var("S")], BTreeSet::from([var("A"), var("B")]));
        assert_eq!(closure[&var("A")], BTreeSet::from([var("B")]));
        assert!(closure[&var("B")].is_empty());

        let result = remove_unit_productions(parts);
        let x = BTreeSet::from([vec![Symbol::terminal("x")]]);
        assert_eq!(result.rules[&var("S")], x);
        assert_eq!(result.rules[&var("A")], x);
        assert_eq!(result.rules[&var("B")], x);
    }

    #[test]
    fn test_unit_cycle_terminates() {
        let parts = GrammarBuilder::new("S")
            .rule("S", &["<A>"])
            .rule("S", &["s"])
            .rule("A", &["<S>"])
            .rule("A", &["<A>"])
            .rule("A", &["a", "<S>"])
            .build()
            .unwrap()
            .into_parts();

        let closure = unit_closure(&parts.rules);
        assert_eq!(closure[&var("S")], BTreeSet::from([var("A"), var("S")]));

        let result = remove_unit_productions(parts);
        let expected = BTreeSet::from([
            vec![Symbol::terminal("s")],
            vec![Symbol::terminal("a"), Symbol::variable("S")],
        ]);
        assert_eq!(result.rules[&var("S")], expected);
        assert_eq!(result.rules[&var("A")], expected);
    }

    #[test]
    fn test_non_unit_single_terminal_kept() {
        let parts = GrammarBuilder::new("S")
            .rule("S", &["a"])
            .rule("S", &["<S>", "<S>"])
            .build()
            .unwrap()
            .into_parts();
        let expected = parts.rules.clone();
        let result = remove_unit_productions(parts);
        assert_eq!(result.rules, expected);
    }
}
