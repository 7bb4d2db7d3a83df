use crate::grammar::{GrammarParts, Rules};
use crate::symbol::{FreshVariables, Symbol};

const CHAIN_BASE: &str = "X";

/// Stage 4: split every alternative longer than two symbols into a chain of
/// binary alternatives.
///
/// `A -> X1 X2 ... Xk` becomes `A -> X1 A1`, `A1 -> X2 A2`, ...,
/// `A(k-2) -> X(k-1) Xk`, introducing `k - 2` fresh variables.
pub fn decompose_long_productions(parts: GrammarParts) -> GrammarParts {
    let GrammarParts {
        mut variables,
        terminals,
        start,
        rules,
    } = parts;

    let mut fresh = FreshVariables::after(&variables);
    let mut decomposed = Rules::new();

    for (lhs, alternatives) in rules {
        decomposed.entry(lhs.clone()).or_default();
        for sequence in alternatives {
            if sequence.len() <= 2 {
                decomposed.entry(lhs.clone()).or_default().insert(sequence);
                continue;
            }

            let (head, tail) = sequence.split_at(sequence.len() - 2);
            let mut current = lhs.clone();
            for symbol in head {
                let next = fresh.next(CHAIN_BASE);
                variables.insert(next.clone());
                decomposed
                    .entry(current)
                    .or_default()
                    .insert(vec![symbol.clone(), Symbol::Variable(next.clone())]);
                current = next;
            }
            decomposed.entry(current).or_default().insert(tail.to_vec());
        }
    }

    GrammarParts {
        variables,
        terminals,
        start,
        rules: decomposed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarBuilder;
    use crate::symbol::Variable;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    #[test]
    fn test_three_symbols_need_one_fresh_variable() {
        let parts = GrammarBuilder::new("S")
            .rule("S", &["<A>", "<B>", "<C>"])
            .rule("A", &["a"])
            .rule("B", &["b"])
            .rule("C", &["c"])
            .build()
            .unwrap()
            .into_parts();

        let result = decompose_long_productions(parts);
        let fresh: Vec<&Variable> = result.variables.iter().filter(|v| v.is_fresh()).collect();
        assert_eq!(fresh.len(), 1);
        let x = fresh[0].clone();

        assert_eq!(
            result.rules[&Variable::new("S")],
            BTreeSet::from([vec![Symbol::variable("A"), Symbol::Variable(x.clone())]])
        );
        assert_eq!(
            result.rules[&x],
            BTreeSet::from([vec![Symbol::variable("B"), Symbol::variable("C")]])
        );
        let binary = result
            .rules
            .values()
            .flatten()
            .filter(|s| s.len() == 2)
            .count();
        assert_eq!(binary, 2);
    }

    #[test]
    fn test_long_chain() {
        let parts = GrammarBuilder::new("S")
            .rule("S", &["a", "b", "c", "d", "e"])
            .build()
            .unwrap()
            .into_parts();

        let result = decompose_long_productions(parts);
        assert_eq!(result.variables.iter().filter(|v| v.is_fresh()).count(), 3);
        assert!(result.rules.values().flatten().all(|s| s.len() == 2));
        assert_eq!(result.rules.len(), 4);
    }

    #[test]
    fn test_short_alternatives_untouched() {
        let parts = GrammarBuilder::new("S")
            .rule("S", &["<A>", "b"])
            .rule("S", &["c"])
            .epsilon("S")
            .rule("A", &["a"])
            .build()
            .unwrap()
            .into_parts();
        let expected = parts.clone();
        assert_eq!(decompose_long_productions(parts), expected);
    }
}
