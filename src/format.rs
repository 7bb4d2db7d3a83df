//! The line-oriented textual grammar format.
//!
//! ```text
//! # comment
//! <S> := <A> "b" | eps
//! <A> := "a" <A> | "a"
//! ```
//!
//! Every delimiter is configurable through [`GrammarFormat`], which can also
//! be loaded from a JSON file.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::grammar::{Grammar, Rules};
use crate::symbol::{Sequence, Symbol, Terminal, Variable};
use crate::utils::{GrammarError, Result};

/// Delimiters of the textual grammar format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrammarFormat {
    /// Separates the left-hand side from the alternatives
    pub transition: String,
    /// Opening and closing text around variable names
    pub variable_enclosure: (String, String),
    /// Opening and closing text around terminal names
    pub terminal_enclosure: (String, String),
    /// Lines starting with this are ignored
    pub comment: String,
    /// Separates alternatives
    pub separator: String,
    /// An alternative consisting of just this token is epsilon
    pub epsilon: String,
}

impl Default for GrammarFormat {
    fn default() -> Self {
        GrammarFormat {
            transition: ":=".to_string(),
            variable_enclosure: ("<".to_string(), ">".to_string()),
            terminal_enclosure: ("\"".to_string(), "\"".to_string()),
            comment: "#".to_string(),
            separator: "|".to_string(),
            epsilon: "eps".to_string(),
        }
    }
}

fn parse_error(line: usize, message: impl Into<String>) -> GrammarError {
    GrammarError::Parse {
        line,
        message: message.into(),
    }
}

impl GrammarFormat {
    /// Load a format description from a JSON file; missing fields keep their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Parse a grammar from a file
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<Grammar> {
        let content = fs::read_to_string(path)?;
        self.parse_str(&content)
    }

    /// Parse a grammar from text. The first left-hand side is the start symbol.
    pub fn parse_str(&self, content: &str) -> Result<Grammar> {
        let token = self.token_pattern()?;

        let mut variables = BTreeSet::new();
        let mut terminals = BTreeSet::new();
        let mut rules = Rules::new();
        let mut start: Option<Variable> = None;

        for (index, line) in content.lines().enumerate() {
            let number = index + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with(&self.comment) {
                continue;
            }

            let mut sides = line.split(self.transition.as_str());
            let (lhs, rhs) = match (sides.next(), sides.next(), sides.next()) {
                (Some(lhs), Some(rhs), None) => (lhs, rhs),
                (_, None, _) => {
                    return Err(parse_error(
                        number,
                        format!("missing transition symbol {:?}", self.transition),
                    ));
                }
                _ => {
                    return Err(parse_error(
                        number,
                        format!("only one transition symbol {:?} is allowed", self.transition),
                    ));
                }
            };

            let lhs = self.variable(lhs.trim(), number)?;
            variables.insert(lhs.clone());
            if start.is_none() {
                start = Some(lhs.clone());
            }

            let alternatives = rules.entry(lhs).or_default();
            for alternative in rhs.split(self.separator.as_str()) {
                let alternative = alternative.trim();
                if alternative == self.epsilon {
                    alternatives.insert(Sequence::new());
                    continue;
                }
                let sequence = self.sequence(&token, alternative, number)?;
                for symbol in &sequence {
                    match symbol {
                        Symbol::Variable(v) => variables.insert(v.clone()),
                        Symbol::Terminal(t) => terminals.insert(t.clone()),
                    };
                }
                alternatives.insert(sequence);
            }
        }

        let last_line = content.lines().count().max(1);
        let start = start.ok_or_else(|| parse_error(last_line, "no production rules found"))?;
        Grammar::new(variables, terminals, start, rules)
    }

    fn token_pattern(&self) -> Result<Regex> {
        let (var_open, var_close) = &self.variable_enclosure;
        let (term_open, term_close) = &self.terminal_enclosure;
        if [var_open, var_close, term_open, term_close]
            .iter()
            .any(|enclosure| enclosure.is_empty())
        {
            return Err(GrammarError::InvalidArgument(
                "symbol enclosures must not be empty".to_string(),
            ));
        }

        let pattern = format!(
            "{}(?P<variable>.+?){}|{}(?P<terminal>.+?){}",
            regex::escape(var_open),
            regex::escape(var_close),
            regex::escape(term_open),
            regex::escape(term_close)
        );
        Regex::new(&pattern)
            .map_err(|e| GrammarError::InvalidArgument(format!("unusable grammar format: {}", e)))
    }

    fn variable(&self, token: &str, line: usize) -> Result<Variable> {
        let (open, close) = &self.variable_enclosure;
        token
            .strip_prefix(open.as_str())
            .and_then(|rest| rest.strip_suffix(close.as_str()))
            .filter(|name| !name.is_empty())
            .map(Variable::new)
            .ok_or_else(|| {
                parse_error(
                    line,
                    format!(
                        "expected a variable of the form {}NAME{}, got {:?}",
                        open, close, token
                    ),
                )
            })
    }

    fn sequence(&self, token: &Regex, text: &str, line: usize) -> Result<Sequence> {
        let mut sequence = Sequence::new();
        let mut consumed = 0;

        for captures in token.captures_iter(text) {
            let Some(whole) = captures.get(0) else {
                continue;
            };
            let gap = &text[consumed..whole.start()];
            if !gap.trim().is_empty() {
                return Err(parse_error(line, format!("invalid token {:?}", gap.trim())));
            }
            consumed = whole.end();

            if let Some(name) = captures.name("variable") {
                sequence.push(Symbol::Variable(Variable::new(name.as_str())));
            } else if let Some(name) = captures.name("terminal") {
                sequence.push(Symbol::Terminal(Terminal::new(name.as_str())));
            }
        }

        let rest = text[consumed..].trim();
        if !rest.is_empty() {
            return Err(parse_error(line, format!("invalid token {:?}", rest)));
        }
        if sequence.is_empty() {
            return Err(parse_error(
                line,
                format!("empty alternative; write {:?} for the empty string", self.epsilon),
            ));
        }
        Ok(sequence)
    }

    /// Render `grammar` in this format, start symbol first.
    ///
    /// Variables without alternatives have no textual form and are skipped.
    pub fn render(&self, grammar: &Grammar) -> String {
        let (var_open, var_close) = &self.variable_enclosure;
        let (term_open, term_close) = &self.terminal_enclosure;
        let symbol = |symbol: &Symbol| match symbol {
            Symbol::Variable(v) => format!("{}{}{}", var_open, v, var_close),
            Symbol::Terminal(t) => format!("{}{}{}", term_open, t, term_close),
        };

        let start = grammar.start();
        let ordered = grammar
            .rules()
            .get_key_value(start)
            .into_iter()
            .chain(grammar.rules().iter().filter(|(lhs, _)| *lhs != start));

        let mut out = String::new();
        for (lhs, alternatives) in ordered {
            if alternatives.is_empty() {
                continue;
            }
            let rhs = alternatives
                .iter()
                .map(|sequence| {
                    if sequence.is_empty() {
                        self.epsilon.clone()
                    } else {
                        sequence.iter().map(symbol).collect::<Vec<_>>().join(" ")
                    }
                })
                .collect::<Vec<_>>()
                .join(&format!(" {} ", self.separator));
            out.push_str(&format!(
                "{}{}{} {} {}\n",
                var_open, lhs, var_close, self.transition, rhs
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarBuilder;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_str() {
        let content = r#"
            # Test comment
            <S> := <A> "b" | eps
            <A> := "a"<A> | "a"
            <S> := "c"
        "#;
        let grammar = GrammarFormat::default().parse_str(content).unwrap();

        let expected = GrammarBuilder::new("S")
            .rule("S", &["<A>", "b"])
            .epsilon("S")
            .rule("S", &["c"])
            .rule("A", &["a", "<A>"])
            .rule("A", &["a"])
            .build()
            .unwrap();
        assert_eq!(grammar, expected);
    }

    #[test]
    fn test_missing_transition() {
        let err = GrammarFormat::default()
            .parse_str("<S> := \"a\"\n<A> \"b\"")
            .unwrap_err();
        assert!(matches!(err, GrammarError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_double_transition() {
        let err = GrammarFormat::default()
            .parse_str("<S> := \"a\" := \"b\"")
            .unwrap_err();
        assert!(err.to_string().contains("only one transition"));
    }

    #[test]
    fn test_invalid_tokens() {
        let format = GrammarFormat::default();
        assert!(format.parse_str("S := \"a\"").is_err());
        assert!(format.parse_str("<S> := a").is_err());
        assert!(format.parse_str("<S> := \"a\" |").is_err());
        assert!(format.parse_str("<> := \"a\"").is_err());
    }

    #[test]
    fn test_empty_content() {
        let err = GrammarFormat::default().parse_str("\n# only a comment\n").unwrap_err();
        assert!(err.to_string().contains("no production rules"));
        assert!(matches!(err, GrammarError::Parse { line: 2, .. }));

        let err = GrammarFormat::default().parse_str("").unwrap_err();
        assert!(matches!(err, GrammarError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_custom_format() {
        let format = GrammarFormat {
            transition: "->".to_string(),
            variable_enclosure: ("[".to_string(), "]".to_string()),
            terminal_enclosure: ("'".to_string(), "'".to_string()),
            comment: "//".to_string(),
            separator: "/".to_string(),
            epsilon: "_".to_string(),
        };
        let grammar = format
            .parse_str("// greeting\n[S] -> 'hi' [S] / _")
            .unwrap();
        assert_eq!(grammar.rule_count(), 2);
        assert!(grammar.terminals().contains(&Terminal::new("hi")));
    }

    #[test]
    fn test_render_round_trip() {
        let grammar = GrammarBuilder::new("S")
            .rule("S", &["<A>", "b"])
            .epsilon("S")
            .rule("A", &["a"])
            .build()
            .unwrap();
        let format = GrammarFormat::default();
        let text = format.render(&grammar);
        assert_eq!(text, "<S> := eps | <A> \"b\"\n<A> := \"a\"\n");
        assert_eq!(format.parse_str(&text).unwrap(), grammar);
    }

    #[test]
    fn test_format_from_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"transition": "::=", "epsilon": "EPS"}}"#).unwrap();

        let format = GrammarFormat::from_json_file(file.path()).unwrap();
        assert_eq!(format.transition, "::=");
        assert_eq!(format.epsilon, "EPS");
        assert_eq!(format.separator, "|");
    }

    #[test]
    fn test_parse_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "<S> := \"x\" <S> | \"x\"").unwrap();
        let grammar = GrammarFormat::default().parse_file(file.path()).unwrap();
        assert_eq!(grammar.rule_count(), 2);
    }
}
