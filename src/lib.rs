//! cflkit works with context-free grammars.
//!
//! Grammars can be converted to Chomsky normal form, checked for membership
//! and parsed with the CYK algorithm, and sampled to produce random strings.
//!
//! # Example
//!
//! ```rust
//! use cflkit::{GrammarBuilder, Recognizer};
//! use rand::SeedableRng;
//!
//! // S -> a S b | ε
//! let grammar = GrammarBuilder::new("S")
//!     .rule("S", &["a", "<S>", "b"])
//!     .epsilon("S")
//!     .build()?;
//!
//! let cnf = grammar.to_cnf()?;
//! assert!(cnf.is_member_str("a a b b")?);
//! assert!(!cnf.is_member_str("a b b")?);
//!
//! let tree = cnf.parse_tree_str("a b")?.expect("a b is derivable");
//! assert_eq!(tree.yield_string(), "a b");
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! for text in grammar.generate_strings(&mut rng, 3)? {
//!     assert!(cnf.is_member_str(&text)?);
//! }
//! # Ok::<(), cflkit::GrammarError>(())
//! ```

pub mod cnf;
pub mod cyk;
pub mod format;
pub mod grammar;
pub mod normal_form;
pub mod parse_tree;
pub mod symbol;
pub mod utils;

pub use cnf::to_chomsky_normal_form;
pub use cyk::{CykTable, Recognizer};
pub use format::GrammarFormat;
pub use grammar::{Alternatives, GenerateConfig, Grammar, GrammarBuilder, GrammarParts, Rules};
pub use normal_form::CnfGrammar;
pub use parse_tree::ParseTree;
pub use symbol::{Sequence, Symbol, Terminal, Variable};
pub use utils::{CnfViolation, GrammarError, Result};
