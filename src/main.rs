use cflkit::{GenerateConfig, Grammar, GrammarFormat, Recognizer};
use clap::{Parser, Subcommand};
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};

/// Context-free grammar toolkit
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file describing the grammar file delimiters
    #[arg(long, global = true, value_name = "JSON")]
    format: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a string belongs to the grammar's language
    Check {
        /// Path to the grammar file
        file: PathBuf,
        /// Whitespace-separated terminals
        string: String,
    },
    /// Print a parse tree for a string
    Parse {
        /// Path to the grammar file
        file: PathBuf,
        /// Whitespace-separated terminals
        string: String,
        /// Print the tree as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate random strings from the grammar
    Generate {
        /// Path to the grammar file
        file: PathBuf,
        /// Number of strings to generate
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
        /// Give up on a sample after this many variable expansions
        #[arg(long, value_name = "N")]
        max_expansions: Option<usize>,
        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
        /// Generate from the Chomsky normal form instead of the grammar as written
        #[arg(long)]
        cnf: bool,
    },
    /// Print the grammar converted to Chomsky normal form
    Normalize {
        /// Path to the grammar file
        file: PathBuf,
    },
}

fn load(format: &GrammarFormat, file: &Path) -> Result<Grammar, Box<dyn std::error::Error>> {
    info!("Loading grammar from {}", file.display());
    let grammar = format.parse_file(file)?;
    info!(
        "Loaded {} variables, {} terminals, {} rules",
        grammar.variables().len(),
        grammar.terminals().len(),
        grammar.rule_count()
    );
    Ok(grammar)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let format = match &cli.format {
        Some(path) => GrammarFormat::from_json_file(path)?,
        None => GrammarFormat::default(),
    };

    match cli.command {
        Commands::Check { file, string } => {
            let cnf = load(&format, &file)?.to_cnf()?;
            let verdict = if cnf.is_member_str(&string)? { "in" } else { "not in" };
            println!("String '{}' is {} the language", string, verdict);
        }
        Commands::Parse { file, string, json } => {
            let cnf = load(&format, &file)?.to_cnf()?;
            match cnf.parse_tree_str(&string)? {
                Some(tree) if json => println!("{}", serde_json::to_string_pretty(&tree)?),
                Some(tree) => println!("{}", tree),
                None => println!("No derivation for '{}'", string),
            }
        }
        Commands::Generate {
            file,
            count,
            max_expansions,
            seed,
            cnf,
        } => {
            let mut grammar = load(&format, &file)?;
            if cnf {
                grammar = grammar.to_cnf()?.into_grammar();
            }
            let config = GenerateConfig {
                max_expansions,
                ..GenerateConfig::default()
            };
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            for text in grammar.generate_strings_with(&mut rng, count, &config)? {
                println!("{}", text);
            }
        }
        Commands::Normalize { file } => {
            let cnf = load(&format, &file)?.to_cnf()?;
            print!("{}", format.render(cnf.grammar()));
        }
    }

    Ok(())
}
