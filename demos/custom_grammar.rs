use cflkit::{GenerateConfig, GrammarBuilder, GrammarFormat, Recognizer};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::error::Error;

/// Build grammars programmatically and from text, then test and sample them
fn main() -> Result<(), Box<dyn Error>> {
    let mut rng = StdRng::seed_from_u64(42);

    // Example 1: Create a grammar with the builder
    let sentences = GrammarBuilder::new("sentence")
        .rule("sentence", &["<subject>", "<verb>", "<object>"])
        .rule("subject", &["The", "<adjective>", "<noun>"])
        .rule("subject", &["A", "<adjective>", "<noun>"])
        .rule("adjective", &["quick"])
        .rule("adjective", &["lazy"])
        .rule("adjective", &["clever"])
        .epsilon("adjective")
        .rule("noun", &["fox"])
        .rule("noun", &["dog"])
        .rule("noun", &["programmer"])
        .rule("verb", &["jumps", "over"])
        .rule("verb", &["observes"])
        .rule("object", &["the", "<adjective>", "<noun>"])
        .build()?;

    println!("Generated sentences:");
    for (i, text) in sentences.generate_strings(&mut rng, 5)?.iter().enumerate() {
        println!("{}. {}", i + 1, text);
    }

    let cnf = sentences.to_cnf()?;
    println!("\nChomsky normal form:\n{}", cnf);
    for text in ["The fox observes the lazy dog", "fox The observes"] {
        let verdict = if cnf.is_member_str(text)? { "accepted" } else { "rejected" };
        println!("{:?} is {}", text, verdict);
    }
    if let Some(tree) = cnf.parse_tree_str("A clever fox jumps over the dog")? {
        println!("Parse tree: {}", tree);
    }

    // Example 2: Parse a grammar from text and bound the generation effort
    let expressions = GrammarFormat::default().parse_str(
        r#"
        # arithmetic over a single variable
        <expr>   := <expr> "+" <term> | <term>
        <term>   := <term> "*" <factor> | <factor>
        <factor> := "(" <expr> ")" | "x" | "1"
        "#,
    )?;
    let config = GenerateConfig {
        max_expansions: Some(50),
        ..GenerateConfig::default()
    };

    println!("\nGenerated expressions:");
    let mut shown = 0;
    while shown < 3 {
        match expressions.generate_string_with(&mut rng, &config) {
            Ok(text) => {
                shown += 1;
                println!("{}. {}", shown, text);
            }
            Err(e) => println!("   (skipped: {})", e),
        }
    }

    let cnf = expressions.to_cnf()?;
    println!(
        "\nNormal form has {} variables and {} rules",
        cnf.grammar().variables().len(),
        cnf.grammar().rule_count()
    );
    if let Some(tree) = cnf.parse_tree_str("( x + 1 ) * x")? {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    }

    Ok(())
}
