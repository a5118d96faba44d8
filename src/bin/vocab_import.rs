//! Generate a group of Japanese words for a category and import it
//!
//! Usage:
//!   cargo run --bin vocab-import -- "food"
//!   cargo run --bin vocab-import -- "food" --yes   # import without asking
//!
//! Optional environment variables:
//! - PORTAL_API_URL (defaults to http://localhost:5000)

use anyhow::{bail, Context, Result};
use sprachkarten::api::ApiClient;
use sprachkarten::config::Config;
use sprachkarten::importer::{ImportWorkflow, ImportedWord};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

fn print_words(words: &[ImportedWord]) {
    for word in words {
        let parts: Vec<String> = word
            .parts
            .iter()
            .map(|p| format!("{}={}", p.kanji, p.romaji))
            .collect();
        println!(
            "  {:<8} {:<14} {:<20} [{}]",
            word.kanji,
            word.romaji,
            word.english,
            parts.join(", ")
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vocab_import=info".parse()?)
                .add_directive("sprachkarten=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let assume_yes = args.iter().any(|a| a == "--yes" || a == "-y");
    let category = args
        .iter()
        .find(|a| !a.starts_with('-'))
        .context("Usage: vocab-import <category> [--yes]")?;

    let config = Config::from_env()?;
    let client = ApiClient::new(&config).context("Failed to build HTTP client")?;
    let mut workflow = ImportWorkflow::new();

    info!("Generating words for '{}'", category);
    let words = workflow
        .generate(&client, category)
        .await
        .context("Failed to generate words")?;
    print_words(words);

    let confirmed = if assume_yes {
        true
    } else {
        println!("Import these words? [y/N]");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let answer = lines.next_line().await?.unwrap_or_default();
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    };

    if !confirmed {
        workflow.cancel();
        info!("Import cancelled");
        return Ok(());
    }

    match workflow.import(&client).await {
        Ok(receipt) => {
            info!("✓ {}", receipt.message);
            Ok(())
        }
        Err(e) => bail!(
            "Import failed: {}",
            workflow.last_error().map(str::to_string).unwrap_or_else(|| e.to_string())
        ),
    }
}
