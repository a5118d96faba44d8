//! Kana reading and writing practice against the lang-portal backend
//!
//! Usage:
//!   cargo run --bin kana-practice                 # hiragana
//!   cargo run --bin kana-practice -- katakana
//!
//! Type the romaji for the kana shown, or `draw <file.png>` to submit a
//! drawing of it. `skip`, `switch` (hiragana/katakana) and `quit` also work.
//!
//! Optional environment variables:
//! - PORTAL_API_URL (defaults to http://localhost:5000)

use anyhow::{Context, Result};
use sprachkarten::api::ApiClient;
use sprachkarten::config::Config;
use sprachkarten::error::KanaError;
use sprachkarten::kana::{KanaDrill, KanaType};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

async fn show_next(drill: &mut KanaDrill, client: &ApiClient) {
    match drill.next_prompt(client).await {
        Ok(prompt) => println!("\n  {}   (draw: {})", prompt.kana, prompt.romaji),
        Err(e) => warn!("Could not fetch kana: {}", e),
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
                .add_directive("kana_practice=info".parse()?)
                .add_directive("sprachkarten=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    let client = ApiClient::new(&config).context("Failed to build HTTP client")?;

    let kana_type = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<KanaType>()?,
        None => KanaType::default(),
    };
    let mut drill = KanaDrill::new(kana_type);
    info!("Practising {} against {}", kana_type, config.portal_api_url);

    show_next(&mut drill, &client).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line.split_once(' ') {
            Some(("draw", path)) => {
                let png = match tokio::fs::read(path.trim()).await {
                    Ok(png) => png,
                    Err(e) => {
                        warn!("Could not read {}: {}", path.trim(), e);
                        continue;
                    }
                };
                match drill.submit_drawing(&client, &png).await {
                    Ok(verdict) if verdict.success => println!("Correct!"),
                    Ok(verdict) => println!("Incorrect, recognised '{}'", verdict.recognized),
                    Err(e) => warn!("{}", e),
                }
            }
            _ => match line {
                "quit" | "q" => break,
                "skip" => {}
                "switch" => drill.set_kana_type(drill.kana_type().toggled()),
                answer => match drill.answer_romaji(answer) {
                    Ok(true) => println!("Correct!"),
                    Ok(false) => {
                        let expected = drill.current().map(|p| p.romaji.as_str()).unwrap_or("");
                        println!("Incorrect, it was '{}'", expected);
                    }
                    Err(KanaError::EmptyAnswer) => continue,
                    Err(e) => {
                        warn!("{}", e);
                        continue;
                    }
                },
            },
        }

        show_next(&mut drill, &client).await;
    }

    let (correct, attempts) = drill.score();
    info!("{}/{} correct", correct, attempts);
    Ok(())
}
