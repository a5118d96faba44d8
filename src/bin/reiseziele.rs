//! Travel game: choose up to three activities and get destinations in Germany
//!
//! Usage:
//!   cargo run --bin reiseziele
//!   cargo run --bin reiseziele -- de
//!
//! Commands: a number to toggle that activity, `custom <text>`, `custom` to
//! toggle the custom activity, `lang`, `clear`, `go`, `quit`.
//!
//! Optional environment variables:
//! - REISE_API_URL (defaults to http://localhost:8000)

use anyhow::{Context, Result};
use sprachkarten::api::ApiClient;
use sprachkarten::config::Config;
use sprachkarten::i18n::Language;
use sprachkarten::travel::{find_destinations, ActivitySelection, MAX_ACTIVITIES};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

fn print_menu(language: Language, selection: &ActivitySelection) {
    let strings = language.strings();
    println!("\n{}", strings.travel_title);
    println!(
        "{}",
        strings
            .select_activities
            .replace("{max}", &MAX_ACTIVITIES.to_string())
    );

    for (i, activity) in strings.activities.iter().enumerate() {
        let mark = if selection.is_selected(activity) { "x" } else { " " };
        println!("  [{}] {} {}", mark, i + 1, activity);
    }

    let mark = if selection.custom_enabled() { "x" } else { " " };
    println!(
        "  [{}] {}: {}",
        mark,
        strings.custom_activity,
        selection.custom_text()
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("reiseziele=info".parse()?)
                .add_directive("sprachkarten=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    let client = ApiClient::new(&config).context("Failed to build HTTP client")?;

    let mut language = match std::env::args().nth(1) {
        Some(code) => Language::from_code(&code)?,
        None => config.prompt_language,
    };
    let mut selection = ActivitySelection::new();

    print_menu(language, &selection);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let strings = language.strings();

        match line.split_once(' ') {
            Some(("custom", text)) => {
                selection.set_custom_text(text.trim());
                if !selection.custom_enabled() {
                    selection.toggle_custom();
                }
            }
            _ => match line {
                "quit" | "q" => break,
                "clear" => selection.clear(),
                "custom" => {
                    if !selection.toggle_custom() && selection.custom_text().trim().is_empty() {
                        println!("{}", strings.enter_activity);
                    }
                }
                "lang" => {
                    // Catalogue entries are language specific
                    language = language.toggled();
                    selection.clear();
                }
                "go" => {
                    println!("{}", strings.searching);
                    match find_destinations(&client, &selection).await {
                        Ok(destinations) => {
                            println!("{}", strings.destinations);
                            for d in destinations {
                                println!("  {} ({})", d.destination_name, d.state);
                            }
                        }
                        Err(e) => warn!("{}", e),
                    }
                    continue;
                }
                other => match other.parse::<usize>() {
                    Ok(n) if (1..=strings.activities.len()).contains(&n) => {
                        selection.toggle(strings.activities[n - 1]);
                    }
                    _ => println!("{}", strings.no_destinations_yet),
                },
            },
        }

        print_menu(language, &selection);
    }

    info!("Bye");
    Ok(())
}
