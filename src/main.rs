//! Flashcard practice in the terminal
//!
//! Usage:
//!   cargo run -- --level B1 --pos verb --count 5
//!   cargo run -- --level A2 --pos adjective --mode pronunciation --lang de
//!
//! Commands once loaded: next, prev, reveal, translate, image, speak <file>
//! (Enter stops the recording early), level <A1..C2>, mode <identification|pronunciation>, lang, load, reset,
//! score, help, quit.
//!
//! Optional environment variables:
//! - REISE_API_URL (defaults to http://localhost:8000)
//! - DEFAULT_CEFR_LEVEL, DEFAULT_CARD_COUNT, PROMPT_LANGUAGE
//! - RECORDING_MAX_SECS (defaults to 5)

use anyhow::{bail, Context, Result};
use sprachkarten::api::ApiClient;
use sprachkarten::config::Config;
use sprachkarten::i18n::Language;
use sprachkarten::recorder::{FileAudioInput, Recorder};
use sprachkarten::session::{ImageState, PracticeMode, Session, SessionConfig};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// Delay between replayed file chunks, so a recording runs in real time
const FILE_PACE: Duration = Duration::from_millis(100);

/// Apply `--flag value` pairs on top of the env defaults
fn parse_args(args: &[String], config: &mut SessionConfig) -> Result<()> {
    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .with_context(|| format!("Missing value for {}", flag))?;

        match flag.as_str() {
            "--level" => config.level = Some(value.parse()?),
            "--pos" => config.part_of_speech = Some(value.parse()?),
            "--count" => {
                config.card_count = value
                    .parse()
                    .with_context(|| format!("Invalid card count: {}", value))?
            }
            "--mode" => config.practice_mode = value.parse()?,
            "--lang" => config.prompt_language = Language::from_code(value)?,
            other => bail!("Unknown argument: {}", other),
        }
    }
    Ok(())
}

fn print_card(session: &Session) {
    let strings = session.config().prompt_language.strings();
    let Some(card) = session.card() else {
        match session.state() {
            sprachkarten::session::SessionState::Failed { error } => println!("! {}", error),
            _ => println!("{}", strings.missing_filters),
        }
        return;
    };

    println!();
    println!(
        "{}",
        strings
            .card_position
            .replace("{current}", &card.position.to_string())
            .replace("{total}", &card.total.to_string())
    );
    println!("  {}", card.phrase);
    if let Some(translation) = &card.translation {
        println!("  ({})", translation);
    }

    match &card.image {
        ImageState::Empty => {}
        ImageState::Pending => println!("  {}", strings.image_loading),
        ImageState::Ready { path } => println!("  [image] {}", path),
        ImageState::Failed { message } => println!("  [image] {}", message),
    }

    if let Some(verdict) = &card.pronunciation {
        println!(
            "  {}",
            strings
                .heard
                .replace("{text}", &verdict.display_transcript())
        );
        let label = if verdict.is_correct {
            strings.correct
        } else {
            strings.incorrect
        };
        println!("  {} ({:.0}%)", label, verdict.confidence * 100.0);
    }
}

fn print_help() {
    println!("next | prev | reveal | translate | image | speak <file>");
    println!("level <A1..C2> | mode <identification|pronunciation> | lang");
    println!("load | reset | score | help | quit");
}

async fn load(session: &mut Session, client: &ApiClient) {
    println!("{}", session.config().prompt_language.strings().loading_words);
    match session.load_words(client).await {
        Ok(_) => session.prepare_card(client).await,
        Err(e) if e.is_validation() => warn!("{}", e),
        Err(e) => warn!("Could not load words: {}", e),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored if missing)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sprachkarten=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    let client = ApiClient::new(&config).context("Failed to build HTTP client")?;

    let mut session_config = SessionConfig::from_config(&config);
    let args: Vec<String> = std::env::args().skip(1).collect();
    parse_args(&args, &mut session_config)?;

    let mut session = Session::new(session_config).with_noun_pool(config.auxiliary_noun_pool);
    let mut recorder = Recorder::new(config.recording_max);

    info!(
        "{} against {}",
        session.config().prompt_language.strings().flashcards_title,
        config.reise_api_url
    );

    load(&mut session, &client).await;
    print_card(&session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            continue;
        };
        let argument = parts.next();

        match (command, argument) {
            ("next" | "n", _) => {
                if session.next() {
                    session.prepare_card(&client).await;
                }
            }
            ("prev" | "p", _) => {
                if session.previous() {
                    session.prepare_card(&client).await;
                }
            }
            ("reveal" | "r", _) => {
                session.toggle_reveal();
            }
            ("translate" | "t", _) => {
                session.toggle_translation();
            }
            ("image" | "i", _) => {
                session.refresh_image(&client, true).await;
            }
            ("speak" | "s", Some(path)) => {
                let Some(expected) = session.expected_text() else {
                    continue;
                };
                let ticket = session.card_ticket();
                let input = FileAudioInput::new(path).with_pace(FILE_PACE);
                println!(
                    "Recording (max {}s), press Enter to stop",
                    recorder.max_duration().as_secs()
                );

                let stop = recorder.stop_handle();
                let cycle = recorder.record_and_check(&input, &client, &expected);
                tokio::pin!(cycle);
                let mut stop_sent = false;
                let verdict = loop {
                    tokio::select! {
                        verdict = &mut cycle => break verdict,
                        _ = lines.next_line(), if !stop_sent => {
                            stop.stop();
                            stop_sent = true;
                        }
                    }
                };
                session.record_pronunciation(ticket, verdict);
            }
            ("level", Some(level)) => match level.parse() {
                Ok(level) => {
                    session.set_level(level);
                    session.prepare_card(&client).await;
                }
                Err(e) => warn!("{}", e),
            },
            ("mode", Some(mode)) => match mode.parse::<PracticeMode>() {
                Ok(mode) => {
                    session.set_practice_mode(mode);
                    session.prepare_card(&client).await;
                }
                Err(e) => warn!("{}", e),
            },
            ("lang", _) => {
                let language = session.config().prompt_language.toggled();
                session.set_prompt_language(language);
                println!("{}", language.native_name());
            }
            ("load", _) => load(&mut session, &client).await,
            ("reset", _) => session.reset(),
            ("score", _) => {
                let (correct, attempts) = session.pronunciation_score();
                println!("{}/{}", correct, attempts);
                for attempt in session.history() {
                    println!(
                        "  {} {} -> {}",
                        attempt.checked_at.format("%H:%M:%S"),
                        attempt.expected,
                        attempt.verdict.display_transcript()
                    );
                }
                continue;
            }
            ("help" | "h", _) => {
                print_help();
                continue;
            }
            ("quit" | "q", _) => break,
            _ => {
                print_help();
                continue;
            }
        }

        print_card(&session);
    }

    let (correct, attempts) = session.pronunciation_score();
    info!("Session finished: {}/{} pronounced correctly", correct, attempts);
    Ok(())
}
