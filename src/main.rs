//! Digital Being Runtime
//!
//! The entry point. Handles CLI args, loads the character, wires the
//! collaborators together, and starts the being loop.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;

use digital_being::activity::{handlers, ActivityManager, ActivityRegistry};
use digital_being::agents::{EmotionEvaluator, OpenAiClient, ThoughtAgent, TriageAgent};
use digital_being::being::Being;
use digital_being::config;
use digital_being::display;
use digital_being::skills::{ImageGenClient, XApiClient};
use digital_being::state::BeingState;
use digital_being::types::{ActivityContext, SkillConfig};

const VERSION: &str = "0.1.0";

/// Digital Being -- an autonomous creature that lives in cycles
#[derive(Parser, Debug)]
#[command(
    name = "digital-being",
    version = VERSION,
    about = "Digital Being -- an autonomous creature that lives in cycles",
    long_about = "An autonomous digital being: it senses, interprets, feels, \
                  picks one activity per cycle, and rests."
)]
struct Cli {
    /// Start the being
    #[arg(long)]
    run: bool,

    /// Show the character's activities and their gates, then exit
    #[arg(long)]
    status: bool,

    /// Path to the character file
    #[arg(long, default_value = config::DEFAULT_CHARACTER_PATH)]
    character: String,
}

// ---- Status Command ---------------------------------------------------------

/// Show what the configured character could do from a fresh start.
fn show_status(character_path: &str) -> Result<()> {
    let character = config::load_character(character_path)?;

    let mut registry = ActivityRegistry::new();
    handlers::register_builtin_handlers(&mut registry);
    let manager = ActivityManager::new(&character, registry);

    let state = BeingState::new();
    println!("\ncharacter: {}", character.name);
    display::status_table(&manager.activity_status(&state, chrono::Utc::now()), &state);
    Ok(())
}

// ---- Main Run ---------------------------------------------------------------

/// Load config, wire up all collaborators, and run the being loop.
async fn run(character_path: &str) -> Result<()> {
    let character = config::load_character(character_path)?;

    let api_url = std::env::var("OPENAI_API_URL")
        .unwrap_or_else(|_| "https://api.openai.com".to_string());
    let api_key = std::env::var("OPENAI_API_KEY")
        .context("OPENAI_API_KEY is required to run the being")?;
    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

    let inference = Arc::new(OpenAiClient::new(api_url, api_key.clone(), model)?);
    let thought = Arc::new(ThoughtAgent::new(inference.clone(), character.clone()));
    let triage = Arc::new(TriageAgent::new(inference.clone()));
    let emotion = EmotionEvaluator::new(inference);

    let posting_config = character
        .skills
        .get("twitter_posting")
        .cloned()
        .unwrap_or_default();
    let x_api_key = std::env::var("X_API_KEY").unwrap_or_default();
    if posting_config.enabled && x_api_key.is_empty() {
        warn!("twitter_posting is enabled but X_API_KEY is not set; posts will fail");
    }
    let posting = Arc::new(XApiClient::from_config(&posting_config, x_api_key)?);

    let image_config = character
        .skills
        .get("image_generation")
        .cloned()
        .unwrap_or_else(SkillConfig::default);
    let images = Arc::new(ImageGenClient::from_config(
        &image_config,
        api_key,
        character.clone(),
    )?);

    let mut registry = ActivityRegistry::new();
    handlers::register_builtin_handlers(&mut registry);
    let manager = ActivityManager::new(&character, registry);

    let ctx = ActivityContext {
        character,
        reflection: thought,
        posting,
        images,
    };

    Being::new(manager, ctx, triage, emotion).run().await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if cli.status {
        return show_status(&cli.character);
    }

    if cli.run {
        return run(&cli.character).await;
    }

    // No flag given: default to running, matching what people expect
    // from a creature that exists to live.
    run(&cli.character).await
}
