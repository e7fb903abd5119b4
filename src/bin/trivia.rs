//! trivia - question supply CLI
//!
//! Drives the acquisition pipeline from the command line: set up a game,
//! inspect pools, and manage the seen set.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args as ClapArgs, Parser, Subcommand};
use trivia_supply::{Config, GameSettings, QuestionSupply, SupplyError};

/// Trivia question supply
#[derive(Parser)]
#[command(name = "trivia")]
#[command(version = trivia_supply::PKG_VERSION)]
#[command(about = "Acquire and cache AI-generated trivia questions")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, env = "TRIVIA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(ClapArgs)]
struct SettingsArgs {
    /// Question category
    #[arg(short, long, default_value = "General Knowledge")]
    category: String,
    /// Difficulty
    #[arg(short, long, default_value = "Medium")]
    difficulty: String,
}

impl SettingsArgs {
    fn settings(&self) -> GameSettings {
        GameSettings::new(self.category.clone(), self.difficulty.clone())
    }
}

#[derive(Subcommand)]
enum Command {
    /// Set up a game and print its questions as JSON
    Acquire {
        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Start a prefetch, then set up a game from it
    PrefetchAndAcquire {
        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Show the pool size for a category and difficulty
    Pool {
        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Print the current game's rounds as JSON
    Rounds,

    /// Show how many questions are in the seen set
    Seen,

    /// Forget every seen question
    ResetSeen,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_user_visible() => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: could not load questions ({e})");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), SupplyError> {
    let config = Config::load(args.config.as_deref())?;
    let supply = config.builder()?.build()?;

    match args.command {
        Command::Acquire { settings } => {
            let game = supply.acquire(&settings.settings()).await?;
            eprintln!("{} questions from {}", game.questions.len(), game.tier);
            println!("{}", serde_json::to_string_pretty(&game.questions)?);
        }
        Command::PrefetchAndAcquire { settings } => {
            let settings = settings.settings();
            let outcome = supply.prefetch(&settings).await?;
            eprintln!("prefetch: {outcome:?}");
            let game = supply.acquire(&settings).await?;
            eprintln!("{} questions from {}", game.questions.len(), game.tier);
            println!("{}", serde_json::to_string_pretty(&game.questions)?);
        }
        Command::Pool { settings } => print_pool(&supply, &settings.settings()).await?,
        Command::Rounds => {
            let rounds = supply.rounds().all().await?;
            let rounds: Vec<serde_json::Value> = rounds
                .into_iter()
                .map(|(round, question)| serde_json::json!({ "round": round, "question": question }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&rounds)?);
        }
        Command::Seen => {
            println!("{} questions seen", supply.seen().seen_ids().await?.len());
        }
        Command::ResetSeen => {
            supply.seen().reset().await?;
            println!("seen set cleared");
        }
    }
    Ok(())
}

async fn print_pool(supply: &QuestionSupply, settings: &GameSettings) -> Result<(), SupplyError> {
    let pool = supply.pool();
    let size = pool.size(settings).await?;
    let expired = pool
        .entry(settings)
        .await?
        .is_some_and(|e| e.is_expired(trivia_supply::cache::unix_millis()));
    println!("pool:          {settings}");
    println!("size:          {size}");
    println!("needs refresh: {}", pool.needs_refresh(settings).await?);
    println!("expired:       {expired}");
    Ok(())
}
