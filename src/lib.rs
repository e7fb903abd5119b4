//! trivia-supply - question acquisition for AI-generated trivia games
//!
//! A game needs a fixed number of fresh questions for one (category,
//! difficulty) pair, and the generator that produces them is slow,
//! rate-limited and sometimes down. This crate hides that behind
//! [`QuestionSupply`], which tries three tiers in order:
//!
//! 1. the persistent per-settings question [pool](cache::PoolCache),
//!    filtered by the player's [seen set](cache::SeenTracker);
//! 2. a [prefetched](prefetch::PrefetchController) batch started while the
//!    player was still choosing settings;
//! 3. a direct call to the [`QuestionGenerator`].
//!
//! # Example
//!
//! ```rust,no_run
//! use trivia_supply::{GameSettings, QuestionSupply};
//!
//! #[tokio::main]
//! async fn main() -> trivia_supply::Result<()> {
//!     let supply = QuestionSupply::builder()
//!         .file_store("/tmp/trivia")
//!         .endpoint("http://127.0.0.1:5000")
//!         .build()?;
//!
//!     let settings = GameSettings::new("Science", "Hard");
//!
//!     // On the configuration screen
//!     supply.prefetch(&settings).await?;
//!
//!     // On the loading screen
//!     let game = supply.acquire(&settings).await?;
//!     for (round, question) in game.questions.iter().enumerate() {
//!         println!("{}: {}", round + 1, question.question);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod generator;
pub mod prefetch;
pub mod rounds;
pub mod store;
pub mod supply;
pub mod telemetry;
pub mod traits;
pub mod types;

// Re-export main types at crate root
pub use cache::{PoolCache, SeenTracker};
pub use config::Config;
pub use error::{Result, SupplyError};
pub use generator::{EndpointGenerator, GeminiGenerator, RetryConfig, RetryingGenerator};
pub use prefetch::{PrefetchController, PrefetchOutcome, PrefetchStatus};
pub use rounds::GameRounds;
pub use store::{DurableStore, FileStore, MemoryStore, Table};
pub use supply::{Acquisition, QUESTIONS_PER_GAME, QuestionSupply, SupplyBuilder, Tier};
pub use traits::QuestionGenerator;
pub use types::{GameSettings, GenerateRequest, Question, QuestionKind, RawQuestion};

/// Package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
