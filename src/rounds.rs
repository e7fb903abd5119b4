//! The per-game question set.
//!
//! One question per round, keyed by 1-based round number in
//! [`Table::GameQuestions`]. Rewritten on every game start; the pool and
//! seen records are never touched from here.

use std::sync::Arc;

use crate::Result;
use crate::store::{self, DurableStore, Table};
use crate::types::Question;

/// Ephemeral store of the current game's questions.
#[derive(Clone)]
pub struct GameRounds {
    store: Arc<dyn DurableStore>,
}

impl GameRounds {
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self { store }
    }

    /// Drop every round of the previous game.
    pub async fn clear(&self) -> Result<()> {
        self.store.clear(Table::GameQuestions).await
    }

    /// Store `questions` as rounds `1..=questions.len()`, in order.
    pub async fn write(&self, questions: &[Question]) -> Result<()> {
        for (index, question) in questions.iter().enumerate() {
            let round = (index + 1).to_string();
            store::save(self.store.as_ref(), Table::GameQuestions, &round, question).await?;
        }
        Ok(())
    }

    /// The question for 1-based `round`, if stored.
    pub async fn round(&self, round: usize) -> Result<Option<Question>> {
        store::load(self.store.as_ref(), Table::GameQuestions, &round.to_string()).await
    }

    /// Every stored round as `(round, question)`, ordered by round.
    pub async fn all(&self) -> Result<Vec<(usize, Question)>> {
        let mut rounds: Vec<usize> = self
            .store
            .keys(Table::GameQuestions)
            .await?
            .iter()
            .filter_map(|key| key.parse().ok())
            .collect();
        rounds.sort_unstable();

        let mut questions = Vec::with_capacity(rounds.len());
        for round in rounds {
            if let Some(question) = self.round(round).await? {
                questions.push((round, question));
            }
        }
        Ok(questions)
    }
}
