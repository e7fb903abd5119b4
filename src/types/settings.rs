//! Game settings that select a question pool.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator used in composite pool keys.
pub const POOL_KEY_SEPARATOR: &str = "||";

/// The (category, difficulty) pair a game is configured with.
///
/// Order matters: `("Science", "Hard")` and `("Hard", "Science")` select
/// different pools.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameSettings {
    pub category: String,
    pub difficulty: String,
}

impl GameSettings {
    pub fn new(category: impl Into<String>, difficulty: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            difficulty: difficulty.into(),
        }
    }

    /// Composite key of the pool entry for these settings.
    pub fn pool_key(&self) -> String {
        format!(
            "{}{POOL_KEY_SEPARATOR}{}",
            self.category, self.difficulty
        )
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self::new("General Knowledge", "Medium")
    }
}

impl fmt::Display for GameSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.category, self.difficulty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_key_joins_with_separator() {
        let settings = GameSettings::new("Science", "Hard");
        assert_eq!(settings.pool_key(), "Science||Hard");
    }

    #[test]
    fn pool_key_is_order_sensitive() {
        let a = GameSettings::new("Science", "Hard");
        let b = GameSettings::new("Hard", "Science");
        assert_ne!(a.pool_key(), b.pool_key());
    }

    #[test]
    fn defaults_match_server_defaults() {
        let settings = GameSettings::default();
        assert_eq!(settings.category, "General Knowledge");
        assert_eq!(settings.difficulty, "Medium");
    }
}
