//! Remote generation request type.

use serde::Serialize;

use super::GameSettings;

/// Body of a question generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateRequest {
    pub category: String,
    pub difficulty: String,
    pub count: usize,
    /// Ids the caller has already shown; generators drop matching questions.
    pub exclude_ids: Vec<String>,
}

impl GenerateRequest {
    pub fn new(settings: &GameSettings, count: usize) -> Self {
        Self {
            category: settings.category.clone(),
            difficulty: settings.difficulty.clone(),
            count,
            exclude_ids: Vec::new(),
        }
    }

    /// Set the ids to exclude.
    pub fn exclude(mut self, ids: Vec<String>) -> Self {
        self.exclude_ids = ids;
        self
    }

    pub fn settings(&self) -> GameSettings {
        GameSettings::new(self.category.clone(), self.difficulty.clone())
    }
}
