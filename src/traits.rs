//! Core QuestionGenerator trait

use async_trait::async_trait;

use crate::Result;
use crate::types::{GenerateRequest, Question};

/// A remote source of freshly generated questions.
///
/// Implementations return at most `request.count` validated questions, none
/// of whose ids appear in `request.exclude_ids`. A shorter list is a valid
/// answer. An explicit error payload from the service maps to
/// [`SupplyError::RemoteApplication`](crate::SupplyError::RemoteApplication);
/// failing to reach it maps to
/// [`SupplyError::RemoteTransport`](crate::SupplyError::RemoteTransport).
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    /// Generator name for logging.
    fn name(&self) -> &str;

    /// Generate a batch of questions.
    async fn generate(&self, request: &GenerateRequest) -> Result<Vec<Question>>;
}
