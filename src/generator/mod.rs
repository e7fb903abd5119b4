//! Remote question generators.
//!
//! - [`EndpointGenerator`]: talks to the game server's
//!   `/api/generate_question` route.
//! - [`GeminiGenerator`]: prompts the Gemini `generateContent` API directly.
//! - [`RetryingGenerator`]: decorator adding backoff on transient errors.
//!
//! Every generator funnels its reply through [`accept_batch`], which
//! validates items, derives ids, and drops excluded or duplicate questions.

pub mod endpoint;
pub mod gemini;
pub mod prompt;
pub mod retry;

pub use endpoint::EndpointGenerator;
pub use gemini::GeminiGenerator;
pub use retry::{RetryConfig, RetryingGenerator};

use std::collections::HashSet;

use serde_json::Value;
use tracing::warn;

use crate::types::{GenerateRequest, Question, RawQuestion};

/// Turn raw reply items into at most `request.count` usable questions.
///
/// Items that fail to decode or validate are logged and skipped, as are
/// excluded ids and repeats within the batch.
pub(crate) fn accept_batch(
    generator: &str,
    items: Vec<Value>,
    request: &GenerateRequest,
) -> Vec<Question> {
    let excluded: HashSet<&str> = request.exclude_ids.iter().map(String::as_str).collect();
    let mut ids = HashSet::new();
    let mut accepted = Vec::with_capacity(request.count.min(items.len()));

    for item in items {
        let question = match serde_json::from_value::<RawQuestion>(item)
            .map_err(crate::SupplyError::from)
            .and_then(RawQuestion::into_question)
        {
            Ok(q) => q,
            Err(e) => {
                warn!(generator, error = %e, "dropping invalid generated question");
                continue;
            }
        };
        if excluded.contains(question.id.as_str()) || !ids.insert(question.id.clone()) {
            continue;
        }
        accepted.push(question);
        if accepted.len() == request.count {
            break;
        }
    }
    accepted
}
