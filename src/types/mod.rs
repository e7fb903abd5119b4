//! Core types for question supply

mod question;
mod request;
mod settings;

pub use question::{Question, QuestionKind, RawQuestion, normalize_text, question_id};
pub use request::GenerateRequest;
pub use settings::{GameSettings, POOL_KEY_SEPARATOR};
