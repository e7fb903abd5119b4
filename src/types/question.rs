//! Trivia question types and content-derived identity.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Result, SupplyError};

/// Separator between normalized text and serialized options in the id input.
const ID_FIELD_SEPARATOR: char = '\u{1f}';

/// Number of digest bytes kept in an id (rendered as 32 hex chars).
const ID_BYTES: usize = 16;

/// The four question formats the game board knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Multiple choice, four options.
    Mcq,
    /// Surprising statement, options "True"/"False".
    #[serde(alias = "truefalse", alias = "true/false")]
    TrueFalse,
    /// Comparison of magnitudes, options "More"/"Less".
    #[serde(alias = "moreless", alias = "more/less")]
    MoreLess,
    /// Scale or proportion estimate, four numeric options.
    #[serde(alias = "numberline")]
    NumberLine,
}

impl QuestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::Mcq => "mcq",
            QuestionKind::TrueFalse => "true_false",
            QuestionKind::MoreLess => "more_less",
            QuestionKind::NumberLine => "number_line",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated question with a stable, content-derived id.
///
/// Construct through [`Question::new`] or [`RawQuestion::into_question`]; the
/// id is always recomputed from content so identical questions from different
/// batches collapse to one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub question: String,
    /// Option key (e.g. "A") to option text. Two or four entries.
    pub options: BTreeMap<String, String>,
    /// Key of the correct option.
    pub correct: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
}

impl Question {
    /// Build a question, validating its shape and deriving its id.
    pub fn new(
        kind: QuestionKind,
        question: impl Into<String>,
        options: BTreeMap<String, String>,
        correct: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Result<Self> {
        let question = question.into();
        let correct = correct.into();

        if question.trim().is_empty() {
            return Err(SupplyError::InvalidQuestion("empty question text".into()));
        }
        if options.len() != 2 && options.len() != 4 {
            return Err(SupplyError::InvalidQuestion(format!(
                "expected 2 or 4 options, got {}",
                options.len()
            )));
        }
        if !options.contains_key(&correct) {
            return Err(SupplyError::InvalidQuestion(format!(
                "correct key '{correct}' is not one of the options"
            )));
        }

        Ok(Self {
            id: question_id(&question, &options),
            question,
            options,
            correct,
            explanation: explanation.into(),
            kind,
        })
    }
}

/// A question as it arrives from a generator, before validation.
///
/// Any `id` the remote side sends is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuestion {
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub question: String,
    pub options: BTreeMap<String, String>,
    pub correct: String,
    #[serde(default)]
    pub explanation: String,
}

impl RawQuestion {
    pub fn into_question(self) -> Result<Question> {
        Question::new(
            self.kind,
            self.question,
            self.options,
            self.correct,
            self.explanation,
        )
    }
}

/// Lowercase, trim, and collapse internal whitespace runs to one space.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Derive the stable id for a question's content.
///
/// SHA-256 over the normalized text and the options serialized with sorted
/// keys, truncated to 16 bytes of hex.
pub fn question_id(text: &str, options: &BTreeMap<String, String>) -> String {
    let canonical_options = serde_json::to_string(options).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(normalize_text(text).as_bytes());
    hasher.update(ID_FIELD_SEPARATOR.to_string().as_bytes());
    hasher.update(canonical_options.as_bytes());
    hasher.finalize()[..ID_BYTES]
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn id_is_stable_across_whitespace_and_case() {
        let opts = options(&[("A", "True"), ("B", "False")]);
        let a = question_id("Sharks are older than trees", &opts);
        let b = question_id("  sharks   ARE older than\ttrees ", &opts);
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn id_differs_on_text() {
        let opts = options(&[("A", "True"), ("B", "False")]);
        assert_ne!(
            question_id("Sharks are older than trees", &opts),
            question_id("Trees are older than sharks", &opts)
        );
    }

    #[test]
    fn id_differs_on_options() {
        let a = question_id("How far?", &options(&[("A", "1mm"), ("B", "10mm")]));
        let b = question_id("How far?", &options(&[("A", "1mm"), ("B", "100mm")]));
        assert_ne!(a, b);
    }

    #[test]
    fn id_ignores_option_insertion_order() {
        let mut first = BTreeMap::new();
        first.insert("B".to_string(), "Less".to_string());
        first.insert("A".to_string(), "More".to_string());
        let second = options(&[("A", "More"), ("B", "Less")]);
        assert_eq!(question_id("q", &first), question_id("q", &second));
    }

    #[test]
    fn rejects_three_options() {
        let err = Question::new(
            QuestionKind::Mcq,
            "q",
            options(&[("A", "1"), ("B", "2"), ("C", "3")]),
            "A",
            "",
        )
        .unwrap_err();
        assert!(matches!(err, SupplyError::InvalidQuestion(_)));
    }

    #[test]
    fn rejects_unknown_correct_key() {
        let err = Question::new(
            QuestionKind::TrueFalse,
            "q",
            options(&[("A", "True"), ("B", "False")]),
            "C",
            "",
        )
        .unwrap_err();
        assert!(err.to_string().contains("'C'"));
    }

    #[test]
    fn rejects_blank_text() {
        let result = Question::new(
            QuestionKind::TrueFalse,
            "   ",
            options(&[("A", "True"), ("B", "False")]),
            "A",
            "",
        );
        assert!(result.is_err());
    }

    #[test]
    fn raw_question_accepts_legacy_kind_spellings() {
        let json = r#"[
            {"type": "truefalse", "question": "a", "options": {"A": "True", "B": "False"}, "correct": "A", "explanation": "x"},
            {"type": "moreless", "question": "b", "options": {"A": "More", "B": "Less"}, "correct": "B"},
            {"type": "numberline", "question": "c", "options": {"A": "1", "B": "2", "C": "3", "D": "4"}, "correct": "D", "explanation": "z"},
            {"type": "mcq", "question": "d", "options": {"A": "1", "B": "2", "C": "3", "D": "4"}, "correct": "C", "explanation": "w"}
        ]"#;
        let raw: Vec<RawQuestion> = serde_json::from_str(json).unwrap();
        let kinds: Vec<QuestionKind> = raw.iter().map(|q| q.kind).collect();
        assert_eq!(
            kinds,
            vec![
                QuestionKind::TrueFalse,
                QuestionKind::MoreLess,
                QuestionKind::NumberLine,
                QuestionKind::Mcq
            ]
        );
        assert_eq!(raw[1].explanation, "");
    }

    #[test]
    fn raw_id_is_replaced_by_content_id() {
        let json = r#"{"id": "server-7", "type": "mcq", "question": "q", "options": {"A": "x", "B": "y"}, "correct": "A"}"#;
        let raw: RawQuestion = serde_json::from_str(json).unwrap();
        let question = raw.into_question().unwrap();
        assert_ne!(question.id, "server-7");
        assert_eq!(question.id, question_id("q", &question.options));
    }

    #[test]
    fn question_serializes_kind_as_type() {
        let q = Question::new(
            QuestionKind::MoreLess,
            "q",
            options(&[("A", "More"), ("B", "Less")]),
            "A",
            "e",
        )
        .unwrap();
        let value = serde_json::to_value(&q).unwrap();
        assert_eq!(value["type"], "more_less");
        assert_eq!(value["id"], q.id.as_str());
    }
}
