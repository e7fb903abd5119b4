//! Prompt construction and reply cleanup for LLM-backed generation.

use serde_json::Value;

use crate::{Result, SupplyError};

/// Build the generation prompt for `count` questions.
///
/// Asks for a mix of the four question formats with at least one of each
/// and a bare JSON array as output.
pub fn build_prompt(category: &str, difficulty: &str, count: usize) -> String {
    format!(
        r#"Generate {count} creative, concise, and thought-provoking questions for "Elements of Truth" board game.

Category: {category}
Difficulty: {difficulty}

IMPORTANT: Generate questions across 4 TYPES. Ensure AT LEAST 1 of each type, distribute remaining randomly.

**Question Types:**

1. **MCQ (Multiple Choice)** - Short, creative questions with 4 options
   - Focus on reasoning and obscure but deducible facts
   - Keep questions concise (1-2 sentences max)

2. **True/False** - Surprising facts that challenge intuition
   - Examples: "Sharks have existed longer than Saturn's rings", "Cleopatra lived closer to iPhone release than Great Pyramid construction"
   - Provide 2 options: True, False

3. **More/Less** - Comparative questions about scale/magnitude
   - Examples: "Earth's atmosphere weight vs all living things combined", "Trees on Earth vs stars in Milky Way"
   - Provide 2 options: More, Less

4. **Number Line** - Scale/proportion questions with multiple choice answers
   - Examples: "If Earth = basketball, atmosphere thickness in mm?", "If Sun = front door, Earth size?"
   - Provide 4 numerical options (A, B, C, D)

**Output JSON format:**
[
    {{"type": "mcq", "question": "Short question text", "options": {{"A": "text", "B": "text", "C": "text", "D": "text"}}, "correct": "A", "explanation": "Brief explanation"}},
    {{"type": "truefalse", "question": "Surprising fact statement", "options": {{"A": "True", "B": "False"}}, "correct": "A", "explanation": "Brief explanation"}},
    {{"type": "moreless", "question": "Comparative question", "options": {{"A": "More", "B": "Less"}}, "correct": "A", "explanation": "Brief explanation"}},
    {{"type": "numberline", "question": "Scale/proportion question", "options": {{"A": "1mm", "B": "10mm", "C": "100mm", "D": "1000mm"}}, "correct": "B", "explanation": "Brief explanation"}}
]

Remember: AT LEAST 1 of each type must be present in the {count} questions.
"#
    )
}

/// Strip a surrounding ```json / ``` fence and whitespace from model output.
pub fn strip_code_fence(text: &str) -> &str {
    let mut text = text.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Parse model output into raw question items.
///
/// A reply that is not a JSON array is reported the way the game server
/// reports it: as an application error carrying the parse message.
pub fn parse_reply(text: &str) -> Result<Vec<Value>> {
    serde_json::from_str(strip_code_fence(text))
        .map_err(|e| SupplyError::RemoteApplication(format!("model returned malformed JSON: {e}")))
}
