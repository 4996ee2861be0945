use serde::{Deserialize, Serialize};

use crate::state::room::Question;

/// Question document as stored in the content database.
///
/// Field names follow the collection's existing camelCase convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionEntity {
    /// Category the question belongs to.
    pub category: String,
    /// Prompt text.
    pub question: String,
    /// Ordered answer options.
    pub options: Vec<String>,
    /// Index of the correct option.
    #[serde(rename = "correctIndex")]
    pub correct_index: usize,
    /// Optional explanation shown after the reveal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl From<QuestionEntity> for Question {
    fn from(value: QuestionEntity) -> Self {
        Self {
            category: value.category,
            prompt: value.question,
            options: value.options,
            correct_index: value.correct_index,
            explanation: value.explanation,
        }
    }
}
