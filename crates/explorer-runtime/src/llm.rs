//! Language-model queries about the user's surroundings.
//!
//! [`build_environment_prompt`] turns the recognized objects into a textual
//! prompt; a [`LanguageModel`] answers it.  Only [`CannedLanguageModel`] ships
//! here: it returns a fixed answer and records the prompts it was given.
//!
//! # Example
//!
//! ```rust
//! use explorer_runtime::llm::{query_environment, CannedLanguageModel};
//!
//! let mut model = CannedLanguageModel::default();
//! let answer = query_environment(&mut model, "What am I looking at?", &[]).unwrap();
//! assert!(!answer.is_empty());
//! assert!(model.last_prompt().unwrap().contains("No objects recognized"));
//! ```

use explorer_types::RecognizedObject;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SYSTEM_PROMPT: &str = "\
You describe a user's indoor surroundings. Answer briefly, using only the \
recognized objects and building layout you are given.";

const CANNED_ANSWER: &str = "I see there are some recognized objects in front of you. \
This is a placeholder answer because no language model is attached.";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// No user message to answer.
    #[error("empty prompt")]
    EmptyPrompt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Message types (OpenAI-compatible)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Prompting
// ─────────────────────────────────────────────────────────────────────────────

/// Prompt text for `query` given the objects currently in view.
pub fn build_environment_prompt(query: &str, objects: &[RecognizedObject]) -> String {
    let summary = if objects.is_empty() {
        "No objects recognized at the moment.".to_string()
    } else {
        objects
            .iter()
            .map(|o| format!("Object: {}, at {}, confidence {:.2}", o.name, o.position, o.confidence))
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!(
        "User Query: {query}\nEnvironment Data:\n{summary}\n\n\
         Please answer the user query based on the recognized objects and building layout.\n"
    )
}

pub trait LanguageModel: Send {
    fn complete(&mut self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

/// Ask `model` about the surroundings.
pub fn query_environment(
    model: &mut dyn LanguageModel,
    query: &str,
    objects: &[RecognizedObject],
) -> Result<String, LlmError> {
    let messages = [
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(build_environment_prompt(query, objects)),
    ];
    model.complete(&messages)
}

/// A model that always gives the same answer.
#[derive(Debug, Clone)]
pub struct CannedLanguageModel {
    answer: String,
    last_prompt: Option<String>,
}

impl Default for CannedLanguageModel {
    fn default() -> Self {
        Self::new(CANNED_ANSWER)
    }
}

impl CannedLanguageModel {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            last_prompt: None,
        }
    }

    /// Content of the last user message seen.
    pub fn last_prompt(&self) -> Option<&str> {
        self.last_prompt.as_deref()
    }
}

impl LanguageModel for CannedLanguageModel {
    fn complete(&mut self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let prompt = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .ok_or(LlmError::EmptyPrompt)?;
        self.last_prompt = Some(prompt.content.clone());
        Ok(self.answer.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use explorer_types::Position3;

    fn chair() -> RecognizedObject {
        RecognizedObject {
            name: "Office Chair".into(),
            category: "furniture".into(),
            description: "A swivel chair".into(),
            position: Position3::new(0.5, 0.0, 2.0),
            confidence: 0.9,
        }
    }

    #[test]
    fn prompt_lists_each_object() {
        let prompt = build_environment_prompt("What am I looking at?", &[chair()]);
        assert!(prompt.starts_with("User Query: What am I looking at?\n"));
        assert!(prompt.contains("Object: Office Chair, at (0.50, 0.00, 2.00), confidence 0.90"));
    }

    #[test]
    fn prompt_without_objects_says_so() {
        let prompt = build_environment_prompt("describe", &[]);
        assert!(prompt.contains("No objects recognized at the moment."));
    }

    #[test]
    fn canned_model_records_prompt() {
        let mut model = CannedLanguageModel::new("It's a chair.");
        let answer = query_environment(&mut model, "What is around?", &[chair()]).unwrap();
        assert_eq!(answer, "It's a chair.");
        assert!(model.last_prompt().unwrap().contains("Office Chair"));
    }

    #[test]
    fn canned_model_needs_a_user_message() {
        let mut model = CannedLanguageModel::default();
        let err = model.complete(&[ChatMessage::system("hi")]).unwrap_err();
        assert_eq!(err, LlmError::EmptyPrompt);
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::user("hello")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hello"}"#);
    }
}
