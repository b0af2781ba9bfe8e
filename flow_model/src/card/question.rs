//! Question definitions - the prompts shown inside a card.

use serde::{Deserialize, Serialize};

use crate::card::Answer;
use crate::condition::Condition;
use crate::id::{AnswerId, QuestionId};

/// A single prompt in a card's flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default)]
    pub id: QuestionId,

    /// The prompt shown to the visitor. May contain `{{placeholders}}`.
    pub text: String,

    /// How the visitor is expected to respond.
    #[serde(default)]
    pub kind: QuestionKind,

    /// Where the question sits on the authoring canvas. Not behavioral.
    #[serde(default)]
    pub position: CanvasPosition,

    /// The options offered for this question.
    #[serde(default)]
    pub answers: Vec<Answer>,

    /// Guards that decide whether the question may be shown.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    /// Variable names this question reads or writes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<String>,

    /// Which placeholder substitutions apply to the text.
    #[serde(default)]
    pub personalization: Personalization,

    #[serde(default)]
    pub metadata: QuestionMetadata,
}

impl Question {
    /// Create a plain text question with the given prompt.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: QuestionId::new(),
            text: text.into(),
            kind: QuestionKind::Text,
            position: CanvasPosition::default(),
            answers: Vec::new(),
            conditions: Vec::new(),
            variables: Vec::new(),
            personalization: Personalization::default(),
            metadata: QuestionMetadata::default(),
        }
    }

    /// Set how the visitor is expected to respond.
    pub fn with_kind(mut self, kind: QuestionKind) -> Self {
        self.kind = kind;
        self
    }

    /// Add an answer option.
    pub fn with_answer(mut self, answer: Answer) -> Self {
        self.answers.push(answer);
        self
    }

    /// Add a guard on whether the question may be shown.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Declare a variable this question reads or writes.
    pub fn with_variable(mut self, name: impl Into<String>) -> Self {
        self.variables.push(name.into());
        self
    }

    /// Set which placeholder substitutions apply to the text.
    pub fn with_personalization(mut self, personalization: Personalization) -> Self {
        self.personalization = personalization;
        self
    }

    /// Set the importance score used for analytics and ordering.
    pub fn with_importance(mut self, importance: f32) -> Self {
        self.metadata.importance = importance.clamp(0.0, 1.0);
        self
    }

    /// Look up an answer by id.
    pub fn answer(&self, id: &AnswerId) -> Option<&Answer> {
        self.answers.iter().find(|a| &a.id == id)
    }
}

/// Input modes for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Static prompt with button answers.
    #[default]
    Text,
    /// Free-text input expected from the visitor.
    Input,
    /// Pick one of several options.
    MultipleChoice,
    /// Pick another card to jump to.
    CardSelection,
    /// Free-text search over the card library.
    Search,
}

/// A question's position on the authoring canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CanvasPosition {
    pub x: f32,
    pub y: f32,
}

/// Placeholder substitutions enabled for a question's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Personalization {
    /// Substitute `{{name}}` from the visitor profile.
    #[serde(default)]
    pub use_user_name: bool,

    /// Substitute `{{variable}}` placeholders from conversation variables.
    #[serde(default)]
    pub use_variables: bool,
}

/// Authoring metadata attached to a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionMetadata {
    /// Importance score (0.0 - 1.0) for analytics and ordering.
    #[serde(default = "default_importance")]
    pub importance: f32,

    /// Action type to run when the visitor stops responding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_action: Option<String>,

    /// How many times an input question may be re-asked.
    #[serde(default)]
    pub max_retries: u32,
}

fn default_importance() -> f32 {
    0.5
}

impl Default for QuestionMetadata {
    fn default() -> Self {
        Self {
            importance: default_importance(),
            timeout_action: None,
            max_retries: 0,
        }
    }
}
