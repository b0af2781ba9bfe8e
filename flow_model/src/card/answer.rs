//! Answer definitions - the options offered on a question.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::condition::Condition;
use crate::id::AnswerId;

/// One selectable option on a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    #[serde(default)]
    pub id: AnswerId,

    /// Label shown to the visitor.
    pub text: String,

    /// How the option is rendered.
    #[serde(default)]
    pub kind: AnswerKind,

    /// Actions executed when the answer is chosen, ordered by priority.
    #[serde(default)]
    pub actions: Vec<Action>,

    /// Guards that decide whether the answer is offered at all.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    /// Presentation hints for the client.
    #[serde(default)]
    pub styling: AnswerStyling,

    /// Usage counters maintained by the client.
    #[serde(default)]
    pub analytics: AnswerAnalytics,
}

impl Answer {
    /// Create a button answer with the given label and no actions.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: AnswerId::new(),
            text: text.into(),
            kind: AnswerKind::Button,
            actions: Vec::new(),
            conditions: Vec::new(),
            styling: AnswerStyling::default(),
            analytics: AnswerAnalytics::default(),
        }
    }

    /// Set how the option is rendered.
    pub fn with_kind(mut self, kind: AnswerKind) -> Self {
        self.kind = kind;
        self
    }

    /// Add an action to execute when the answer is chosen.
    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Add a guard on whether the answer is offered.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Set the presentation hints.
    pub fn with_styling(mut self, styling: AnswerStyling) -> Self {
        self.styling = styling;
        self
    }

    /// The answer's actions in execution order.
    ///
    /// Sorted ascending by priority; actions sharing a priority keep their
    /// authored order.
    pub fn ordered_actions(&self) -> Vec<&Action> {
        let mut actions: Vec<&Action> = self.actions.iter().collect();
        actions.sort_by(|a, b| a.priority.cmp(&b.priority));
        actions
    }

    /// Record that the visitor picked this answer.
    pub fn record_click(&mut self) {
        self.analytics.click_count += 1;
        self.analytics.last_used = Some(Utc::now());
    }
}

/// Rendering styles for an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerKind {
    /// A regular button.
    #[default]
    Button,
    /// A compact suggestion chip.
    QuickReply,
    /// A free-text input field.
    Input,
    /// An entry in a selection list.
    Selection,
}

/// Presentation hints for an answer, all optional.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnswerStyling {
    /// Named visual variant ("primary", "danger", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,

    /// Icon identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Color override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Usage counters for an answer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerAnalytics {
    /// How many times the answer was picked.
    #[serde(default)]
    pub click_count: u32,

    /// Share of picks that led to a successful outcome, 0.0 to 100.0.
    #[serde(default)]
    pub conversion_rate: f32,

    /// When the answer was last picked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
}
