//! Guard conditions attached to actions, answers, and card links.
//!
//! Conditions are pure data here; evaluating them against a live
//! conversation belongs to the engine. Keeping the two apart means new
//! condition kinds only touch this enum and the engine's evaluator.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::id::CardId;

/// A single guard that must hold for the guarded element to apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    /// A field of the visitor profile must equal the given value.
    UserData { field: String, equals: Value },

    /// A conversation variable must equal the given value.
    Variable { name: String, equals: Value },

    /// The conversation history must contain a visit to the given card.
    #[serde(rename_all = "camelCase")]
    HistoryContains { card_id: CardId },
}

impl Condition {
    /// Guard on a visitor profile field.
    pub fn user_data(field: impl Into<String>, equals: Value) -> Self {
        Self::UserData {
            field: field.into(),
            equals,
        }
    }

    /// Guard on a conversation variable.
    pub fn variable(name: impl Into<String>, equals: Value) -> Self {
        Self::Variable {
            name: name.into(),
            equals,
        }
    }

    /// Guard on the conversation having visited a card.
    pub fn history_contains(card_id: CardId) -> Self {
        Self::HistoryContains { card_id }
    }
}
