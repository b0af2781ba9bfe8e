//! Card definitions - self-contained conversation units.
//!
//! A card bundles a set of questions with the metadata used to find it:
//! tags, triggers, category, and usage statistics. Cards know nothing about
//! sessions; everything runtime lives in the engine.

mod answer;
mod question;

pub use answer::*;
pub use question::*;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::id::{CardId, QuestionId};

/// A self-contained conversation unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    #[serde(default)]
    pub id: CardId,

    /// Display name, also the strongest search signal.
    pub name: String,

    /// What the card covers, for authors and search.
    #[serde(default)]
    pub description: String,

    /// Free-form grouping label ("general", "billing", ...).
    #[serde(default)]
    pub category: String,

    /// Lifecycle state; only active cards should be offered to visitors.
    #[serde(default)]
    pub status: CardStatus,

    /// Author-assigned rank from 1 (highest) to 3 (lowest).
    #[serde(default = "default_priority")]
    pub priority: u8,

    /// Labels used by search and suggestions.
    #[serde(default)]
    pub tags: HashSet<String>,

    /// The card's questions. The first one is the entry point unless
    /// `start_question_id` says otherwise.
    #[serde(default)]
    pub questions: Vec<Question>,

    /// Explicit entry point override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_question_id: Option<QuestionId>,

    #[serde(default)]
    pub metadata: CardMetadata,

    /// Cards this one relates to, used as fallback suggestions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub linked_cards: Vec<CardId>,

    /// Phrases that should route a visitor's message to this card.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<String>,
}

fn default_priority() -> u8 {
    2
}

impl Card {
    /// Create an active card with the given name and no questions.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CardId::new(),
            name: name.into(),
            description: String::new(),
            category: String::new(),
            status: CardStatus::Active,
            priority: default_priority(),
            tags: HashSet::new(),
            questions: Vec::new(),
            start_question_id: None,
            metadata: CardMetadata::default(),
            linked_cards: Vec::new(),
            triggers: Vec::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the grouping label.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the lifecycle state.
    pub fn with_status(mut self, status: CardStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the author-assigned rank, clamped to 1..=3.
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority.clamp(1, 3);
        self
    }

    /// Add a search tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Append a question.
    pub fn with_question(mut self, question: Question) -> Self {
        self.questions.push(question);
        self
    }

    /// Override the entry question.
    pub fn with_start_question(mut self, id: QuestionId) -> Self {
        self.start_question_id = Some(id);
        self
    }

    /// Set the card metadata.
    pub fn with_metadata(mut self, metadata: CardMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Relate another card to this one.
    pub fn with_linked_card(mut self, id: CardId) -> Self {
        self.linked_cards.push(id);
        self
    }

    /// Add a routing phrase.
    pub fn with_trigger(mut self, phrase: impl Into<String>) -> Self {
        self.triggers.push(phrase.into());
        self
    }

    /// Look up a question by id.
    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| &q.id == id)
    }

    /// The question a conversation on this card starts at.
    ///
    /// The explicit `start_question_id` wins when set; otherwise the first
    /// authored question. `None` when the override points nowhere or the
    /// card has no questions.
    pub fn start_question(&self) -> Option<&Question> {
        match &self.start_question_id {
            Some(id) => self.question(id),
            None => self.questions.first(),
        }
    }

    /// True when the visitor's message contains one of the card's triggers.
    pub fn matches_trigger(&self, input: &str) -> bool {
        let input = input.to_lowercase();
        self.triggers
            .iter()
            .any(|phrase| input.contains(&phrase.to_lowercase()))
    }
}

/// Lifecycle states for a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
    /// Live and offered to visitors.
    #[default]
    Active,
    /// Hidden from visitors but kept in the library.
    Inactive,
    /// Still being authored.
    Draft,
}

/// Usage statistics and authoring hints for a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardMetadata {
    /// Rough completion time in seconds.
    #[serde(default = "default_duration", rename = "estimatedDuration")]
    pub estimated_duration_secs: u32,

    /// How demanding the card is for the visitor.
    #[serde(default)]
    pub difficulty: Difficulty,

    /// Share of conversations through this card that ended well, 0.0 - 100.0.
    #[serde(default)]
    pub success_rate: f32,

    /// How many conversations have passed through this card.
    #[serde(default)]
    pub usage: u32,
}

fn default_duration() -> u32 {
    60
}

impl Default for CardMetadata {
    fn default() -> Self {
        Self {
            estimated_duration_secs: default_duration(),
            difficulty: Difficulty::Medium,
            success_rate: 0.0,
            usage: 0,
        }
    }
}

/// How demanding a card is for the visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}
