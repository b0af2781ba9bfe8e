//! Conversation context - per-session position, history, and data.
//!
//! A context is the only mutable runtime state in the engine; the system
//! document stays read-only while conversations run. All mutation goes
//! through the methods here, which keep three things true:
//!
//! 1. History is append-only, and every entry was the current position at
//!    some point. The last entry always mirrors the current position, so
//!    "previous" is the entry before it.
//! 2. A navigation either applies fully (position, history, generation,
//!    analytics) or changes nothing.
//! 3. The generation counter grows by exactly one per applied navigation,
//!    so callers can detect writes based on a stale snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use flow_model::{CardId, ContextId, QuestionId, System};

use crate::dispatch::Navigation;

/// Action name recorded on the seeded first history entry.
pub const SESSION_START_ACTION: &str = "session_start";

/// One step of a conversation, recorded when it became the current position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub card_id: CardId,
    pub question_id: QuestionId,

    /// Name of the action that caused this step.
    pub action: String,
}

/// Counters a client can use to measure a conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextAnalytics {
    /// Applied navigations that changed the card.
    #[serde(default)]
    pub card_switches: u32,

    /// Answers the visitor has picked.
    #[serde(default)]
    pub questions_answered: u32,

    /// Milliseconds since creation, refreshed on each applied navigation.
    #[serde(default, rename = "totalTime")]
    pub total_time_ms: u64,

    /// Positions ("card/question") where the visitor went silent.
    #[serde(default)]
    pub drop_off_points: Vec<String>,
}

/// What applying a navigation did to the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Position, history, generation, and analytics were updated.
    Applied,
    /// The target could not be resolved or is not allowed; nothing changed.
    Rejected,
    /// The caller observed an older generation; nothing changed.
    Stale,
}

/// The live state of one conversation.
///
/// Fields are private so position and history can only change through the
/// navigation methods. Reads go through the accessors; serialization keeps
/// the full state for persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationContext {
    id: ContextId,
    session_id: String,
    current_card_id: CardId,
    current_question_id: QuestionId,
    history: Vec<HistoryEntry>,
    variables: HashMap<String, Value>,
    user_data: HashMap<String, Value>,
    analytics: ContextAnalytics,
    #[serde(default)]
    generation: u64,
    created_at: DateTime<Utc>,
}

impl ConversationContext {
    /// Start a conversation on the system's default card.
    ///
    /// Seeds history with a `session_start` entry for the starting
    /// position. `None` when the system has no resolvable start (no cards,
    /// or a default card without questions); validated systems always
    /// resolve.
    pub fn for_system(system: &System, session_id: impl Into<String>) -> Option<Self> {
        let card = system.default_card()?;
        let question = card.start_question()?;
        let now = Utc::now();

        Some(Self {
            id: ContextId::new(),
            session_id: session_id.into(),
            current_card_id: card.id.clone(),
            current_question_id: question.id.clone(),
            history: vec![HistoryEntry {
                timestamp: now,
                card_id: card.id.clone(),
                question_id: question.id.clone(),
                action: SESSION_START_ACTION.to_string(),
            }],
            variables: HashMap::new(),
            user_data: HashMap::new(),
            analytics: ContextAnalytics::default(),
            generation: 0,
            created_at: now,
        })
    }

    pub fn id(&self) -> &ContextId {
        &self.id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn current_card_id(&self) -> &CardId {
        &self.current_card_id
    }

    pub fn current_question_id(&self) -> &QuestionId {
        &self.current_question_id
    }

    /// Every step so far, oldest first. The last entry is the current
    /// position.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// The position a step back would return to.
    pub fn previous_position(&self) -> Option<&HistoryEntry> {
        if self.history.len() < 2 {
            return None;
        }
        self.history.get(self.history.len() - 2)
    }

    pub fn variables(&self) -> &HashMap<String, Value> {
        &self.variables
    }

    /// A single conversation variable.
    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn user_data(&self) -> &HashMap<String, Value> {
        &self.user_data
    }

    pub fn analytics(&self) -> &ContextAnalytics {
        &self.analytics
    }

    /// Monotonic counter of applied navigations.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Apply a navigation produced by dispatch.
    ///
    /// Resolves `card_id: None` to the current card and
    /// `question_id: None` to the target card's start question. Unknown
    /// targets and disabled cross-card moves reject with a log line and
    /// leave the context untouched.
    pub fn apply(&mut self, system: &System, navigation: &Navigation) -> ApplyOutcome {
        let card_id = navigation
            .card_id
            .clone()
            .unwrap_or_else(|| self.current_card_id.clone());

        let Some(card) = system.card(&card_id) else {
            tracing::warn!(card = %card_id, "navigation target card not found; context unchanged");
            return ApplyOutcome::Rejected;
        };

        if card_id != self.current_card_id && !system.settings.enable_cross_card_navigation {
            tracing::warn!(card = %card_id, "cross-card navigation is disabled; context unchanged");
            return ApplyOutcome::Rejected;
        }

        let question = match &navigation.question_id {
            Some(id) => card.question(id),
            None => card.start_question(),
        };
        let Some(question) = question else {
            tracing::warn!(
                card = %card_id,
                question = ?navigation.question_id,
                "navigation target question not found; context unchanged"
            );
            return ApplyOutcome::Rejected;
        };

        let switched_card = card_id != self.current_card_id;
        let now = Utc::now();

        self.current_card_id = card_id;
        self.current_question_id = question.id.clone();
        self.history.push(HistoryEntry {
            timestamp: now,
            card_id: self.current_card_id.clone(),
            question_id: self.current_question_id.clone(),
            action: navigation.source.clone(),
        });
        self.generation += 1;
        if switched_card {
            self.analytics.card_switches += 1;
        }
        self.analytics.total_time_ms = (now - self.created_at).num_milliseconds().max(0) as u64;

        ApplyOutcome::Applied
    }

    /// Apply a navigation only if the caller saw the latest generation.
    ///
    /// Lets a queueing client drop moves that were decided against an
    /// outdated snapshot of the conversation.
    pub fn apply_if_current(
        &mut self,
        system: &System,
        navigation: &Navigation,
        observed_generation: u64,
    ) -> ApplyOutcome {
        if observed_generation != self.generation {
            tracing::warn!(
                observed = observed_generation,
                current = self.generation,
                "navigation was decided against a stale context; dropped"
            );
            return ApplyOutcome::Stale;
        }
        self.apply(system, navigation)
    }

    /// Move to a card, optionally to a specific question on it.
    pub fn go_to_card(
        &mut self,
        system: &System,
        card_id: CardId,
        question_id: Option<QuestionId>,
    ) -> ApplyOutcome {
        self.apply(
            system,
            &Navigation {
                card_id: Some(card_id),
                question_id,
                source: "navigate_to_card".to_string(),
            },
        )
    }

    /// Move to a question on the current card.
    pub fn go_to_question(&mut self, system: &System, question_id: QuestionId) -> ApplyOutcome {
        self.apply(
            system,
            &Navigation {
                card_id: None,
                question_id: Some(question_id),
                source: "navigate_to_question".to_string(),
            },
        )
    }

    /// Step back to the previously visited position.
    ///
    /// Rejects when the conversation has not moved yet; the seeded start
    /// entry is the current position, not somewhere to return to.
    pub fn go_back(&mut self, system: &System) -> ApplyOutcome {
        let target = match self.previous_position() {
            Some(entry) => (entry.card_id.clone(), entry.question_id.clone()),
            None => {
                tracing::debug!("no previous position to return to; context unchanged");
                return ApplyOutcome::Rejected;
            }
        };
        self.apply(
            system,
            &Navigation {
                card_id: Some(target.0),
                question_id: Some(target.1),
                source: "return_to_previous".to_string(),
            },
        )
    }

    /// Restart at the system's default card.
    ///
    /// A configured default that no longer resolves rejects rather than
    /// restarting the current card.
    pub fn go_to_start(&mut self, system: &System) -> ApplyOutcome {
        self.apply(
            system,
            &Navigation {
                card_id: system.start_card_id().cloned(),
                question_id: None,
                source: "go_to_start".to_string(),
            },
        )
    }

    /// Set one conversation variable.
    pub fn set_variable(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    /// Merge a batch of variables, overwriting existing names.
    pub fn merge_variables(&mut self, entries: &HashMap<String, Value>) {
        for (name, value) in entries {
            self.variables.insert(name.clone(), value.clone());
        }
    }

    /// Set one field of the visitor profile.
    pub fn set_user_data(&mut self, field: impl Into<String>, value: Value) {
        self.user_data.insert(field.into(), value);
    }

    /// Count one answered question.
    pub fn record_answered(&mut self) {
        self.analytics.questions_answered += 1;
    }

    /// Mark the current position as a drop-off point.
    pub fn record_drop_off(&mut self) {
        let point = format!("{}/{}", self.current_card_id, self.current_question_id);
        self.analytics.drop_off_points.push(point);
    }
}
