//! Action dispatch - resolving authored actions into typed outcomes.
//!
//! Dispatch is total: an action whose guards hold always produces an
//! outcome, whatever its kind. The dispatcher never executes side effects
//! itself. Transfers, messages, webhooks and the rest come back as
//! descriptors, and navigations come back as requests for the context to
//! apply, so a failed handoff can never leave a conversation half-moved.

mod conditions;

pub use conditions::{condition_holds, conditions_hold};

use serde::{Deserialize, Serialize};

use flow_model::{Action, ActionId, ActionKind, Answer, CardId, QuestionId, System};

use crate::context::ConversationContext;
use crate::search::CardMatcher;

/// A movement request produced by dispatch.
///
/// Nothing has happened yet when one of these is returned; hand it to
/// [`ConversationContext::apply`] to take the step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigation {
    /// Target card; `None` means the current card.
    pub card_id: Option<CardId>,

    /// Target question; `None` means the target card's start question.
    pub question_id: Option<QuestionId>,

    /// Action name to record in history when this navigation applies.
    pub source: String,
}

/// A side effect for the caller to execute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideEffect {
    pub action_id: ActionId,

    /// The authored action kind, payload included.
    #[serde(flatten)]
    pub kind: ActionKind,

    /// Requested wait before executing, in milliseconds.
    #[serde(default)]
    pub delay_ms: u64,
}

/// Everything dispatching one action can produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ActionOutcome {
    /// Move the conversation.
    Navigation(Navigation),

    /// A search navigation found no card; the caller decides what to offer.
    #[serde(rename_all = "camelCase")]
    SearchNoResults { query: String },

    /// A step back was requested but the conversation has not moved yet.
    NoPreviousCard,

    /// Execute this effect outside the engine.
    SideEffect(SideEffect),

    /// The action's type tag is not in this engine's vocabulary.
    #[serde(rename_all = "camelCase")]
    UnknownAction { action_id: ActionId },
}

/// Resolves actions against a system and a live conversation.
pub struct ActionDispatcher {
    matcher: CardMatcher,
}

impl ActionDispatcher {
    pub fn new(matcher: CardMatcher) -> Self {
        Self { matcher }
    }

    /// Create a dispatcher with default search scoring.
    pub fn with_defaults() -> Self {
        Self::new(CardMatcher::with_defaults())
    }

    /// Dispatch one action.
    ///
    /// `None` means the action's guards did not hold and it was skipped.
    /// Everything else maps to exactly one [`ActionOutcome`].
    pub fn dispatch(
        &self,
        system: &System,
        context: &ConversationContext,
        action: &Action,
    ) -> Option<ActionOutcome> {
        if !conditions_hold(context, &action.conditions) {
            tracing::debug!(
                action = %action.id,
                kind = action.kind.name(),
                "guards did not hold; action skipped"
            );
            return None;
        }

        let outcome = match &action.kind {
            ActionKind::NavigateToCard {
                card_id,
                question_id,
            } => ActionOutcome::Navigation(Navigation {
                card_id: Some(card_id.clone()),
                question_id: question_id.clone(),
                source: action.kind.name().to_string(),
            }),
            ActionKind::NavigateToQuestion { question_id } => {
                ActionOutcome::Navigation(Navigation {
                    card_id: None,
                    question_id: Some(question_id.clone()),
                    source: action.kind.name().to_string(),
                })
            }
            ActionKind::SearchAndLoadCard { query } => {
                match self.matcher.find_best_match(system, query) {
                    Some(card) => ActionOutcome::Navigation(Navigation {
                        card_id: Some(card.id.clone()),
                        question_id: None,
                        source: action.kind.name().to_string(),
                    }),
                    None => ActionOutcome::SearchNoResults {
                        query: query.clone(),
                    },
                }
            }
            ActionKind::ReturnToPrevious => match context.previous_position() {
                Some(previous) => ActionOutcome::Navigation(Navigation {
                    card_id: Some(previous.card_id.clone()),
                    question_id: Some(previous.question_id.clone()),
                    source: action.kind.name().to_string(),
                }),
                None => ActionOutcome::NoPreviousCard,
            },
            // The configured start id goes through even when it dangles;
            // resolving it, and rejecting a dangling one, is apply's job.
            ActionKind::GoToStart => ActionOutcome::Navigation(Navigation {
                card_id: system.start_card_id().cloned(),
                question_id: None,
                source: action.kind.name().to_string(),
            }),
            ActionKind::Unknown => {
                tracing::warn!(action = %action.id, "unknown action type; reported, not executed");
                ActionOutcome::UnknownAction {
                    action_id: action.id.clone(),
                }
            }
            kind @ (ActionKind::SendMessage { .. }
            | ActionKind::TransferToAgent { .. }
            | ActionKind::ScheduleCallback { .. }
            | ActionKind::SendEmail { .. }
            | ActionKind::SaveUserData { .. }
            | ActionKind::UpdateContext { .. }
            | ActionKind::SetVariable { .. }
            | ActionKind::RedirectToUrl { .. }
            | ActionKind::OpenModal { .. }
            | ActionKind::TriggerWebhook { .. }
            | ActionKind::ConditionalBranch { .. }
            | ActionKind::RandomSelection { .. }
            | ActionKind::WeightedSelection { .. }) => ActionOutcome::SideEffect(SideEffect {
                action_id: action.id.clone(),
                kind: kind.clone(),
                delay_ms: action.delay_ms,
            }),
        };

        Some(outcome)
    }

    /// Dispatch every action of an answer, lowest priority value first.
    ///
    /// Guard-failed actions are skipped; the rest contribute one outcome
    /// each, in execution order. Every guard is evaluated against the
    /// context as passed in: outcomes are descriptors, not applied state,
    /// so a guard never sees the effect of an earlier sibling. Callers
    /// that want guards to observe earlier effects must dispatch one
    /// action at a time, applying each outcome before the next call.
    pub fn dispatch_answer(
        &self,
        system: &System,
        context: &ConversationContext,
        answer: &Answer,
    ) -> Vec<ActionOutcome> {
        answer
            .ordered_actions()
            .into_iter()
            .filter_map(|action| self.dispatch(system, context, action))
            .collect()
    }
}
