//! Actions - the atomic operations attached to answers.
//!
//! On the wire an action is `{ id, type, payload, conditions, priority,
//! delay }` with the payload shape decided by the type tag, so the kind is
//! modelled as an adjacently tagged enum. Unknown type tags deserialize to
//! [`ActionKind::Unknown`] instead of failing, payload and all, which lets
//! documents authored against a newer vocabulary still load.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::condition::Condition;
use crate::id::{ActionId, CardId, QuestionId};

/// An atomic operation executed when an answer is chosen.
///
/// An answer may carry several actions; `priority` orders them (ascending)
/// and `delay_ms` asks the caller to wait before executing this one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    #[serde(default)]
    pub id: ActionId,

    /// What the action does, with its payload.
    #[serde(flatten)]
    pub kind: ActionKind,

    /// Guards that must all hold for the action to run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    /// Execution order among sibling actions (lower runs first).
    #[serde(default)]
    pub priority: u8,

    /// Requested wait before execution, in milliseconds.
    #[serde(default, rename = "delay")]
    pub delay_ms: u64,
}

impl Action {
    /// Create an action of the given kind with no guards, priority 0 and no delay.
    pub fn new(kind: ActionKind) -> Self {
        Self {
            id: ActionId::new(),
            kind,
            conditions: Vec::new(),
            priority: 0,
            delay_ms: 0,
        }
    }

    /// Add a guard condition.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Set the execution order among sibling actions.
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Set the requested wait before execution.
    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

/// One branch of a [`ActionKind::ConditionalBranch`] action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalArm {
    /// Guards that select this branch.
    #[serde(default)]
    pub conditions: Vec<Condition>,

    /// Actions to run when the branch is selected.
    #[serde(default)]
    pub actions: Vec<Action>,
}

/// One choice of a [`ActionKind::WeightedSelection`] action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedChoice {
    /// Relative likelihood of this choice.
    pub weight: f32,

    /// Actions to run when the choice is drawn.
    #[serde(default)]
    pub actions: Vec<Action>,
}

/// The operation an action performs, together with its payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ActionKind {
    // Navigation.
    /// Move the conversation to another card, optionally to a specific question.
    #[serde(rename_all = "camelCase")]
    NavigateToCard {
        card_id: CardId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        question_id: Option<QuestionId>,
    },

    /// Move to another question on the current card.
    #[serde(rename_all = "camelCase")]
    NavigateToQuestion { question_id: QuestionId },

    /// Search all cards and move to the best match.
    SearchAndLoadCard { query: String },

    /// Step back to the previously visited position.
    ReturnToPrevious,

    /// Restart the conversation at the system's default card.
    GoToStart,

    // Communication.
    /// Show a message to the visitor.
    SendMessage { message: String },

    /// Hand the conversation over to a human agent.
    TransferToAgent {
        department: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// Ask an agent to call the visitor back after a delay.
    #[serde(rename_all = "camelCase")]
    ScheduleCallback {
        department: String,
        delay_minutes: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// Send an email on the visitor's behalf.
    SendEmail {
        subject: String,
        body: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        recipient: Option<String>,
    },

    // Data.
    /// Persist a field of the visitor profile.
    SaveUserData { key: String, value: Value },

    /// Merge several variables into the conversation context at once.
    UpdateContext { variables: HashMap<String, Value> },

    /// Set a single conversation variable.
    SetVariable { name: String, value: Value },

    // External.
    /// Send the visitor to a URL.
    RedirectToUrl { url: String },

    /// Open a modal dialog in the visitor's client.
    OpenModal { title: String, body: String },

    /// POST a payload to an external webhook.
    TriggerWebhook { url: String, payload: Value },

    // Composition.
    /// Run the first branch whose guards all hold.
    ConditionalBranch { branches: Vec<ConditionalArm> },

    /// Run one of the nested action lists, chosen uniformly by the caller.
    RandomSelection { actions: Vec<Action> },

    /// Run one choice, drawn by the caller proportionally to its weight.
    WeightedSelection { choices: Vec<WeightedChoice> },

    /// Any type tag this vocabulary does not know.
    ///
    /// Kept as a variant so loading never fails on newer documents; the
    /// dispatcher reports it instead of acting on it.
    Unknown,
}

impl ActionKind {
    /// The wire name of this kind, as it appears in the `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NavigateToCard { .. } => "navigate_to_card",
            Self::NavigateToQuestion { .. } => "navigate_to_question",
            Self::SearchAndLoadCard { .. } => "search_and_load_card",
            Self::ReturnToPrevious => "return_to_previous",
            Self::GoToStart => "go_to_start",
            Self::SendMessage { .. } => "send_message",
            Self::TransferToAgent { .. } => "transfer_to_agent",
            Self::ScheduleCallback { .. } => "schedule_callback",
            Self::SendEmail { .. } => "send_email",
            Self::SaveUserData { .. } => "save_user_data",
            Self::UpdateContext { .. } => "update_context",
            Self::SetVariable { .. } => "set_variable",
            Self::RedirectToUrl { .. } => "redirect_to_url",
            Self::OpenModal { .. } => "open_modal",
            Self::TriggerWebhook { .. } => "trigger_webhook",
            Self::ConditionalBranch { .. } => "conditional_branch",
            Self::RandomSelection { .. } => "random_selection",
            Self::WeightedSelection { .. } => "weighted_selection",
            Self::Unknown => "unknown",
        }
    }

    /// True for kinds that move the conversation to another position.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            Self::NavigateToCard { .. }
                | Self::NavigateToQuestion { .. }
                | Self::SearchAndLoadCard { .. }
                | Self::ReturnToPrevious
                | Self::GoToStart
        )
    }

    /// Actions nested inside composite kinds, in authored order.
    pub fn nested_actions(&self) -> Vec<&Action> {
        match self {
            Self::ConditionalBranch { branches } => {
                branches.iter().flat_map(|b| b.actions.iter()).collect()
            }
            Self::RandomSelection { actions } => actions.iter().collect(),
            Self::WeightedSelection { choices } => {
                choices.iter().flat_map(|c| c.actions.iter()).collect()
            }
            _ => Vec::new(),
        }
    }
}

// `#[serde(other)]` cannot absorb an adjacent `payload`, so deserialization
// reads the tag first and short-circuits unknown ones to `Unknown` before
// the strict parser sees the document.
impl<'de> Deserialize<'de> for ActionKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            #[serde(rename = "type")]
            tag: String,
            #[serde(default)]
            payload: Option<Value>,
        }

        let raw = Raw::deserialize(deserializer)?;
        if !known_tag(&raw.tag) {
            return Ok(Self::Unknown);
        }

        let mut tagged = serde_json::Map::with_capacity(2);
        tagged.insert("type".to_string(), Value::String(raw.tag));
        if let Some(payload) = raw.payload {
            tagged.insert("payload".to_string(), payload);
        }
        KnownKind::deserialize(Value::Object(tagged))
            .map(Self::from)
            .map_err(serde::de::Error::custom)
    }
}

/// Wire tags with a kind in this vocabulary; everything else parses as
/// [`ActionKind::Unknown`].
fn known_tag(tag: &str) -> bool {
    matches!(
        tag,
        "navigate_to_card"
            | "navigate_to_question"
            | "search_and_load_card"
            | "return_to_previous"
            | "go_to_start"
            | "send_message"
            | "transfer_to_agent"
            | "schedule_callback"
            | "send_email"
            | "save_user_data"
            | "update_context"
            | "set_variable"
            | "redirect_to_url"
            | "open_modal"
            | "trigger_webhook"
            | "conditional_branch"
            | "random_selection"
            | "weighted_selection"
    )
}

/// Strict parser for the known kinds, reached only for tags [`known_tag`]
/// accepts. Keep the variants and [`known_tag`] in lockstep with
/// [`ActionKind`].
#[derive(Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
enum KnownKind {
    #[serde(rename_all = "camelCase")]
    NavigateToCard {
        card_id: CardId,
        #[serde(default)]
        question_id: Option<QuestionId>,
    },
    #[serde(rename_all = "camelCase")]
    NavigateToQuestion { question_id: QuestionId },
    SearchAndLoadCard { query: String },
    ReturnToPrevious,
    GoToStart,
    SendMessage { message: String },
    TransferToAgent {
        department: String,
        #[serde(default)]
        message: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    ScheduleCallback {
        department: String,
        delay_minutes: u32,
        #[serde(default)]
        message: Option<String>,
    },
    SendEmail {
        subject: String,
        body: String,
        #[serde(default)]
        recipient: Option<String>,
    },
    SaveUserData { key: String, value: Value },
    UpdateContext { variables: HashMap<String, Value> },
    SetVariable { name: String, value: Value },
    RedirectToUrl { url: String },
    OpenModal { title: String, body: String },
    TriggerWebhook { url: String, payload: Value },
    ConditionalBranch { branches: Vec<ConditionalArm> },
    RandomSelection { actions: Vec<Action> },
    WeightedSelection { choices: Vec<WeightedChoice> },
}

impl From<KnownKind> for ActionKind {
    fn from(known: KnownKind) -> Self {
        match known {
            KnownKind::NavigateToCard {
                card_id,
                question_id,
            } => Self::NavigateToCard {
                card_id,
                question_id,
            },
            KnownKind::NavigateToQuestion { question_id } => {
                Self::NavigateToQuestion { question_id }
            }
            KnownKind::SearchAndLoadCard { query } => Self::SearchAndLoadCard { query },
            KnownKind::ReturnToPrevious => Self::ReturnToPrevious,
            KnownKind::GoToStart => Self::GoToStart,
            KnownKind::SendMessage { message } => Self::SendMessage { message },
            KnownKind::TransferToAgent {
                department,
                message,
            } => Self::TransferToAgent {
                department,
                message,
            },
            KnownKind::ScheduleCallback {
                department,
                delay_minutes,
                message,
            } => Self::ScheduleCallback {
                department,
                delay_minutes,
                message,
            },
            KnownKind::SendEmail {
                subject,
                body,
                recipient,
            } => Self::SendEmail {
                subject,
                body,
                recipient,
            },
            KnownKind::SaveUserData { key, value } => Self::SaveUserData { key, value },
            KnownKind::UpdateContext { variables } => Self::UpdateContext { variables },
            KnownKind::SetVariable { name, value } => Self::SetVariable { name, value },
            KnownKind::RedirectToUrl { url } => Self::RedirectToUrl { url },
            KnownKind::OpenModal { title, body } => Self::OpenModal { title, body },
            KnownKind::TriggerWebhook { url, payload } => Self::TriggerWebhook { url, payload },
            KnownKind::ConditionalBranch { branches } => Self::ConditionalBranch { branches },
            KnownKind::RandomSelection { actions } => Self::RandomSelection { actions },
            KnownKind::WeightedSelection { choices } => Self::WeightedSelection { choices },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_defaults() {
        let action = Action::new(ActionKind::GoToStart);
        assert!(action.conditions.is_empty());
        assert_eq!(action.priority, 0);
        assert_eq!(action.delay_ms, 0);
    }

    #[test]
    fn test_wire_tag_matches_kind_name() {
        let kinds = [
            ActionKind::ReturnToPrevious,
            ActionKind::SendMessage {
                message: "hi".to_string(),
            },
            ActionKind::NavigateToQuestion {
                question_id: QuestionId::from_raw("q1"),
            },
        ];
        for kind in kinds {
            let value = serde_json::to_value(&kind).unwrap();
            assert_eq!(value["type"], json!(kind.name()));
        }
    }

    #[test]
    fn test_navigation_classification() {
        assert!(ActionKind::GoToStart.is_navigation());
        assert!(ActionKind::SearchAndLoadCard {
            query: "billing".to_string()
        }
        .is_navigation());
        assert!(!ActionKind::SendMessage {
            message: "hi".to_string()
        }
        .is_navigation());
        assert!(!ActionKind::Unknown.is_navigation());
    }

    #[test]
    fn test_payload_fields_use_camel_case() {
        let parsed: Action = serde_json::from_str(
            r#"{
                "id": "act-cb",
                "type": "schedule_callback",
                "payload": { "department": "support", "delayMinutes": 30 },
                "priority": 1,
                "delay": 250
            }"#,
        )
        .unwrap();

        assert_eq!(
            parsed.kind,
            ActionKind::ScheduleCallback {
                department: "support".to_string(),
                delay_minutes: 30,
                message: None,
            }
        );
        assert_eq!(parsed.priority, 1);
        assert_eq!(parsed.delay_ms, 250);
    }

    #[test]
    fn test_unknown_type_tags_parse_as_unknown() {
        let parsed: Action = serde_json::from_str(
            r#"{
                "id": "act-confetti",
                "type": "launch_confetti",
                "payload": { "count": 3 }
            }"#,
        )
        .unwrap();

        assert_eq!(parsed.kind, ActionKind::Unknown);
        assert_eq!(parsed.id, ActionId::from_raw("act-confetti"));
    }

    #[test]
    fn test_unknown_kinds_may_carry_payloads() {
        let kind: ActionKind = serde_json::from_value(json!({
            "type": "launch_confetti",
            "payload": { "count": 3 }
        }))
        .unwrap();
        assert_eq!(kind, ActionKind::Unknown);

        // Without a payload too.
        let kind: ActionKind =
            serde_json::from_value(json!({ "type": "launch_confetti" })).unwrap();
        assert_eq!(kind, ActionKind::Unknown);
    }

    #[test]
    fn test_known_kinds_still_reject_bad_payloads() {
        let result = serde_json::from_value::<ActionKind>(json!({
            "type": "send_message",
            "payload": { "text": "wrong field" }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_nested_actions_parse() {
        let kind: ActionKind = serde_json::from_value(json!({
            "type": "weighted_selection",
            "payload": {
                "choices": [
                    { "weight": 0.7, "actions": [{ "type": "go_to_start" }] },
                    { "weight": 0.3, "actions": [] }
                ]
            }
        }))
        .unwrap();

        match kind {
            ActionKind::WeightedSelection { choices } => {
                assert_eq!(choices.len(), 2);
                assert_eq!(choices[0].actions.len(), 1);
                assert_eq!(choices[0].actions[0].kind, ActionKind::GoToStart);
            }
            other => panic!("expected weighted selection, got {other:?}"),
        }
    }
}
