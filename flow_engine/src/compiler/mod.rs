//! Flow compilation - turning authored cards into render-ready flows.
//!
//! Compilation is a pure function of the card: no context, no clock, no
//! randomness. Anything that depends on the visitor (guard filtering,
//! message personalization) happens afterwards, against a compiled flow
//! and a live context, so one compiled card can serve every conversation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use flow_model::{
    Action, Answer, AnswerId, AnswerKind, AnswerStyling, Card, CardId, Condition, Personalization,
    Question, QuestionId, QuestionKind, QuestionMetadata,
};

use crate::context::ConversationContext;
use crate::dispatch::conditions_hold;

/// One question of a card, ready to present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentableFlow {
    pub id: QuestionId,
    pub card_id: CardId,

    /// The authored message, placeholders still in place.
    pub message: String,

    pub kind: QuestionKind,
    pub options: Vec<FlowOption>,
    pub personalization: Personalization,
    pub metadata: QuestionMetadata,
}

/// One choice the visitor can pick on a flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowOption {
    /// The answer this option came from, for click reporting.
    pub answer_id: AnswerId,

    pub text: String,
    pub kind: AnswerKind,

    /// Actions in authored order; dispatch reorders by priority.
    pub actions: Vec<Action>,

    /// Guards deciding whether the option is shown.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    #[serde(default)]
    pub styling: AnswerStyling,
}

impl PresentableFlow {
    /// Render the message for one visitor.
    ///
    /// `{{name}}` resolves from the visitor profile and falls back to
    /// "there". Variable placeholders resolve from the conversation's
    /// variables; a placeholder with no value is left in place so the
    /// omission is visible instead of silently blanked.
    pub fn personalized_message(&self, context: &ConversationContext) -> String {
        let mut message = self.message.clone();

        if self.personalization.use_user_name {
            let name = context
                .user_data()
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("there");
            message = message.replace("{{name}}", name);
        }

        if self.personalization.use_variables {
            for (name, value) in context.variables() {
                let placeholder = format!("{{{{{name}}}}}");
                if !message.contains(&placeholder) {
                    continue;
                }
                let rendered = match value {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                message = message.replace(&placeholder, &rendered);
            }
        }

        message
    }
}

/// Compile every question of a card into a presentable flow.
///
/// The map is keyed by question id; looking up the context's current
/// question gives the flow to render. Compiling the same card twice gives
/// equal output.
pub fn compile_card(card: &Card) -> HashMap<QuestionId, PresentableFlow> {
    card.questions
        .iter()
        .map(|question| (question.id.clone(), compile_question(card, question)))
        .collect()
}

/// The options a given visitor should actually see.
///
/// Options whose guards fail are hidden; authored order is kept.
pub fn visible_options<'a>(
    flow: &'a PresentableFlow,
    context: &ConversationContext,
) -> Vec<&'a FlowOption> {
    flow.options
        .iter()
        .filter(|option| conditions_hold(context, &option.conditions))
        .collect()
}

fn compile_question(card: &Card, question: &Question) -> PresentableFlow {
    PresentableFlow {
        id: question.id.clone(),
        card_id: card.id.clone(),
        message: question.text.clone(),
        kind: question.kind,
        options: question.answers.iter().map(compile_answer).collect(),
        personalization: question.personalization,
        metadata: question.metadata.clone(),
    }
}

fn compile_answer(answer: &Answer) -> FlowOption {
    FlowOption {
        answer_id: answer.id.clone(),
        text: answer.text.clone(),
        kind: answer.kind,
        actions: answer.actions.clone(),
        conditions: answer.conditions.clone(),
        styling: answer.styling.clone(),
    }
}
