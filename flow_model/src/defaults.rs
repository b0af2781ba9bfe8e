//! The system shipped with new installations.
//!
//! Two cards: a welcome card that greets and routes, and a support card
//! that hands the conversation to a person. Ids are fixed strings so
//! integrations can address the shipped content directly.

use crate::action::{Action, ActionKind};
use crate::card::{
    Answer, AnswerStyling, Card, CardMetadata, Difficulty, Personalization, Question, QuestionKind,
};
use crate::id::{AnswerId, CardId, QuestionId, SystemId};
use crate::system::{CardLink, LinkMetadata, LinkTrigger, System};

/// Build the system used when no document has been authored yet.
pub fn default_system() -> System {
    let mut system = System::new("Customer Support")
        .with_card(welcome_card())
        .with_card(support_card())
        .with_link(
            CardLink::new(CardId::from_raw("welcome"), CardId::from_raw("human-support"))
                .with_trigger(LinkTrigger::Suggestion)
                .with_weight(0.9)
                .with_metadata(LinkMetadata {
                    usage: 34,
                    success_rate: 81.0,
                }),
        );

    system.id = SystemId::from_raw("sys-customer-support");
    system.settings.default_card_id = Some(CardId::from_raw("welcome"));
    system.settings.fallback_card_id = Some(CardId::from_raw("human-support"));
    system
}

/// The greeting card of the shipped system.
pub fn welcome_card() -> Card {
    let start = question("welcome-start", "Hi {{name}}! How can we help you today?")
        .with_kind(QuestionKind::MultipleChoice)
        .with_personalization(Personalization {
            use_user_name: true,
            use_variables: false,
        })
        .with_importance(0.9)
        .with_answer(answer("welcome-topics-btn", "Browse help topics").with_action(
            Action::new(ActionKind::NavigateToQuestion {
                question_id: QuestionId::from_raw("welcome-topics"),
            }),
        ))
        .with_answer(
            answer("welcome-human", "Talk to a human")
                .with_styling(AnswerStyling {
                    variant: Some("primary".to_string()),
                    icon: None,
                    color: None,
                })
                .with_action(Action::new(ActionKind::TransferToAgent {
                    department: "sales".to_string(),
                    message: Some("Visitor asked for a person right away".to_string()),
                })),
        )
        .with_answer(answer("welcome-search", "Find the right team").with_action(
            Action::new(ActionKind::SearchAndLoadCard {
                query: "support".to_string(),
            }),
        ));

    let topics = question("welcome-topics", "What would you like help with?")
        .with_kind(QuestionKind::MultipleChoice)
        .with_answer(
            answer("topics-account", "Account questions")
                .with_action(
                    Action::new(ActionKind::SendMessage {
                        message: "Our team can sort out anything account-related.".to_string(),
                    })
                    .with_priority(0),
                )
                .with_action(
                    Action::new(ActionKind::NavigateToCard {
                        card_id: CardId::from_raw("human-support"),
                        question_id: None,
                    })
                    .with_priority(1),
                ),
        )
        .with_answer(
            answer("topics-hello", "Just saying hello")
                .with_action(
                    Action::new(ActionKind::SetVariable {
                        name: "mood".to_string(),
                        value: serde_json::Value::String("friendly".to_string()),
                    })
                    .with_priority(0),
                )
                .with_action(
                    Action::new(ActionKind::SendMessage {
                        message: "Hello right back! Take your time and look around.".to_string(),
                    })
                    .with_priority(1),
                ),
        )
        .with_answer(
            answer("topics-back", "Back").with_action(Action::new(ActionKind::ReturnToPrevious)),
        )
        .with_answer(
            answer("topics-restart", "Start over").with_action(Action::new(ActionKind::GoToStart)),
        );

    let mut card = Card::new("Welcome")
        .with_description("Greets new visitors and routes them to the right place")
        .with_category("general")
        .with_priority(1)
        .with_tag("greeting")
        .with_tag("start")
        .with_tag("hello")
        .with_trigger("hello")
        .with_trigger("hi")
        .with_trigger("start over")
        .with_question(start)
        .with_question(topics)
        .with_start_question(QuestionId::from_raw("welcome-start"))
        .with_metadata(CardMetadata {
            estimated_duration_secs: 45,
            difficulty: Difficulty::Easy,
            success_rate: 92.5,
            usage: 128,
        });
    card.id = CardId::from_raw("welcome");
    card
}

/// The human-handoff card of the shipped system.
pub fn support_card() -> Card {
    let start = question("support-start", "We can bring in a person. What fits best?")
        .with_kind(QuestionKind::MultipleChoice)
        .with_answer(answer("support-sales", "Sales question").with_action(Action::new(
            ActionKind::TransferToAgent {
                department: "sales".to_string(),
                message: None,
            },
        )))
        .with_answer(answer("support-tech", "Technical problem").with_action(Action::new(
            ActionKind::TransferToAgent {
                department: "support".to_string(),
                message: None,
            },
        )))
        .with_answer(answer("support-callback", "Call me back").with_action(Action::new(
            ActionKind::ScheduleCallback {
                department: "support".to_string(),
                delay_minutes: 30,
                message: Some("Visitor asked for a callback".to_string()),
            },
        )))
        .with_answer(answer("support-email", "Email instead").with_action(Action::new(
            ActionKind::SendEmail {
                subject: "Follow-up from your conversation".to_string(),
                body: "Tell us what you need and we will reply within one business day."
                    .to_string(),
                recipient: None,
            },
        )))
        .with_answer(
            answer("support-back", "Go back").with_action(Action::new(ActionKind::ReturnToPrevious)),
        );

    let mut card = Card::new("Human Support")
        .with_description("Connects the visitor with a person on our team")
        .with_category("support")
        .with_priority(2)
        .with_tag("support")
        .with_tag("agent")
        .with_tag("human")
        .with_tag("escalation")
        .with_trigger("human")
        .with_trigger("agent")
        .with_trigger("person")
        .with_question(start)
        .with_start_question(QuestionId::from_raw("support-start"))
        .with_metadata(CardMetadata {
            estimated_duration_secs: 120,
            difficulty: Difficulty::Medium,
            success_rate: 88.0,
            usage: 57,
        });
    card.id = CardId::from_raw("human-support");
    card
}

fn question(id: &str, text: &str) -> Question {
    let mut question = Question::new(text);
    question.id = QuestionId::from_raw(id);
    question
}

fn answer(id: &str, text: &str) -> Answer {
    let mut answer = Answer::new(text);
    answer.id = AnswerId::from_raw(id);
    answer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_system;

    #[test]
    fn test_default_system_validates_cleanly() {
        let report = validate_system(&default_system());
        assert!(report.is_valid(), "unexpected errors: {:?}", report.errors);
        assert!(
            report.warnings.is_empty(),
            "unexpected warnings: {:?}",
            report.warnings
        );
    }

    #[test]
    fn test_default_system_starts_on_the_welcome_card() {
        let system = default_system();
        let card = system.default_card().unwrap();
        assert_eq!(card.id, CardId::from_raw("welcome"));
        assert_eq!(
            card.start_question().map(|q| q.id.clone()),
            Some(QuestionId::from_raw("welcome-start"))
        );
    }

    #[test]
    fn test_welcome_card_offers_a_human_handoff() {
        let system = default_system();
        let start = system.default_card().unwrap().start_question().unwrap();

        let human = start
            .answers
            .iter()
            .find(|a| a.text == "Talk to a human")
            .unwrap();
        match &human.actions[0].kind {
            ActionKind::TransferToAgent { department, .. } => assert_eq!(department, "sales"),
            other => panic!("expected a transfer, got {other:?}"),
        }
    }

    #[test]
    fn test_fallback_escalates_to_the_support_card() {
        let system = default_system();
        assert_eq!(
            system.fallback_card().map(|c| c.name.as_str()),
            Some("Human Support")
        );
    }
}
