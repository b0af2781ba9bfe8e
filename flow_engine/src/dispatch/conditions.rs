//! Guard evaluation against a live context.

use flow_model::Condition;

use crate::context::ConversationContext;

/// True when every condition holds. An empty list always holds.
pub fn conditions_hold(context: &ConversationContext, conditions: &[Condition]) -> bool {
    conditions
        .iter()
        .all(|condition| condition_holds(context, condition))
}

/// Evaluate one condition. Missing fields and variables compare unequal.
pub fn condition_holds(context: &ConversationContext, condition: &Condition) -> bool {
    match condition {
        Condition::UserData { field, equals } => context.user_data().get(field) == Some(equals),
        Condition::Variable { name, equals } => context.variable(name) == Some(equals),
        Condition::HistoryContains { card_id } => context
            .history()
            .iter()
            .any(|entry| &entry.card_id == card_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_model::defaults::default_system;
    use flow_model::CardId;
    use serde_json::json;

    fn fresh_context() -> (flow_model::System, ConversationContext) {
        let system = default_system();
        let context = ConversationContext::for_system(&system, "sess-1").unwrap();
        (system, context)
    }

    #[test]
    fn test_empty_condition_lists_hold() {
        let (_, context) = fresh_context();
        assert!(conditions_hold(&context, &[]));
    }

    #[test]
    fn test_user_data_conditions() {
        let (_, mut context) = fresh_context();
        let condition = Condition::user_data("plan", json!("pro"));

        assert!(!condition_holds(&context, &condition));
        context.set_user_data("plan", json!("pro"));
        assert!(condition_holds(&context, &condition));
        context.set_user_data("plan", json!("free"));
        assert!(!condition_holds(&context, &condition));
    }

    #[test]
    fn test_variable_conditions() {
        let (_, mut context) = fresh_context();
        let condition = Condition::variable("mood", json!("friendly"));

        assert!(!condition_holds(&context, &condition));
        context.set_variable("mood", json!("friendly"));
        assert!(condition_holds(&context, &condition));
    }

    #[test]
    fn test_history_conditions_match_visited_cards() {
        let (system, mut context) = fresh_context();

        let visited = Condition::history_contains(CardId::from_raw("welcome"));
        let unvisited = Condition::history_contains(CardId::from_raw("human-support"));
        assert!(condition_holds(&context, &visited));
        assert!(!condition_holds(&context, &unvisited));

        context.go_to_card(&system, CardId::from_raw("human-support"), None);
        assert!(condition_holds(&context, &unvisited));
    }

    #[test]
    fn test_all_conditions_must_hold() {
        let (_, mut context) = fresh_context();
        context.set_variable("mood", json!("friendly"));

        let both = [
            Condition::variable("mood", json!("friendly")),
            Condition::user_data("plan", json!("pro")),
        ];
        assert!(!conditions_hold(&context, &both));

        context.set_user_data("plan", json!("pro"));
        assert!(conditions_hold(&context, &both));
    }
}
