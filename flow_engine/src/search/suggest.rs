//! Suggestions - related cards offered alongside the current question.

use std::collections::HashSet;

use flow_model::{Card, CardId, CardStatus, System};

use super::CardMatcher;
use crate::context::ConversationContext;
use crate::dispatch::conditions_hold;

impl CardMatcher {
    /// Cards worth offering from the current position, best first.
    ///
    /// Candidates are the system links leaving the current card, guards
    /// respected, plus the card's own `linked_cards` at weight 1.0.
    /// Inactive cards, dangling targets, and the current card itself are
    /// dropped; a card reachable through several edges appears once, under
    /// its best-scoring edge. Empty when the system disables suggestions.
    pub fn suggest<'a>(
        &self,
        system: &'a System,
        context: &ConversationContext,
    ) -> Vec<&'a Card> {
        if !system.settings.enable_smart_suggestions {
            return Vec::new();
        }

        let current = context.current_card_id();
        let mut candidates: Vec<(&CardId, f32)> = Vec::new();

        for link in system.links_from(current) {
            if !conditions_hold(context, &link.conditions) {
                continue;
            }
            let score = link.weight
                + (link.metadata.usage as f32 * self.config.usage_weight).min(self.config.usage_cap)
                + link.metadata.success_rate * self.config.success_rate_weight;
            candidates.push((&link.to_card_id, score));
        }

        if let Some(card) = system.card(current) {
            for linked in &card.linked_cards {
                candidates.push((linked, 1.0));
            }
        }

        candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut seen = HashSet::new();
        let mut suggestions = Vec::new();
        for (card_id, _) in candidates {
            if card_id == current || !seen.insert(card_id) {
                continue;
            }
            let Some(card) = system.card(card_id) else {
                continue;
            };
            if card.status != CardStatus::Active {
                continue;
            }
            suggestions.push(card);
        }
        suggestions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_model::{Card, CardLink, Condition, LinkMetadata};
    use serde_json::json;

    fn card(id: &str, name: &str) -> Card {
        let mut card = Card::new(name);
        card.id = CardId::from_raw(id);
        card
    }

    fn link(from: &str, to: &str, weight: f32) -> CardLink {
        CardLink::new(CardId::from_raw(from), CardId::from_raw(to)).with_weight(weight)
    }

    fn setup(system: &System) -> ConversationContext {
        ConversationContext::for_system(system, "sess-1").unwrap()
    }

    fn home_card() -> Card {
        card("home", "Home").with_question(flow_model::Question::new("Where to?"))
    }

    #[test]
    fn test_heavier_links_rank_first() {
        let mut system = System::new("Shop")
            .with_card(home_card())
            .with_card(card("returns", "Returns"))
            .with_card(card("billing", "Billing"))
            .with_link(link("home", "returns", 0.3))
            .with_link(link("home", "billing", 0.9));
        system.settings.default_card_id = Some(CardId::from_raw("home"));

        let context = setup(&system);
        let suggestions = CardMatcher::with_defaults().suggest(&system, &context);
        let ids: Vec<_> = suggestions.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["billing", "returns"]);
    }

    #[test]
    fn test_link_statistics_break_weight_ties() {
        let mut system = System::new("Shop")
            .with_card(home_card())
            .with_card(card("returns", "Returns"))
            .with_card(card("billing", "Billing"))
            .with_link(link("home", "returns", 0.5))
            .with_link(link("home", "billing", 0.5).with_metadata(LinkMetadata {
                usage: 40,
                success_rate: 90.0,
            }));
        system.settings.default_card_id = Some(CardId::from_raw("home"));

        let context = setup(&system);
        let suggestions = CardMatcher::with_defaults().suggest(&system, &context);
        assert_eq!(suggestions[0].id, CardId::from_raw("billing"));
    }

    #[test]
    fn test_guarded_links_wait_for_their_condition() {
        let mut system = System::new("Shop")
            .with_card(home_card())
            .with_card(card("vip", "Concierge"))
            .with_link(
                link("home", "vip", 1.0)
                    .with_condition(Condition::user_data("plan", json!("pro"))),
            );
        system.settings.default_card_id = Some(CardId::from_raw("home"));

        let mut context = setup(&system);
        let matcher = CardMatcher::with_defaults();
        assert!(matcher.suggest(&system, &context).is_empty());

        context.set_user_data("plan", json!("pro"));
        let suggestions = matcher.suggest(&system, &context);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].id, CardId::from_raw("vip"));
    }

    #[test]
    fn test_linked_cards_are_offered_without_explicit_links() {
        let mut system = System::new("Shop")
            .with_card(home_card().with_linked_card(CardId::from_raw("returns")))
            .with_card(card("returns", "Returns"));
        system.settings.default_card_id = Some(CardId::from_raw("home"));

        let context = setup(&system);
        let suggestions = CardMatcher::with_defaults().suggest(&system, &context);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].id, CardId::from_raw("returns"));
    }

    #[test]
    fn test_each_card_is_suggested_once() {
        let mut system = System::new("Shop")
            .with_card(home_card().with_linked_card(CardId::from_raw("returns")))
            .with_card(card("returns", "Returns"))
            .with_link(link("home", "returns", 0.8));
        system.settings.default_card_id = Some(CardId::from_raw("home"));

        let context = setup(&system);
        let suggestions = CardMatcher::with_defaults().suggest(&system, &context);
        assert_eq!(suggestions.len(), 1);
    }

    #[test]
    fn test_inactive_and_dangling_targets_are_dropped() {
        let mut system = System::new("Shop")
            .with_card(home_card())
            .with_card(card("retired", "Retired").with_status(CardStatus::Inactive))
            .with_link(link("home", "retired", 1.0))
            .with_link(link("home", "missing", 1.0));
        system.settings.default_card_id = Some(CardId::from_raw("home"));

        let context = setup(&system);
        assert!(CardMatcher::with_defaults()
            .suggest(&system, &context)
            .is_empty());
    }

    #[test]
    fn test_the_current_card_is_never_suggested() {
        let mut system = System::new("Shop")
            .with_card(home_card())
            .with_link(link("home", "home", 1.0));
        system.settings.default_card_id = Some(CardId::from_raw("home"));

        let context = setup(&system);
        assert!(CardMatcher::with_defaults()
            .suggest(&system, &context)
            .is_empty());
    }

    #[test]
    fn test_disabling_suggestions_empties_the_list() {
        let mut system = System::new("Shop")
            .with_card(home_card())
            .with_card(card("returns", "Returns"))
            .with_link(link("home", "returns", 1.0));
        system.settings.default_card_id = Some(CardId::from_raw("home"));
        system.settings.enable_smart_suggestions = false;

        let context = setup(&system);
        assert!(CardMatcher::with_defaults()
            .suggest(&system, &context)
            .is_empty());
    }

    #[test]
    fn test_the_bundled_system_suggests_support_from_welcome() {
        let system = flow_model::defaults::default_system();
        let context = setup(&system);

        let suggestions = CardMatcher::with_defaults().suggest(&system, &context);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].id, CardId::from_raw("human-support"));
    }
}
