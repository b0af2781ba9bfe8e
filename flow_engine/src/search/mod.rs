//! Card search - lexical matching with deterministic scoring.
//!
//! Matching is a case-insensitive substring test over a card's name,
//! description, and optionally its tags and question texts. Ranking is a
//! weighted sum over exact-field hits and the card's recorded performance,
//! so the same library and query always produce the same order.

mod suggest;

use flow_model::{Card, System};

/// Weights for ranking matched cards.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Added when the query appears in the card name.
    pub name_match_weight: f32,

    /// Added when the query appears in one of the card's tags.
    pub tag_match_weight: f32,

    /// Score per recorded use of the card.
    pub usage_weight: f32,

    /// Ceiling on the usage contribution.
    pub usage_cap: f32,

    /// Score per success-rate percentage point.
    pub success_rate_weight: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            name_match_weight: 10.0,
            tag_match_weight: 8.0,
            usage_weight: 0.1,
            usage_cap: 5.0,
            success_rate_weight: 0.05,
        }
    }
}

/// Which card fields a search may look at beyond name and description.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub include_tags: bool,
    pub include_questions: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            include_tags: true,
            include_questions: true,
        }
    }
}

/// Finds and ranks cards for free-text queries.
pub struct CardMatcher {
    config: ScoringConfig,
}

impl CardMatcher {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Create a matcher with default scoring weights.
    pub fn with_defaults() -> Self {
        Self::new(ScoringConfig::default())
    }

    /// All cards matching the query, in library order.
    ///
    /// An empty query matches everything. Never fails; a query nothing
    /// matches returns an empty list.
    pub fn search<'a>(
        &self,
        system: &'a System,
        query: &str,
        options: &SearchOptions,
    ) -> Vec<&'a Card> {
        let needle = query.to_lowercase();
        system
            .cards
            .iter()
            .filter(|card| self.matches(card, &needle, options))
            .collect()
    }

    /// Rank a query's matches, best first.
    ///
    /// Ties keep library order, so ranking is stable across runs.
    pub fn ranked_matches<'a>(&self, system: &'a System, query: &str) -> Vec<(&'a Card, f32)> {
        let mut matches: Vec<(&Card, f32)> = self
            .search(system, query, &SearchOptions::default())
            .into_iter()
            .map(|card| (card, self.score(card, query)))
            .collect();

        matches.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        matches
    }

    /// The single best card for a query, if anything matched.
    pub fn find_best_match<'a>(&self, system: &'a System, query: &str) -> Option<&'a Card> {
        self.ranked_matches(system, query)
            .into_iter()
            .map(|(card, _)| card)
            .next()
    }

    /// Relevance of one card for a query.
    ///
    /// Field hits dominate; priority adds a small fixed bonus (priority 1
    /// adds 3, priority 3 adds 1); usage and success rate break ties
    /// between equally relevant cards.
    pub fn score(&self, card: &Card, query: &str) -> f32 {
        let needle = query.to_lowercase();
        let mut score = 0.0;

        if card.name.to_lowercase().contains(&needle) {
            score += self.config.name_match_weight;
        }
        if card
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(&needle))
        {
            score += self.config.tag_match_weight;
        }

        score += (4 - card.priority.clamp(1, 3)) as f32;
        score += (card.metadata.usage as f32 * self.config.usage_weight).min(self.config.usage_cap);
        score += card.metadata.success_rate * self.config.success_rate_weight;

        score
    }

    fn matches(&self, card: &Card, needle: &str, options: &SearchOptions) -> bool {
        if card.name.to_lowercase().contains(needle)
            || card.description.to_lowercase().contains(needle)
        {
            return true;
        }
        if options.include_tags
            && card
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(needle))
        {
            return true;
        }
        if options.include_questions
            && card
                .questions
                .iter()
                .any(|question| question.text.to_lowercase().contains(needle))
        {
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_model::defaults::default_system;
    use flow_model::{Card, CardId};

    fn named_card(id: &str, name: &str) -> Card {
        let mut card = Card::new(name);
        card.id = CardId::from_raw(id);
        card
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let system = default_system();
        let matcher = CardMatcher::with_defaults();

        let hits = matcher.search(&system, "SUPPORT", &SearchOptions::default());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, CardId::from_raw("human-support"));
    }

    #[test]
    fn test_search_reaches_into_question_texts() {
        let system = default_system();
        let matcher = CardMatcher::with_defaults();

        // "help" appears only inside the welcome card's question texts.
        let hits = matcher.search(&system, "help", &SearchOptions::default());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, CardId::from_raw("welcome"));

        let narrowed = SearchOptions {
            include_questions: false,
            ..SearchOptions::default()
        };
        assert!(matcher.search(&system, "help", &narrowed).is_empty());
    }

    #[test]
    fn test_search_can_ignore_tags() {
        let system = default_system();
        let matcher = CardMatcher::with_defaults();

        let hits = matcher.search(&system, "escalation", &SearchOptions::default());
        assert_eq!(hits.len(), 1);

        let narrowed = SearchOptions {
            include_tags: false,
            ..SearchOptions::default()
        };
        assert!(matcher.search(&system, "escalation", &narrowed).is_empty());
    }

    #[test]
    fn test_unmatched_queries_return_empty_not_error() {
        let system = default_system();
        let matcher = CardMatcher::with_defaults();

        assert!(matcher
            .search(&system, "pricing plans", &SearchOptions::default())
            .is_empty());
        assert!(matcher.find_best_match(&system, "pricing plans").is_none());
    }

    #[test]
    fn test_empty_queries_match_everything() {
        let system = default_system();
        let matcher = CardMatcher::with_defaults();

        let hits = matcher.search(&system, "", &SearchOptions::default());
        assert_eq!(hits.len(), system.cards.len());
    }

    #[test]
    fn test_score_adds_up_field_hits_and_performance() {
        let matcher = CardMatcher::with_defaults();
        let mut card = named_card("billing", "Billing").with_tag("billing");
        card.metadata.usage = 20;
        card.metadata.success_rate = 80.0;
        card = card.with_priority(2);

        // name 10 + tag 8 + priority 2 + usage 2.0 + success 4.0
        let score = matcher.score(&card, "billing");
        assert!((score - 26.0).abs() < 0.001);
    }

    #[test]
    fn test_usage_contribution_is_capped() {
        let matcher = CardMatcher::with_defaults();
        let mut modest = named_card("a", "Returns").with_priority(2);
        modest.metadata.usage = 50;
        let mut heavy = named_card("b", "Returns").with_priority(2);
        heavy.metadata.usage = 5000;

        let difference = matcher.score(&heavy, "returns") - matcher.score(&modest, "returns");
        assert!(difference.abs() < 0.001);
    }

    #[test]
    fn test_more_used_cards_never_rank_lower() {
        let matcher = CardMatcher::with_defaults();
        let mut quiet = named_card("a", "Shipping").with_priority(2);
        quiet.metadata.usage = 3;
        let mut busy = named_card("b", "Shipping").with_priority(2);
        busy.metadata.usage = 30;

        assert!(matcher.score(&busy, "shipping") > matcher.score(&quiet, "shipping"));
    }

    #[test]
    fn test_best_match_prefers_name_hits_over_tag_hits() {
        let by_tag = named_card("faq", "Common questions").with_tag("billing");
        let by_name = named_card("billing", "Billing");
        let system = flow_model::System::new("Shop")
            .with_card(by_tag)
            .with_card(by_name);

        let matcher = CardMatcher::with_defaults();
        let best = matcher.find_best_match(&system, "billing").unwrap();
        assert_eq!(best.id, CardId::from_raw("billing"));
    }

    #[test]
    fn test_ties_keep_library_order() {
        let first = named_card("first", "Returns");
        let second = named_card("second", "Returns");
        let system = flow_model::System::new("Shop")
            .with_card(first)
            .with_card(second);

        let matcher = CardMatcher::with_defaults();
        let ranked = matcher.ranked_matches(&system, "returns");
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].0.id, CardId::from_raw("first"));
        assert_eq!(ranked[1].0.id, CardId::from_raw("second"));
    }

    #[test]
    fn test_ranking_is_deterministic() {
        let system = default_system();
        let matcher = CardMatcher::with_defaults();

        let first: Vec<_> = matcher
            .ranked_matches(&system, "o")
            .into_iter()
            .map(|(card, _)| card.id.clone())
            .collect();
        let second: Vec<_> = matcher
            .ranked_matches(&system, "o")
            .into_iter()
            .map(|(card, _)| card.id.clone())
            .collect();
        assert_eq!(first, second);
    }
}
