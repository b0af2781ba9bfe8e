//! System definitions - the root document tying cards together.

use serde::{Deserialize, Serialize};

use crate::card::{Card, CardStatus};
use crate::condition::Condition;
use crate::error::ModelError;
use crate::id::{CardId, SystemId};
use crate::validate::validate_system;

/// A complete authored conversation system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct System {
    #[serde(default)]
    pub id: SystemId,

    /// Display name of the system.
    pub name: String,

    #[serde(default)]
    pub settings: SystemSettings,

    /// The card library.
    #[serde(default)]
    pub cards: Vec<Card>,

    /// Directed relations between cards, used for suggestions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<CardLink>,
}

impl System {
    /// Create an empty system with default settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SystemId::new(),
            name: name.into(),
            settings: SystemSettings::default(),
            cards: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Replace the settings.
    pub fn with_settings(mut self, settings: SystemSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Add a card to the library.
    pub fn with_card(mut self, card: Card) -> Self {
        self.cards.push(card);
        self
    }

    /// Add a link between two cards.
    pub fn with_link(mut self, link: CardLink) -> Self {
        self.links.push(link);
        self
    }

    /// Look up a card by id.
    pub fn card(&self, id: &CardId) -> Option<&Card> {
        self.cards.iter().find(|c| &c.id == id)
    }

    /// The id a restart should target: the configured default when set,
    /// otherwise the first card in the library.
    ///
    /// A configured id comes back as-is even when it no longer resolves;
    /// whoever navigates with it decides what a dangling target means.
    pub fn start_card_id(&self) -> Option<&CardId> {
        self.settings
            .default_card_id
            .as_ref()
            .or_else(|| self.cards.first().map(|c| &c.id))
    }

    /// The card a new conversation starts on.
    ///
    /// The configured default wins when set; otherwise the first card in
    /// the library. `None` when the configured id points nowhere or the
    /// library is empty.
    pub fn default_card(&self) -> Option<&Card> {
        self.start_card_id().and_then(|id| self.card(id))
    }

    /// The card to offer when search comes up empty, if configured.
    pub fn fallback_card(&self) -> Option<&Card> {
        self.settings
            .fallback_card_id
            .as_ref()
            .and_then(|id| self.card(id))
    }

    /// Cards currently offered to visitors.
    pub fn active_cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter().filter(|c| c.status == CardStatus::Active)
    }

    /// Links leaving the given card.
    pub fn links_from<'a>(&'a self, id: &'a CardId) -> impl Iterator<Item = &'a CardLink> {
        self.links.iter().filter(move |l| &l.from_card_id == id)
    }

    /// Parse a system document without validating it.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a system document and reject it if validation finds errors.
    ///
    /// Warnings do not reject; they are only surfaced by
    /// [`validate_system`] itself.
    pub fn from_json_validated(json: &str) -> Result<Self, ModelError> {
        let system = Self::from_json(json)?;
        let report = validate_system(&system);
        if report.is_valid() {
            Ok(system)
        } else {
            Err(ModelError::Invalid(report.errors))
        }
    }

    /// Serialize the system as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Behavior switches for a system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSettings {
    /// Where new conversations start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_card_id: Option<CardId>,

    /// Where conversations escalate to when search finds nothing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_card_id: Option<CardId>,

    /// Whether navigation may leave the current card.
    #[serde(default = "default_true")]
    pub enable_cross_card_navigation: bool,

    /// Whether related cards are suggested during the conversation.
    #[serde(default = "default_true")]
    pub enable_smart_suggestions: bool,

    /// Advisory cap on history length for clients that display it.
    #[serde(default = "default_history_limit")]
    pub max_conversation_history: usize,
}

fn default_true() -> bool {
    true
}

fn default_history_limit() -> usize {
    50
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            default_card_id: None,
            fallback_card_id: None,
            enable_cross_card_navigation: true,
            enable_smart_suggestions: true,
            max_conversation_history: default_history_limit(),
        }
    }
}

/// A directed relation between two cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardLink {
    pub from_card_id: CardId,
    pub to_card_id: CardId,

    /// What kind of transition the link describes.
    #[serde(default)]
    pub trigger: LinkTrigger,

    /// Guards that must hold for the link to be suggested.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    /// Relative strength of the relation.
    #[serde(default = "default_weight")]
    pub weight: f32,

    #[serde(default)]
    pub metadata: LinkMetadata,
}

fn default_weight() -> f32 {
    1.0
}

impl CardLink {
    /// Create a suggestion link with weight 1.0 and no guards.
    pub fn new(from_card_id: CardId, to_card_id: CardId) -> Self {
        Self {
            from_card_id,
            to_card_id,
            trigger: LinkTrigger::Suggestion,
            conditions: Vec::new(),
            weight: default_weight(),
            metadata: LinkMetadata::default(),
        }
    }

    /// Set what kind of transition the link describes.
    pub fn with_trigger(mut self, trigger: LinkTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    /// Set the relative strength of the relation.
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    /// Add a guard on the link being suggested.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Set the link usage statistics.
    pub fn with_metadata(mut self, metadata: LinkMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// What kind of transition a link describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkTrigger {
    /// Followed by an explicit navigation action.
    Navigation,
    /// Discovered through search.
    Search,
    /// Offered proactively.
    #[default]
    Suggestion,
    /// Authored by hand for editor use.
    Manual,
}

/// Usage statistics for a link.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkMetadata {
    /// How many times the link was followed.
    #[serde(default)]
    pub usage: u32,

    /// Share of follows that ended well, 0.0 - 100.0.
    #[serde(default)]
    pub success_rate: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;
    use crate::card::{Answer, Question};
    use crate::id::QuestionId;

    #[test]
    fn test_settings_defaults() {
        let settings: SystemSettings = serde_json::from_str("{}").unwrap();
        assert!(settings.default_card_id.is_none());
        assert!(settings.enable_cross_card_navigation);
        assert!(settings.enable_smart_suggestions);
        assert_eq!(settings.max_conversation_history, 50);
    }

    #[test]
    fn test_default_card_prefers_configured_id() {
        let first = Card::new("First");
        let second = Card::new("Second");
        let second_id = second.id.clone();

        let mut system = System::new("Demo").with_card(first).with_card(second);
        assert_eq!(system.default_card().map(|c| c.name.as_str()), Some("First"));

        system.settings.default_card_id = Some(second_id);
        assert_eq!(system.default_card().map(|c| c.name.as_str()), Some("Second"));

        system.settings.default_card_id = Some(CardId::from_raw("missing"));
        assert!(system.default_card().is_none());
    }

    #[test]
    fn test_start_card_id_keeps_a_dangling_configured_default() {
        let mut system = System::new("Demo").with_card(Card::new("First"));
        let first_id = system.cards[0].id.clone();
        assert_eq!(system.start_card_id(), Some(&first_id));

        system.settings.default_card_id = Some(CardId::from_raw("missing"));
        assert_eq!(system.start_card_id(), Some(&CardId::from_raw("missing")));
        assert!(system.default_card().is_none());
    }

    #[test]
    fn test_links_from_filters_by_source() {
        let a = CardId::from_raw("a");
        let b = CardId::from_raw("b");
        let c = CardId::from_raw("c");

        let system = System::new("Demo")
            .with_link(CardLink::new(a.clone(), b.clone()))
            .with_link(CardLink::new(b.clone(), c.clone()))
            .with_link(CardLink::new(a.clone(), c.clone()));

        assert_eq!(system.links_from(&a).count(), 2);
        assert_eq!(system.links_from(&c).count(), 0);
    }

    #[test]
    fn test_system_document_parses_with_camel_case_keys() {
        let system = System::from_json(
            r#"{
                "id": "sys-demo",
                "name": "Demo",
                "settings": {
                    "defaultCardId": "welcome",
                    "enableCrossCardNavigation": false
                },
                "cards": [
                    {
                        "id": "welcome",
                        "name": "Welcome",
                        "startQuestionId": "q1",
                        "questions": [
                            {
                                "id": "q1",
                                "text": "Hello! What do you need?",
                                "answers": [
                                    {
                                        "id": "a1",
                                        "text": "Help",
                                        "actions": [
                                            {
                                                "type": "send_message",
                                                "payload": { "message": "Sure." }
                                            }
                                        ]
                                    }
                                ]
                            }
                        ]
                    }
                ],
                "links": [
                    {
                        "fromCardId": "welcome",
                        "toCardId": "welcome",
                        "trigger": "manual",
                        "weight": 0.5
                    }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(system.id, SystemId::from_raw("sys-demo"));
        assert!(!system.settings.enable_cross_card_navigation);
        assert_eq!(system.cards.len(), 1);
        assert_eq!(system.links[0].trigger, LinkTrigger::Manual);

        let card = &system.cards[0];
        assert_eq!(card.start_question_id, Some(QuestionId::from_raw("q1")));
        assert_eq!(card.questions[0].answers[0].actions.len(), 1);
    }

    #[test]
    fn test_documents_with_unknown_action_types_still_load() {
        let system = System::from_json(
            r#"{
                "id": "sys-next",
                "name": "Newer vocabulary",
                "cards": [
                    {
                        "id": "c1",
                        "name": "Card",
                        "questions": [
                            {
                                "id": "q1",
                                "text": "Ready?",
                                "answers": [
                                    {
                                        "id": "a1",
                                        "text": "Go",
                                        "actions": [
                                            {
                                                "type": "launch_confetti",
                                                "payload": { "count": 3 }
                                            }
                                        ]
                                    }
                                ]
                            }
                        ]
                    }
                ]
            }"#,
        )
        .unwrap();

        let action = &system.cards[0].questions[0].answers[0].actions[0];
        assert_eq!(action.kind, ActionKind::Unknown);
    }

    #[test]
    fn test_from_json_validated_rejects_broken_documents() {
        // A card with no questions is an authoring error.
        let result = System::from_json_validated(
            r#"{ "id": "sys-x", "name": "Broken", "cards": [{ "id": "c1", "name": "Empty" }] }"#,
        );
        assert!(matches!(result, Err(ModelError::Invalid(_))));
    }

    #[test]
    fn test_to_json_round_trips() {
        let card = Card::new("Welcome")
            .with_question(Question::new("Hi!").with_answer(Answer::new("Hello")));
        let system = System::new("Demo").with_card(card);

        let json = system.to_json().unwrap();
        let back = System::from_json(&json).unwrap();
        assert_eq!(back, system);
    }
}
