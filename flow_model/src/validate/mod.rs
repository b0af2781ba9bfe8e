//! Structural validation of authored systems.
//!
//! Validation never stops at the first problem: it walks the whole document
//! and reports everything it finds, split into errors (the document cannot
//! run) and warnings (the document runs, but parts of it are dead or
//! dangling). Runtime code tolerates everything warnings describe.

mod reachability;

pub use reachability::{reachable_question_ids, unreachable_questions};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::action::{Action, ActionKind};
use crate::card::Card;
use crate::system::System;

/// Everything validation found, split by severity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Problems that make the document unusable.
    pub errors: Vec<String>,

    /// Problems the engine tolerates at runtime.
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no errors were found. Warnings do not count.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    fn error(&mut self, message: String) {
        self.errors.push(message);
    }

    fn warning(&mut self, message: String) {
        self.warnings.push(message);
    }
}

/// Check a whole system: its own fields, every card, and every
/// cross-card reference.
pub fn validate_system(system: &System) -> ValidationReport {
    let mut report = ValidationReport::new();

    if system.id.is_empty() {
        report.error("system has an empty id".to_string());
    }
    if system.name.trim().is_empty() {
        report.error("system has an empty name".to_string());
    }
    if system.cards.is_empty() {
        report.error(format!("system '{}' has no cards", system.name));
    }

    // Reference checks below only mean something once ids are unique.
    let mut card_ids = HashSet::new();
    for card in &system.cards {
        if !card_ids.insert(&card.id) {
            report.error(format!("duplicate card id '{}'", card.id));
        }
    }

    if let Some(id) = &system.settings.default_card_id {
        if !card_ids.contains(id) {
            report.error(format!("default card '{id}' does not exist"));
        }
    }
    if let Some(id) = &system.settings.fallback_card_id {
        if !card_ids.contains(id) {
            report.warning(format!("fallback card '{id}' does not exist"));
        }
    }

    for card in &system.cards {
        report.merge(validate_card(card));

        for linked in &card.linked_cards {
            if !card_ids.contains(linked) {
                report.warning(format!(
                    "card '{}': linked card '{}' does not exist",
                    card.name, linked
                ));
            }
        }

        for question in &card.questions {
            for answer in &question.answers {
                for action in &answer.actions {
                    walk_actions(action, &mut |action| {
                        check_card_navigation(system, card, action, &mut report);
                    });
                }
            }
        }
    }

    for link in &system.links {
        if !card_ids.contains(&link.from_card_id) {
            report.warning(format!(
                "link '{}' -> '{}': source card does not exist",
                link.from_card_id, link.to_card_id
            ));
        }
        if !card_ids.contains(&link.to_card_id) {
            report.warning(format!(
                "link '{}' -> '{}': target card does not exist",
                link.from_card_id, link.to_card_id
            ));
        }
    }

    report
}

/// Check a single card in isolation: its own fields, its questions and
/// answers, in-card navigation targets, and question reachability.
pub fn validate_card(card: &Card) -> ValidationReport {
    let mut report = ValidationReport::new();

    if card.id.is_empty() {
        report.error(format!("card '{}' has an empty id", card.name));
    }
    if card.name.trim().is_empty() {
        report.error(format!("card '{}' has an empty name", card.id));
    }
    if card.questions.is_empty() {
        report.error(format!("card '{}' has no questions", card.name));
        return report;
    }

    let mut question_ids = HashSet::new();
    for question in &card.questions {
        if !question_ids.insert(&question.id) {
            report.error(format!(
                "card '{}': duplicate question id '{}'",
                card.name, question.id
            ));
        }
    }

    if let Some(start) = &card.start_question_id {
        if !question_ids.contains(start) {
            report.error(format!(
                "card '{}': start question '{}' does not exist",
                card.name, start
            ));
        }
    }

    for question in &card.questions {
        if question.text.trim().is_empty() {
            report.error(format!(
                "card '{}': question '{}' has empty text",
                card.name, question.id
            ));
        }
        if question.answers.is_empty() {
            report.error(format!(
                "card '{}': question '{}' has no answers",
                card.name, question.id
            ));
        }
        for answer in &question.answers {
            if answer.text.trim().is_empty() {
                report.error(format!(
                    "card '{}': answer '{}' has empty text",
                    card.name, answer.id
                ));
            }
            if answer.actions.is_empty() {
                report.error(format!(
                    "card '{}': answer '{}' has no actions",
                    card.name, answer.id
                ));
            }
            for action in &answer.actions {
                walk_actions(action, &mut |action| {
                    if let ActionKind::NavigateToQuestion { question_id } = &action.kind {
                        if !question_ids.contains(question_id) {
                            report.warning(format!(
                                "card '{}': navigate_to_question target '{}' does not exist",
                                card.name, question_id
                            ));
                        }
                    }
                });
            }
        }
    }

    // With a dangling start override every question would be flagged,
    // drowning the real problem reported above.
    if card.start_question().is_some() {
        for question in unreachable_questions(card) {
            report.warning(format!(
                "card '{}': question '{}' is unreachable from the start question",
                card.name, question.id
            ));
        }
    }

    report
}

fn check_card_navigation(
    system: &System,
    source: &Card,
    action: &Action,
    report: &mut ValidationReport,
) {
    let ActionKind::NavigateToCard {
        card_id,
        question_id,
    } = &action.kind
    else {
        return;
    };

    let Some(target) = system.card(card_id) else {
        report.warning(format!(
            "card '{}': navigate_to_card target '{}' does not exist",
            source.name, card_id
        ));
        return;
    };

    if let Some(question_id) = question_id {
        if target.question(question_id).is_none() {
            report.warning(format!(
                "card '{}': navigate_to_card target question '{}' does not exist on card '{}'",
                source.name, question_id, card_id
            ));
        }
    }
}

fn walk_actions<'a>(action: &'a Action, f: &mut impl FnMut(&'a Action)) {
    f(action);
    for nested in action.kind.nested_actions() {
        walk_actions(nested, f);
    }
}
