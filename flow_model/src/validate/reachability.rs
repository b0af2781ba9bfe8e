//! Reachability analysis over a card's question graph.
//!
//! Questions form a directed graph whose edges are `navigate_to_question`
//! actions, including ones nested inside composite actions. Traversal keeps
//! a visited set, so cycles and shared paths terminate.

use std::collections::HashSet;

use crate::action::{Action, ActionKind};
use crate::card::{Card, Question};
use crate::id::QuestionId;

/// Ids of all questions reachable from the card's start question.
///
/// Empty when the card has no resolvable start.
pub fn reachable_question_ids(card: &Card) -> HashSet<QuestionId> {
    let mut visited: HashSet<QuestionId> = HashSet::new();
    let mut stack: Vec<&Question> = match card.start_question() {
        Some(start) => vec![start],
        None => return visited,
    };

    while let Some(question) = stack.pop() {
        if !visited.insert(question.id.clone()) {
            continue;
        }
        for answer in &question.answers {
            for action in &answer.actions {
                collect_targets(action, &mut |target| {
                    if !visited.contains(target) {
                        if let Some(next) = card.question(target) {
                            stack.push(next);
                        }
                    }
                });
            }
        }
    }

    visited
}

/// Questions that can never be shown because no path from the start
/// question leads to them.
pub fn unreachable_questions(card: &Card) -> Vec<&Question> {
    let reachable = reachable_question_ids(card);
    card.questions
        .iter()
        .filter(|q| !reachable.contains(&q.id))
        .collect()
}

fn collect_targets<'a>(action: &'a Action, f: &mut impl FnMut(&'a QuestionId)) {
    if let ActionKind::NavigateToQuestion { question_id } = &action.kind {
        f(question_id);
    }
    for nested in action.kind.nested_actions() {
        collect_targets(nested, f);
    }
}
