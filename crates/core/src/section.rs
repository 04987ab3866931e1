// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Section identifier and definition.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

crate::define_id! {
    /// Unique identifier for a section.
    #[derive(Default)]
    pub struct SectionId;
}

/// A named, ordered grouping of tasks with optional dependencies and a skip flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    pub name: String,
    pub position: i64,
    pub priority: i64,
    pub skipped: bool,
    pub depends_on: Vec<SectionId>,
}

/// Error returned when inserting a dependency edge would create a cycle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("adding dependency {from} -> {to} would create a cycle")]
pub struct CycleError {
    pub from: SectionId,
    pub to: SectionId,
}

/// Checks that adding an edge `from -> to` (meaning `from` depends on `to`)
/// into the given adjacency map would not create a cycle. `edges` maps a
/// section id to the ids it already depends on.
pub fn would_create_cycle(
    edges: &std::collections::HashMap<SectionId, Vec<SectionId>>,
    from: &SectionId,
    to: &SectionId,
) -> bool {
    if from == to {
        return true;
    }
    // Would `to` (transitively) depend on `from`? If so, adding from->to closes a loop.
    let mut stack = vec![to.clone()];
    let mut seen: HashSet<SectionId> = HashSet::new();
    while let Some(node) = stack.pop() {
        if &node == from {
            return true;
        }
        if !seen.insert(node.clone()) {
            continue;
        }
        if let Some(deps) = edges.get(&node) {
            stack.extend(deps.iter().cloned());
        }
    }
    false
}

#[cfg(test)]
#[path = "section_tests.rs"]
mod tests;
