//! Pending relation diff for multi-select editors.
//!
//! An editor holding a set of related ids (the dances on a program) saves
//! by adding and removing join rows. The diff tells it which; the join-row
//! inserts and deletes it then performs become ops of the same action.

use serde::Serialize;

use crate::types::DbId;

/// Ids to link and unlink to go from `current` to `desired`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelationDiff {
    pub added: Vec<DbId>,
    pub removed: Vec<DbId>,
}

impl RelationDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Set difference in both directions.
///
/// `added` follows the order of `desired`, `removed` the order of `current`;
/// duplicates are collapsed.
pub fn diff_relations(current: &[DbId], desired: &[DbId]) -> RelationDiff {
    let mut diff = RelationDiff::default();
    for id in desired {
        if !current.contains(id) && !diff.added.contains(id) {
            diff.added.push(*id);
        }
    }
    for id in current {
        if !desired.contains(id) && !diff.removed.contains(id) {
            diff.removed.push(*id);
        }
    }
    diff
}
