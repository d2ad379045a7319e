//! Phecode rollup graph.
//!
//! Parent/child relationships between phecode indices, stored in both
//! directions. Traversal is one level only: a parent's effective count sums
//! its direct children, never grandchildren. A cyclic rollup table therefore
//! cannot loop, though it may count a code towards two phecodes that roll
//! up into each other. Direct two-node cycles are reported when loaded.
//!
//! Every non-identity row becomes an edge. A repeated row is kept as a
//! parallel edge, so the child's count is added once per row.

use std::collections::BTreeMap;

use phetable_types::PheIndex;
use tracing::warn;

use crate::types::PheResult;
use crate::vocabulary::VocabularyIndex;

/// Rollup relationships over phecode indices.
#[derive(Debug, Clone, Default)]
pub struct RollupGraph {
    children_of: BTreeMap<PheIndex, Vec<PheIndex>>,
    parents_of: BTreeMap<PheIndex, Vec<PheIndex>>,
    edge_count: usize,
}

impl RollupGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a relationship between two phecodes.
    ///
    /// Self-relationships are ignored before either phecode is resolved.
    /// Returns true if an edge was added.
    ///
    /// # Errors
    /// Returns [`PheError::UnknownPhecode`](crate::PheError::UnknownPhecode)
    /// if either phecode is missing from the vocabulary.
    pub fn add_relationship(
        &mut self,
        vocabulary: &VocabularyIndex,
        parent: &str,
        child: &str,
    ) -> PheResult<bool> {
        if parent == child {
            return Ok(false);
        }

        let parent_index = vocabulary.lookup(parent)?;
        let child_index = vocabulary.lookup(child)?;

        let repeated = self.children_of(parent_index).contains(&child_index);
        let added = self.add_edge(parent_index, child_index);
        if added && !repeated && self.children_of(child_index).contains(&parent_index) {
            warn!(
                "Rollup cycle: {} and {} roll up into each other",
                parent, child
            );
        }
        Ok(added)
    }

    /// Adds an edge between two resolved indices. Self edges are ignored.
    pub(crate) fn add_edge(&mut self, parent: PheIndex, child: PheIndex) -> bool {
        if parent == child {
            return false;
        }

        self.children_of.entry(parent).or_default().push(child);
        self.parents_of.entry(child).or_default().push(parent);
        self.edge_count += 1;
        true
    }

    /// Gets the direct children of a phecode.
    pub fn children_of(&self, parent: PheIndex) -> &[PheIndex] {
        self.children_of.get(&parent).map_or(&[], Vec::as_slice)
    }

    /// Gets the direct parents of a phecode.
    pub fn parents_of(&self, child: PheIndex) -> &[PheIndex] {
        self.parents_of.get(&child).map_or(&[], Vec::as_slice)
    }

    /// Returns true if the phecode rolls up into at least one parent.
    pub fn has_parents(&self, child: PheIndex) -> bool {
        self.parents_of.contains_key(&child)
    }

    /// Returns true if the phecode takes part in any relationship.
    pub fn is_related(&self, index: PheIndex) -> bool {
        self.children_of.contains_key(&index) || self.parents_of.contains_key(&index)
    }

    /// Iterates every phecode that rolls up into some parent, in index order.
    pub fn rolled_up_children(&self) -> impl Iterator<Item = PheIndex> + '_ {
        self.parents_of.keys().copied()
    }

    /// Returns the number of edges, repeated rows included.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Returns true if the graph has no edges.
    pub fn is_empty(&self) -> bool {
        self.edge_count == 0
    }
}
