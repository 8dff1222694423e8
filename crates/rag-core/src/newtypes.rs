//! Small validated identifier types used throughout the graph.
//!
//! Node and edge identifiers are kept distinct at the type level so that a
//! caller cannot accidentally index a node table with an edge id or vice
//! versa; both wrap a plain `u32` and are cheap to copy.

use std::fmt;
use std::num::NonZeroU32;

/// Identifies a node (region) within a single [`crate::graph::Rag`].
///
/// Ids are assigned at construction time and never reused while the graph
/// is alive; a merged-away node's id becomes invalid but is not recycled
/// until the graph is rebuilt from scratch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(NonZeroU32);

impl NodeId {
    /// Constructs a `NodeId` from a 1-based ordinal.
    ///
    /// Returns `None` if `ordinal` is zero.
    pub fn new(ordinal: u32) -> Option<Self> {
        NonZeroU32::new(ordinal).map(Self)
    }

    /// Returns the underlying ordinal.
    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// Returns a zero-based index suitable for indexing a dense `Vec`.
    pub fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }

    pub(crate) fn from_index(index: usize) -> Self {
        // index is always < u32::MAX in practice; overflow would mean the
        // caller built an implausibly large volume and slicing would have
        // already failed earlier.
        #[allow(clippy::unwrap_used)]
        Self(NonZeroU32::new((index as u32) + 1).unwrap())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Identifies an edge (adjacency) within a single [`crate::graph::Rag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(NonZeroU32);

impl EdgeId {
    pub(crate) fn new(ordinal: u32) -> Option<Self> {
        NonZeroU32::new(ordinal).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    pub fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }

    pub(crate) fn from_index(index: usize) -> Self {
        #[allow(clippy::unwrap_used)]
        Self(NonZeroU32::new((index as u32) + 1).unwrap())
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// A user-supplied constraint tag; two nodes sharing a nonzero tag may
/// never be merged. Zero means "unconstrained" and is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ExclusionTag(pub i64);

impl ExclusionTag {
    pub const NONE: ExclusionTag = ExclusionTag(0);

    pub fn is_constrained(self) -> bool {
        self.0 != 0
    }

    /// Two tags conflict (forbid merging) only if both are nonzero and equal.
    pub fn conflicts_with(self, other: ExclusionTag) -> bool {
        self.is_constrained() && self == other
    }
}

/// A monotonically increasing counter stamped on queue entries so that
/// stale entries (referring to an edge that has since been rewired or
/// deleted) can be recognised in O(1) without scanning the heap.
pub type Generation = u32;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_round_trips_through_index() {
        let id = NodeId::from_index(41);
        assert_eq!(id.index(), 41);
        assert_eq!(id.get(), 42);
    }

    #[test]
    fn node_id_zero_ordinal_rejected() {
        assert!(NodeId::new(0).is_none());
    }

    #[test]
    fn exclusion_tag_default_is_unconstrained() {
        assert!(!ExclusionTag::default().is_constrained());
    }

    #[test]
    fn exclusion_tag_conflicts_only_when_both_nonzero_and_equal() {
        let a = ExclusionTag(7);
        let b = ExclusionTag(7);
        let c = ExclusionTag(8);
        assert!(a.conflicts_with(b));
        assert!(!a.conflicts_with(c));
        assert!(!ExclusionTag::NONE.conflicts_with(ExclusionTag::NONE));
    }

    #[test]
    fn node_and_edge_ids_display_distinctly() {
        let n = NodeId::from_index(0);
        let e = EdgeId::from_index(0);
        assert_eq!(n.to_string(), "n1");
        assert_eq!(e.to_string(), "e1");
    }
}
