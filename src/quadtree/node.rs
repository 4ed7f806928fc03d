use std::fmt::Debug;

/// Index of a canonical [`Node`] inside a [`NodeStore`](super::NodeStore).
///
/// Two ids are equal exactly when the nodes they name are structurally equal, so the id is all we
/// ever need to compare or hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// The dead leaf. Always the first entry of a store.
    pub const DEAD: NodeId = NodeId(0);

    /// The live leaf. Always the second entry of a store.
    pub const ALIVE: NodeId = NodeId(1);

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl Debug for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A square region of the universe.
///
/// A node of level `L` covers `2^L x 2^L` cells, addressed by signed coordinates in
/// `[-2^(L-1), 2^(L-1) - 1]` along both axes. North is positive `y`, east is positive `x`, and a
/// cell is named by its lower-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Node {
    /// A single cell, alive or dead.
    Leaf(bool),

    /// Four children of level `level - 1`.
    Quad {
        level: u8,
        nw: NodeId,
        ne: NodeId,
        sw: NodeId,
        se: NodeId,
    },
}

impl Node {
    pub fn level(&self) -> u8 {
        match *self {
            Node::Leaf(_) => 0,
            Node::Quad { level, .. } => level,
        }
    }

    pub fn children(&self) -> Option<[NodeId; 4]> {
        match *self {
            Node::Leaf(_) => None,
            Node::Quad { nw, ne, sw, se, .. } => Some([nw, ne, sw, se]),
        }
    }

    pub fn nw(&self) -> Option<NodeId> {
        self.children().map(|[nw, _, _, _]| nw)
    }

    pub fn ne(&self) -> Option<NodeId> {
        self.children().map(|[_, ne, _, _]| ne)
    }

    pub fn sw(&self) -> Option<NodeId> {
        self.children().map(|[_, _, sw, _]| sw)
    }

    pub fn se(&self) -> Option<NodeId> {
        self.children().map(|[_, _, _, se]| se)
    }
}
