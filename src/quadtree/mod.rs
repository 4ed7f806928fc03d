use std::collections::HashMap;

pub use crate::quadtree::node::Node;
pub use crate::quadtree::node::NodeId;
pub use crate::quadtree::quadrant::Quadrant;
pub use crate::quadtree::quadrant::MAX_OFFSET_LEVEL;

use crate::error::Error;
use crate::error::Result;
use crate::quadtree::quadrant::locate;

mod node;
mod quadrant;

/// Canonical store of quadtree nodes.
///
/// Every node ever built lives in `nodes`, and `index` maps the children of each quad back to
/// its id. Interning the same four children twice yields the same id, so structurally equal
/// regions are always the same node. Nothing is ever evicted.
#[derive(Debug)]
pub struct NodeStore {
    /// This is where all of our memory goes
    nodes: Vec<Node>,

    /// Children of a quad, in `[nw, ne, sw, se]` order, to its id
    index: HashMap<[NodeId; 4], NodeId>,

    /// `empty[l]` is the all-dead node of level `l`, built on demand
    empty: Vec<NodeId>,
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::Leaf(false), Node::Leaf(true)],
            index: HashMap::new(),
            empty: vec![NodeId::DEAD],
        }
    }

    /// The leaf holding `alive`. Leaves need no interning, there are only two.
    pub const fn leaf(alive: bool) -> NodeId {
        if alive { NodeId::ALIVE } else { NodeId::DEAD }
    }

    /// Number of distinct nodes built so far, leaves included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn level(&self, id: NodeId) -> u8 {
        self.node(id).level()
    }

    pub fn children(&self, id: NodeId) -> Option<[NodeId; 4]> {
        self.node(id).children()
    }

    /// Children of a node the caller knows to be a quad.
    pub(crate) fn quadrants(&self, id: NodeId) -> [NodeId; 4] {
        match *self.node(id) {
            Node::Quad { nw, ne, sw, se, .. } => [nw, ne, sw, se],
            Node::Leaf(_) => unreachable!("a leaf has no quadrants"),
        }
    }

    /// Return the canonical quad with the given children, creating it if it was never seen.
    pub fn intern(&mut self, nw: NodeId, ne: NodeId, sw: NodeId, se: NodeId) -> NodeId {
        let key = [nw, ne, sw, se];

        if let Some(&id) = self.index.get(&key) {
            return id;
        }

        let level = self.level(nw);
        debug_assert!(
            key.iter().all(|&child| self.level(child) == level),
            "quad children must share a level: {:?}",
            key.map(|child| self.level(child))
        );
        assert!(level < u8::MAX, "node level overflow");
        assert!(self.nodes.len() < u32::MAX as usize, "Out of memory!");

        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::Quad {
            level: level + 1,
            nw,
            ne,
            sw,
            se,
        });
        self.index.insert(key, id);

        id
    }

    fn intern_quadrants(&mut self, [nw, ne, sw, se]: [NodeId; 4]) -> NodeId {
        self.intern(nw, ne, sw, se)
    }

    /// The all-dead node of the given level.
    pub fn empty_tree(&mut self, level: u8) -> NodeId {
        while self.empty.len() <= level as usize {
            let e = self.empty[self.empty.len() - 1];
            let next = self.intern(e, e, e, e);
            self.empty.push(next);
        }

        self.empty[level as usize]
    }

    /// Whether `id` is the all-dead node of its level. Only levels already requested through
    /// [`NodeStore::empty_tree`] are recognized.
    pub fn is_empty_tree(&self, id: NodeId) -> bool {
        self.empty.get(self.level(id) as usize) == Some(&id)
    }

    /// Value of the cell `(x, y)`, relative to the center of `id`.
    pub fn get_value(&self, id: NodeId, x: i64, y: i64) -> Result<bool> {
        match *self.node(id) {
            Node::Leaf(alive) if x == 0 && y == 0 => Ok(alive),
            Node::Leaf(_) => Err(Error::OutOfBounds { x, y, level: 0 }),
            Node::Quad {
                level,
                nw,
                ne,
                sw,
                se,
            } => self.quad_value([nw, ne, sw, se], level, x, y),
        }
    }

    /// Lookup inside a quad given by its children, which may not be interned.
    fn quad_value(&self, children: [NodeId; 4], level: u8, x: i64, y: i64) -> Result<bool> {
        if level > MAX_OFFSET_LEVEL {
            let inner = self.inner_corners(children);
            return self.quad_value(inner, level - 1, x, y);
        }

        let (q, x, y) = locate(level, x, y)?;
        self.get_value(children[q.index()], x, y)
    }

    /// Copy of `id` with the cell `(x, y)` set to `alive`. Only the path down to that cell is
    /// rebuilt, every other subtree is shared with `id`.
    pub fn set_value(&mut self, id: NodeId, x: i64, y: i64, alive: bool) -> Result<NodeId> {
        match *self.node(id) {
            Node::Leaf(_) if x == 0 && y == 0 => Ok(Self::leaf(alive)),
            Node::Leaf(_) => Err(Error::OutOfBounds { x, y, level: 0 }),
            Node::Quad {
                level,
                nw,
                ne,
                sw,
                se,
            } => {
                let children = self.set_quad([nw, ne, sw, se], level, x, y, alive)?;
                Ok(self.intern_quadrants(children))
            }
        }
    }

    fn set_quad(
        &mut self,
        mut children: [NodeId; 4],
        level: u8,
        x: i64,
        y: i64,
        alive: bool,
    ) -> Result<[NodeId; 4]> {
        if level > MAX_OFFSET_LEVEL {
            let inner = self.inner_corners(children);
            let inner = self.set_quad(inner, level - 1, x, y, alive)?;

            for q in Quadrant::ALL {
                children[q.index()] =
                    self.with_quadrant(children[q.index()], q.opposite(), inner[q.index()]);
            }

            return Ok(children);
        }

        let (q, x, y) = locate(level, x, y)?;
        children[q.index()] = self.set_value(children[q.index()], x, y, alive)?;

        Ok(children)
    }

    /// Copy of the quad `id` with quadrant `q` replaced by `child`.
    fn with_quadrant(&mut self, id: NodeId, q: Quadrant, child: NodeId) -> NodeId {
        let mut children = self.quadrants(id);
        children[q.index()] = child;

        self.intern_quadrants(children)
    }

    /// The grandchildren touching the center of a quad with the given children.
    fn inner_corners(&self, children: [NodeId; 4]) -> [NodeId; 4] {
        Quadrant::ALL.map(|q| self.quadrants(children[q.index()])[q.opposite().index()])
    }

    /// Given a `2^n` node, returns the `2^(n-1)` node at its center
    pub fn centered_subnode(&mut self, id: NodeId) -> NodeId {
        let inner = self.inner_corners(self.quadrants(id));
        self.intern_quadrants(inner)
    }

    /// Given two `2^n` nodes with `w` to the left and `e` to the right, this returns the
    /// `2^(n-1)` node centered on their boundary
    pub fn centered_horizontal(&mut self, w: NodeId, e: NodeId) -> NodeId {
        let [_, w_ne, _, w_se] = self.quadrants(w);
        let [e_nw, _, e_sw, _] = self.quadrants(e);

        let nw = self.quadrants(w_ne)[Quadrant::Se.index()];
        let ne = self.quadrants(e_nw)[Quadrant::Sw.index()];
        let sw = self.quadrants(w_se)[Quadrant::Ne.index()];
        let se = self.quadrants(e_sw)[Quadrant::Nw.index()];

        self.intern(nw, ne, sw, se)
    }

    /// Given two `2^n` nodes with `n` above and `s` below, this returns the `2^(n-1)` node
    /// centered on their boundary
    pub fn centered_vertical(&mut self, n: NodeId, s: NodeId) -> NodeId {
        let [_, _, n_sw, n_se] = self.quadrants(n);
        let [s_nw, s_ne, _, _] = self.quadrants(s);

        let nw = self.quadrants(n_sw)[Quadrant::Se.index()];
        let ne = self.quadrants(n_se)[Quadrant::Sw.index()];
        let sw = self.quadrants(s_nw)[Quadrant::Ne.index()];
        let se = self.quadrants(s_ne)[Quadrant::Nw.index()];

        self.intern(nw, ne, sw, se)
    }

    /// On a `2^n` node, this is its `2^(n-2)` center
    pub fn centered_sub_subnode(&mut self, id: NodeId) -> NodeId {
        let inner = self.inner_corners(self.quadrants(id));
        let inner = self.inner_corners(inner);

        self.intern_quadrants(inner)
    }

    /// Embed `id` at the center of an otherwise empty node one level up.
    pub fn pad(&mut self, id: NodeId) -> NodeId {
        let level = self.level(id);
        assert!(level >= 1, "a leaf cannot be centered");

        let e = self.empty_tree(level - 1);
        let [nw, ne, sw, se] = self.quadrants(id);

        let nw = self.intern(e, e, e, nw);
        let ne = self.intern(e, e, ne, e);
        let sw = self.intern(e, sw, e, e);
        let se = self.intern(se, e, e, e);

        self.intern(nw, ne, sw, se)
    }
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::Node;
    use super::NodeId;
    use super::NodeStore;
    use super::Quadrant;
    use crate::error::Error;

    #[test]
    fn leaf_is_level_zero_and_only_addresses_the_origin() {
        let mut store = NodeStore::new();

        assert_eq!(store.level(NodeId::ALIVE), 0);
        assert_eq!(store.get_value(NodeId::ALIVE, 0, 0), Ok(true));
        assert_eq!(store.get_value(NodeId::DEAD, 0, 0), Ok(false));
        assert_eq!(store.children(NodeId::ALIVE), None);
        assert_eq!(store.node(NodeId::DEAD).nw(), None);

        assert_eq!(
            store.get_value(NodeId::ALIVE, 1, 1),
            Err(Error::OutOfBounds { x: 1, y: 1, level: 0 })
        );
        assert!(store.set_value(NodeId::ALIVE, 0, -1, false).is_err());

        assert_eq!(store.set_value(NodeId::ALIVE, 0, 0, false), Ok(NodeId::DEAD));
    }

    #[test]
    fn empty_tree_has_the_requested_level() {
        let mut store = NodeStore::new();

        for level in 0..=66 {
            let e = store.empty_tree(level);
            assert_eq!(store.level(e), level);
            assert!(store.is_empty_tree(e));
        }

        // One node per level, plus the live leaf.
        assert_eq!(store.node_count(), 68);
    }

    #[test]
    fn interning_is_canonical() {
        let mut store = NodeStore::new();
        let (d, a) = (NodeId::DEAD, NodeId::ALIVE);

        let first = store.intern(a, d, d, a);
        let count = store.node_count();
        let second = store.intern(a, d, d, a);

        assert_eq!(first, second);
        assert_eq!(store.node_count(), count);
        assert_ne!(store.intern(d, a, a, d), first);
        assert_eq!(
            *store.node(first),
            Node::Quad {
                level: 1,
                nw: a,
                ne: d,
                sw: d,
                se: a,
            }
        );
    }

    #[test]
    fn independent_paths_reach_the_same_node() {
        let mut store = NodeStore::new();
        let empty = store.empty_tree(6);

        let a = store.set_value(empty, 3, -7, true).unwrap();
        let a = store.set_value(a, -12, 5, true).unwrap();

        let b = store.set_value(empty, -12, 5, true).unwrap();
        let b = store.set_value(b, 0, 0, true).unwrap();
        let b = store.set_value(b, 3, -7, true).unwrap();
        let b = store.set_value(b, 0, 0, false).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn clearing_a_cell_returns_the_original_node() {
        let mut store = NodeStore::new();
        let empty = store.empty_tree(5);

        let changed = store.set_value(empty, 0, 0, true).unwrap();
        assert_ne!(changed, empty);

        let original = store.set_value(changed, 0, 0, false).unwrap();
        assert_eq!(original, empty);
    }

    #[test]
    fn bounds_are_exact_at_every_level() {
        let mut store = NodeStore::new();

        for level in 1..=66u8 {
            let node = store.empty_tree(level);

            if level < 64 {
                let half = 1i64 << (level - 1);

                let cases = [(half - 1, true), (-half, true), (half, false), (-half - 1, false)];

                for (c, in_bounds) in cases {
                    let msg = format!("level {level}, coordinate {c}");

                    assert_eq!(store.get_value(node, c, 0).is_ok(), in_bounds, "{msg}");
                    assert_eq!(store.get_value(node, 0, c).is_ok(), in_bounds, "{msg}");
                    assert_eq!(store.set_value(node, c, 0, true).is_ok(), in_bounds, "{msg}");
                    assert_eq!(store.set_value(node, 0, c, true).is_ok(), in_bounds, "{msg}");
                }
            } else {
                for c in [i64::MIN, i64::MAX] {
                    assert_eq!(store.get_value(node, c, c), Ok(false), "level {level}");
                    assert!(store.set_value(node, c, -1, true).is_ok(), "level {level}");
                }
            }
        }
    }

    #[test]
    fn corners_of_the_i64_square_survive_above_offset_levels() {
        let mut store = NodeStore::new();
        let corners = [
            (i64::MIN, i64::MIN),
            (i64::MIN, i64::MAX),
            (i64::MAX, i64::MIN),
            (i64::MAX, i64::MAX),
        ];

        for level in [64, 65, 66] {
            let mut node = store.empty_tree(level);

            for (x, y) in corners {
                node = store.set_value(node, x, y, true).unwrap();
            }

            for (x, y) in corners {
                assert_eq!(store.get_value(node, x, y), Ok(true), "level {level}");
            }

            assert_eq!(store.get_value(node, 0, 0), Ok(false));
            assert_eq!(store.level(node), level);
        }
    }

    #[test]
    fn offset_level_crossing_keeps_untouched_subtrees() {
        let mut store = NodeStore::new();
        let empty = store.empty_tree(66);
        let node = store.set_value(empty, 5, 5, true).unwrap();

        // (5, 5) lives in the NE child, inside its SW grandchild.
        let before = store.quadrants(empty);
        let after = store.quadrants(node);

        assert_eq!(after[Quadrant::Nw.index()], before[Quadrant::Nw.index()]);
        assert_eq!(after[Quadrant::Sw.index()], before[Quadrant::Sw.index()]);
        assert_eq!(after[Quadrant::Se.index()], before[Quadrant::Se.index()]);
        assert_ne!(after[Quadrant::Ne.index()], before[Quadrant::Ne.index()]);
    }

    #[test]
    fn centered_helpers_pick_the_middle() {
        let mut store = NodeStore::new();
        let mut node = store.empty_tree(4);

        let center_cells = [(-1, 0), (0, 0), (-1, -1), (0, -1)];
        let strip_cells = [(0, 4), (-4, 0), (4, -1), (-1, -4)];

        for (x, y) in center_cells.into_iter().chain(strip_cells).chain([(-8, 7)]) {
            node = store.set_value(node, x, y, true).unwrap();
        }

        let center = store.centered_subnode(node);
        assert_eq!(store.level(center), 3);
        for (x, y) in center_cells {
            assert_eq!(store.get_value(center, x, y), Ok(true));
        }
        assert_eq!(store.get_value(center, -4, 0), Ok(true));
        assert_eq!(store.get_value(center, -4, 3), Ok(false));

        let inner = store.centered_sub_subnode(node);
        assert_eq!(store.level(inner), 2);
        for (x, y) in center_cells {
            assert_eq!(store.get_value(inner, x, y), Ok(true));
        }
        assert_eq!(store.get_value(inner, -2, 1), Ok(false));

        let [nw, ne, sw, se] = store.quadrants(node);
        let top = store.centered_horizontal(nw, ne);
        let bottom = store.centered_horizontal(sw, se);
        let left = store.centered_vertical(nw, sw);
        let right = store.centered_vertical(ne, se);

        // Each strip is a 4x4 node centered on the midpoint of the shared edge.
        assert_eq!(store.level(top), 2);
        assert_eq!(store.get_value(top, 0, 0), Ok(true));
        assert_eq!(store.get_value(left, 0, 0), Ok(true));
        assert_eq!(store.get_value(right, 0, -1), Ok(true));
        assert_eq!(store.get_value(bottom, -1, 0), Ok(true));
        assert_eq!(store.get_value(bottom, 0, 0), Ok(false));
    }

    #[test]
    fn pad_centers_the_node_one_level_up() {
        let mut store = NodeStore::new();
        let mut node = store.empty_tree(3);

        for (x, y) in [(-4, 3), (3, -4), (0, 0)] {
            node = store.set_value(node, x, y, true).unwrap();
        }

        let padded = store.pad(node);
        assert_eq!(store.level(padded), 4);
        assert_eq!(store.centered_subnode(padded), node);

        for (x, y) in [(-4, 3), (3, -4), (0, 0)] {
            assert_eq!(store.get_value(padded, x, y), Ok(true));
        }
        assert_eq!(store.get_value(padded, -8, 7), Ok(false));
    }

    proptest! {
        #[test]
        fn set_then_get_round_trips(
            level in 1u8..=66,
            x in any::<i64>(),
            y in any::<i64>(),
            other in (any::<i64>(), any::<i64>()),
            alive in any::<bool>(),
        ) {
            let mut store = NodeStore::new();
            let node = store.empty_tree(level);

            // Scale the coordinates down into the node's square.
            let fold = |c: i64| if level >= 64 { c } else { c >> (64 - level) };
            let (x, y) = (fold(x), fold(y));
            let (ox, oy) = (fold(other.0), fold(other.1));

            let node = store.set_value(node, ox, oy, true).unwrap();
            let updated = store.set_value(node, x, y, alive).unwrap();

            prop_assert_eq!(store.get_value(updated, x, y), Ok(alive));
            if (ox, oy) != (x, y) {
                prop_assert_eq!(store.get_value(updated, ox, oy), Ok(true));
            }
            prop_assert_eq!(store.level(updated), level);
        }

        #[test]
        fn set_only_rebuilds_one_quadrant(level in 2u8..=64, x in any::<i64>(), y in any::<i64>()) {
            let mut store = NodeStore::new();
            let node = store.empty_tree(level);

            let fold = |c: i64| if level >= 64 { c } else { c >> (64 - level) };
            let (x, y) = (fold(x), fold(y));

            let updated = store.set_value(node, x, y, true).unwrap();
            let before = store.quadrants(node);
            let after = store.quadrants(updated);

            let touched = match (x < 0, y < 0) {
                (true, false) => Quadrant::Nw,
                (false, false) => Quadrant::Ne,
                (true, true) => Quadrant::Sw,
                (false, true) => Quadrant::Se,
            };

            for q in Quadrant::ALL {
                if q == touched {
                    prop_assert_ne!(after[q.index()], before[q.index()]);
                } else {
                    prop_assert_eq!(after[q.index()], before[q.index()]);
                }
            }
        }
    }
}
