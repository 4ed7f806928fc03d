use std::collections::HashMap;

use tracing::trace;

use crate::quadtree::NodeId;
use crate::quadtree::NodeStore;
use crate::rule_set::RuleSet;

/// Counters for the generation cache.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// The HashLife engine: a canonical node store plus the memoized next-generation results of the
/// nodes in it.
///
/// Results are keyed by node id. Since nodes are immutable and canonical, an entry is valid for
/// as long as the engine lives and is never invalidated.
#[derive(Debug, Default)]
pub struct HashLife {
    store: NodeStore,
    rules: RuleSet,

    /// Node to its center, one generation later
    cache: HashMap<NodeId, NodeId>,
    stats: CacheStats,
}

impl HashLife {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            store: NodeStore::new(),
            rules,
            cache: HashMap::new(),
            stats: CacheStats::default(),
        }
    }

    pub fn rules(&self) -> RuleSet {
        self.rules
    }

    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut NodeStore {
        &mut self.store
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Number of memoized generation results.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Returns the node one level down, centered on `node`, advanced by one generation.
    ///
    /// # Panics
    /// If `node` is below level 2, since there is no centered region to advance.
    pub fn next_generation(&mut self, node: NodeId) -> NodeId {
        if let Some(&res) = self.cache.get(&node) {
            self.stats.hits += 1;
            return res;
        }
        self.stats.misses += 1;

        let level = self.store.level(node);
        assert!(level >= 2, "cannot advance a level {level} node");

        let res = if level == 2 {
            self.base_case(node)
        } else {
            self.compute_node_res(node)
        };

        trace!(?node, level, ?res, "computed generation");
        self.cache.insert(node, res);

        res
    }

    /// A 4x4 node: simulate the four center cells directly.
    fn base_case(&mut self, node: NodeId) -> NodeId {
        let nw = self.next_cell(node, -1, 0);
        let ne = self.next_cell(node, 0, 0);
        let sw = self.next_cell(node, -1, -1);
        let se = self.next_cell(node, 0, -1);

        self.store.intern(nw, ne, sw, se)
    }

    /// Next state of the cell `(x, y)` of a 4x4 node, as a leaf. The cell must not be on the
    /// node's border.
    fn next_cell(&self, node: NodeId, x: i64, y: i64) -> NodeId {
        let alive = |x, y| {
            let value = self.store.get_value(node, x, y);
            debug_assert!(value.is_ok(), "cell ({x}, {y}) is outside the 4x4 node");

            value == Ok(true)
        };

        let neighbors = (-1..=1)
            .flat_map(|dx| (-1..=1).map(move |dy| (dx, dy)))
            .filter(|&offset| offset != (0, 0))
            .filter(|&(dx, dy)| alive(x + dx, y + dy))
            .count();

        NodeStore::leaf(self.rules.next_state(alive(x, y), neighbors as u8))
    }

    fn compute_node_res(&mut self, node: NodeId) -> NodeId {
        //  n00 n01 n02
        //  n10 n11 n12
        //  n20 n21 n22
        let [nw, ne, sw, se] = self.store.quadrants(node);

        let n00 = self.store.centered_subnode(nw);
        let n01 = self.store.centered_horizontal(nw, ne);
        let n02 = self.store.centered_subnode(ne);
        let n10 = self.store.centered_vertical(nw, sw);
        let n11 = self.store.centered_sub_subnode(node);
        let n12 = self.store.centered_vertical(ne, se);
        let n20 = self.store.centered_subnode(sw);
        let n21 = self.store.centered_horizontal(sw, se);
        let n22 = self.store.centered_subnode(se);

        // Four overlapping nodes one level down, whose centers tile the center of `node`
        let q_nw = self.store.intern(n00, n01, n10, n11);
        let q_ne = self.store.intern(n01, n02, n11, n12);
        let q_sw = self.store.intern(n10, n11, n20, n21);
        let q_se = self.store.intern(n11, n12, n21, n22);

        let nw = self.next_generation(q_nw);
        let ne = self.next_generation(q_ne);
        let sw = self.next_generation(q_sw);
        let se = self.next_generation(q_se);

        self.store.intern(nw, ne, sw, se)
    }
}
