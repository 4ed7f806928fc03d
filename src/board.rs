use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt::Debug;
use std::rc::Rc;

use tracing::debug;
use tracing::instrument;

use crate::error::Error;
use crate::error::Result;
use crate::hashlife::CacheStats;
use crate::hashlife::HashLife;
use crate::quadtree::Node;
use crate::quadtree::NodeId;
use crate::rule_set::RuleSet;

/// Level of every board root.
///
/// Advancing a node yields its centered half, so the root keeps one level in reserve above the
/// level 65 region that covers the whole signed 64-bit square.
pub const ROOT_LEVEL: u8 = 66;

/// A Game of Life board: a 2d plane centered at `(0, 0)` that extends to the limits of a signed
/// 64-bit integer in every direction. The board does not wrap at the edges.
pub trait GolBoard: Sized {
    /// Returns a copy of the board with cell in position `(x, y)` alive
    fn add_cell(&self, x: i64, y: i64) -> Result<Self>;

    /// Returns a copy of the board with cell in position `(x, y)` dead
    fn kill_cell(&self, x: i64, y: i64) -> Result<Self>;

    /// Whether the cell is alive. Anything the board cannot address is dead.
    fn is_alive(&self, x: i64, y: i64) -> bool;

    /// Returns a copy of the board stepped to the next state of the simulation
    fn step(&self) -> Self;

    /// Returns an empty board
    fn clear(&self) -> Self;
}

/// A [`GolBoard`] backed by HashLife.
///
/// Boards are immutable values. Every board derived from another through [`GolBoard`] operations
/// shares its engine, so canonical nodes and cached generations carry over between them, while
/// [`Board::new`] starts from a fresh engine.
#[derive(Clone)]
pub struct Board {
    root: NodeId,
    engine: Rc<RefCell<HashLife>>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Board")
            .field("root", &self.root)
            .field("rules", &self.rules())
            .finish()
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.engine, &other.engine) && self.root == other.root
    }
}

impl Eq for Board {}

impl Board {
    /// An empty board following Conway's rules.
    pub fn new() -> Self {
        Self::with_rules(RuleSet::default())
    }

    pub fn with_rules(rules: RuleSet) -> Self {
        let mut engine = HashLife::new(rules);
        let root = engine.store_mut().empty_tree(ROOT_LEVEL);

        Self {
            root,
            engine: Rc::new(RefCell::new(engine)),
        }
    }

    fn with_root(&self, root: NodeId) -> Self {
        Self {
            root,
            engine: Rc::clone(&self.engine),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn level(&self) -> u8 {
        self.engine.borrow().store().level(self.root)
    }

    pub fn rules(&self) -> RuleSet {
        self.engine.borrow().rules()
    }

    pub fn stats(&self) -> CacheStats {
        self.engine.borrow().stats()
    }

    /// Number of distinct nodes held by the shared engine.
    pub fn node_count(&self) -> usize {
        self.engine.borrow().store().node_count()
    }

    /// Whether no cell on the board is alive.
    pub fn is_empty(&self) -> bool {
        self.engine.borrow().store().is_empty_tree(self.root)
    }

    fn set_cell(&self, x: i64, y: i64, alive: bool) -> Result<Self> {
        let root = self
            .engine
            .borrow_mut()
            .store_mut()
            .set_value(self.root, x, y, alive)
            .inspect_err(|err| debug!(%err, alive, "rejected cell update"))?;

        Ok(self.with_root(root))
    }

    /// Every live cell with a signed 64-bit address, sorted by `(x, y)`.
    ///
    /// Empty subtrees are skipped, so this is proportional to the live population times the tree
    /// depth rather than to the area of the board.
    pub fn live_cells(&self) -> BTreeSet<(i64, i64)> {
        let engine = self.engine.borrow();
        let mut cells = BTreeSet::new();

        // Centers are tracked in i128, the root spans 2^66 cells per side.
        let mut stack = vec![(self.root, 0i128, 0i128)];

        while let Some((id, cx, cy)) = stack.pop() {
            if engine.store().is_empty_tree(id) {
                continue;
            }

            match *engine.store().node(id) {
                Node::Leaf(_) => {
                    if let (Ok(x), Ok(y)) = (i64::try_from(cx), i64::try_from(cy)) {
                        cells.insert((x, y));
                    }
                }
                Node::Quad {
                    level,
                    nw,
                    ne,
                    sw,
                    se,
                } => {
                    // Level 1 children are single cells, with the east and north ones at the
                    // parent's own origin.
                    let (w, e, n, s) = if level == 1 {
                        (cx - 1, cx, cy, cy - 1)
                    } else {
                        let quarter = 1i128 << (level - 2);
                        (cx - quarter, cx + quarter, cy + quarter, cy - quarter)
                    };

                    stack.extend([(nw, w, n), (ne, e, n), (sw, w, s), (se, e, s)]);
                }
            }
        }

        cells
    }
}

impl GolBoard for Board {
    fn add_cell(&self, x: i64, y: i64) -> Result<Self> {
        self.set_cell(x, y, true)
    }

    fn kill_cell(&self, x: i64, y: i64) -> Result<Self> {
        self.set_cell(x, y, false)
    }

    fn is_alive(&self, x: i64, y: i64) -> bool {
        match self.engine.borrow().store().get_value(self.root, x, y) {
            Ok(alive) => alive,
            Err(Error::OutOfBounds { .. }) => false,
        }
    }

    #[instrument(level = "debug", skip(self), fields(root = ?self.root))]
    fn step(&self) -> Self {
        let mut engine = self.engine.borrow_mut();

        let next = engine.next_generation(self.root);
        let root = engine.store_mut().pad(next);

        debug!(
            ?root,
            nodes = engine.store().node_count(),
            cached = engine.cached(),
            hits = engine.stats().hits,
            misses = engine.stats().misses,
            "stepped board"
        );

        self.with_root(root)
    }

    fn clear(&self) -> Self {
        let root = self.engine.borrow_mut().store_mut().empty_tree(ROOT_LEVEL);
        self.with_root(root)
    }
}
