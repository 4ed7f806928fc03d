use crate::error::Error;
use crate::error::Result;

/// Highest level at which a node's local coordinates are translated with `i64` offsets.
///
/// A level 64 node spans exactly the signed 64-bit square. Above it, the quarter-width offsets
/// no longer fit, so lookups go through the centered inner node instead.
pub const MAX_OFFSET_LEVEL: u8 = 64;

/// One of the four children of a quad. The discriminant is the child's position in
/// `[nw, ne, sw, se]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    Nw = 0,
    Ne = 1,
    Sw = 2,
    Se = 3,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [Quadrant::Nw, Quadrant::Ne, Quadrant::Sw, Quadrant::Se];

    /// The diagonally opposite quadrant. For a child in quadrant `q`, the grandchild in
    /// `q.opposite()` is the one touching the parent's center.
    pub fn opposite(self) -> Self {
        match self {
            Quadrant::Nw => Quadrant::Se,
            Quadrant::Ne => Quadrant::Sw,
            Quadrant::Sw => Quadrant::Ne,
            Quadrant::Se => Quadrant::Nw,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Find the quadrant of a level `level` node holding `(x, y)`, together with the coordinates of
/// that cell in the quadrant's own frame.
///
/// Valid for `1 <= level <= MAX_OFFSET_LEVEL`. A level 64 node covers every `i64` coordinate, so
/// bounds are only checked below it.
pub fn locate(level: u8, x: i64, y: i64) -> Result<(Quadrant, i64, i64)> {
    debug_assert!(
        (1..=MAX_OFFSET_LEVEL).contains(&level),
        "level {level} has no i64 offsets"
    );

    if level < MAX_OFFSET_LEVEL {
        let half = 1i64 << (level - 1);

        if x < -half || x >= half || y < -half || y >= half {
            return Err(Error::OutOfBounds { x, y, level });
        }
    }

    // Level 1 children are leaves, centered on the cell at their own origin. Halving the
    // quarter-width there would round the negative offset toward zero.
    let (pos, neg) = if level == 1 {
        (1, 0)
    } else {
        let quarter = 1i64 << (level - 2);
        (quarter, -quarter)
    };

    let located = match (x < 0, y < 0) {
        (true, false) => (Quadrant::Nw, x + pos, y + neg),
        (false, false) => (Quadrant::Ne, x + neg, y + neg),
        (true, true) => (Quadrant::Sw, x + pos, y + pos),
        (false, true) => (Quadrant::Se, x + neg, y + pos),
    };

    Ok(located)
}
