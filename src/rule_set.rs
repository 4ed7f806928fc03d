use std::str::FromStr;

use thiserror::Error;

/// Rules of Conway's Game of Life.
pub const B3S23: RuleSet = RuleSet::from_masks(0b1000, 0b1100);

/// # Representation
/// Life rules are represented as
/// ```notrust
/// |------birth------|
/// 0000_0000_0000_0000_0000_0000_0000_0000
///                     |----survival-----|
/// ```
///
/// # Examples
/// ```notrust
/// b3s23:                0000_0000_0000_1000_0000_0000_0000_1100
///
/// b0s0:                 0000_0000_0000_0000_0000_0000_0000_0000
/// b012345678s012345678: 0000_0001_1111_1111_0000_0001_1111_1111
/// ```
///
/// See: https://conwaylife.com/wiki/Rulestring
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RuleSet {
    rule: u32,
}

impl Default for RuleSet {
    fn default() -> Self {
        B3S23
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

impl std::fmt::Display for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let digits = |mask: u16| {
            (0..=8u16)
                .filter(|&n| mask & (1 << n) != 0)
                .map(|n| char::from(b'0' + n as u8))
                .collect::<String>()
        };

        write!(f, "B{}/S{}", digits(self.births()), digits(self.survivals()))
    }
}

impl RuleSet {
    /// Rules from birth and survival masks, bit `i` standing for `i` live neighbors. Bits past
    /// the 8th are ignored.
    ///
    /// Rules where a cell with no live neighbors is born are rejected: a single step would fill
    /// the whole board.
    pub fn new(b: u16, s: u16) -> Result<Self, RuleSetError> {
        if b & 1 != 0 {
            return Err(RuleSetError::BirthOnZero);
        }

        Ok(Self::from_masks(b, s))
    }

    const fn from_masks(b: u16, s: u16) -> Self {
        let b = b & 0x1FF;
        let s = s & 0x1FF;

        Self {
            rule: (b as u32) << 16 | s as u32,
        }
    }

    pub fn births(&self) -> u16 {
        ((self.rule & 0x1FF0000) >> 0x10) as u16
    }

    pub fn survivals(&self) -> u16 {
        (self.rule & 0x1FF) as u16
    }

    /// State of a cell in the next generation, given its current state and its number of live
    /// neighbors.
    pub fn next_state(&self, alive: bool, neighbors: u8) -> bool {
        if neighbors > 8 {
            return false;
        }

        let mask = if alive {
            self.survivals()
        } else {
            self.births()
        };

        mask & (1 << neighbors) != 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleSetError {
    #[error("unexpected character '{0}' in rule string")]
    InvalidChar(char),

    #[error("neighbor count {0} is not in 0..=8")]
    InvalidCount(u32),

    #[error("rule string must start with 'b' or 's'")]
    MissingSection,

    #[error("births on 0 neighbors are not supported")]
    BirthOnZero,
}

impl FromStr for RuleSet {
    type Err = RuleSetError;

    /// Parse rules that look like `B3/S23` or `b3s23`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        enum State {
            Start,
            Birth,
            Survival,
        }

        let mut state = State::Start;
        let (mut b, mut s_mask) = (0u16, 0u16);

        for c in s.trim().chars() {
            match c {
                'b' | 'B' => {
                    state = State::Birth;
                }
                's' | 'S' => {
                    state = State::Survival;
                }
                '/' => {}
                n if n.is_ascii_digit() => {
                    let n = n.to_digit(10).ok_or(RuleSetError::InvalidChar(n))?;

                    if n > 8 {
                        return Err(RuleSetError::InvalidCount(n));
                    }

                    match state {
                        State::Start => return Err(RuleSetError::MissingSection),
                        State::Birth => b |= 1 << n,
                        State::Survival => s_mask |= 1 << n,
                    }
                }
                c => return Err(RuleSetError::InvalidChar(c)),
            }
        }

        RuleSet::new(b, s_mask)
    }
}
