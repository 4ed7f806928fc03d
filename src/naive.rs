use std::collections::BTreeSet;
use std::collections::HashMap;

use crate::board::GolBoard;
use crate::error::Result;
use crate::rule_set::RuleSet;

/// Cell-by-cell simulation over the set of live cells.
///
/// Slow, but simple enough to trust. Neighbors past the edge of the `i64` square are dead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NaiveBoard {
    rules: RuleSet,
    alive: BTreeSet<(i64, i64)>,
}

impl NaiveBoard {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            alive: BTreeSet::new(),
        }
    }

    pub fn live_cells(&self) -> &BTreeSet<(i64, i64)> {
        &self.alive
    }

    fn neighbors(x: i64, y: i64) -> impl Iterator<Item = (i64, i64)> {
        (-1..=1i64)
            .flat_map(|dx| (-1..=1i64).map(move |dy| (dx, dy)))
            .filter(|&offset| offset != (0, 0))
            .filter_map(move |(dx, dy)| Some((x.checked_add(dx)?, y.checked_add(dy)?)))
    }
}

impl GolBoard for NaiveBoard {
    fn add_cell(&self, x: i64, y: i64) -> Result<Self> {
        let mut next = self.clone();
        next.alive.insert((x, y));

        Ok(next)
    }

    fn kill_cell(&self, x: i64, y: i64) -> Result<Self> {
        let mut next = self.clone();
        next.alive.remove(&(x, y));

        Ok(next)
    }

    fn is_alive(&self, x: i64, y: i64) -> bool {
        self.alive.contains(&(x, y))
    }

    fn step(&self) -> Self {
        let mut counts: HashMap<(i64, i64), u8> = HashMap::new();

        for &(x, y) in &self.alive {
            for cell in Self::neighbors(x, y) {
                *counts.entry(cell).or_default() += 1;
            }
        }

        // A cell with no live neighbors never comes alive, so only counted cells and
        // current survivors need checking.
        let candidates = counts.keys().copied().chain(self.alive.iter().copied());

        let alive = candidates
            .filter(|cell| {
                let neighbors = counts.get(cell).copied().unwrap_or(0);
                self.rules.next_state(self.alive.contains(cell), neighbors)
            })
            .collect();

        Self {
            rules: self.rules,
            alive,
        }
    }

    fn clear(&self) -> Self {
        Self::new(self.rules)
    }
}
