//! Maze section generation
//!
//! A section is carved as a DFS maze on the odd-cell lattice, seeded from
//! each entry and exit column so the section always lines up with its
//! neighbours:
//!
//! 1. Pick (or inherit) entry and exit columns on odd interior columns
//! 2. Keep an exit within reach of every entry
//! 3. Open a 3-wide mouth around every boundary column
//! 4. Carve from every boundary column with an iterative randomized DFS
//! 5. Repair any boundary point the carving missed
//! 6. Knock out a few extra walls to break up dead ends

use std::collections::{BTreeSet, HashMap};

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};

use super::grid::{Cell, Grid};
use super::repair::{RepairReport, repair};
use crate::consts::MINIMUM_PATHS;

/// Generator tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Fewest entry/exit columns per boundary
    pub min_points: usize,
    /// Most entry/exit columns per boundary (drawn per section)
    pub max_points: usize,
    /// Extra passage attempts per section (`None` = half the width)
    pub extra_passages: Option<usize>,
    /// How far (in columns) an exit may sit from an entry
    pub proximity: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_points: MINIMUM_PATHS,
            max_points: MINIMUM_PATHS,
            extra_passages: None,
            proximity: 2,
        }
    }
}

/// One generated maze tile
#[derive(Debug, Clone)]
pub struct Section {
    pub index: i32,
    pub grid: Grid,
    /// Open columns on the bottom edge
    pub entries: BTreeSet<usize>,
    /// Open columns on the top edge
    pub exits: BTreeSet<usize>,
    pub repair: RepairReport,
}

impl Section {
    /// Cell at local (column, row) with row 0 at the bottom
    pub fn cell(&self, x: i64, y: i64) -> Cell {
        self.grid.get(x, y)
    }
}

/// Boundary columns handed between adjacent sections
#[derive(Debug, Clone, Default)]
pub struct PathMemory {
    /// Columns a section must open on its bottom edge (set by the section below)
    entries: HashMap<i32, BTreeSet<usize>>,
    /// Columns a section must open on its top edge (set by the section above)
    exits: HashMap<i32, BTreeSet<usize>>,
}

impl PathMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_entries(&mut self, index: i32, columns: BTreeSet<usize>) {
        self.entries.insert(index, columns);
    }

    pub fn set_exits(&mut self, index: i32, columns: BTreeSet<usize>) {
        self.exits.insert(index, columns);
    }

    pub fn entries(&self, index: i32) -> Option<&BTreeSet<usize>> {
        self.entries.get(&index)
    }

    pub fn exits(&self, index: i32) -> Option<&BTreeSet<usize>> {
        self.exits.get(&index)
    }

    pub fn take_entries(&mut self, index: i32) -> Option<BTreeSet<usize>> {
        self.entries.remove(&index)
    }

    pub fn take_exits(&mut self, index: i32) -> Option<BTreeSet<usize>> {
        self.exits.remove(&index)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.exits.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.exits.is_empty()
    }
}

/// Builds sections of a fixed size
#[derive(Debug, Clone)]
pub struct SectionGenerator {
    width: usize,
    height: usize,
    config: GeneratorConfig,
}

impl SectionGenerator {
    pub fn new(width: usize, height: usize, config: GeneratorConfig) -> Self {
        Self {
            width,
            height,
            config,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Generate section `index`, consuming its inherited columns from `memory`
    /// and handing its own boundary to both neighbours.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        index: i32,
        memory: &mut PathMemory,
        rng: &mut R,
    ) -> Section {
        let entries = memory.take_entries(index);
        let exits = memory.take_exits(index);
        let section = self.build(index, entries, exits, rng);

        memory.set_entries(index + 1, section.exits.clone());
        memory.set_exits(index - 1, section.entries.clone());
        section
    }

    /// Build a section from optional inherited boundary columns
    pub fn build<R: Rng + ?Sized>(
        &self,
        index: i32,
        inherited_entries: Option<BTreeSet<usize>>,
        inherited_exits: Option<BTreeSet<usize>>,
        rng: &mut R,
    ) -> Section {
        let mut grid = Grid::walled(self.width, self.height);

        let entries_fresh = inherited_entries.is_none();
        let exits_fresh = inherited_exits.is_none();
        let mut entries = inherited_entries.unwrap_or_else(|| self.sample_columns(rng));
        let mut exits = inherited_exits.unwrap_or_else(|| self.sample_columns(rng));

        if exits_fresh {
            self.ensure_nearby(&entries, &mut exits, rng);
        } else if entries_fresh {
            // Coming down from above: the exits are fixed, bend the entries instead
            self.ensure_nearby(&exits, &mut entries, rng);
        }

        let top = self.height as i64 - 1;
        self.open_mouths(&mut grid, &entries, 0, 1);
        self.open_mouths(&mut grid, &exits, top, top - 1);

        for &x in &entries {
            carve_maze(&mut grid, x as i64, 1, rng);
        }
        for &x in &exits {
            carve_maze(&mut grid, x as i64, top - 1, rng);
        }

        let report = repair(&mut grid, &entries, &exits);
        self.add_extra_passages(&mut grid, rng);

        log::debug!(
            "Generated section {index}: entries {entries:?}, exits {exits:?}, {} path cells",
            grid.path_count()
        );

        Section {
            index,
            grid,
            entries,
            exits,
            repair: report,
        }
    }

    /// Odd interior columns `1, 3, ..` not past `width - 2`
    fn candidate_columns(&self) -> Vec<usize> {
        (1..self.width.saturating_sub(1)).step_by(2).collect()
    }

    /// Largest number of boundary columns this width allows
    pub fn max_points(&self) -> usize {
        (self.width.saturating_sub(2) / 2).max(1)
    }

    fn sample_columns<R: Rng + ?Sized>(&self, rng: &mut R) -> BTreeSet<usize> {
        let candidates = self.candidate_columns();
        if candidates.is_empty() {
            return BTreeSet::new();
        }
        let low = self.config.min_points.max(1);
        let high = self.config.max_points.max(low);
        let k = rng
            .random_range(low..=high)
            .min(self.max_points())
            .min(candidates.len());

        rand::seq::index::sample(rng, candidates.len(), k)
            .into_iter()
            .map(|i| candidates[i])
            .collect()
    }

    /// Columns within `proximity` of `x` sharing its parity
    fn window(&self, x: usize) -> Vec<usize> {
        let reach = self.config.proximity;
        let low = x.saturating_sub(reach).max(1);
        let high = (x + reach).min(self.width.saturating_sub(2));
        (low..=high).filter(|c| c % 2 == x % 2).collect()
    }

    /// Every column in `anchors` gets at least one partner column close by
    fn ensure_nearby<R: Rng + ?Sized>(
        &self,
        anchors: &BTreeSet<usize>,
        partners: &mut BTreeSet<usize>,
        rng: &mut R,
    ) {
        for &anchor in anchors {
            let window = self.window(anchor);
            if window.iter().any(|c| partners.contains(c)) {
                continue;
            }
            if let Some(&column) = window.choose(rng) {
                partners.insert(column);
            }
        }
    }

    /// Open `x - 1 ..= x + 1` on the boundary row and the row just inside it
    fn open_mouths(&self, grid: &mut Grid, columns: &BTreeSet<usize>, edge: i64, inner: i64) {
        let last_inner = self.width as i64 - 2;
        for &x in columns {
            let x = x as i64;
            for row in [edge, inner] {
                grid.carve(x, row);
                if x > 1 {
                    grid.carve(x - 1, row);
                }
                if x < last_inner {
                    grid.carve(x + 1, row);
                }
            }
        }
    }

    fn add_extra_passages<R: Rng + ?Sized>(&self, grid: &mut Grid, rng: &mut R) {
        if self.width < 3 || self.height < 3 {
            return;
        }
        let budget = self.config.extra_passages.unwrap_or(self.width / 2);
        for _ in 0..budget {
            let x = rng.random_range(1..=self.width as i64 - 2);
            let y = rng.random_range(1..=self.height as i64 - 2);
            if grid.get(x, y) == Cell::Wall && grid.path_neighbours(x, y) >= 2 {
                grid.carve(x, y);
            }
        }
    }
}

/// Iterative randomized DFS on the two-step lattice starting at `(x, y)`
pub fn carve_maze<R: Rng + ?Sized>(grid: &mut Grid, x: i64, y: i64, rng: &mut R) {
    grid.carve(x, y);
    let mut stack = vec![(x, y)];

    while let Some(&(cx, cy)) = stack.last() {
        let mut options: Vec<(i64, i64)> = [(0, 2), (2, 0), (0, -2), (-2, 0)]
            .into_iter()
            .filter(|&(dx, dy)| {
                let (nx, ny) = (cx + dx, cy + dy);
                grid.is_interior(nx, ny) && grid.get(nx, ny) == Cell::Wall
            })
            .collect();

        if options.is_empty() {
            stack.pop();
            continue;
        }

        options.shuffle(rng);
        let (dx, dy) = options[0];
        grid.carve(cx + dx / 2, cy + dy / 2);
        grid.carve(cx + dx, cy + dy);
        stack.push((cx + dx, cy + dy));
    }
}
