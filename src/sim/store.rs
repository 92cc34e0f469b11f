//! Section store
//!
//! Keeps a sliding window of generated sections around the player. Sections
//! are generated strictly in sequence outward from the resident bounds so
//! every new section inherits its boundary from a neighbour, and anything
//! more than `RETENTION_RADIUS` away from the requested index is dropped.

use std::collections::BTreeMap;

use glam::IVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::generator::{PathMemory, Section, SectionGenerator};
use super::grid::Cell;
use crate::consts::RETENTION_RADIUS;
use crate::settings::Settings;

/// Lazily generated, windowed cache of maze sections
#[derive(Debug, Clone)]
pub struct SectionStore {
    generator: SectionGenerator,
    memory: PathMemory,
    sections: BTreeMap<i32, Section>,
    lowest: i32,
    highest: i32,
    cell_size: i32,
    lookahead: i32,
    rng: Pcg32,
}

impl SectionStore {
    /// Create a store holding the starting section and the one above it
    pub fn new(settings: &Settings, seed: u64) -> Self {
        let mut store = Self {
            generator: SectionGenerator::new(
                settings.width_cells,
                settings.section_height_cells,
                settings.generator.clone(),
            ),
            memory: PathMemory::new(),
            sections: BTreeMap::new(),
            lowest: 0,
            highest: 1,
            cell_size: settings.cell_size,
            lookahead: settings.lookahead,
            rng: Pcg32::seed_from_u64(seed),
        };
        store.generate(0);
        store.generate(1);
        store
    }

    fn generate(&mut self, index: i32) {
        let section = self.generator.generate(index, &mut self.memory, &mut self.rng);
        if section.repair.used_fallback() {
            log::warn!("Section {index} needed fallback corridors");
        }
        self.sections.insert(index, section);
    }

    /// Make sure `index` and its lookahead neighbours exist, then evict
    /// everything outside the retention window around `index`.
    pub fn ensure_exists(&mut self, index: i32) {
        while self.highest < index + self.lookahead {
            self.highest += 1;
            self.generate(self.highest);
        }
        while self.lowest > index - self.lookahead {
            self.lowest -= 1;
            self.generate(self.lowest);
        }
        self.evict_outside(index);
    }

    fn evict_outside(&mut self, index: i32) {
        let before = self.sections.len();
        self.sections
            .retain(|&i, _| (i - index).abs() <= RETENTION_RADIUS);
        let evicted = before - self.sections.len();

        if let (Some((&low, _)), Some((&high, _))) =
            (self.sections.first_key_value(), self.sections.last_key_value())
        {
            self.lowest = low;
            self.highest = high;
        }
        if evicted > 0 {
            log::debug!(
                "Evicted {evicted} sections around {index}, resident {}..={}",
                self.lowest,
                self.highest
            );
        }

        // Whatever gets generated next must line up with the current bounds
        self.memory.clear();
        if let Some(top) = self.sections.get(&self.highest) {
            self.memory.set_entries(self.highest + 1, top.exits.clone());
        }
        if let Some(bottom) = self.sections.get(&self.lowest) {
            self.memory.set_exits(self.lowest - 1, bottom.entries.clone());
        }
    }

    /// Height of one section in pixels
    pub fn section_pixels(&self) -> i32 {
        self.generator.height() as i32 * self.cell_size
    }

    /// Section index covering pixel row `pixel_y` (index grows upward)
    pub fn section_for_y(&self, pixel_y: i32) -> i32 {
        -pixel_y.div_euclid(self.section_pixels())
    }

    /// Pixel row of the top edge of section `index`
    pub fn section_top_y(&self, index: i32) -> i32 {
        -index * self.section_pixels()
    }

    /// Cell under a pixel position; unknown or out-of-range cells are walls
    pub fn get_cell(&self, pixel: IVec2) -> Cell {
        let width = self.generator.width() as i32;
        let height = self.generator.height() as i32;
        let column = pixel.x.div_euclid(self.cell_size);
        if column < 0 || column >= width {
            return Cell::Wall;
        }
        let Some(section) = self.sections.get(&self.section_for_y(pixel.y)) else {
            return Cell::Wall;
        };
        let row_from_top = pixel.y.div_euclid(self.cell_size).rem_euclid(height);
        section.cell(column as i64, (height - 1 - row_from_top) as i64)
    }

    pub fn section(&self, index: i32) -> Option<&Section> {
        self.sections.get(&index)
    }

    /// Resident sections in ascending index order
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    /// `(lowest, highest)` resident indices
    pub fn bounds(&self) -> (i32, i32) {
        (self.lowest, self.highest)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn memory(&self) -> &PathMemory {
        &self.memory
    }

    pub fn cell_size(&self) -> i32 {
        self.cell_size
    }

    pub fn width_cells(&self) -> usize {
        self.generator.width()
    }

    pub fn height_cells(&self) -> usize {
        self.generator.height()
    }
}
