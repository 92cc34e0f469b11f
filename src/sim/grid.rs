//! Cell grid for a single maze section
//!
//! Row 0 is the bottom edge of the section (where the entries are), row
//! `height - 1` the top edge (where the exits are).

use std::fmt;

/// One maze cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Wall,
    Path,
}

impl Cell {
    pub fn is_path(self) -> bool {
        self == Cell::Path
    }
}

/// Row-major cell storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a grid where every cell is a wall
    pub fn walled(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Wall; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn index_of(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    #[inline]
    pub fn coords_of(&self, index: usize) -> (usize, usize) {
        (index % self.width, index / self.width)
    }

    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Interior cells exclude the outer ring (columns 0/w-1, rows 0/h-1)
    pub fn is_interior(&self, x: i64, y: i64) -> bool {
        x > 0 && y > 0 && x < self.width as i64 - 1 && y < self.height as i64 - 1
    }

    /// Cell at (x, y); anything outside the grid is a wall
    pub fn get(&self, x: i64, y: i64) -> Cell {
        if self.in_bounds(x, y) {
            self.cells[self.index_of(x as usize, y as usize)]
        } else {
            Cell::Wall
        }
    }

    pub fn is_path(&self, x: i64, y: i64) -> bool {
        self.get(x, y).is_path()
    }

    /// Set a cell; out-of-range writes are ignored
    pub fn set(&mut self, x: i64, y: i64, cell: Cell) {
        if self.in_bounds(x, y) {
            let i = self.index_of(x as usize, y as usize);
            self.cells[i] = cell;
        }
    }

    pub fn carve(&mut self, x: i64, y: i64) {
        self.set(x, y, Cell::Path);
    }

    /// Number of the four edge-adjacent neighbours that are paths
    pub fn path_neighbours(&self, x: i64, y: i64) -> usize {
        [(x + 1, y), (x - 1, y), (x, y + 1), (x, y - 1)]
            .into_iter()
            .filter(|&(nx, ny)| self.is_path(nx, ny))
            .count()
    }

    pub fn path_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_path()).count()
    }

    pub fn row(&self, y: usize) -> &[Cell] {
        let start = y * self.width;
        &self.cells[start..start + self.width]
    }
}

impl fmt::Display for Grid {
    /// Top row first, `#` for walls and `.` for paths
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..self.height).rev() {
            let line: String = self
                .row(y)
                .iter()
                .map(|c| if c.is_path() { '.' } else { '#' })
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
