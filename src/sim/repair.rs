//! Connectivity repair
//!
//! Makes sure every entry and exit point of a section touches the carved
//! network, digging the shortest possible corridor through the walls, then
//! joins any carved regions that ended up cut off from each other.

use std::collections::{BTreeSet, VecDeque};

use super::grid::Grid;

/// What a repair pass changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Cells turned from wall to path
    pub carved: usize,
    /// Columns that needed a fallback corridor because no path existed yet
    pub fallback_columns: Vec<usize>,
    /// Disjoint regions joined to the rest of the maze
    pub merged_regions: usize,
}

impl RepairReport {
    pub fn used_fallback(&self) -> bool {
        !self.fallback_columns.is_empty()
    }
}

/// Connect `(e, 1)` for every entry and `(x, h - 2)` for every exit
pub fn repair(grid: &mut Grid, entries: &BTreeSet<usize>, exits: &BTreeSet<usize>) -> RepairReport {
    let mut report = RepairReport::default();
    if grid.height() < 3 || grid.width() < 3 {
        return report;
    }

    let bottom = 1;
    let top = grid.height() - 2;
    let targets = entries
        .iter()
        .map(|&x| (x, bottom))
        .chain(exits.iter().map(|&x| (x, top)));

    for (x, y) in targets {
        if grid.is_path(x as i64, y as i64) {
            continue;
        }
        match shortest_corridor(grid, x, y) {
            Some(corridor) => {
                for (cx, cy) in corridor {
                    if !grid.is_path(cx as i64, cy as i64) {
                        grid.carve(cx as i64, cy as i64);
                        report.carved += 1;
                    }
                }
            }
            None => {
                log::warn!("No carved path reachable from column {x}, carving fallback corridor");
                report.carved += carve_column(grid, x);
                report.fallback_columns.push(x);
            }
        }
    }

    let (merged, carved) = merge_regions(grid);
    report.merged_regions = merged;
    report.carved += carved;
    report
}

/// BFS over every interior cell from `(x, y)` to the nearest path cell.
///
/// Returns the corridor from the start up to (excluding) the path cell it
/// reached, or `None` when the interior contains no path at all.
pub fn shortest_corridor(grid: &Grid, x: usize, y: usize) -> Option<Vec<(usize, usize)>> {
    if !grid.is_interior(x as i64, y as i64) {
        return None;
    }

    let start = grid.index_of(x, y);
    let mut parent: Vec<Option<usize>> = vec![None; grid.width() * grid.height()];
    let mut visited = vec![false; grid.width() * grid.height()];
    let mut queue = VecDeque::new();
    visited[start] = true;
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        let (cx, cy) = grid.coords_of(current);
        if grid.is_path(cx as i64, cy as i64) {
            let mut corridor = Vec::new();
            let mut step = parent[current];
            while let Some(index) = step {
                corridor.push(grid.coords_of(index));
                step = parent[index];
            }
            corridor.reverse();
            return Some(corridor);
        }

        let (cx, cy) = (cx as i64, cy as i64);
        for (nx, ny) in [(cx, cy + 1), (cx + 1, cy), (cx, cy - 1), (cx - 1, cy)] {
            if !grid.is_interior(nx, ny) {
                continue;
            }
            let next = grid.index_of(nx as usize, ny as usize);
            if !visited[next] {
                visited[next] = true;
                parent[next] = Some(current);
                queue.push_back(next);
            }
        }
    }

    None
}

/// Label the 4-connected path regions; returns labels and region count
fn label_regions(grid: &Grid) -> (Vec<Option<usize>>, usize) {
    let mut labels = vec![None; grid.width() * grid.height()];
    let mut count = 0;
    for start in 0..labels.len() {
        let (sx, sy) = grid.coords_of(start);
        if labels[start].is_some() || !grid.is_path(sx as i64, sy as i64) {
            continue;
        }
        labels[start] = Some(count);
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            let (cx, cy) = grid.coords_of(current);
            let (cx, cy) = (cx as i64, cy as i64);
            for (nx, ny) in [(cx, cy + 1), (cx + 1, cy), (cx, cy - 1), (cx - 1, cy)] {
                if !grid.is_path(nx, ny) {
                    continue;
                }
                let next = grid.index_of(nx as usize, ny as usize);
                if labels[next].is_none() {
                    labels[next] = Some(count);
                    queue.push_back(next);
                }
            }
        }
        count += 1;
    }
    (labels, count)
}

/// Join every carved region into one by digging the shortest wall corridor
/// from a stray region to the nearest other region.
///
/// Returns `(regions merged, cells carved)`.
pub fn merge_regions(grid: &mut Grid) -> (usize, usize) {
    let mut merged = 0;
    let mut carved = 0;

    loop {
        let (labels, count) = label_regions(grid);
        if count <= 1 {
            break;
        }

        // Multi-source BFS from the last region through interior walls
        let stray = count - 1;
        let mut parent: Vec<Option<usize>> = vec![None; labels.len()];
        let mut visited = vec![false; labels.len()];
        let mut queue = VecDeque::new();
        for (i, label) in labels.iter().enumerate() {
            if *label == Some(stray) {
                visited[i] = true;
                queue.push_back(i);
            }
        }

        let mut bridge = None;
        'search: while let Some(current) = queue.pop_front() {
            let (cx, cy) = grid.coords_of(current);
            let (cx, cy) = (cx as i64, cy as i64);
            for (nx, ny) in [(cx, cy + 1), (cx + 1, cy), (cx, cy - 1), (cx - 1, cy)] {
                if !grid.in_bounds(nx, ny) {
                    continue;
                }
                let next = grid.index_of(nx as usize, ny as usize);
                match labels[next] {
                    Some(label) if label != stray => {
                        bridge = Some(current);
                        break 'search;
                    }
                    None if grid.is_interior(nx, ny) && !visited[next] => {
                        visited[next] = true;
                        parent[next] = Some(current);
                        queue.push_back(next);
                    }
                    _ => {}
                }
            }
        }

        let Some(mut step) = bridge else {
            log::warn!("Could not join {count} maze regions");
            break;
        };
        while labels[step].is_none() {
            let (x, y) = grid.coords_of(step);
            grid.carve(x as i64, y as i64);
            carved += 1;
            match parent[step] {
                Some(prev) => step = prev,
                None => break,
            }
        }
        merged += 1;
    }

    (merged, carved)
}

/// Straight corridor through every interior row of column `x`
fn carve_column(grid: &mut Grid, x: usize) -> usize {
    let mut carved = 0;
    for y in 1..grid.height() - 1 {
        if !grid.is_path(x as i64, y as i64) {
            grid.carve(x as i64, y as i64);
            carved += 1;
        }
    }
    carved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(values: &[usize]) -> BTreeSet<usize> {
        values.iter().copied().collect()
    }

    #[test]
    fn test_shortest_corridor_is_manhattan() {
        let mut grid = Grid::walled(9, 9);
        grid.carve(6, 5);
        let corridor = shortest_corridor(&grid, 2, 1).expect("path exists");
        // Start plus 4 + 4 steps, minus the path cell itself
        assert_eq!(corridor.len(), 8);
        assert_eq!(corridor[0], (2, 1));
        let (lx, ly) = *corridor.last().unwrap();
        assert_eq!((6_i64 - lx as i64).abs() + (5_i64 - ly as i64).abs(), 1);
    }

    #[test]
    fn test_repair_connects_entry() {
        let mut grid = Grid::walled(9, 9);
        grid.carve(5, 5);
        let report = repair(&mut grid, &set(&[1]), &BTreeSet::new());
        assert!(grid.is_path(1, 1));
        assert_eq!(report.carved, 8);
        assert!(!report.used_fallback());
    }

    #[test]
    fn test_repair_skips_connected_points() {
        let mut grid = Grid::walled(7, 7);
        for y in 1..6 {
            grid.carve(3, y);
        }
        let before = grid.clone();
        let report = repair(&mut grid, &set(&[3]), &set(&[3]));
        assert_eq!(report, RepairReport::default());
        assert_eq!(grid, before);
    }

    #[test]
    fn test_fallback_on_all_wall_grid() {
        let mut grid = Grid::walled(7, 7);
        let report = repair(&mut grid, &set(&[1, 5]), &set(&[3]));
        assert_eq!(report.fallback_columns, vec![1]);
        // Column 1 is a corridor, the others dug their way to it
        for y in 1..6 {
            assert!(grid.is_path(1, y));
        }
        assert!(grid.is_path(5, 1));
        assert!(grid.is_path(3, 5));
    }

    #[test]
    fn test_merge_joins_disjoint_regions() {
        let mut grid = Grid::walled(9, 9);
        grid.carve(1, 1);
        grid.carve(7, 7);
        grid.carve(7, 8); // touches the top edge
        let (merged, carved) = merge_regions(&mut grid);
        assert_eq!(merged, 1);
        // Shortest wall corridor between (1,1) and (7,7)
        assert_eq!(carved, 11);
        assert_eq!(label_regions(&grid).1, 1);
    }

    #[test]
    fn test_merge_single_region_untouched() {
        let mut grid = Grid::walled(5, 5);
        grid.carve(1, 1);
        grid.carve(2, 1);
        let before = grid.clone();
        assert_eq!(merge_regions(&mut grid), (0, 0));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_corridor_stays_inside() {
        let mut grid = Grid::walled(5, 5);
        grid.carve(0, 1); // boundary path must not be used as a target
        assert!(shortest_corridor(&grid, 3, 3).is_none());
    }
}
