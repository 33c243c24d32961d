//! Uniform spatial grid for neighbor queries.
//!
//! Connection discovery would be O(N²) with an all-pairs scan. Bucketing
//! entities into cells whose size equals the connection distance bounds the
//! candidate set to the 3x3 neighborhood around each entity's cell, which
//! keeps the per-frame search near-linear in entity count.
//!
//! The grid is frame-local: it is rebuilt from scratch every frame so cell
//! assignment always matches current positions when pairs are evaluated.

use glam::Vec2;

/// A uniform grid over a rectangular field.
#[derive(Debug)]
pub struct CellGrid {
    cell_size: f32,
    cols: usize,
    rows: usize,
    cells: Vec<Vec<u32>>,
}

impl CellGrid {
    /// Create a grid covering `width` x `height` with the given cell size.
    ///
    /// The cell size doubles as the connection distance threshold used by
    /// [`for_each_pair`](Self::for_each_pair).
    pub fn new(width: f32, height: f32, cell_size: f32) -> Self {
        debug_assert!(cell_size > 0.0);
        let cols = (width / cell_size).ceil().max(1.0) as usize;
        let rows = (height / cell_size).ceil().max(1.0) as usize;
        Self {
            cell_size,
            cols,
            rows,
            cells: vec![Vec::new(); cols * rows],
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Cell coordinates for a position, clamped into the grid.
    ///
    /// Entities can overshoot the field edge by less than one step before
    /// their velocity flips, so out-of-bounds positions clamp to the border
    /// cell rather than dropping out of the search.
    fn cell_of(&self, p: Vec2) -> (usize, usize) {
        let c = (p.x / self.cell_size).floor();
        let r = (p.y / self.cell_size).floor();
        let c = (c.max(0.0) as usize).min(self.cols - 1);
        let r = (r.max(0.0) as usize).min(self.rows - 1);
        (c, r)
    }

    /// Rebuild the grid from the given positions. Index in the slice is the
    /// entity id.
    pub fn rebuild(&mut self, positions: &[Vec2]) {
        for cell in &mut self.cells {
            cell.clear();
        }
        for (id, &p) in positions.iter().enumerate() {
            let (c, r) = self.cell_of(p);
            self.cells[c + r * self.cols].push(id as u32);
        }
    }

    /// Visit every pair of entities closer than the cell size.
    ///
    /// Calls `f(id_a, id_b, dist_sq)` with `id_a < id_b` strictly, so each
    /// pair is reported exactly once. Requires a preceding
    /// [`rebuild`](Self::rebuild) with the same positions.
    pub fn for_each_pair<F>(&self, positions: &[Vec2], mut f: F)
    where
        F: FnMut(u32, u32, f32),
    {
        let limit_sq = self.cell_size * self.cell_size;
        for (id, &p) in positions.iter().enumerate() {
            let id = id as u32;
            let (c, r) = self.cell_of(p);
            let c_lo = c.saturating_sub(1);
            let r_lo = r.saturating_sub(1);
            let c_hi = (c + 1).min(self.cols - 1);
            let r_hi = (r + 1).min(self.rows - 1);

            for nr in r_lo..=r_hi {
                for nc in c_lo..=c_hi {
                    for &other in &self.cells[nc + nr * self.cols] {
                        if other <= id {
                            continue;
                        }
                        let d = p - positions[other as usize];
                        let dist_sq = d.length_squared();
                        if dist_sq < limit_sq {
                            f(id, other, dist_sq);
                        }
                    }
                }
            }
        }
    }

    /// Collect connected pairs into a vector. Convenience for tests and
    /// benchmarks.
    pub fn pairs(&self, positions: &[Vec2]) -> Vec<(u32, u32)> {
        let mut out = Vec::new();
        self.for_each_pair(positions, |a, b, _| out.push((a, b)));
        out
    }
}

/// All-pairs reference implementation of the same query. O(N²); used to
/// validate the grid search and as the benchmark baseline.
pub fn brute_force_pairs(positions: &[Vec2], distance: f32) -> Vec<(u32, u32)> {
    let limit_sq = distance * distance;
    let mut out = Vec::new();
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            if (positions[i] - positions[j]).length_squared() < limit_sq {
                out.push((i as u32, j as u32));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_dimensions_round_up() {
        let grid = CellGrid::new(1000.0, 1100.0, 145.0);
        assert_eq!(grid.cols(), 7);
        assert_eq!(grid.rows(), 8);
    }

    #[test]
    fn test_pair_just_inside_and_outside_threshold() {
        let eps = 0.01;

        let mut inside = vec![Vec2::new(500.0, 500.0), Vec2::new(600.0 - eps, 500.0)];
        let mut g = CellGrid::new(1000.0, 1000.0, 100.0);
        g.rebuild(&inside);
        assert_eq!(g.pairs(&inside), vec![(0, 1)]);

        inside[1].x = 600.0 + eps;
        g.rebuild(&inside);
        assert!(g.pairs(&inside).is_empty());

        // Exactly at the threshold is excluded (strict less-than).
        inside[1].x = 600.0;
        g.rebuild(&inside);
        assert!(g.pairs(&inside).is_empty());
    }

    #[test]
    fn test_pairs_are_strictly_ordered_and_unique() {
        let positions: Vec<Vec2> = (0..50)
            .map(|i| Vec2::new((i % 10) as f32 * 30.0, (i / 10) as f32 * 30.0))
            .collect();
        let mut grid = CellGrid::new(300.0, 300.0, 80.0);
        grid.rebuild(&positions);

        let pairs = grid.pairs(&positions);
        let mut seen = std::collections::HashSet::new();
        for &(a, b) in &pairs {
            assert!(a < b);
            assert!(seen.insert((a, b)), "pair ({}, {}) reported twice", a, b);
        }
    }

    #[test]
    fn test_clamped_positions_still_connect() {
        // One entity slightly past the right edge after a bounce overshoot.
        let positions = vec![Vec2::new(999.0, 500.0), Vec2::new(1000.5, 500.0)];
        let mut grid = CellGrid::new(1000.0, 1000.0, 100.0);
        grid.rebuild(&positions);
        assert_eq!(grid.pairs(&positions), vec![(0, 1)]);
    }
}
