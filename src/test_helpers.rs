use crate::board::{Cell, Grid};
use crate::piece::Color;

pub fn empty_grid() -> Grid {
    Grid::default()
}

pub fn fill_row(grid: &mut Grid, y: usize) {
    grid[y].fill(Cell::Occupied(Color::Blue));
}

pub fn fill_row_with_gap(grid: &mut Grid, y: usize, gap_x: usize) {
    fill_row(grid, y);
    grid[y][gap_x] = Cell::Empty;
}

/// Marks a single cell so tests can follow it through row shifts.
pub fn mark(grid: &mut Grid, x: usize, y: usize, color: Color) {
    grid[y][x] = Cell::Occupied(color);
}
