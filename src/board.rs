use std::ops::{Index, IndexMut};

use crate::piece::{Color, Occupancy, Piece, PieceKind, Position};

// ============================================================================
// Configuration
// ============================================================================

pub const DEFAULT_COLUMNS: usize = 10;
pub const DEFAULT_ROWS: usize = 27;

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Cell {
    #[default]
    Empty,
    Occupied(Color),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// Notifications queued for the presentation layer, in the order they
/// happened. Drained with [`Board::take_events`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    /// The active piece was (re)drawn. `erase` is empty for a fresh spawn.
    PieceChanged {
        erase: Vec<Position>,
        draw: Vec<Position>,
        color: Color,
    },
    PieceLocked {
        cells: Vec<Position>,
        color: Color,
    },
    RowCleared {
        row: usize,
    },
    /// Every row above `above` moved down by `delta` rows.
    RowsShifted {
        above: usize,
        delta: usize,
    },
    ScoreChanged {
        score: u32,
        level: u32,
    },
    LevelUp(u32),
    Paused,
    Resumed,
    GameRestarted,
    GameOver,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TickOutcome {
    /// Nothing happened: the game is paused or already over.
    Idle,
    Fell,
    Locked { rows_cleared: u32 },
    GameOver,
}

// ============================================================================
// Grid
// ============================================================================

/// Fixed-size field of locked cells. Row 0 is the top.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    columns: usize,
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows: vec![vec![Cell::Empty; columns]; rows],
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, position: Position) -> Option<Cell> {
        if position.x < 0 || position.y < 0 {
            return None;
        }
        self.rows
            .get(position.y as usize)
            .and_then(|row| row.get(position.x as usize))
            .copied()
    }

    pub fn get_mut(&mut self, position: Position) -> Option<&mut Cell> {
        if position.x < 0 || position.y < 0 {
            return None;
        }
        self.rows
            .get_mut(position.y as usize)
            .and_then(|row| row.get_mut(position.x as usize))
    }

    pub fn is_row_full(&self, y: usize) -> bool {
        self.rows[y].iter().all(|cell| !cell.is_empty())
    }

    pub fn is_row_empty(&self, y: usize) -> bool {
        self.rows[y].iter().all(Cell::is_empty)
    }

    pub fn filled_count_in_row(&self, y: usize) -> usize {
        self.rows[y].iter().filter(|cell| !cell.is_empty()).count()
    }

    pub fn total_filled_cells(&self) -> usize {
        self.rows
            .iter()
            .flatten()
            .filter(|cell| !cell.is_empty())
            .count()
    }

    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.fill(Cell::Empty);
        }
    }

    /// Empties row `y` and moves every row above it down by one, leaving
    /// row 0 empty.
    fn collapse_row(&mut self, y: usize) {
        self.rows[y].fill(Cell::Empty);
        self.rows[..=y].rotate_right(1);
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(DEFAULT_COLUMNS, DEFAULT_ROWS)
    }
}

impl Index<usize> for Grid {
    type Output = [Cell];

    fn index(&self, y: usize) -> &[Cell] {
        &self.rows[y]
    }
}

impl IndexMut<usize> for Grid {
    fn index_mut(&mut self, y: usize) -> &mut [Cell] {
        &mut self.rows[y]
    }
}

impl Occupancy for Grid {
    /// Columns outside the field and rows below it are blocked. Rows above
    /// the field are open so a spawning piece may hang over the top.
    fn is_empty_at(&self, position: Position) -> bool {
        let (columns, rows) = (self.columns as i16, self.rows() as i16);
        if position.x < 0 || position.x >= columns || position.y >= rows {
            return false;
        }
        if position.y < 0 {
            return true;
        }
        self.rows[position.y as usize][position.x as usize].is_empty()
    }
}

// ============================================================================
// Piece Provider Trait
// ============================================================================

pub trait PieceProvider {
    fn next_piece(&mut self) -> (PieceKind, Color);
}

pub struct RandomPieceProvider;

impl PieceProvider for RandomPieceProvider {
    fn next_piece(&mut self) -> (PieceKind, Color) {
        (PieceKind::random(), Color::random())
    }
}

/// Cycles through a fixed list of kinds; colors walk the palette.
pub struct SequencePieceProvider {
    pieces: Vec<PieceKind>,
    index: usize,
}

impl SequencePieceProvider {
    pub fn new(pieces: Vec<PieceKind>) -> Self {
        assert!(!pieces.is_empty(), "piece sequence must not be empty");
        Self { pieces, index: 0 }
    }
}

impl PieceProvider for SequencePieceProvider {
    fn next_piece(&mut self) -> (PieceKind, Color) {
        let kind = self.pieces[self.index % self.pieces.len()];
        let color = Color::PALETTE[self.index % Color::PALETTE.len()];
        self.index += 1;
        (kind, color)
    }
}

// ============================================================================
// Board
// ============================================================================

pub struct Board {
    pub grid: Grid,
    pub current_piece: Piece,
    removed_row_count: u32,
    piece_provider: Box<dyn PieceProvider>,
    events: Vec<GameEvent>,
}

impl Board {
    /// Pieces spawn around column 4, so a field narrower than 7 columns or
    /// shorter than 4 rows clips them. Clipped cells are lost on lock.
    pub fn new(columns: usize, rows: usize) -> Self {
        Self::with_provider(columns, rows, Box::new(RandomPieceProvider))
    }

    pub fn with_provider(
        columns: usize,
        rows: usize,
        mut provider: Box<dyn PieceProvider>,
    ) -> Self {
        let (kind, color) = provider.next_piece();
        let mut board = Self {
            grid: Grid::new(columns, rows),
            current_piece: Piece::new(kind, color),
            removed_row_count: 0,
            piece_provider: provider,
            events: Vec::new(),
        };
        board.announce_spawn();
        board
    }

    /// Board with a prepared field and active piece; later pieces are random.
    pub fn with_grid(grid: Grid, current_piece: Piece) -> Self {
        Self {
            grid,
            current_piece,
            removed_row_count: 0,
            piece_provider: Box::new(RandomPieceProvider),
            events: Vec::new(),
        }
    }

    pub fn set_provider(&mut self, provider: Box<dyn PieceProvider>) {
        self.piece_provider = provider;
    }

    pub fn columns(&self) -> usize {
        self.grid.columns()
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn removed_row_count(&self) -> u32 {
        self.removed_row_count
    }

    pub fn is_empty_at(&self, position: Position) -> bool {
        self.grid.is_empty_at(position)
    }

    /// Clears the field, zeroes the row counter and spawns a fresh piece.
    pub fn reset(&mut self) {
        self.grid.clear();
        self.removed_row_count = 0;
        self.spawn_piece();
    }

    /// Replaces the active piece with the provider's next one at the spawn
    /// anchor. Overlap with locked cells is left for the game-over check.
    pub fn spawn_piece(&mut self) {
        let (kind, color) = self.piece_provider.next_piece();
        self.current_piece = Piece::new(kind, color);
        self.announce_spawn();
    }

    fn announce_spawn(&mut self) {
        self.events.push(GameEvent::PieceChanged {
            erase: Vec::new(),
            draw: self.current_piece.cells().to_vec(),
            color: self.current_piece.color,
        });
    }

    /// True once any cell of the top row is occupied.
    pub fn is_game_over(&self) -> bool {
        self.grid
            .rows
            .first()
            .is_some_and(|row| row.iter().any(|cell| !cell.is_empty()))
    }

    /// Advances the fall by one step.
    ///
    /// `on_row_cleared` receives the running removed-row count once per
    /// cleared row.
    pub fn tick(&mut self, on_row_cleared: impl FnMut(u32)) -> TickOutcome {
        if self.is_game_over() {
            return TickOutcome::GameOver;
        }
        if self.drop_one() {
            return TickOutcome::Fell;
        }

        self.lock_piece();
        let rows_cleared = self.remove_filled_rows(on_row_cleared);
        self.spawn_piece();
        TickOutcome::Locked { rows_cleared }
    }

    fn lock_piece(&mut self) {
        let color = self.current_piece.color;
        let cells = self.current_piece.cells();
        for cell in cells {
            // Cells above the field, or past the edge of a field smaller
            // than the spawn footprint, are dropped.
            if let Some(slot) = self.grid.get_mut(cell) {
                *slot = Cell::Occupied(color);
            }
        }
        self.events.push(GameEvent::PieceLocked {
            cells: cells.to_vec(),
            color,
        });
    }

    /// Clears every full row below the top one, scanning downwards and
    /// collapsing the stack immediately so adjacent full rows are all
    /// caught in one pass. Returns the number of rows removed.
    pub fn remove_filled_rows(&mut self, mut on_row_cleared: impl FnMut(u32)) -> u32 {
        let mut cleared = 0;
        for y in 1..self.grid.rows() {
            if !self.grid.is_row_full(y) {
                continue;
            }
            self.grid.collapse_row(y);
            self.events.push(GameEvent::RowCleared { row: y });
            self.events.push(GameEvent::RowsShifted { above: y, delta: 1 });

            self.removed_row_count += 1;
            cleared += 1;
            on_row_cleared(self.removed_row_count);
        }
        cleared
    }

    fn try_move_current(&mut self, delta: (i16, i16), delta_rotation: i32) -> bool {
        let before = self.current_piece.cells();
        let moved = self
            .current_piece
            .try_move(&self.grid, delta, delta_rotation);
        self.events.push(GameEvent::PieceChanged {
            erase: before.to_vec(),
            draw: self.current_piece.cells().to_vec(),
            color: self.current_piece.color,
        });
        moved
    }

    pub fn drop_one(&mut self) -> bool {
        self.try_move_current((0, 1), 0)
    }

    pub fn move_left(&mut self) -> bool {
        self.try_move_current((-1, 0), 0)
    }

    pub fn move_right(&mut self) -> bool {
        self.try_move_current((1, 0), 0)
    }

    /// One row down; never locks; locking is left to the tick.
    pub fn soft_drop(&mut self) -> bool {
        self.drop_one()
    }

    pub fn rotate_clockwise(&mut self) -> bool {
        self.try_move_current((0, 0), 1)
    }

    pub fn rotate_counter_clockwise(&mut self) -> bool {
        self.try_move_current((0, 0), -1)
    }

    /// Returns the field with the active piece overlaid.
    pub fn render_grid(&self) -> Grid {
        let mut visual = self.grid.clone();
        let color = self.current_piece.color;
        for cell in self.current_piece.cells() {
            if let Some(slot) = visual.get_mut(cell) {
                *slot = Cell::Occupied(color);
            }
        }
        visual
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
