//! Board collision, locking, line clearing and game-over detection.

use falling_blocks::board::{
    Board, Cell, GameEvent, Grid, SequencePieceProvider, TickOutcome, DEFAULT_COLUMNS, DEFAULT_ROWS,
};
use falling_blocks::piece::{Color, Occupancy, Piece, PieceKind, Position};
use falling_blocks::test_helpers::*;

const BOTTOM: usize = DEFAULT_ROWS - 1;

fn square_at(x: i16, y: i16) -> Piece {
    Piece::new_at(PieceKind::Square, Color::Gold, x, y)
}

// ============================================================================
// Boundaries
// ============================================================================

mod boundaries {
    use super::*;

    #[test]
    fn columns_outside_field_are_blocked() {
        let grid = empty_grid();
        for y in [-3, 0, 10, BOTTOM as i16] {
            assert!(!grid.is_empty_at(Position::new(-1, y)));
            assert!(!grid.is_empty_at(Position::new(DEFAULT_COLUMNS as i16, y)));
        }
    }

    #[test]
    fn rows_below_field_are_blocked() {
        let grid = empty_grid();
        for x in 0..DEFAULT_COLUMNS as i16 {
            assert!(!grid.is_empty_at(Position::new(x, DEFAULT_ROWS as i16)));
        }
    }

    #[test]
    fn rows_above_field_are_open() {
        let grid = empty_grid();
        for x in 0..DEFAULT_COLUMNS as i16 {
            assert!(grid.is_empty_at(Position::new(x, -1)));
            assert!(grid.is_empty_at(Position::new(x, -4)));
        }
    }

    #[test]
    fn occupied_cell_is_blocked() {
        let mut grid = empty_grid();
        mark(&mut grid, 3, 7, Color::Blue);

        assert!(!grid.is_empty_at(Position::new(3, 7)));
        assert!(grid.is_empty_at(Position::new(4, 7)));
    }

    #[test]
    fn cell_lookup_is_none_off_the_field() {
        let mut grid = empty_grid();
        mark(&mut grid, 3, 7, Color::Blue);

        assert_eq!(
            grid.get(Position::new(3, 7)),
            Some(Cell::Occupied(Color::Blue))
        );
        assert_eq!(grid.get(Position::new(0, 0)), Some(Cell::Empty));
        assert_eq!(grid.get(Position::new(3, -1)), None);
        assert_eq!(grid.get(Position::new(DEFAULT_COLUMNS as i16, 7)), None);
        assert!(grid.get_mut(Position::new(3, DEFAULT_ROWS as i16)).is_none());
    }

    #[test]
    fn board_delegates_to_grid() {
        let mut grid = empty_grid();
        mark(&mut grid, 0, 0, Color::Blue);
        let board = Board::with_grid(grid, square_at(4, 10));

        assert!(!board.is_empty_at(Position::new(0, 0)));
        assert!(board.is_empty_at(Position::new(1, 0)));
    }
}

// ============================================================================
// Movement API
// ============================================================================

mod movement {
    use super::*;

    #[test]
    fn moves_shift_the_active_piece() {
        let mut board = Board::with_grid(empty_grid(), square_at(4, 5));

        assert!(board.move_left());
        assert_eq!(board.current_piece.position, Position::new(3, 5));
        assert!(board.move_right());
        assert!(board.move_right());
        assert_eq!(board.current_piece.position, Position::new(5, 5));
        assert!(board.soft_drop());
        assert_eq!(board.current_piece.position, Position::new(5, 6));
    }

    #[test]
    fn rotations_step_the_rotation_index() {
        let piece = Piece::new_at(PieceKind::S, Color::Blue, 4, 5);
        let mut board = Board::with_grid(empty_grid(), piece);

        assert!(board.rotate_clockwise());
        assert_eq!(board.current_piece.rotation, 1);
        assert!(board.rotate_counter_clockwise());
        assert!(board.rotate_counter_clockwise());
        assert_eq!(board.current_piece.rotation, 3);
    }

    #[test]
    fn soft_drop_at_floor_does_not_lock() {
        let mut board = Board::with_grid(empty_grid(), square_at(4, BOTTOM as i16 - 1));

        assert!(!board.soft_drop());
        assert_eq!(board.grid.total_filled_cells(), 0);
    }

    #[test]
    fn every_attempt_reports_piece_snapshot() {
        let mut board = Board::with_grid(empty_grid(), square_at(0, 5));
        board.take_events();

        assert!(!board.move_left());
        assert!(board.move_right());

        let events = board.take_events();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            GameEvent::PieceChanged {
                erase: square_at(0, 5).cells().to_vec(),
                draw: square_at(0, 5).cells().to_vec(),
                color: Color::Gold,
            }
        );
        assert_eq!(
            events[1],
            GameEvent::PieceChanged {
                erase: square_at(0, 5).cells().to_vec(),
                draw: square_at(1, 5).cells().to_vec(),
                color: Color::Gold,
            }
        );
    }
}

// ============================================================================
// Line Clearing
// ============================================================================

mod line_clearing {
    use super::*;

    #[test]
    fn single_full_row_is_cleared_once() {
        let mut grid = empty_grid();
        fill_row(&mut grid, BOTTOM);
        let mut board = Board::with_grid(grid, square_at(4, 1));

        let mut calls = Vec::new();
        let cleared = board.remove_filled_rows(|count| calls.push(count));

        assert_eq!(cleared, 1);
        assert_eq!(calls, vec![1]);
        assert_eq!(board.removed_row_count(), 1);
        assert_eq!(board.grid.filled_count_in_row(BOTTOM), 0);
    }

    #[test]
    fn rows_above_fall_by_one() {
        let mut grid = empty_grid();
        fill_row(&mut grid, BOTTOM);
        mark(&mut grid, 0, BOTTOM - 1, Color::Purple);
        mark(&mut grid, 7, BOTTOM - 3, Color::Gold);
        let mut board = Board::with_grid(grid, square_at(4, 1));

        board.remove_filled_rows(|_| {});

        assert_eq!(board.grid[BOTTOM][0], Cell::Occupied(Color::Purple));
        assert_eq!(board.grid[BOTTOM - 2][7], Cell::Occupied(Color::Gold));
        assert_eq!(board.grid.total_filled_cells(), 2);
    }

    #[test]
    fn adjacent_full_rows_cascade_in_one_pass() {
        let mut grid = empty_grid();
        fill_row(&mut grid, BOTTOM);
        fill_row(&mut grid, BOTTOM - 1);
        mark(&mut grid, 2, BOTTOM - 2, Color::DarkRed);
        mark(&mut grid, 5, BOTTOM - 3, Color::DarkGreen);
        let mut board = Board::with_grid(grid, square_at(4, 1));

        let mut calls = Vec::new();
        let cleared = board.remove_filled_rows(|count| calls.push(count));

        assert_eq!(cleared, 2);
        assert_eq!(calls, vec![1, 2]);
        assert_eq!(board.grid[BOTTOM][2], Cell::Occupied(Color::DarkRed));
        assert_eq!(board.grid[BOTTOM - 1][5], Cell::Occupied(Color::DarkGreen));
        assert_eq!(board.grid.total_filled_cells(), 2);
    }

    #[test]
    fn separated_full_rows_are_both_cleared() {
        let mut grid = empty_grid();
        fill_row(&mut grid, BOTTOM);
        fill_row_with_gap(&mut grid, BOTTOM - 1, 4);
        fill_row(&mut grid, BOTTOM - 2);
        let mut board = Board::with_grid(grid, square_at(4, 1));

        let cleared = board.remove_filled_rows(|_| {});

        assert_eq!(cleared, 2);
        assert_eq!(board.grid.filled_count_in_row(BOTTOM), DEFAULT_COLUMNS - 1);
        assert_eq!(board.grid[BOTTOM][4], Cell::Empty);
        assert!(board.grid.is_row_empty(BOTTOM - 1));
    }

    #[test]
    fn row_with_gap_is_kept() {
        let mut grid = empty_grid();
        fill_row_with_gap(&mut grid, BOTTOM, 9);
        let mut board = Board::with_grid(grid, square_at(4, 1));

        assert_eq!(board.remove_filled_rows(|_| panic!("nothing to clear")), 0);
        assert_eq!(board.grid.filled_count_in_row(BOTTOM), DEFAULT_COLUMNS - 1);
    }

    #[test]
    fn top_row_is_never_cleared() {
        let mut grid = empty_grid();
        fill_row(&mut grid, 0);
        let mut board = Board::with_grid(grid, square_at(4, 10));

        assert_eq!(board.remove_filled_rows(|_| {}), 0);
        assert!(board.grid.is_row_full(0));
    }

    #[test]
    fn clear_leaves_top_row_empty() {
        let mut grid = empty_grid();
        mark(&mut grid, 3, 0, Color::Blue);
        fill_row(&mut grid, 1);
        let mut board = Board::with_grid(grid, square_at(4, 10));

        board.remove_filled_rows(|_| {});

        assert!(board.grid.is_row_empty(0));
        assert_eq!(board.grid[1][3], Cell::Occupied(Color::Blue));
    }

    #[test]
    fn clear_reports_row_and_shift() {
        let mut grid = empty_grid();
        fill_row(&mut grid, BOTTOM);
        let mut board = Board::with_grid(grid, square_at(4, 1));
        board.take_events();

        board.remove_filled_rows(|_| {});

        assert_eq!(
            board.take_events(),
            vec![
                GameEvent::RowCleared { row: BOTTOM },
                GameEvent::RowsShifted {
                    above: BOTTOM,
                    delta: 1
                },
            ]
        );
    }
}

// ============================================================================
// Tick State Machine
// ============================================================================

mod tick {
    use super::*;

    #[test]
    fn tick_drops_piece_by_one() {
        let mut board = Board::with_grid(empty_grid(), square_at(4, 1));

        assert_eq!(board.tick(|_| {}), TickOutcome::Fell);
        assert_eq!(board.current_piece.position, Position::new(4, 2));
    }

    #[test]
    fn tick_locks_landed_piece_and_spawns_next() {
        let mut board = Board::with_grid(empty_grid(), square_at(0, BOTTOM as i16 - 1));
        board.set_provider(Box::new(SequencePieceProvider::new(vec![PieceKind::Long])));

        assert_eq!(board.tick(|_| {}), TickOutcome::Locked { rows_cleared: 0 });

        assert_eq!(board.grid[BOTTOM][0], Cell::Occupied(Color::Gold));
        assert_eq!(board.grid[BOTTOM][1], Cell::Occupied(Color::Gold));
        assert_eq!(board.grid[BOTTOM - 1][0], Cell::Occupied(Color::Gold));
        assert_eq!(board.grid[BOTTOM - 1][1], Cell::Occupied(Color::Gold));
        assert_eq!(board.current_piece.kind, PieceKind::Long);
        assert_eq!(board.current_piece.position, Position::new(4, 1));
    }

    #[test]
    fn lock_completing_rows_clears_them() {
        let mut grid = empty_grid();
        fill_row_with_gap(&mut grid, BOTTOM, 4);
        grid[BOTTOM][5] = Cell::Empty;
        fill_row_with_gap(&mut grid, BOTTOM - 1, 4);
        grid[BOTTOM - 1][5] = Cell::Empty;
        let mut board = Board::with_grid(grid, square_at(4, BOTTOM as i16 - 1));

        let mut calls = 0;
        let outcome = board.tick(|_| calls += 1);

        assert_eq!(outcome, TickOutcome::Locked { rows_cleared: 2 });
        assert_eq!(calls, 2);
        assert_eq!(board.grid.total_filled_cells(), 0);
    }

    #[test]
    fn cells_above_field_are_discarded_on_lock() {
        let mut grid = empty_grid();
        fill_row_with_gap(&mut grid, 2, 4);
        fill_row_with_gap(&mut grid, 3, 0);
        // Vertical long piece with two blocks still above the field.
        let mut piece = Piece::new_at(PieceKind::Long, Color::Blue, 4, 0);
        piece.rotation = 1;
        piece.position.y = -1;
        let mut board = Board::with_grid(grid, piece);

        // Cells (4,-2) (4,-1) (4,0) (4,1); (4,2) is the gap so it can fall once.
        assert_eq!(board.tick(|_| {}), TickOutcome::Fell);
        // Locks with (4,-1) still hidden; the gap fills and row 2 clears.
        assert_eq!(board.tick(|_| {}), TickOutcome::Locked { rows_cleared: 1 });
        assert_eq!(board.grid[1][4], Cell::Occupied(Color::Blue));
        assert_eq!(board.grid[2][4], Cell::Occupied(Color::Blue));
        assert!(!board.is_game_over());
    }

    #[test]
    fn partially_hidden_piece_locks_without_panicking() {
        let mut grid = empty_grid();
        fill_row(&mut grid, 1);
        let mut piece = Piece::new_at(PieceKind::Long, Color::Blue, 2, -2);
        piece.rotation = 1;
        let mut board = Board::with_grid(grid, piece);
        let filled_before = board.grid.total_filled_cells();

        // Cells (2,-3) (2,-2) (2,-1) (2,0); row 1 blocks the fall.
        assert_eq!(board.tick(|_| {}), TickOutcome::Locked { rows_cleared: 1 });
        assert_eq!(board.grid[1][2], Cell::Occupied(Color::Blue));
        assert_eq!(
            board.grid.total_filled_cells(),
            filled_before - DEFAULT_COLUMNS + 1
        );
    }

    #[test]
    fn lock_into_top_row_is_detected_next_tick() {
        let mut grid = empty_grid();
        for y in 2..DEFAULT_ROWS {
            fill_row_with_gap(&mut grid, y, 0);
        }
        let mut board = Board::with_grid(grid, square_at(4, 0));

        assert!(!board.is_game_over());
        assert_eq!(board.tick(|_| {}), TickOutcome::Locked { rows_cleared: 0 });
        assert!(board.is_game_over());
        assert_eq!(board.tick(|_| {}), TickOutcome::GameOver);
    }

    #[test]
    fn game_over_tick_leaves_piece_in_place() {
        let mut grid = empty_grid();
        mark(&mut grid, 9, 0, Color::Blue);
        let mut board = Board::with_grid(grid, square_at(4, 5));

        assert_eq!(board.tick(|_| {}), TickOutcome::GameOver);
        assert_eq!(board.current_piece.position, Position::new(4, 5));
    }

    #[test]
    fn narrow_field_clips_piece_on_lock() {
        let provider = SequencePieceProvider::new(vec![PieceKind::Square]);
        let mut board = Board::with_provider(5, 20, Box::new(provider));

        // Column 5 is past the edge, so the square cannot fall.
        assert_eq!(board.tick(|_| {}), TickOutcome::Locked { rows_cleared: 0 });
        assert_eq!(board.grid[1][4], Cell::Occupied(Color::DarkGreen));
        assert_eq!(board.grid[2][4], Cell::Occupied(Color::DarkGreen));
        assert_eq!(board.grid.total_filled_cells(), 2);
        assert_eq!(board.tick(|_| {}), TickOutcome::Locked { rows_cleared: 0 });
    }

    #[test]
    fn short_field_clips_piece_on_lock() {
        let provider = SequencePieceProvider::new(vec![PieceKind::Square]);
        let mut board = Board::with_provider(10, 2, Box::new(provider));

        assert_eq!(board.tick(|_| {}), TickOutcome::Locked { rows_cleared: 0 });
        assert!(!board.grid[1][4].is_empty());
        assert!(!board.grid[1][5].is_empty());
        assert_eq!(board.grid.total_filled_cells(), 2);
        assert!(!board.is_game_over());
    }

    #[test]
    fn field_without_rows_never_ends() {
        let provider = SequencePieceProvider::new(vec![PieceKind::Long]);
        let mut board = Board::with_provider(10, 0, Box::new(provider));

        assert!(!board.is_game_over());
        assert_eq!(board.tick(|_| {}), TickOutcome::Locked { rows_cleared: 0 });
        assert_eq!(board.grid.total_filled_cells(), 0);
        assert!(board.render_grid().iter_rows().next().is_none());
    }

    #[test]
    fn spawn_does_not_check_collision() {
        let mut grid = empty_grid();
        mark(&mut grid, 4, 1, Color::Blue);
        let mut board = Board::with_grid(grid, square_at(0, 10));
        let provider = SequencePieceProvider::new(vec![PieceKind::Square]);
        board.set_provider(Box::new(provider));

        board.spawn_piece();

        assert_eq!(board.current_piece.position, Position::new(4, 1));
        assert!(!board.is_game_over());
    }
}

// ============================================================================
// Reset & Rendering
// ============================================================================

mod reset_and_render {
    use super::*;

    #[test]
    fn reset_clears_field_and_counter() {
        let mut grid = empty_grid();
        fill_row(&mut grid, BOTTOM);
        mark(&mut grid, 1, 0, Color::Blue);
        let mut board = Board::with_grid(grid, square_at(4, 1));
        board.remove_filled_rows(|_| {});
        assert_eq!(board.removed_row_count(), 1);

        board.reset();

        assert_eq!(board.grid.total_filled_cells(), 0);
        assert_eq!(board.removed_row_count(), 0);
        assert_eq!(board.current_piece.position, Position::new(4, 1));
    }

    #[test]
    fn dimensions_are_fixed_at_construction() {
        let mut board = Board::new(8, 12);
        assert_eq!((board.columns(), board.rows()), (8, 12));

        board.reset();
        assert_eq!((board.columns(), board.rows()), (8, 12));
    }

    #[test]
    fn render_overlays_active_piece() {
        let mut grid = empty_grid();
        mark(&mut grid, 0, BOTTOM, Color::Purple);
        let board = Board::with_grid(grid, square_at(4, 5));

        let visual = board.render_grid();

        assert_eq!(visual[5][4], Cell::Occupied(Color::Gold));
        assert_eq!(visual[6][5], Cell::Occupied(Color::Gold));
        assert_eq!(visual[BOTTOM][0], Cell::Occupied(Color::Purple));
        assert_eq!(board.grid[5][4], Cell::Empty);
    }

    #[test]
    fn render_skips_cells_above_field() {
        let mut piece = Piece::new_at(PieceKind::Long, Color::Blue, 3, -1);
        piece.rotation = 1;
        let board = Board::with_grid(Grid::new(10, 27), piece);

        let visual = board.render_grid();

        assert_eq!(visual.total_filled_cells(), 2);
    }
}
