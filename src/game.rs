use crate::board::{Board, GameEvent, Grid, PieceProvider, RandomPieceProvider, TickOutcome};
use crate::piece::Piece;
use crate::ranking::{MemoryRanking, RankingEntry, RankingError, RankingStore};

// ============================================================================
// Configuration
// ============================================================================

pub const BASE_DROP_INTERVAL_MS: u64 = 500;
pub const MAX_LEVEL: u32 = 21;
/// A level is passed once more than `level * ROWS_PER_LEVEL` rows are gone.
pub const ROWS_PER_LEVEL: u32 = 5;
/// Points per cleared row on top of the current level.
pub const ROW_SCORE_BASE: u32 = 9;

pub const DEFAULT_PLAYER: &str = "player";

/// Milliseconds between automatic drops at `level`.
pub fn drop_interval_for_level(level: u32) -> u64 {
    let reduction = (f64::from(level.max(1)).log10() * 300.0).floor() as u64;
    BASE_DROP_INTERVAL_MS.saturating_sub(reduction)
}

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameState {
    Playing,
    Paused,
    GameOver,
}

/// Player intents the presentation layer maps its input onto.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    MoveLeft,
    MoveRight,
    SoftDrop,
    RotateClockwise,
    RotateCounterClockwise,
    TogglePause,
    NewGame,
}

// ============================================================================
// Game
// ============================================================================

pub struct Game {
    pub board: Board,
    pub score: u32,
    pub level: u32,
    pub high_score: u32,
    pub state: GameState,
    drop_interval_ms: u64,
    player: String,
    ranking: Box<dyn RankingStore>,
}

impl Game {
    pub fn new(
        columns: usize,
        rows: usize,
        player: impl Into<String>,
        ranking: Box<dyn RankingStore>,
    ) -> Self {
        Self::with_provider(
            columns,
            rows,
            Box::new(RandomPieceProvider),
            player,
            ranking,
        )
    }

    pub fn with_provider(
        columns: usize,
        rows: usize,
        provider: Box<dyn PieceProvider>,
        player: impl Into<String>,
        ranking: Box<dyn RankingStore>,
    ) -> Self {
        Self::from_board(
            Board::with_provider(columns, rows, provider),
            player,
            ranking,
        )
    }

    /// Game over a prepared field, with an unpersisted ranking.
    pub fn with_grid(grid: Grid, current_piece: Piece) -> Self {
        Self::from_board(
            Board::with_grid(grid, current_piece),
            DEFAULT_PLAYER,
            Box::new(MemoryRanking::new()),
        )
    }

    fn from_board(board: Board, player: impl Into<String>, ranking: Box<dyn RankingStore>) -> Self {
        let high_score = ranking.best_score().unwrap_or(0);
        Self {
            board,
            score: 0,
            level: 1,
            high_score,
            state: GameState::Playing,
            drop_interval_ms: BASE_DROP_INTERVAL_MS,
            player: player.into(),
            ranking,
        }
    }

    pub fn current_piece(&self) -> &Piece {
        &self.board.current_piece
    }

    pub fn removed_row_count(&self) -> u32 {
        self.board.removed_row_count()
    }

    pub fn drop_interval_ms(&self) -> u64 {
        self.drop_interval_ms
    }

    pub fn player(&self) -> &str {
        &self.player
    }

    pub fn ranking(&self) -> &[RankingEntry] {
        self.ranking.records()
    }

    pub fn is_game_over(&self) -> bool {
        self.state == GameState::GameOver
    }

    pub fn is_paused(&self) -> bool {
        self.state == GameState::Paused
    }

    /// One timer step. Does nothing while paused or after the game ended.
    ///
    /// Fails only if the final score could not be written to the ranking.
    pub fn tick(&mut self) -> Result<TickOutcome, RankingError> {
        if self.state != GameState::Playing {
            return Ok(TickOutcome::Idle);
        }

        let mut cleared = Vec::new();
        let outcome = self.board.tick(|count| cleared.push(count));
        for removed_row_count in cleared {
            self.on_row_cleared(removed_row_count);
        }

        if outcome == TickOutcome::GameOver {
            self.on_game_over()?;
        }
        Ok(outcome)
    }

    /// Scores one cleared row and levels up when the running row count
    /// passes the current level's threshold.
    pub fn on_row_cleared(&mut self, removed_row_count: u32) {
        self.score += ROW_SCORE_BASE + self.level;

        if removed_row_count > self.level * ROWS_PER_LEVEL && self.level < MAX_LEVEL {
            self.level += 1;
            self.drop_interval_ms = drop_interval_for_level(self.level);
            self.board.push_event(GameEvent::LevelUp(self.level));
        }

        self.high_score = self.high_score.max(self.score);
        self.board.push_event(GameEvent::ScoreChanged {
            score: self.score,
            level: self.level,
        });
    }

    fn on_game_over(&mut self) -> Result<(), RankingError> {
        self.state = GameState::GameOver;
        self.board.push_event(GameEvent::GameOver);
        self.ranking
            .add_record(RankingEntry::new(self.score, self.player.as_str()))
    }

    fn accepts_input(&self) -> bool {
        self.state == GameState::Playing
    }

    pub fn move_left(&mut self) -> bool {
        self.accepts_input() && self.board.move_left()
    }

    pub fn move_right(&mut self) -> bool {
        self.accepts_input() && self.board.move_right()
    }

    pub fn soft_drop(&mut self) -> bool {
        self.accepts_input() && self.board.soft_drop()
    }

    pub fn rotate_clockwise(&mut self) -> bool {
        self.accepts_input() && self.board.rotate_clockwise()
    }

    pub fn rotate_counter_clockwise(&mut self) -> bool {
        self.accepts_input() && self.board.rotate_counter_clockwise()
    }

    pub fn pause(&mut self) {
        if self.state == GameState::Playing {
            self.state = GameState::Paused;
            self.board.push_event(GameEvent::Paused);
        }
    }

    pub fn resume(&mut self) {
        if self.state == GameState::Paused {
            self.state = GameState::Playing;
            self.board.push_event(GameEvent::Resumed);
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            GameState::Playing => self.pause(),
            GameState::Paused => self.resume(),
            GameState::GameOver => {}
        }
    }

    pub fn new_game(&mut self) {
        self.score = 0;
        self.level = 1;
        self.drop_interval_ms = BASE_DROP_INTERVAL_MS;
        self.state = GameState::Playing;

        self.board.push_event(GameEvent::GameRestarted);
        self.board.reset();
        self.board.push_event(GameEvent::ScoreChanged {
            score: 0,
            level: 1,
        });
    }

    /// Dispatches a player command. Returns whether anything changed.
    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::MoveLeft => self.move_left(),
            Command::MoveRight => self.move_right(),
            Command::SoftDrop => self.soft_drop(),
            Command::RotateClockwise => self.rotate_clockwise(),
            Command::RotateCounterClockwise => self.rotate_counter_clockwise(),
            Command::TogglePause => {
                let before = self.state;
                self.toggle_pause();
                before != self.state
            }
            Command::NewGame => {
                self.new_game();
                true
            }
        }
    }

    /// Returns the visual grid state with the current piece overlaid
    pub fn render_grid(&self) -> Grid {
        self.board.render_grid()
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        self.board.take_events()
    }
}
