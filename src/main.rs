use std::{
    env,
    io::stdout,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

use falling_blocks::board::{Cell, GameEvent};
use falling_blocks::config::{GameConfig, USAGE};
use falling_blocks::game::{Game, GameState};
use falling_blocks::input::{command_for_key, should_quit};
use falling_blocks::piece;
use falling_blocks::ranking::RankingList;

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: u16 = 2;
const BLOCK_CHAR: &str = "██";
const EMPTY_CHAR: &str = "  ";

// ============================================================================
// Color Mapping
// ============================================================================

fn block_color(color: piece::Color) -> Color {
    match color {
        piece::Color::DarkGreen => Color::Green,
        piece::Color::DarkBlue => Color::Blue,
        piece::Color::Blue => Color::LightBlue,
        piece::Color::DarkRed => Color::Red,
        piece::Color::Gold => Color::Yellow,
        piece::Color::Purple => Color::Magenta,
        piece::Color::OrangeRed => Color::Rgb(255, 69, 0),
        piece::Color::LightSkyBlue => Color::Cyan,
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Text shown under the board; level-ups and ranking failures land here.
#[derive(Default)]
struct StatusLine {
    message: Option<String>,
}

impl StatusLine {
    fn absorb(&mut self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::LevelUp(level) => self.message = Some(format!("Level {level}!")),
                GameEvent::GameRestarted => self.message = None,
                _ => {}
            }
        }
    }
}

fn render(frame: &mut Frame, game: &Game, status: &StatusLine) {
    let area = frame.size();
    render_game(frame, game, status, area);

    match game.state {
        GameState::Playing => {}
        GameState::Paused => render_paused(frame, area),
        GameState::GameOver => render_game_over(frame, game, area),
    }
}

fn render_game(frame: &mut Frame, game: &Game, status: &StatusLine, area: Rect) {
    let grid_display_width = (game.board.columns() as u16 * CELL_WIDTH) + 2;
    let grid_display_height = game.board.rows() as u16 + 2;
    let info_width = 16;
    let ranking_width = 24;
    let total_width = grid_display_width + info_width + ranking_width;
    let total_height = grid_display_height + 2;

    let main_area = centered_rect(total_width, total_height, area);

    let vertical = Layout::vertical([
        Constraint::Length(grid_display_height),
        Constraint::Fill(1),
    ])
    .split(main_area);

    let game_row = vertical[0];

    // Layout: [Grid][Info][Ranking]
    let horizontal = Layout::horizontal([
        Constraint::Length(grid_display_width),
        Constraint::Length(info_width),
        Constraint::Length(ranking_width),
    ])
    .split(game_row);

    render_grid(frame, game, horizontal[0]);
    render_info(frame, game, horizontal[1]);
    render_ranking(frame, game, horizontal[2]);

    let status_area = vertical[1];
    if status_area.height > 0 {
        let text = status.message.clone().unwrap_or_else(|| {
            "←→: Move | ↑↓: Rotate | Space: Drop | P: Pause | N: New | Q: Quit".to_string()
        });
        let paragraph = Paragraph::new(vec![Line::from(text)])
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, status_area);
    }
}

fn render_grid(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Falling Blocks ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Locked cells turn grey once the game is over.
    let frozen = game.is_game_over();
    let visual_grid = if frozen {
        game.board.grid.clone()
    } else {
        game.render_grid()
    };

    let lines: Vec<Line> = visual_grid
        .iter_rows()
        .map(|row| {
            let spans: Vec<Span> = row
                .iter()
                .map(|cell| match cell {
                    Cell::Empty => Span::raw(EMPTY_CHAR),
                    Cell::Occupied(_) if frozen => {
                        Span::styled(BLOCK_CHAR, Style::default().fg(Color::Gray))
                    }
                    Cell::Occupied(color) => {
                        Span::styled(BLOCK_CHAR, Style::default().fg(block_color(*color)))
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_info(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Score", Style::default().fg(Color::Yellow))),
        Line::from(format!("{}", game.score)),
        Line::from(""),
        Line::from(Span::styled("Level", Style::default().fg(Color::Green))),
        Line::from(format!("{}", game.level)),
        Line::from(""),
        Line::from(Span::styled("Rows", Style::default().fg(Color::Cyan))),
        Line::from(format!("{}", game.removed_row_count())),
        Line::from(""),
        Line::from(Span::styled("Best", Style::default().fg(Color::Magenta))),
        Line::from(format!("{}", game.high_score)),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn render_ranking(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Ranking ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![Line::from("")];
    if game.ranking().is_empty() {
        lines.push(Line::from(Span::styled(
            "no scores yet",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for (rank, entry) in game.ranking().iter().enumerate() {
        lines.push(Line::from(format!(
            "{:>2}. {:<10.10} {:>6}",
            rank + 1,
            entry.player,
            entry.score
        )));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_game_over(frame: &mut Frame, game: &Game, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("GAME OVER", Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(format!("Score: {}", game.score)),
        Line::from(format!("Level: {}", game.level)),
        Line::from(""),
        Line::from(Span::styled(
            "N: new game | Q: quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Game Over ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    let popup_area = centered_rect(26, 10, area);
    frame.render_widget(paragraph, popup_area);
}

fn render_paused(frame: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("PAUSED", Style::default().fg(Color::Yellow))),
        Line::from(""),
        Line::from(Span::styled(
            "Press P to continue",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Paused ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    let popup_area = centered_rect(24, 7, area);
    frame.render_widget(paragraph, popup_area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

// ============================================================================
// Main Loop
// ============================================================================

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let config = match GameConfig::from_args(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    };

    let path = &config.ranking_path;
    let ranking = RankingList::open(path)
        .with_context(|| format!("loading ranking from {}", path.display()))?;
    let mut game = Game::new(
        config.columns,
        config.rows,
        config.player.clone(),
        Box::new(ranking),
    );

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;

    let result = run(&mut game);

    // Always try to restore terminal state.
    let _ = disable_raw_mode();
    let _ = stdout().execute(LeaveAlternateScreen);
    result
}

fn run(game: &mut Game) -> Result<()> {
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let mut status = StatusLine::default();
    let mut last_tick = Instant::now();

    loop {
        status.absorb(&game.take_events());
        terminal.draw(|frame| render(frame, game, &status))?;

        let tick_duration = Duration::from_millis(game.drop_interval_ms());
        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if should_quit(key) {
                        break;
                    }
                    if let Some(command) = command_for_key(key) {
                        game.apply(command);
                    }
                }
            }
        }

        if last_tick.elapsed() >= tick_duration {
            if let Err(err) = game.tick() {
                status.message = Some(format!("{:#}", anyhow::Error::new(err)));
            }
            last_tick = Instant::now();
        }
    }

    Ok(())
}
