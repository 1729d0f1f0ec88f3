//! Key mapping from terminal events to game commands.
//!
//! Bindings follow the classic layout: arrows move and rotate, space drops.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::game::Command;

pub fn command_for_key(key: KeyEvent) -> Option<Command> {
    match key.code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Command::MoveLeft),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Command::MoveRight),
        KeyCode::Char(' ') | KeyCode::Char('s') | KeyCode::Char('S') => Some(Command::SoftDrop),
        KeyCode::Down | KeyCode::Char('e') | KeyCode::Char('E') => Some(Command::RotateClockwise),
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => {
            Some(Command::RotateCounterClockwise)
        }
        KeyCode::Char('p') | KeyCode::Char('P') => Some(Command::TogglePause),
        KeyCode::Char('n') | KeyCode::Char('N') => Some(Command::NewGame),
        _ => None,
    }
}

pub fn should_quit(key: KeyEvent) -> bool {
    let ctrl_c = key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
    ctrl_c || matches!(key.code, KeyCode::Esc | KeyCode::Char('q' | 'Q'))
}
