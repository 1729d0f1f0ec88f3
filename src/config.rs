//! Startup configuration: board variant from the command line, ranking
//! location and player name from the environment.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::board::{DEFAULT_COLUMNS, DEFAULT_ROWS};
use crate::game::DEFAULT_PLAYER;

pub const RANKING_PATH_VAR: &str = "FALLING_BLOCKS_RANKING";
pub const DEFAULT_RANKING_PATH: &str = "ranking.txt";

pub const USAGE: &str = "usage: falling-blocks [classic|compact]";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown variant `{0}` (expected `classic` or `compact`)")]
    UnknownVariant(String),
    #[error("expected at most one argument, got {0}")]
    TooManyArguments(usize),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Variant {
    /// 10 x 27 field.
    #[default]
    Classic,
    /// 10 x 20 field for short terminals.
    Compact,
}

impl Variant {
    pub fn dimensions(&self) -> (usize, usize) {
        match self {
            Variant::Classic => (DEFAULT_COLUMNS, DEFAULT_ROWS),
            Variant::Compact => (DEFAULT_COLUMNS, 20),
        }
    }
}

impl FromStr for Variant {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "classic" => Ok(Variant::Classic),
            "compact" => Ok(Variant::Compact),
            _ => Err(ConfigError::UnknownVariant(s.to_string())),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Classic => f.write_str("classic"),
            Variant::Compact => f.write_str("compact"),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GameConfig {
    pub variant: Variant,
    pub columns: usize,
    pub rows: usize,
    pub ranking_path: PathBuf,
    pub player: String,
}

impl GameConfig {
    /// Builds the config from the arguments after the program name.
    pub fn from_args(args: &[String]) -> Result<Self, ConfigError> {
        let variant = match args {
            [] => Variant::default(),
            [variant] => variant.parse()?,
            _ => return Err(ConfigError::TooManyArguments(args.len())),
        };
        let (columns, rows) = variant.dimensions();

        Ok(Self {
            variant,
            columns,
            rows,
            ranking_path: ranking_path_from_env(),
            player: player_from_env(),
        })
    }
}

fn ranking_path_from_env() -> PathBuf {
    env::var_os(RANKING_PATH_VAR)
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_RANKING_PATH))
}

fn player_from_env() -> String {
    ["USER", "USERNAME"]
        .iter()
        .filter_map(|var| env::var(var).ok())
        .find(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PLAYER.to_string())
}
