use crate::utils::error::{GtpError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// GTP 座標的欄字母，跳過 I
const COLUMN_LETTERS: &str = "ABCDEFGHJKLMNOPQRSTUVWXYZ";

pub const MIN_BOARD_SIZE: usize = 2;
pub const MAX_BOARD_SIZE: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// 單字母縮寫，用於 `play b a1` 與 SGF 屬性
    pub fn letter(self) -> char {
        match self {
            Color::Black => 'B',
            Color::White => 'W',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::Black => "black",
            Color::White => "white",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Color {
    type Err = GtpError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "b" | "black" => Ok(Color::Black),
            "w" | "white" => Ok(Color::White),
            _ => Err(GtpError::InvalidColor(s.to_string())),
        }
    }
}

/// A board intersection, 1-based: `col` runs left to right and `row`
/// bottom to top, so `A1` is `Vertex { col: 1, row: 1 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Vertex {
    pub col: usize,
    pub row: usize,
}

impl Vertex {
    pub fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    pub fn is_on_board(&self, size: usize) -> bool {
        (1..=size).contains(&self.col) && (1..=size).contains(&self.row)
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match COLUMN_LETTERS.chars().nth(self.col.wrapping_sub(1)) {
            Some(letter) => write!(f, "{}{}", letter, self.row),
            None => write!(f, "?{}", self.row),
        }
    }
}

impl FromStr for Vertex {
    type Err = GtpError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || GtpError::InvalidVertex(s.to_string());
        let mut chars = s.chars();
        let letter = chars.next().ok_or_else(invalid)?.to_ascii_uppercase();
        let col = COLUMN_LETTERS.find(letter).ok_or_else(invalid)? + 1;
        let row: usize = chars.as_str().parse().map_err(|_| invalid())?;
        if row == 0 || row > MAX_BOARD_SIZE {
            return Err(invalid());
        }
        Ok(Vertex { col, row })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Play(Vertex),
    Pass,
    Resign,
}

impl Move {
    pub fn is_pass(&self) -> bool {
        matches!(self, Move::Pass)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Play(vertex) => write!(f, "{}", vertex),
            Move::Pass => f.write_str("pass"),
            Move::Resign => f.write_str("resign"),
        }
    }
}

impl FromStr for Move {
    type Err = GtpError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pass" => Ok(Move::Pass),
            "resign" => Ok(Move::Resign),
            _ => s.parse().map(Move::Play),
        }
    }
}

/// One parsed GTP command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub id: Option<u32>,
    pub name: String,
    pub args: Vec<String>,
}

impl Command {
    pub fn args(&self) -> Vec<&str> {
        self.args.iter().map(String::as_str).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
}

/// One GTP response, either produced by the engine or read back by a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub id: Option<u32>,
    pub status: Status,
    pub text: String,
}

impl Response {
    pub fn success(id: Option<u32>, text: impl Into<String>) -> Self {
        Self {
            id,
            status: Status::Success,
            text: text.into(),
        }
    }

    pub fn failure(id: Option<u32>, text: impl Into<String>) -> Self {
        Self {
            id,
            status: Status::Failure,
            text: text.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_parsing_skips_i() {
        assert_eq!("A1".parse::<Vertex>().unwrap(), Vertex::new(1, 1));
        assert_eq!("j3".parse::<Vertex>().unwrap(), Vertex::new(9, 3));
        assert_eq!(Vertex::new(9, 3).to_string(), "J3");
        assert!("I5".parse::<Vertex>().is_err());
        assert!("A0".parse::<Vertex>().is_err());
        assert!("A".parse::<Vertex>().is_err());
        assert!("".parse::<Vertex>().is_err());
    }

    #[test]
    fn test_move_and_color_parsing() {
        assert_eq!("PASS".parse::<Move>().unwrap(), Move::Pass);
        assert_eq!("resign".parse::<Move>().unwrap(), Move::Resign);
        assert_eq!("c3".parse::<Move>().unwrap(), Move::Play(Vertex::new(3, 3)));
        assert_eq!("B".parse::<Color>().unwrap(), Color::Black);
        assert_eq!("white".parse::<Color>().unwrap(), Color::White);
        assert!("red".parse::<Color>().is_err());
    }
}
