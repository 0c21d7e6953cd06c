use crate::domain::model::{Color, Move, Vertex, MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use crate::utils::error::{GtpError, Result};

pub const DEFAULT_SIZE: usize = 7;

/// 一手棋的歷史紀錄
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayedMove {
    pub color: Color,
    pub mv: Move,
}

/// Stone positions and the move history of one game.
///
/// There are no captures and no ko: a stone stays where it was put
/// until `undo` or `clear`, and a point is playable exactly when it is
/// empty.
#[derive(Debug, Clone)]
pub struct Board {
    size: usize,
    points: Vec<Option<Color>>,
    history: Vec<PlayedMove>,
    side_to_move: Color,
}

impl Board {
    pub fn new(size: usize) -> Result<Self> {
        Self::check_size(size)?;
        Ok(Self {
            size,
            points: vec![None; size * size],
            history: Vec::new(),
            side_to_move: Color::Black,
        })
    }

    fn check_size(size: usize) -> Result<()> {
        if (MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
            Ok(())
        } else {
            Err(GtpError::InvalidBoardSize(size))
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn history(&self) -> &[PlayedMove] {
        &self.history
    }

    pub fn last_move(&self) -> Option<&PlayedMove> {
        self.history.last()
    }

    fn index(&self, vertex: Vertex) -> usize {
        (vertex.row - 1) * self.size + (vertex.col - 1)
    }

    pub fn get(&self, vertex: Vertex) -> Option<Color> {
        if vertex.is_on_board(self.size) {
            self.points[self.index(vertex)]
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.points.iter_mut().for_each(|p| *p = None);
        self.history.clear();
        self.side_to_move = Color::Black;
    }

    /// Changes the size and clears the board. An invalid size leaves
    /// the board untouched.
    pub fn resize(&mut self, size: usize) -> Result<()> {
        Self::check_size(size)?;
        self.size = size;
        self.points = vec![None; size * size];
        self.history.clear();
        self.side_to_move = Color::Black;
        Ok(())
    }

    pub fn is_legal(&self, color: Color, mv: Move) -> bool {
        self.check_move(color, mv).is_ok()
    }

    fn check_move(&self, color: Color, mv: Move) -> Result<()> {
        match mv {
            Move::Pass => Ok(()),
            Move::Resign => Err(GtpError::InvalidVertex("resign".to_string())),
            Move::Play(vertex) => {
                if !vertex.is_on_board(self.size) {
                    return Err(GtpError::InvalidVertex(vertex.to_string().to_lowercase()));
                }
                if self.points[self.index(vertex)].is_some() {
                    return Err(GtpError::IllegalMove {
                        color: color.letter().to_ascii_lowercase().to_string(),
                        vertex: vertex.to_string().to_lowercase(),
                        reason: "occupied".to_string(),
                    });
                }
                Ok(())
            }
        }
    }

    pub fn play(&mut self, color: Color, mv: Move) -> Result<()> {
        self.check_move(color, mv)?;
        if let Move::Play(vertex) = mv {
            let index = self.index(vertex);
            self.points[index] = Some(color);
        }
        self.history.push(PlayedMove { color, mv });
        self.side_to_move = color.opponent();
        Ok(())
    }

    pub fn undo(&mut self) -> Result<()> {
        let last = self.history.pop().ok_or(GtpError::CannotUndo)?;
        if let Move::Play(vertex) = last.mv {
            let index = self.index(vertex);
            self.points[index] = None;
        }
        self.side_to_move = last.color;
        Ok(())
    }

    /// Both players passed in the last two moves.
    pub fn end_of_game(&self) -> bool {
        let n = self.history.len();
        n >= 2 && self.history[n - 1].mv.is_pass() && self.history[n - 2].mv.is_pass()
    }

    pub fn vertices(&self) -> impl Iterator<Item = Vertex> + '_ {
        (1..=self.size).flat_map(move |row| (1..=self.size).map(move |col| Vertex::new(col, row)))
    }

    pub fn empty_points(&self) -> Vec<Vertex> {
        self.vertices().filter(|v| self.get(*v).is_none()).collect()
    }

    /// Legal points for `color`, ordered by column then row.
    pub fn legal_moves(&self, color: Color) -> Vec<Vertex> {
        let mut moves: Vec<Vertex> = self
            .empty_points()
            .into_iter()
            .filter(|v| self.is_legal(color, Move::Play(*v)))
            .collect();
        moves.sort();
        moves
    }

    pub fn count(&self, color: Color) -> usize {
        self.points.iter().filter(|p| **p == Some(color)).count()
    }

    fn offsets(&self, vertex: Vertex, deltas: &[(isize, isize)]) -> Vec<Option<Vertex>> {
        deltas
            .iter()
            .map(|(dc, dr)| {
                let col = vertex.col as isize + dc;
                let row = vertex.row as isize + dr;
                let v = Vertex::new(col.max(0) as usize, row.max(0) as usize);
                (col >= 1 && row >= 1 && v.is_on_board(self.size)).then_some(v)
            })
            .collect()
    }

    pub fn neighbors(&self, vertex: Vertex) -> Vec<Vertex> {
        self.offsets(vertex, &[(-1, 0), (1, 0), (0, -1), (0, 1)])
            .into_iter()
            .flatten()
            .collect()
    }

    /// An empty point whose neighbors all belong to `color`, and whose
    /// diagonals hold at most one opponent stone (none at the edge).
    pub fn is_eye(&self, vertex: Vertex, color: Color) -> bool {
        if self.get(vertex).is_some() {
            return false;
        }
        if !self.neighbors(vertex).iter().all(|nb| self.get(*nb) == Some(color)) {
            return false;
        }
        let diagonals = self.offsets(vertex, &[(-1, -1), (1, -1), (-1, 1), (1, 1)]);
        let at_edge = diagonals.iter().any(Option::is_none);
        let false_count = diagonals
            .iter()
            .flatten()
            .filter(|d| self.get(**d) == Some(color.opponent()))
            .count();
        false_count + usize::from(at_edge) <= 1
    }

    fn point_char(&self, vertex: Vertex) -> char {
        match self.get(vertex) {
            Some(Color::Black) => 'X',
            Some(Color::White) => 'O',
            None => '.',
        }
    }

    /// Rows of `X`, `O` and `.`, top row first.
    pub fn rules_board(&self) -> String {
        (1..=self.size)
            .rev()
            .map(|row| {
                (1..=self.size)
                    .map(|col| self.point_char(Vertex::new(col, row)))
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn render(&self) -> String {
        let letters: Vec<String> = (1..=self.size)
            .map(|col| {
                Vertex::new(col, 1)
                    .to_string()
                    .chars()
                    .next()
                    .unwrap_or('?')
                    .to_string()
            })
            .collect();
        let header = format!("   {}", letters.join(" "));
        let mut lines = vec![header.clone()];
        for row in (1..=self.size).rev() {
            let cells: Vec<String> = (1..=self.size)
                .map(|col| self.point_char(Vertex::new(col, row)).to_string())
                .collect();
            lines.push(format!("{:>2} {} {}", row, cells.join(" "), row));
        }
        lines.push(header);
        lines.join("\n")
    }
}

impl Default for Board {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            points: vec![None; DEFAULT_SIZE * DEFAULT_SIZE],
            history: Vec::new(),
            side_to_move: Color::Black,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Vertex {
        s.parse().unwrap()
    }

    #[test]
    fn test_size_bounds() {
        assert!(Board::new(1).is_err());
        assert!(Board::new(26).is_err());
        assert!(Board::new(2).is_ok());
        assert!(Board::new(25).is_ok());

        let mut board = Board::new(3).unwrap();
        assert!(board.resize(30).is_err());
        assert_eq!(board.size(), 3);
    }

    #[test]
    fn test_occupied_and_off_board_moves_are_illegal() {
        let mut board = Board::new(3).unwrap();
        board.play(Color::Black, Move::Play(v("B2"))).unwrap();

        let err = board.play(Color::White, Move::Play(v("B2"))).unwrap_err();
        assert_eq!(err.to_string(), "illegal move: \"w b2\" occupied");
        assert!(matches!(
            board.play(Color::White, Move::Play(v("D4"))),
            Err(GtpError::InvalidVertex(_))
        ));
        assert_eq!(board.history().len(), 1);
        assert_eq!(board.side_to_move(), Color::White);
    }

    #[test]
    fn test_no_captures() {
        let mut board = Board::new(3).unwrap();
        board.play(Color::White, Move::Play(v("A1"))).unwrap();
        board.play(Color::Black, Move::Play(v("A2"))).unwrap();
        board.play(Color::Black, Move::Play(v("B1"))).unwrap();
        assert_eq!(board.get(v("A1")), Some(Color::White));
        assert_eq!(board.count(Color::Black), 2);
    }

    #[test]
    fn test_undo_restores_point_and_side() {
        let mut board = Board::new(3).unwrap();
        assert!(matches!(board.undo(), Err(GtpError::CannotUndo)));

        board.play(Color::Black, Move::Play(v("C3"))).unwrap();
        board.play(Color::White, Move::Pass).unwrap();
        board.undo().unwrap();
        assert_eq!(board.side_to_move(), Color::White);
        board.undo().unwrap();
        assert_eq!(board.get(v("C3")), None);
        assert_eq!(board.side_to_move(), Color::Black);
        assert!(board.history().is_empty());
    }

    #[test]
    fn test_end_of_game_after_two_passes() {
        let mut board = Board::new(2).unwrap();
        board.play(Color::Black, Move::Pass).unwrap();
        assert!(!board.end_of_game());
        board.play(Color::White, Move::Pass).unwrap();
        assert!(board.end_of_game());
    }

    #[test]
    fn test_eye_detection() {
        let mut board = Board::new(3).unwrap();
        for s in ["A2", "B1"] {
            board.play(Color::Black, Move::Play(v(s))).unwrap();
        }
        assert!(board.is_eye(v("A1"), Color::Black));
        assert!(!board.is_eye(v("A1"), Color::White));

        // 對角有對方棋子，邊上即為假眼
        board.play(Color::White, Move::Play(v("B2"))).unwrap();
        assert!(!board.is_eye(v("A1"), Color::Black));
    }

    #[test]
    fn test_legal_moves_and_rendering() {
        let mut board = Board::new(2).unwrap();
        board.play(Color::Black, Move::Play(v("A2"))).unwrap();
        board.play(Color::White, Move::Play(v("B1"))).unwrap();
        assert_eq!(board.legal_moves(Color::Black), vec![v("A1"), v("B2")]);
        assert_eq!(board.rules_board(), "X.\n.O");
        assert_eq!(board.render(), "   A B\n 2 X . 2\n 1 . O 1\n   A B");
    }
}
