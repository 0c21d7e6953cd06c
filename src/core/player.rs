use crate::domain::board::Board;
use crate::domain::model::{Color, Move, Vertex};
use crate::domain::ports::GoPlayer;
use rand::prelude::IndexedRandom;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum Policy {
    /// Any legal point.
    Random,
    /// Any legal point except the player's own single-point eyes.
    NoEyeFill,
}

/// Uniform random choice among legal points; passes when none is left.
pub struct RandomPlayer {
    name: String,
    version: String,
    policy: Policy,
    rng: SmallRng,
}

impl RandomPlayer {
    pub fn new(name: impl Into<String>, version: impl Into<String>, policy: Policy, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Self {
            name: name.into(),
            version: version.into(),
            policy,
            rng,
        }
    }

    fn candidates(&self, board: &Board, color: Color) -> Vec<Vertex> {
        let legal = board.legal_moves(color);
        match self.policy {
            Policy::Random => legal,
            Policy::NoEyeFill => legal
                .into_iter()
                .filter(|v| !board.is_eye(*v, color))
                .collect(),
        }
    }
}

impl GoPlayer for RandomPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn select_move(&mut self, board: &Board, color: Color) -> Move {
        let candidates = self.candidates(board, color);
        match candidates.choose(&mut self.rng) {
            Some(vertex) => Move::Play(*vertex),
            None => Move::Pass,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_picks_occupied_point() {
        let mut board = Board::new(3).unwrap();
        let mut player = RandomPlayer::new("Go1", "1.0", Policy::Random, Some(7));
        for i in 0..9 {
            let color = if i % 2 == 0 { Color::Black } else { Color::White };
            let mv = player.select_move(&board, color);
            assert!(matches!(mv, Move::Play(_)), "move {} should not pass", i);
            board.play(color, mv).unwrap();
        }
        assert_eq!(player.select_move(&board, Color::Black), Move::Pass);
    }

    #[test]
    fn test_same_seed_same_game() {
        let play_out = |seed| {
            let mut board = Board::new(5).unwrap();
            let mut player = RandomPlayer::new("Go1", "1.0", Policy::Random, Some(seed));
            (0..10)
                .map(|_| {
                    let mv = player.select_move(&board, Color::Black);
                    board.play(Color::Black, mv).unwrap();
                    mv
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(play_out(42), play_out(42));
    }

    #[test]
    fn test_eye_filter_passes_instead_of_filling_eye() {
        let mut board = Board::new(2).unwrap();
        for s in ["A2", "B1", "B2"] {
            board.play(Color::Black, Move::Play(s.parse().unwrap())).unwrap();
        }
        let mut careful = RandomPlayer::new("Go2", "1.0", Policy::NoEyeFill, Some(1));
        assert_eq!(careful.select_move(&board, Color::Black), Move::Pass);

        let mut random = RandomPlayer::new("Go1", "1.0", Policy::Random, Some(1));
        assert_eq!(
            random.select_move(&board, Color::Black),
            Move::Play("A1".parse().unwrap())
        );
        // 對白棋而言 A1 不是眼
        assert_eq!(
            careful.select_move(&board, Color::White),
            Move::Play("A1".parse().unwrap())
        );
    }
}
