use crate::domain::board::PlayedMove;
use crate::domain::model::{Move, Vertex};

/// What an SGF game record needs to know about one finished game.
#[derive(Debug, Clone)]
pub struct SgfGame<'a> {
    pub size: usize,
    pub komi: f32,
    pub black: &'a str,
    pub white: &'a str,
    pub date: &'a str,
    pub result: &'a str,
    pub moves: &'a [PlayedMove],
    pub comment: Option<&'a str>,
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace(']', "\\]")
}

/// SGF 座標：欄與列都從左上角的 `a` 開始；棋盤外的點沒有座標
fn point(vertex: Vertex, size: usize) -> Option<String> {
    if !vertex.is_on_board(size) {
        return None;
    }
    let col = (b'a' + (vertex.col - 1) as u8) as char;
    let row = (b'a' + (size - vertex.row) as u8) as char;
    Some(format!("{}{}", col, row))
}

pub fn render(game: &SgfGame<'_>) -> String {
    let mut out = format!(
        "(;FF[4]CA[UTF-8]AP[{}:{}]GM[1]SZ[{}]KM[{}]PB[{}]PW[{}]DT[{}]RE[{}]",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        game.size,
        game.komi,
        escape(game.black),
        escape(game.white),
        escape(game.date),
        escape(game.result),
    );
    if let Some(comment) = game.comment {
        out.push_str(&format!("C[{}]", escape(comment)));
    }
    let nodes = game.moves.iter().filter_map(|played| {
        let value = match played.mv {
            Move::Play(vertex) => point(vertex, game.size)?,
            Move::Pass => String::new(),
            Move::Resign => return None,
        };
        Some(format!(";{}[{}]", played.color.letter(), value))
    });
    for (i, node) in nodes.enumerate() {
        if i % 10 == 0 {
            out.push('\n');
        }
        out.push_str(&node);
    }
    out.push_str(")\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Color;

    #[test]
    fn test_render_game_record() {
        let moves = vec![
            PlayedMove {
                color: Color::Black,
                mv: Move::Play("A1".parse().unwrap()),
            },
            PlayedMove {
                color: Color::White,
                mv: Move::Play("C3".parse().unwrap()),
            },
            PlayedMove {
                color: Color::Black,
                mv: Move::Pass,
            },
        ];
        let sgf = render(&SgfGame {
            size: 3,
            komi: 0.0,
            black: "Go1",
            white: "Go]2",
            date: "2026-10-14",
            result: "?",
            moves: &moves,
            comment: None,
        });

        assert!(sgf.starts_with("(;FF[4]CA[UTF-8]AP[go-gtp:"));
        assert!(sgf.contains("SZ[3]KM[0]PB[Go1]PW[Go\\]2]DT[2026-10-14]RE[?]"));
        assert!(sgf.ends_with("\n;B[ac];W[ca];B[])\n"));
    }

    #[test]
    fn test_render_skips_points_off_the_board() {
        let moves = vec![
            PlayedMove {
                color: Color::Black,
                mv: Move::Play("B2".parse().unwrap()),
            },
            PlayedMove {
                color: Color::White,
                mv: Move::Play("E5".parse().unwrap()),
            },
        ];
        let sgf = render(&SgfGame {
            size: 3,
            komi: 0.0,
            black: "Go1",
            white: "Go2",
            date: "2026-10-14",
            result: "B+F",
            moves: &moves,
            comment: Some("Go2 played w E5 off the board"),
        });

        assert!(sgf.contains("C[Go2 played w E5 off the board]"));
        assert!(sgf.ends_with("\n;B[bb])\n"));
    }
}
