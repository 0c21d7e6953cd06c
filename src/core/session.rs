use crate::core::dispatcher::{CommandTable, Handler, Lookup};
use crate::core::protocol::{parse_command, preprocess, read_command, write_response};
use crate::domain::board::Board;
use crate::domain::model::{Color, Command, Move, Response};
use crate::domain::ports::GoPlayer;
use crate::utils::error::{GtpError, Result};
use std::io::{BufRead, Write};

pub const PROTOCOL_VERSION: &str = "2";

/// The engine side of a GTP connection: board state, komi and the
/// player behind `genmove`, plus the command table that drives them.
pub struct GtpSession<P: GoPlayer> {
    board: Board,
    komi: f32,
    player: P,
    commands: CommandTable<GtpSession<P>>,
    quit_requested: bool,
}

impl<P: GoPlayer> GtpSession<P> {
    pub fn new(player: P, size: usize) -> Result<Self> {
        let mut session = Self {
            board: Board::new(size)?,
            komi: 0.0,
            player,
            commands: CommandTable::new(),
            quit_requested: false,
        };
        session.register_standard_commands();
        Ok(session)
    }

    fn register_standard_commands(&mut self) {
        let table = &mut self.commands;
        table.register("protocol_version", 0, "Usage: protocol_version", protocol_version);
        table.register("name", 0, "Usage: name", name);
        table.register("version", 0, "Usage: version", version);
        table.register("known_command", 1, "Usage: known_command CMD_NAME", known_command);
        table.register("list_commands", 0, "Usage: list_commands", list_commands);
        table.register("quit", 0, "Usage: quit", quit);
        table.register("boardsize", 1, "Usage: boardsize INT", boardsize);
        table.register("clear_board", 0, "Usage: clear_board", clear_board);
        table.register("komi", 1, "Usage: komi FLOAT", komi);
        table.register("play", 2, "Usage: play {b,w} MOVE", play);
        table.register("genmove", 1, "Usage: genmove {w,b}", genmove);
        table.register("undo", 0, "Usage: undo", undo);
        table.register("showboard", 0, "Usage: showboard", showboard);
        table.register("legal_moves", 1, "Usage: legal_moves {w,b}", legal_moves);
        table.register("gogui-rules_game_id", 0, "Usage: gogui-rules_game_id", rules_game_id);
        table.register("gogui-rules_board_size", 0, "Usage: gogui-rules_board_size", rules_board_size);
        table.register("gogui-rules_legal_moves", 0, "Usage: gogui-rules_legal_moves", rules_legal_moves);
        table.register("gogui-rules_side_to_move", 0, "Usage: gogui-rules_side_to_move", rules_side_to_move);
        table.register("gogui-rules_board", 0, "Usage: gogui-rules_board", rules_board);
        table.register("gogui-analyze_commands", 0, "Usage: gogui-analyze_commands", analyze_commands);
    }

    /// Adds an engine-specific command next to the standard set.
    pub fn register(&mut self, name: &str, arity: usize, usage: &'static str, handler: Handler<Self>) {
        self.commands.register(name, arity, usage, handler);
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn komi(&self) -> f32 {
        self.komi
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn execute(&mut self, command: &Command) -> Response {
        let args = command.args();
        let handler = match self.commands.lookup(&command.name, args.len()) {
            Lookup::Found(spec) => spec.handler,
            Lookup::Unknown => return Response::failure(command.id, "unknown command"),
            Lookup::WrongArity(usage) => {
                return Response::failure(
                    command.id,
                    format!("wrong number of arguments; {}", usage),
                )
            }
        };

        match handler(self, &args) {
            Ok(text) => Response::success(command.id, text),
            Err(e) => {
                tracing::debug!("'{}' failed: {}", command.name, e);
                Response::failure(command.id, e.to_string())
            }
        }
    }

    /// Runs one raw input line. Blank and comment lines produce no response.
    pub fn handle_line(&mut self, line: &str) -> Option<Response> {
        let content = preprocess(line)?;
        Some(match parse_command(&content) {
            Ok(command) => self.execute(&command),
            Err(e) => Response::failure(None, e.to_string()),
        })
    }

    /// The blocking request/response loop. Returns after `quit` or EOF.
    pub fn run<R: BufRead, W: Write>(&mut self, reader: &mut R, writer: &mut W) -> Result<()> {
        while let Some(parsed) = read_command(reader)? {
            let response = match parsed {
                Ok(command) => {
                    tracing::debug!("Received '{} {}'", command.name, command.args.join(" "));
                    self.execute(&command)
                }
                Err(e) => Response::failure(None, e.to_string()),
            };
            tracing::debug!("Responding '{}'", response.text);
            write_response(writer, &response)?;
            if self.quit_requested {
                tracing::info!("Quit requested");
                return Ok(());
            }
        }
        tracing::info!("Input closed");
        Ok(())
    }
}

fn parse_color(arg: &str) -> Result<Color> {
    arg.parse()
}

fn protocol_version<P: GoPlayer>(_: &mut GtpSession<P>, _: &[&str]) -> Result<String> {
    Ok(PROTOCOL_VERSION.to_string())
}

fn name<P: GoPlayer>(s: &mut GtpSession<P>, _: &[&str]) -> Result<String> {
    Ok(s.player.name().to_string())
}

fn version<P: GoPlayer>(s: &mut GtpSession<P>, _: &[&str]) -> Result<String> {
    Ok(s.player.version().to_string())
}

fn known_command<P: GoPlayer>(s: &mut GtpSession<P>, args: &[&str]) -> Result<String> {
    Ok(s.commands.contains(args[0]).to_string())
}

fn list_commands<P: GoPlayer>(s: &mut GtpSession<P>, _: &[&str]) -> Result<String> {
    Ok(s.commands.names().collect::<Vec<_>>().join("\n"))
}

fn quit<P: GoPlayer>(s: &mut GtpSession<P>, _: &[&str]) -> Result<String> {
    s.quit_requested = true;
    Ok(String::new())
}

fn boardsize<P: GoPlayer>(s: &mut GtpSession<P>, args: &[&str]) -> Result<String> {
    let size: usize = args[0].parse().map_err(|_| GtpError::Syntax {
        message: format!("board size is not an integer: \"{}\"", args[0]),
    })?;
    s.board.resize(size)?;
    Ok(String::new())
}

fn clear_board<P: GoPlayer>(s: &mut GtpSession<P>, _: &[&str]) -> Result<String> {
    s.board.clear();
    Ok(String::new())
}

fn komi<P: GoPlayer>(s: &mut GtpSession<P>, args: &[&str]) -> Result<String> {
    let komi: f32 = args[0].parse().map_err(|_| GtpError::Syntax {
        message: format!("komi is not a float: \"{}\"", args[0]),
    })?;
    s.komi = komi;
    Ok(String::new())
}

fn play<P: GoPlayer>(s: &mut GtpSession<P>, args: &[&str]) -> Result<String> {
    let color = parse_color(args[0])?;
    let mv: Move = args[1].parse()?;
    s.board.play(color, mv)?;
    Ok(String::new())
}

fn genmove<P: GoPlayer>(s: &mut GtpSession<P>, args: &[&str]) -> Result<String> {
    let color = parse_color(args[0])?;
    let mv = s.player.select_move(&s.board, color);
    if mv != Move::Resign {
        s.board.play(color, mv)?;
    }
    tracing::debug!("genmove {} -> {}", color, mv);
    Ok(mv.to_string().to_lowercase())
}

fn undo<P: GoPlayer>(s: &mut GtpSession<P>, _: &[&str]) -> Result<String> {
    s.board.undo()?;
    Ok(String::new())
}

fn showboard<P: GoPlayer>(s: &mut GtpSession<P>, _: &[&str]) -> Result<String> {
    Ok(format!("\n{}", s.board.render()))
}

fn format_vertices(vertices: &[crate::domain::model::Vertex]) -> String {
    vertices
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn legal_moves<P: GoPlayer>(s: &mut GtpSession<P>, args: &[&str]) -> Result<String> {
    let color = parse_color(args[0])?;
    Ok(format_vertices(&s.board.legal_moves(color)))
}

fn rules_game_id<P: GoPlayer>(_: &mut GtpSession<P>, _: &[&str]) -> Result<String> {
    Ok("Go".to_string())
}

fn rules_board_size<P: GoPlayer>(s: &mut GtpSession<P>, _: &[&str]) -> Result<String> {
    Ok(s.board.size().to_string())
}

fn rules_legal_moves<P: GoPlayer>(s: &mut GtpSession<P>, _: &[&str]) -> Result<String> {
    let color = s.board.side_to_move();
    Ok(format_vertices(&s.board.legal_moves(color)))
}

fn rules_side_to_move<P: GoPlayer>(s: &mut GtpSession<P>, _: &[&str]) -> Result<String> {
    Ok(s.board.side_to_move().name().to_string())
}

fn rules_board<P: GoPlayer>(s: &mut GtpSession<P>, _: &[&str]) -> Result<String> {
    Ok(s.board.rules_board())
}

fn analyze_commands<P: GoPlayer>(_: &mut GtpSession<P>, _: &[&str]) -> Result<String> {
    Ok([
        "pstring/Legal Moves For ToPlay/gogui-rules_legal_moves",
        "pstring/Side to Play/gogui-rules_side_to_move",
        "pstring/Board Size/gogui-rules_board_size",
        "pstring/Rules GameID/gogui-rules_game_id",
        "pstring/Show Board/gogui-rules_board",
    ]
    .join("\n"))
}

/// `board`: a one-line dump of the session state, for debugging.
pub fn board_summary<P: GoPlayer>(s: &mut GtpSession<P>, _: &[&str]) -> Result<String> {
    let last = s
        .board
        .last_move()
        .map(|m| format!("{} {}", m.color.letter(), m.mv))
        .unwrap_or_else(|| "none".to_string());
    Ok(format!(
        "Board: size={} to_move={} moves={} last={} black={} white={} komi={}",
        s.board.size(),
        s.board.side_to_move(),
        s.board.history().len(),
        last,
        s.board.count(Color::Black),
        s.board.count(Color::White),
        s.komi
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Vertex;
    use std::io::Cursor;

    /// 永遠下在第一個空點的測試用棋手
    struct FirstEmpty;

    impl GoPlayer for FirstEmpty {
        fn name(&self) -> &str {
            "first-empty"
        }

        fn version(&self) -> &str {
            "0.1"
        }

        fn select_move(&mut self, board: &Board, _color: Color) -> Move {
            board
                .empty_points()
                .first()
                .map(|v| Move::Play(*v))
                .unwrap_or(Move::Pass)
        }
    }

    fn session() -> GtpSession<FirstEmpty> {
        GtpSession::new(FirstEmpty, 3).unwrap()
    }

    fn reply(s: &mut GtpSession<FirstEmpty>, line: &str) -> Response {
        s.handle_line(line).unwrap()
    }

    #[test]
    fn test_administrative_commands() {
        let mut s = session();
        assert_eq!(reply(&mut s, "protocol_version").text, "2");
        assert_eq!(reply(&mut s, "5 name").id, Some(5));
        assert_eq!(reply(&mut s, "name").text, "first-empty");
        assert_eq!(reply(&mut s, "known_command genmove").text, "true");
        assert_eq!(reply(&mut s, "known_command final_score").text, "false");
        let listed = reply(&mut s, "list_commands").text;
        assert!(listed.lines().any(|l| l == "play"));
        assert!(!listed.lines().any(|l| l == "board"));
    }

    #[test]
    fn test_unknown_command_and_arity() {
        let mut s = session();
        let r = reply(&mut s, "3 final_score");
        assert!(!r.is_success());
        assert_eq!(r.id, Some(3));
        assert_eq!(r.text, "unknown command");

        let r = reply(&mut s, "play b");
        assert!(!r.is_success());
        assert!(r.text.starts_with("wrong number of arguments"));
        assert!(s.handle_line("# nothing here").is_none());
    }

    #[test]
    fn test_play_and_genmove() {
        let mut s = session();
        assert!(reply(&mut s, "play b a1").is_success());
        let r = reply(&mut s, "play w A1");
        assert_eq!(r.text, "illegal move: \"w a1\" occupied");
        assert!(!reply(&mut s, "play x b2").is_success());

        assert_eq!(reply(&mut s, "genmove w").text, "b1");
        assert_eq!(s.board().get(Vertex::new(2, 1)), Some(Color::White));
        assert_eq!(reply(&mut s, "gogui-rules_side_to_move").text, "black");
    }

    #[test]
    fn test_genmove_passes_on_full_board() {
        let mut s = session();
        assert!(reply(&mut s, "boardsize 2").is_success());
        for _ in 0..4 {
            assert_ne!(reply(&mut s, "genmove b").text, "pass");
        }
        assert_eq!(reply(&mut s, "genmove b").text, "pass");
        assert_eq!(reply(&mut s, "gogui-rules_legal_moves").text, "");
    }

    #[test]
    fn test_boardsize_komi_and_undo() {
        let mut s = session();
        assert_eq!(reply(&mut s, "boardsize 1").text, "unacceptable size");
        assert!(!reply(&mut s, "boardsize nine").is_success());
        assert!(reply(&mut s, "komi 6.5").is_success());
        assert_eq!(s.komi(), 6.5);
        assert_eq!(reply(&mut s, "undo").text, "cannot undo");
        reply(&mut s, "play b c3");
        assert!(reply(&mut s, "undo").is_success());
        assert_eq!(reply(&mut s, "gogui-rules_board").text, "...\n...\n...");
    }

    #[test]
    fn test_extension_command() {
        let mut s = session();
        s.register("board", 0, "Usage: board", board_summary);
        reply(&mut s, "play b b2");
        let text = reply(&mut s, "board").text;
        assert!(text.starts_with("Board: size=3"));
        assert!(text.contains("last=B B2"));
        assert_eq!(reply(&mut s, "known_command board").text, "true");
    }

    #[test]
    fn test_run_loop_until_quit() {
        let mut s = session();
        let mut input = Cursor::new("1 boardsize 2\n\n# comment\n2 showboard\n3 quit\n4 name\n");
        let mut output = Vec::new();
        s.run(&mut input, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert_eq!(
            text,
            "=1 \n\n=2 \n   A B\n 2 . . 2\n 1 . . 1\n   A B\n\n=3 \n\n"
        );
        assert!(s.quit_requested());
    }
}
