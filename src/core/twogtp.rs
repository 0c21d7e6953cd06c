use crate::core::results::{GameRecord, MatchHeader, ResultStore};
use crate::core::sgf::{self, SgfGame};
use crate::domain::board::PlayedMove;
use crate::domain::model::{Color, Move};
use crate::domain::ports::{GtpClient, MatchSettings, Storage};
use crate::utils::error::{GtpError, Result};
use crate::utils::monitor::SystemMonitor;
use std::time::Instant;

/// 一局棋的結果；`failure` 有值時表示該局因引擎錯誤中止
#[derive(Debug, Default)]
pub struct GameOutcome {
    pub result_black: String,
    pub result_white: String,
    pub moves: Vec<PlayedMove>,
    pub time_black: f64,
    pub time_white: f64,
    pub note: Option<String>,
    pub failure: Option<GtpError>,
}

impl GameOutcome {
    fn decided(&mut self, result: String) {
        self.result_black = result.clone();
        self.result_white = result;
    }
}

#[derive(Debug, Clone)]
pub struct MatchReport {
    pub first_game: usize,
    pub games_played: usize,
    pub errors: usize,
    pub dat_file: String,
}

/// Plays a match between two GTP programs and records it the way
/// `gogui-twogtp` does: one SGF file per game plus the `.dat` table.
pub struct MatchRunner<S: Storage, C: MatchSettings> {
    store: ResultStore<S>,
    config: C,
    monitor: SystemMonitor,
}

impl<S: Storage, C: MatchSettings> MatchRunner<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self::new_with_monitoring(storage, config, false)
    }

    pub fn new_with_monitoring(storage: S, config: C, monitor_enabled: bool) -> Self {
        let dat_file = format!("{}.dat", config.sgf_prefix());
        Self {
            store: ResultStore::new(storage, dat_file),
            config,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn store(&self) -> &ResultStore<S> {
        &self.store
    }

    /// `first` is the program configured as black, `second` as white;
    /// with alternation they swap colors on odd games. Both programs get
    /// `quit` when the match ends, whether or not it succeeded.
    pub async fn run<'a>(
        &self,
        first: &'a mut dyn GtpClient,
        second: &'a mut dyn GtpClient,
    ) -> Result<MatchReport> {
        let result = self.run_games(first, second).await;
        for client in [first, second] {
            if let Err(e) = client.close().await {
                tracing::warn!("Closing {} failed: {}", client.label(), e);
            }
        }
        self.monitor.log_final_stats();
        result
    }

    async fn identify(client: &mut dyn GtpClient, command: &str) -> String {
        match client.expect_success(command).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                tracing::warn!("{}", e);
                "?".to_string()
            }
        }
    }

    async fn build_header(&self, first: &mut dyn GtpClient, second: &mut dyn GtpClient) -> MatchHeader {
        MatchHeader {
            black: Self::identify(first, "name").await,
            black_command: self.config.black_command().to_string(),
            black_version: Self::identify(first, "version").await,
            white: Self::identify(second, "name").await,
            white_command: self.config.white_command().to_string(),
            white_version: Self::identify(second, "version").await,
            size: self.config.board_size(),
            komi: self.config.komi(),
            date: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            host: std::env::var("HOSTNAME").unwrap_or_else(|_| "-".to_string()),
        }
    }

    async fn run_games(&self, first: &mut dyn GtpClient, second: &mut dyn GtpClient) -> Result<MatchReport> {
        self.monitor.watch(first.label(), first.pid());
        self.monitor.watch(second.label(), second.pid());

        let header = self.build_header(first, second).await;
        let first_game = self.store.start(&header, self.config.force()).await?;
        let mut report = MatchReport {
            first_game,
            games_played: 0,
            errors: 0,
            dat_file: self.store.dat_location(),
        };

        if first_game >= self.config.games() {
            tracing::info!("All {} games already played", self.config.games());
            return Ok(report);
        }

        for index in first_game..self.config.games() {
            let alternated = self.config.alternate() && index % 2 == 1;
            let (black, white): (&mut dyn GtpClient, &mut dyn GtpClient) = if alternated {
                (&mut *second, &mut *first)
            } else {
                (&mut *first, &mut *second)
            };
            let (black_name, white_name) = if alternated {
                (&header.white, &header.black)
            } else {
                (&header.black, &header.white)
            };

            tracing::info!("Game {}: {} (B) vs {} (W)", index, black.label(), white.label());
            let mut outcome = self.play_game(black, white).await;

            let sgf_file = format!("{}-{}.sgf", self.config.sgf_prefix(), index);
            let comment = outcome
                .failure
                .as_ref()
                .map(|e| e.to_string())
                .or_else(|| outcome.note.clone());
            let record = sgf::render(&SgfGame {
                size: self.config.board_size(),
                komi: self.config.komi(),
                black: black_name,
                white: white_name,
                date: &header.date,
                result: &outcome.result_black,
                moves: &outcome.moves,
                comment: comment.as_deref(),
            });
            self.store.write_file(&sgf_file, record.as_bytes()).await?;

            let row = GameRecord {
                game: index,
                result_black: outcome.result_black.clone(),
                result_white: outcome.result_white.clone(),
                alternated: u8::from(alternated),
                length: outcome.moves.len(),
                time_black: round_secs(outcome.time_black),
                time_white: round_secs(outcome.time_white),
                error: u8::from(outcome.failure.is_some()),
                error_message: comment.unwrap_or_default(),
            };
            self.store.append(&row).await?;
            report.games_played += 1;

            tracing::info!(
                "Game {} finished: {} after {} moves",
                index,
                outcome.result_black,
                outcome.moves.len()
            );
            self.monitor.log_stats(&format!("game {}", index));

            if let Some(failure) = outcome.failure.take() {
                report.errors += 1;
                tracing::error!("Game {} aborted: {}", index, failure);
                if !self.config.continue_on_error() {
                    return Err(failure);
                }
            }
        }

        Ok(report)
    }

    /// Plays one game. Engine errors end the game early and are returned
    /// inside the outcome so the partial game still gets recorded.
    pub async fn play_game(&self, black: &mut dyn GtpClient, white: &mut dyn GtpClient) -> GameOutcome {
        let mut outcome = GameOutcome {
            result_black: "?".to_string(),
            result_white: "?".to_string(),
            ..GameOutcome::default()
        };
        if let Err(e) = self.play_moves(black, white, &mut outcome).await {
            outcome.failure = Some(e);
        }
        outcome
    }

    async fn setup(&self, client: &mut dyn GtpClient) -> Result<()> {
        client
            .expect_success(&format!("boardsize {}", self.config.board_size()))
            .await?;
        client.expect_success("clear_board").await?;
        client
            .expect_success(&format!("komi {}", self.config.komi()))
            .await?;
        Ok(())
    }

    async fn play_moves<'a>(
        &self,
        black: &'a mut dyn GtpClient,
        white: &'a mut dyn GtpClient,
        outcome: &mut GameOutcome,
    ) -> Result<()> {
        self.setup(black).await?;
        self.setup(white).await?;

        let mut color = Color::Black;
        let mut passes = 0;
        loop {
            if outcome.moves.len() >= self.config.max_moves() {
                outcome.note = Some(format!("move limit {} reached", self.config.max_moves()));
                return Ok(());
            }

            let (mover, other) = match color {
                Color::Black => (&mut *black, &mut *white),
                Color::White => (&mut *white, &mut *black),
            };
            let letter = color.letter().to_ascii_lowercase();

            let started = Instant::now();
            let reply = mover.expect_success(&format!("genmove {}", letter)).await?;
            let elapsed = started.elapsed().as_secs_f64();
            match color {
                Color::Black => outcome.time_black += elapsed,
                Color::White => outcome.time_white += elapsed,
            }

            let mv: Move = reply.trim().parse().map_err(|_| GtpError::Protocol {
                message: format!("{} answered genmove with '{}'", mover.label(), reply.trim()),
            })?;

            if mv == Move::Resign {
                outcome.decided(format!("{}+R", color.opponent().letter()));
                return Ok(());
            }

            if let Move::Play(vertex) = mv {
                if !vertex.is_on_board(self.config.board_size()) {
                    outcome.decided(format!("{}+F", color.opponent().letter()));
                    outcome.note = Some(format!("{} played {} {} off the board", mover.label(), letter, mv));
                    return Ok(());
                }
            }

            let played = other.send(&format!("play {} {}", letter, mv)).await?;
            if !played.is_success() {
                outcome.decided(format!("{}+F", color.opponent().letter()));
                outcome.note = Some(format!(
                    "{} rejected {} {}: {}",
                    other.label(),
                    letter,
                    mv,
                    played.text
                ));
                return Ok(());
            }
            outcome.moves.push(PlayedMove { color, mv });

            passes = if mv.is_pass() { passes + 1 } else { 0 };
            if passes >= 2 {
                outcome.result_black = Self::final_score(black).await?;
                outcome.result_white = Self::final_score(white).await?;
                return Ok(());
            }
            color = color.opponent();
        }
    }

    async fn final_score(client: &mut dyn GtpClient) -> Result<String> {
        if !client.known_command("final_score").await? {
            return Ok("?".to_string());
        }
        let response = client.send("final_score").await?;
        if response.is_success() && !response.text.trim().is_empty() {
            Ok(response.text.trim().to_uppercase())
        } else {
            Ok("?".to_string())
        }
    }
}

fn round_secs(secs: f64) -> f64 {
    (secs * 1000.0).round() / 1000.0
}
