use crate::core::results::{GameRecord, ResultStore};
use crate::domain::model::Color;
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProgramStats {
    pub name: String,
    pub wins: usize,
    pub wins_as_black: usize,
    pub wins_as_white: usize,
    pub win_rate: f64,
    pub std_error: f64,
    pub mean_time: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchAnalysis {
    pub games: usize,
    pub errors: usize,
    pub unknown: usize,
    pub mean_length: f64,
    pub black: ProgramStats,
    pub white: ProgramStats,
}

/// 兩個程式回報的結果一致（或其中一方為 `?`）時採用，否則視為未知
pub fn agreed_result(record: &GameRecord) -> Option<&str> {
    let (b, w) = (record.result_black.trim(), record.result_white.trim());
    let result = match (b, w) {
        (b, w) if b == w => b,
        ("?", w) | ("", w) => w,
        (b, "?") | (b, "") => b,
        _ => return None,
    };
    (!result.is_empty() && result != "?").then_some(result)
}

fn winner(result: &str) -> Option<Color> {
    match result.chars().next().map(|c| c.to_ascii_uppercase()) {
        Some('B') => Some(Color::Black),
        Some('W') => Some(Color::White),
        _ => None,
    }
}

fn mean(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// Summarizes a match per program. "black" and "white" in the result
/// are the programs named in the table header; `ALT` rows are games
/// where they played the other color.
pub fn analyze_records(header: &HashMap<String, String>, records: &[GameRecord]) -> MatchAnalysis {
    let name = |key: &str| header.get(key).cloned().unwrap_or_else(|| key.to_string());
    let mut analysis = MatchAnalysis {
        games: records.len(),
        black: ProgramStats {
            name: name("Black"),
            ..ProgramStats::default()
        },
        white: ProgramStats {
            name: name("White"),
            ..ProgramStats::default()
        },
        ..MatchAnalysis::default()
    };

    let mut total_length = 0usize;
    let (mut first_time, mut second_time) = (0.0, 0.0);
    for record in records {
        total_length += record.length;
        if record.has_error() {
            analysis.errors += 1;
        }

        let (first_time_here, second_time_here) = if record.is_alternated() {
            (record.time_white, record.time_black)
        } else {
            (record.time_black, record.time_white)
        };
        first_time += first_time_here;
        second_time += second_time_here;

        let Some(color) = agreed_result(record).and_then(winner) else {
            analysis.unknown += 1;
            continue;
        };
        let first_won = (color == Color::Black) != record.is_alternated();
        let stats = if first_won {
            &mut analysis.black
        } else {
            &mut analysis.white
        };
        stats.wins += 1;
        match color {
            Color::Black => stats.wins_as_black += 1,
            Color::White => stats.wins_as_white += 1,
        }
    }

    let decided = analysis.games - analysis.unknown;
    for stats in [&mut analysis.black, &mut analysis.white] {
        stats.win_rate = mean(stats.wins as f64, decided);
        stats.std_error = if decided == 0 {
            0.0
        } else {
            (stats.win_rate * (1.0 - stats.win_rate) / decided as f64).sqrt()
        };
    }
    analysis.black.mean_time = mean(first_time, records.len());
    analysis.white.mean_time = mean(second_time, records.len());
    analysis.mean_length = mean(total_length as f64, records.len());
    analysis
}

/// Reads the match table, writes `<dat_file>.summary.json` next to it
/// and returns the summary.
pub async fn analyze<S: Storage>(store: &ResultStore<S>) -> Result<MatchAnalysis> {
    let header = store.header().await?;
    let records = store.records().await?;
    let analysis = analyze_records(&header, &records);

    let summary_file = format!("{}.summary.json", store.dat_file());
    let json = serde_json::to_string_pretty(&analysis)?;
    store.write_file(&summary_file, json.as_bytes()).await?;
    tracing::info!("Summary written to {}", store.location(&summary_file));
    Ok(analysis)
}

impl fmt::Display for MatchAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Games: {}  Errors: {}  Unknown: {}  Mean length: {:.1}",
            self.games, self.errors, self.unknown, self.mean_length
        )?;
        for stats in [&self.black, &self.white] {
            writeln!(
                f,
                "{:<12} wins {:>3} (B {:>3}, W {:>3})  {:5.1}% ± {:.1}  time/game {:.3}s",
                stats.name,
                stats.wins,
                stats.wins_as_black,
                stats.wins_as_white,
                stats.win_rate * 100.0,
                stats.std_error * 100.0,
                stats.mean_time
            )?;
        }
        Ok(())
    }
}
