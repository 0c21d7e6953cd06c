//! The `game.dat` result table: `# Key: value` header lines, a
//! `#GAME ...` column line, then one tab-separated row per game.

use crate::domain::ports::Storage;
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const COLUMNS: [&str; 9] = [
    "GAME", "RES_B", "RES_W", "ALT", "LEN", "TIME_B", "TIME_W", "ERR", "ERR_MSG",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub game: usize,
    /// 黑方（該局執黑的程式）回報的結果
    pub result_black: String,
    pub result_white: String,
    /// 1 表示兩個程式在這局交換了顏色
    pub alternated: u8,
    pub length: usize,
    pub time_black: f64,
    pub time_white: f64,
    pub error: u8,
    pub error_message: String,
}

impl GameRecord {
    pub fn is_alternated(&self) -> bool {
        self.alternated != 0
    }

    pub fn has_error(&self) -> bool {
        self.error != 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchHeader {
    pub black: String,
    pub black_command: String,
    pub black_version: String,
    pub white: String,
    pub white_command: String,
    pub white_version: String,
    pub size: usize,
    pub komi: f32,
    pub date: String,
    pub host: String,
}

impl MatchHeader {
    pub fn render(&self) -> String {
        let fields = [
            ("Black", self.black.clone()),
            ("BlackCommand", self.black_command.clone()),
            ("BlackVersion", self.black_version.clone()),
            ("Date", self.date.clone()),
            ("Host", self.host.clone()),
            ("Komi", self.komi.to_string()),
            ("Size", self.size.to_string()),
            ("White", self.white.clone()),
            ("WhiteCommand", self.white_command.clone()),
            ("WhiteVersion", self.white_version.clone()),
        ];
        let mut out = String::new();
        for (key, value) in fields {
            out.push_str(&format!("# {}: {}\n", key, value.replace('\n', " ")));
        }
        out.push_str("#\n");
        out.push_str(&format!("#{}\n", COLUMNS.join("\t")));
        out
    }
}

pub fn format_row(record: &GameRecord) -> Result<String> {
    let mut record = record.clone();
    record.error_message = record.error_message.replace(['\n', '\t'], " ");
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.serialize(&record)?;
    writer.flush()?;
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn parse_records(data: &[u8]) -> Result<Vec<GameRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .comment(Some(b'#'))
        .quoting(false)
        .flexible(true)
        .from_reader(data);
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

/// `# Key: value` lines of the header, by key.
pub fn parse_header(data: &[u8]) -> HashMap<String, String> {
    String::from_utf8_lossy(data)
        .lines()
        .filter_map(|line| line.strip_prefix("# "))
        .filter_map(|line| line.split_once(": ").or_else(|| line.strip_suffix(':').map(|k| (k, ""))))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}

/// Result files of one match: the table plus the SGF records next to it.
pub struct ResultStore<S: Storage> {
    storage: S,
    dat_file: String,
}

impl<S: Storage> ResultStore<S> {
    pub fn new(storage: S, dat_file: impl Into<String>) -> Self {
        Self {
            storage,
            dat_file: dat_file.into(),
        }
    }

    pub fn dat_file(&self) -> &str {
        &self.dat_file
    }

    pub fn dat_location(&self) -> String {
        self.storage.location(&self.dat_file)
    }

    pub fn location(&self, path: &str) -> String {
        self.storage.location(path)
    }

    /// Opens the table for a match and returns the first game index to
    /// play. An existing table is continued unless `force` is set.
    pub async fn start(&self, header: &MatchHeader, force: bool) -> Result<usize> {
        if !force && self.storage.exists(&self.dat_file).await {
            let records = self.records().await?;
            let next = records.iter().map(|r| r.game + 1).max().unwrap_or(0);
            tracing::info!(
                "Continuing {} after {} recorded games",
                self.dat_location(),
                records.len()
            );
            return Ok(next);
        }
        self.storage
            .write_file(&self.dat_file, header.render().as_bytes())
            .await?;
        Ok(0)
    }

    pub async fn append(&self, record: &GameRecord) -> Result<()> {
        let row = format_row(record)?;
        self.storage.append_file(&self.dat_file, row.as_bytes()).await
    }

    pub async fn records(&self) -> Result<Vec<GameRecord>> {
        let data = self.storage.read_file(&self.dat_file).await?;
        parse_records(&data)
    }

    pub async fn header(&self) -> Result<HashMap<String, String>> {
        let data = self.storage.read_file(&self.dat_file).await?;
        Ok(parse_header(&data))
    }

    pub async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        self.storage.write_file(path, data).await
    }
}
