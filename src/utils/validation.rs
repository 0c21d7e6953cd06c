//! Checks shared by the engine flags, the match file and the regression
//! runner. Each returns the `InvalidConfigValueError` naming the field.

use crate::domain::model::{MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use crate::utils::error::{GtpError, Result};
use std::fmt::Display;
use std::path::Path;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl Display, reason: impl Into<String>) -> GtpError {
    GtpError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn board_size(field: &str, size: usize) -> Result<()> {
    if (MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
        Ok(())
    } else {
        Err(invalid(
            field,
            size,
            format!("Board size must be {}..={}", MIN_BOARD_SIZE, MAX_BOARD_SIZE),
        ))
    }
}

pub fn komi(field: &str, komi: f32) -> Result<()> {
    if komi.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, komi, "Komi must be a finite number"))
    }
}

/// 局數、手數上限、逾時秒數都至少為 1
pub fn at_least_one(field: &str, count: u64) -> Result<()> {
    if count == 0 {
        return Err(invalid(field, count, "Must be at least 1"));
    }
    Ok(())
}

pub fn label(field: &str, text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(invalid(field, text, "Cannot be blank"));
    }
    Ok(())
}

/// A program command line: present, not blank, and passable to `sh -c`.
pub fn command_line<'a>(field: &str, command: Option<&'a str>) -> Result<&'a str> {
    let command = command.ok_or_else(|| GtpError::MissingConfigError {
        field: field.to_string(),
    })?;
    label(field, command)?;
    if command.contains('\0') {
        return Err(invalid(field, command.escape_default(), "Command contains a NUL byte"));
    }
    Ok(command)
}

pub fn file_path(field: &str, path: &Path) -> Result<()> {
    let text = path.to_string_lossy();
    if text.is_empty() {
        return Err(invalid(field, "", "Path cannot be empty"));
    }
    if text.contains('\0') {
        return Err(invalid(field, text.escape_default(), "Path contains a NUL byte"));
    }
    Ok(())
}

/// 檔名前綴只能是單一檔名，目錄另外設定
pub fn file_prefix(field: &str, prefix: &str) -> Result<()> {
    label(field, prefix)?;
    if prefix.contains(std::path::is_separator) {
        return Err(invalid(
            field,
            prefix,
            "Prefix is a file name, use results.directory for the location",
        ));
    }
    Ok(())
}

/// Every regression fixture must end in `.<extension>`.
pub fn fixture_files(field: &str, files: &[String], extension: &str) -> Result<()> {
    match files
        .iter()
        .find(|file| Path::new(file).extension().and_then(|e| e.to_str()) != Some(extension))
    {
        Some(file) => Err(invalid(field, file, format!("Expected a .{} file", extension))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_size_and_komi() {
        assert!(board_size("size", 3).is_ok());
        assert!(board_size("size", 25).is_ok());
        assert!(board_size("size", 1).is_err());
        assert!(board_size("size", 26).is_err());
        assert!(komi("komi", 6.5).is_ok());
        assert!(komi("komi", f32::NAN).is_err());
        assert!(at_least_one("games", 0).is_err());
    }

    #[test]
    fn test_command_line() {
        assert_eq!(command_line("black.command", Some("go-gtp --name Go1")).unwrap(), "go-gtp --name Go1");
        assert!(matches!(
            command_line("white.command", None),
            Err(GtpError::MissingConfigError { .. })
        ));
        assert!(command_line("white.command", Some("  ")).is_err());
        assert!(command_line("white.command", Some("go\0gtp")).is_err());
    }

    #[test]
    fn test_file_names() {
        assert!(file_path("log_file", Path::new("logs/go.log")).is_ok());
        assert!(file_path("log_file", Path::new("")).is_err());
        assert!(file_prefix("results.sgf_prefix", "go1-vs-go2").is_ok());
        assert!(file_prefix("results.sgf_prefix", "dir/game").is_err());
    }

    #[test]
    fn test_fixture_files() {
        let files = vec!["fixtures/play.tst".to_string(), "genmove.tst".to_string()];
        assert!(fixture_files("fixtures", &files, "tst").is_ok());

        let err = fixture_files("fixtures", &["notes.txt".to_string()], "tst").unwrap_err();
        assert!(err.to_string().contains("notes.txt"));
        assert!(fixture_files("fixtures", &["Makefile".to_string()], "tst").is_err());
    }
}
