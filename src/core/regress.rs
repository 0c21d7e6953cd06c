//! Regression fixtures (`.tst`): GTP commands, each optionally followed
//! by a `#? [pattern]` line checking its response.

use crate::core::protocol::{parse_command, preprocess};
use crate::domain::ports::GtpClient;
use crate::utils::error::{GtpError, Result};
use regex::Regex;
use serde::Serialize;
use std::fmt;

pub const FIXTURE_EXTENSION: &str = "tst";

#[derive(Debug, Clone)]
pub struct Check {
    pub line: usize,
    pub pattern: String,
    pub negate: bool,
    pub expected_failure: bool,
    regex: Regex,
}

impl Check {
    /// Parses the text after `#?`, e.g. `[!A1|B2]*`.
    pub fn parse(line: usize, spec: &str) -> Result<Self> {
        let syntax = |message: String| GtpError::Syntax {
            message: format!("line {}: {}", line, message),
        };
        let spec = spec.trim();
        let inner_start = spec
            .strip_prefix('[')
            .ok_or_else(|| syntax(format!("expected '[' in '#? {}'", spec)))?;
        let close = inner_start
            .rfind(']')
            .ok_or_else(|| syntax(format!("missing ']' in '#? {}'", spec)))?;
        let mut pattern = &inner_start[..close];
        let trailer = inner_start[close + 1..].trim();
        let expected_failure = match trailer {
            "" => false,
            "*" => true,
            other => return Err(syntax(format!("unexpected '{}' after pattern", other))),
        };
        let negate = pattern.starts_with('!');
        if negate {
            pattern = &pattern[1..];
        }
        let regex = Regex::new(&format!("(?is)^(?:{})$", pattern))?;
        Ok(Self {
            line,
            pattern: pattern.to_string(),
            negate,
            expected_failure,
            regex,
        })
    }

    pub fn matches(&self, response: &str) -> bool {
        self.regex.is_match(response.trim()) != self.negate
    }
}

#[derive(Debug, Clone)]
pub struct FixtureCommand {
    pub line: usize,
    pub text: String,
    /// 測試編號：指令本身的 id，沒有則用行號
    pub id: usize,
    pub check: Option<Check>,
}

pub fn parse_fixture(content: &str) -> Result<Vec<FixtureCommand>> {
    let mut commands: Vec<FixtureCommand> = Vec::new();
    for (index, raw) in content.lines().enumerate() {
        let line = index + 1;
        if let Some(spec) = raw.trim_start().strip_prefix("#?") {
            let check = Check::parse(line, spec)?;
            match commands.last_mut() {
                Some(command) if command.check.is_none() => command.check = Some(check),
                Some(_) => {
                    return Err(GtpError::Syntax {
                        message: format!("line {}: second check for one command", line),
                    })
                }
                None => {
                    return Err(GtpError::Syntax {
                        message: format!("line {}: check before any command", line),
                    })
                }
            }
            continue;
        }
        let Some(text) = preprocess(raw) else {
            continue;
        };
        let id = parse_command(&text)?.id.map_or(line, |id| id as usize);
        commands.push(FixtureCommand {
            line,
            text,
            id,
            check: None,
        });
    }
    Ok(commands)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed,
    /// 標記為預期失敗卻通過
    Fixed,
    ExpectedFailure,
}

impl Outcome {
    fn classify(matched: bool, expected_failure: bool) -> Self {
        match (matched, expected_failure) {
            (true, false) => Outcome::Passed,
            (false, false) => Outcome::Failed,
            (true, true) => Outcome::Fixed,
            (false, true) => Outcome::ExpectedFailure,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Passed => "passed",
            Outcome::Failed => "FAILED",
            Outcome::Fixed => "unexpectedly passed",
            Outcome::ExpectedFailure => "expected failure",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    pub id: usize,
    pub command: String,
    pub pattern: String,
    pub response: String,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FileReport {
    pub file: String,
    pub results: Vec<TestResult>,
}

impl FileReport {
    pub fn count(&self, outcome: Outcome) -> usize {
        self.results.iter().filter(|r| r.outcome == outcome).count()
    }

    pub fn success(&self) -> bool {
        self.count(Outcome::Failed) == 0 && self.count(Outcome::Fixed) == 0
    }
}

impl fmt::Display for FileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for result in self.results.iter().filter(|r| r.outcome != Outcome::Passed) {
            writeln!(
                f,
                "{}:{} {} '{}' got '{}' expected [{}]",
                self.file,
                result.id,
                result.outcome.label(),
                result.command,
                result.response,
                result.pattern
            )?;
        }
        write!(f, "{}: ", self.file)?;
        write_totals(f, &self.results)
    }
}

fn write_totals(f: &mut fmt::Formatter<'_>, results: &[TestResult]) -> fmt::Result {
    let count = |outcome: Outcome| results.iter().filter(|r| r.outcome == outcome).count();
    writeln!(
        f,
        "{} tests, {} passed, {} FAILED, {} unexpectedly passed, {} expected failures",
        results.len(),
        count(Outcome::Passed),
        count(Outcome::Failed),
        count(Outcome::Fixed),
        count(Outcome::ExpectedFailure)
    )
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RegressReport {
    pub files: Vec<FileReport>,
}

impl RegressReport {
    pub fn total(&self, outcome: Outcome) -> usize {
        self.files.iter().map(|f| f.count(outcome)).sum()
    }

    pub fn success(&self) -> bool {
        self.files.iter().all(FileReport::success)
    }
}

impl fmt::Display for RegressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for file in &self.files {
            write!(f, "{}", file)?;
        }
        let all: Vec<TestResult> = self.files.iter().flat_map(|file| file.results.clone()).collect();
        write!(f, "Total: ")?;
        write_totals(f, &all)
    }
}

/// Sends every command of a fixture to `client` and evaluates the
/// checks. Transport errors abort the file; GTP failures are compared
/// as `? message`.
pub async fn run_fixture(
    file: &str,
    commands: &[FixtureCommand],
    client: &mut dyn GtpClient,
) -> Result<FileReport> {
    let mut report = FileReport {
        file: file.to_string(),
        results: Vec::new(),
    };
    for command in commands {
        let response = client.send(&command.text).await?;
        let Some(check) = &command.check else {
            continue;
        };
        let text = if response.is_success() {
            response.text.trim().to_string()
        } else {
            format!("? {}", response.text.trim())
        };
        let outcome = Outcome::classify(check.matches(&text), check.expected_failure);
        tracing::debug!("{}:{} {} -> {}", file, command.id, command.text, outcome.label());
        report.results.push(TestResult {
            id: command.id,
            command: command.text.clone(),
            pattern: if check.negate {
                format!("!{}", check.pattern)
            } else {
                check.pattern.clone()
            },
            response: text,
            outcome,
        });
    }
    Ok(report)
}
