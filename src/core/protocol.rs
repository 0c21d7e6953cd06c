//! GTP wire format: reading commands and writing responses on the
//! engine side, and reading responses back on the controller side.

use crate::domain::model::{Command, Response, Status};
use crate::utils::error::{GtpError, Result};
use std::io::{BufRead, Write};

/// Applies the GTP preprocessing rules to one raw line. Returns `None`
/// when nothing is left to execute.
pub fn preprocess(line: &str) -> Option<String> {
    let cleaned: String = line
        .chars()
        .filter(|c| !c.is_control() || *c == '\t' || *c == '\n')
        .map(|c| if c == '\t' { ' ' } else { c })
        .collect();
    let without_comment = match cleaned.find('#') {
        Some(pos) => &cleaned[..pos],
        None => cleaned.as_str(),
    };
    let trimmed = without_comment.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn parse_command(line: &str) -> Result<Command> {
    let mut tokens = line.split_whitespace();
    let first = tokens.next().ok_or_else(|| GtpError::Syntax {
        message: "empty command".to_string(),
    })?;

    let (id, name) = match first.parse::<u32>() {
        Ok(id) => {
            let name = tokens.next().ok_or_else(|| GtpError::Syntax {
                message: format!("missing command after id {}", id),
            })?;
            (Some(id), name)
        }
        Err(_) => (None, first),
    };

    Ok(Command {
        id,
        name: name.to_string(),
        args: tokens.map(str::to_string).collect(),
    })
}

/// Reads the next executable command, skipping blank and comment lines.
/// Lines that fail to parse come back as `Err` so the caller can answer
/// with a failure and keep going.
pub fn read_command<R: BufRead>(reader: &mut R) -> std::io::Result<Option<Result<Command>>> {
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if let Some(content) = preprocess(&line) {
            return Ok(Some(parse_command(&content)));
        }
    }
}

pub fn format_response(response: &Response) -> String {
    let status = match response.status {
        Status::Success => '=',
        Status::Failure => '?',
    };
    let id = response.id.map(|id| id.to_string()).unwrap_or_default();
    // 空行是回應的結束符號，內容中不能出現
    let text: Vec<&str> = response
        .text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .collect();
    let body = if response.text.starts_with('\n') {
        format!("\n{}", text.join("\n"))
    } else {
        text.join("\n")
    };
    format!("{}{} {}\n\n", status, id, body)
}

pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> std::io::Result<()> {
    writer.write_all(format_response(response).as_bytes())?;
    writer.flush()
}

/// Parses the lines of one response (without the terminating empty line).
pub fn parse_response(lines: &[String]) -> Result<Response> {
    let first = lines.first().ok_or_else(|| GtpError::Protocol {
        message: "empty response".to_string(),
    })?;

    let status = match first.chars().next() {
        Some('=') => Status::Success,
        Some('?') => Status::Failure,
        _ => {
            return Err(GtpError::Protocol {
                message: format!("response does not start with '=' or '?': {}", first),
            })
        }
    };

    let rest = &first[1..];
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    let id = if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    };
    let head = rest[digits.len()..].trim();

    let mut text_lines: Vec<&str> = Vec::new();
    if !head.is_empty() || lines.len() == 1 {
        text_lines.push(head);
    }
    text_lines.extend(lines[1..].iter().map(|l| l.trim_end()));

    Ok(Response {
        id,
        status,
        text: text_lines.join("\n"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_preprocess_strips_comments_and_controls() {
        assert_eq!(preprocess("genmove\tb # comment\r\n"), Some("genmove b".to_string()));
        assert_eq!(preprocess("# only a comment"), None);
        assert_eq!(preprocess("   \n"), None);
        assert_eq!(preprocess("na\x07me"), Some("name".to_string()));
    }

    #[test]
    fn test_parse_command_with_and_without_id() {
        let cmd = parse_command("10 play b a1").unwrap();
        assert_eq!(cmd.id, Some(10));
        assert_eq!(cmd.name, "play");
        assert_eq!(cmd.args, vec!["b", "a1"]);

        let cmd = parse_command("clear_board").unwrap();
        assert_eq!(cmd.id, None);
        assert!(cmd.args.is_empty());

        assert!(parse_command("42").is_err());
    }

    #[test]
    fn test_read_command_skips_blank_lines() {
        let mut input = Cursor::new("\n# header\n\n3 name\n");
        let cmd = read_command(&mut input).unwrap().unwrap().unwrap();
        assert_eq!(cmd.id, Some(3));
        assert!(read_command(&mut input).unwrap().is_none());
    }

    #[test]
    fn test_format_response() {
        assert_eq!(format_response(&Response::success(Some(7), "2")), "=7 2\n\n");
        assert_eq!(format_response(&Response::success(None, "")), "= \n\n");
        assert_eq!(
            format_response(&Response::failure(None, "unknown command")),
            "? unknown command\n\n"
        );
        assert_eq!(
            format_response(&Response::success(None, "a\n\nb")),
            "= a\nb\n\n"
        );
    }

    #[test]
    fn test_parse_response() {
        let lines = vec!["=12 c3".to_string()];
        let response = parse_response(&lines).unwrap();
        assert_eq!(response.id, Some(12));
        assert!(response.is_success());
        assert_eq!(response.text, "c3");

        let lines = vec!["= ".to_string(), "   A B".to_string(), " 2 . . 2".to_string()];
        let response = parse_response(&lines).unwrap();
        assert_eq!(response.text, "   A B\n 2 . . 2");

        let lines = vec!["? illegal move".to_string()];
        let response = parse_response(&lines).unwrap();
        assert!(!response.is_success());
        assert_eq!(response.text, "illegal move");

        assert!(parse_response(&["hello".to_string()]).is_err());
    }
}
