//! Line protocol for `comments session`.

use client_core::ControllerError;
use shared::domain::CommentId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    List,
    Count,
    Retry,
    Add { body: String },
    Edit { id: CommentId, body: String },
    Delete { id: CommentId },
    Quit,
}

pub const HELP: &str =
    "commands: list | count | retry | add <body> | edit <id> <body> | delete <id> | quit";

pub fn parse_line(line: &str) -> Result<SessionCommand, String> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match verb.to_ascii_lowercase().as_str() {
        "list" => Ok(SessionCommand::List),
        "count" => Ok(SessionCommand::Count),
        "retry" => Ok(SessionCommand::Retry),
        "quit" | "exit" => Ok(SessionCommand::Quit),
        "add" => Ok(SessionCommand::Add {
            body: rest.to_string(),
        }),
        "edit" => {
            let (id, body) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| "usage: edit <id> <body>".to_string())?;
            Ok(SessionCommand::Edit {
                id: parse_id(id)?,
                body: body.trim().to_string(),
            })
        }
        "delete" => Ok(SessionCommand::Delete {
            id: parse_id(rest)?,
        }),
        "" => Err(HELP.to_string()),
        other => Err(format!("unknown command '{other}'; {HELP}")),
    }
}

/// What to tell the user after `retry`; `None` when the reload succeeded.
pub fn retry_feedback(result: &Result<bool, ControllerError>) -> Option<String> {
    match result {
        Ok(true) => None,
        Ok(false) => Some("nothing to retry".to_string()),
        Err(err) => Some(format!("retry failed: {}", err.report().message)),
    }
}

fn parse_id(raw: &str) -> Result<CommentId, String> {
    raw.trim()
        .parse::<i64>()
        .map(CommentId)
        .map_err(|_| format!("comment id must be an integer, got '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use anyhow::anyhow;
    use shared::error::StoreError;

    #[test]
    fn parses_verbs_with_bodies() {
        assert_eq!(
            parse_line("add   Nice answer, thanks a lot! "),
            Ok(SessionCommand::Add {
                body: "Nice answer, thanks a lot!".into()
            })
        );
        assert_eq!(
            parse_line("edit 4 fixed the typo in my comment"),
            Ok(SessionCommand::Edit {
                id: CommentId(4),
                body: "fixed the typo in my comment".into()
            })
        );
        assert_eq!(
            parse_line("DELETE 7"),
            Ok(SessionCommand::Delete { id: CommentId(7) })
        );
        assert_eq!(parse_line("list"), Ok(SessionCommand::List));
        assert_eq!(parse_line("exit"), Ok(SessionCommand::Quit));
    }

    #[test]
    fn add_without_body_is_left_to_validation() {
        assert_eq!(
            parse_line("add"),
            Ok(SessionCommand::Add { body: String::new() })
        );
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(parse_line("edit 4").is_err());
        assert!(parse_line("delete four").is_err());
        assert!(parse_line("frobnicate").is_err());
        assert!(parse_line("   ").is_err());
    }

    #[test]
    fn failed_retry_is_not_reported_as_a_no_op() {
        let err = ControllerError::Store(StoreError::transport(anyhow!("connection reset")));
        let feedback = retry_feedback(&Err(err)).expect("feedback");
        assert!(feedback.starts_with("retry failed:"));
        assert!(feedback.contains("connection reset"));

        assert_eq!(retry_feedback(&Ok(false)).as_deref(), Some("nothing to retry"));
        assert_eq!(retry_feedback(&Ok(true)), None);
    }
}
