use super::Server;
use crate::application_port::*;
use crate::domain_model::Validity;
use crate::logger::*;
use crate::settings::{Command, Parser};
use serde::Serialize;
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// A single `batch` line: a subcommand without the binary name.
#[derive(Parser, Debug)]
#[command(no_binary_name = true)]
struct BatchLine {
    #[command(subcommand)]
    command: Command,
}

/// Runs one operator command against the server's engine.
pub async fn execute(server: &Server, command: Command) -> Result<Value, RelationError> {
    let service = &server.relationship_service;
    match command {
        Command::Send {
            from,
            to,
            duration_ms,
        } => {
            let duration = Validity::from_millis(duration_ms)?;
            to_json(service.send_request(from, to, duration).await?)
        }
        Command::Accept { from, to } => to_json(service.accept_request(from, to).await?),
        Command::Reject { from, to } => {
            service.reject_request(from, to).await?;
            Ok(json!({ "msg": "Rejected request!" }))
        }
        Command::Cancel { from, to } => {
            service.remove_request(from, to).await?;
            Ok(json!({ "msg": "Removed request!" }))
        }
        Command::Unfriend { user, friend } => {
            service.remove_friend(user, friend).await?;
            Ok(json!({ "msg": "Unfriended!" }))
        }
        Command::Friends { user } => to_json(server.friendship_check.get_friends(user).await?),
        Command::Requests { user } => to_json(service.get_requests(user).await?),
        Command::IsFriend { a, b } => to_json(server.friendship_check.is_friend(a, b).await?),
        Command::Sweep { user } => to_json(service.sweep_expired(user).await?),
        Command::Batch => Err(RelationError::NotAllowed(
            "batch sessions cannot be nested".to_string(),
        )),
    }
}

/// Turns an outcome into the JSON reply and whether it succeeded.
pub fn render(outcome: Result<Value, RelationError>) -> (Value, bool) {
    match outcome {
        Ok(value) => (value, true),
        Err(e) => {
            warn!("command failed: {e}");
            (json!({ "error": e.kind(), "message": e.to_string() }), false)
        }
    }
}

/// Executes newline-separated commands until `input` ends, writing one
/// compact JSON reply per command. Blank lines and `#` comments are skipped.
///
/// Returns the number of failed commands.
pub async fn run_batch<R, W>(server: &Server, input: R, mut output: W) -> anyhow::Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut failures = 0;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (reply, ok) = match BatchLine::try_parse_from(line.split_whitespace()) {
            Ok(parsed) => render(execute(server, parsed.command).await),
            Err(e) => {
                debug!(line, "unparsable batch line");
                (json!({ "error": "usage", "message": e.to_string() }), false)
            }
        };
        if !ok {
            failures += 1;
        }

        output.write_all(format!("{reply}\n").as_bytes()).await?;
        output.flush().await?;
    }

    Ok(failures)
}

fn to_json<T: Serialize>(value: T) -> Result<Value, RelationError> {
    serde_json::to_value(value).map_err(|e| RelationError::Store(format!("encode output: {e}")))
}
