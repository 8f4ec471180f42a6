//! Terminal chat against a single local session.

use parcel_core::ParcelResult;
use parcel_dialogue::DialogueEngine;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

const PROMPT: &str = "> ";

/// Greets, then answers one line at a time until EOF or the conversation ends.
pub async fn run<R, W>(engine: &DialogueEngine, input: R, output: &mut W) -> ParcelResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut session = engine.new_session();
    let greeting = engine.initial_greeting(&mut session);
    output.write_all(format!("{greeting}\n").as_bytes()).await?;

    let mut lines = input.lines();
    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let reply = engine.process_input(&mut session, &line).await;
        output.write_all(format!("{reply}\n").as_bytes()).await?;

        if session.state.is_terminal() {
            break;
        }
    }

    output.flush().await?;
    Ok(())
}
