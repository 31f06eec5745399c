//! Drives a `ChatSession` from line-oriented input.

use crate::render::Renderer;
use anyhow::Result;
use langchat_core::{ChatBackend, ChatSession, SessionEvent, StreamOutcome};
use std::io::Write;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    sync::mpsc::UnboundedReceiver,
};
use tracing::{info, warn};

/// Input line that ends an interactive session.
pub const QUIT_COMMAND: &str = "/quit";

/// Sends the session's current input and renders the reply while it streams.
///
/// Returns `None` when the input was ignored (empty, or a request in flight).
pub async fn run_turn<W: Write>(
    session: &mut ChatSession,
    backend: &dyn ChatBackend,
    events: &mut UnboundedReceiver<SessionEvent>,
    renderer: &mut Renderer<W>,
) -> Result<Option<StreamOutcome>> {
    let result = {
        let send = session.send(backend);
        tokio::pin!(send);
        loop {
            tokio::select! {
                result = &mut send => break result,
                Some(event) = events.recv() => renderer.handle(&event)?,
            }
        }
    };

    // Render whatever was published after the last poll.
    while let Ok(event) = events.try_recv() {
        renderer.handle(&event)?;
    }
    Ok(result?)
}

/// Reads lines until end of input or `/quit`, sending each one as a message.
///
/// A failed submission is reported and the loop continues so the user can
/// try again.
pub async fn run_interactive<R, W>(
    session: &mut ChatSession,
    backend: &dyn ChatBackend,
    events: &mut UnboundedReceiver<SessionEvent>,
    input: R,
    renderer: &mut Renderer<W>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    loop {
        renderer.prompt()?;
        let Some(line) = lines.next_line().await? else {
            info!("End of input");
            break;
        };
        if line.trim() == QUIT_COMMAND {
            break;
        }

        session.set_input(line);
        if let Err(e) = run_turn(session, backend, events, renderer).await {
            warn!(error = ?e, "Turn failed");
            renderer.notice(&format!("failed to send message: {e}"))?;
        }
    }
    Ok(())
}
