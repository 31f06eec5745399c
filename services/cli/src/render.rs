//! Plain-text rendering of session events for a terminal.

use langchat_core::{Role, SessionEvent, StreamFailure, StreamOutcome, TranscriptUpdate};
use std::io::{self, Write};

/// Writes transcript changes as they happen.
///
/// AI entries open a line that later fragments extend in place; the line is
/// closed when another entry starts or the stream finishes.
pub struct Renderer<W: Write> {
    out: W,
    echo_user: bool,
    line_open: bool,
}

impl<W: Write> Renderer<W> {
    /// Creates a renderer. With `echo_user` set, user messages are printed
    /// too (useful when the input did not come from the terminal).
    pub fn new(out: W, echo_user: bool) -> Self {
        Self {
            out,
            echo_user,
            line_open: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn handle(&mut self, event: &SessionEvent) -> io::Result<()> {
        match event {
            SessionEvent::Transcript(TranscriptUpdate::Appended { role, content, .. }) => {
                self.close_line()?;
                match role {
                    Role::User if self.echo_user => writeln!(self.out, "you> {content}")?,
                    Role::User => {}
                    Role::Ai => {
                        write!(self.out, "ai> {content}")?;
                        self.line_open = true;
                    }
                }
            }
            SessionEvent::Transcript(TranscriptUpdate::Extended { delta, .. }) => {
                write!(self.out, "{delta}")?;
            }
            SessionEvent::BackendError(message) => {
                self.close_line()?;
                writeln!(self.out, "[backend error] {message}")?;
            }
            SessionEvent::Finished(outcome) => {
                self.close_line()?;
                match outcome {
                    StreamOutcome::Completed => {}
                    StreamOutcome::Failed(StreamFailure::NotFound) => {
                        writeln!(self.out, "[stream not found]")?
                    }
                    StreamOutcome::Failed(StreamFailure::Backend(reason)) => {
                        writeln!(self.out, "[stream failed] {reason}")?
                    }
                    StreamOutcome::Disconnected => writeln!(self.out, "[connection lost]")?,
                }
            }
        }
        self.out.flush()
    }

    /// Prints a one-line notice outside the transcript.
    pub fn notice(&mut self, text: &str) -> io::Result<()> {
        self.close_line()?;
        writeln!(self.out, "[{text}]")?;
        self.out.flush()
    }

    pub fn prompt(&mut self) -> io::Result<()> {
        self.close_line()?;
        write!(self.out, "> ")?;
        self.out.flush()
    }

    fn close_line(&mut self) -> io::Result<()> {
        if self.line_open {
            writeln!(self.out)?;
            self.line_open = false;
        }
        Ok(())
    }
}
