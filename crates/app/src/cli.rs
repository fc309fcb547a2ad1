//! Interactive read loop.
//!
//! Each line is first offered to the command parser. Commands are handled
//! here or by the action runner; everything else goes to the response
//! engine on a worker task while a placeholder is shown.

use crate::ascii_art;
use assistant::session::THINKING_PLACEHOLDER;
use assistant::{help_text, parse_command, ActionRunner, ChatSession, ReplyDispatcher};
use shared::Command;
use std::future::Future;
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[1;1H";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Repl<W: Write> {
    session: ChatSession,
    dispatcher: ReplyDispatcher,
    actions: ActionRunner,
    out: W,
}

impl<W: Write> Repl<W> {
    pub fn new(
        session: ChatSession,
        dispatcher: ReplyDispatcher,
        actions: ActionRunner,
        out: W,
    ) -> Self {
        Self {
            session,
            dispatcher,
            actions,
            out,
        }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// Read lines until exit, end of input, or Ctrl+C.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> io::Result<()> {
        self.run_until(input, tokio::signal::ctrl_c()).await
    }

    /// Read loop that also stops when `interrupt` resolves. The same
    /// listener stays armed while a reply is pending.
    pub async fn run_until<R, S>(&mut self, input: R, interrupt: S) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        S: Future<Output = io::Result<()>>,
    {
        tokio::pin!(interrupt);
        let mut lines = input.lines();
        loop {
            write!(self.out, "Du: ")?;
            self.out.flush()?;

            let line = tokio::select! {
                line = lines.next_line() => line?,
                res = &mut interrupt => {
                    res?;
                    return self.interrupted();
                }
            };

            let Some(line) = line else {
                writeln!(self.out)?;
                return Ok(());
            };

            let flow = tokio::select! {
                flow = self.handle_line(&line) => Some(flow?),
                res = &mut interrupt => {
                    res?;
                    None
                }
            };
            match flow {
                Some(Flow::Continue) => {}
                Some(Flow::Exit) => return Ok(()),
                None => return self.interrupted(),
            }
        }
    }

    fn interrupted(&mut self) -> io::Result<()> {
        writeln!(self.out, "\n\nAssistent: Auf Wiedersehen! Das Programm wurde beendet.")
    }

    pub async fn handle_line(&mut self, line: &str) -> io::Result<Flow> {
        let text = line.trim();
        if text.is_empty() {
            return Ok(Flow::Continue);
        }

        // Prior turns only; the current input is added to the prompt separately
        let prior = self.session.history().snapshot();
        self.session.record_user(text);

        match parse_command(text) {
            Some(Command::Exit) => {
                writeln!(self.out, "\nAuf Wiedersehen! Bis zum nächsten Mal.")?;
                return Ok(Flow::Exit);
            }
            Some(Command::Help) => {
                writeln!(self.out, "\n{}", help_text())?;
            }
            Some(Command::ClearChat) => {
                self.session.clear();
                writeln!(self.out, "\nDer Chat wurde gelöscht.")?;
                write!(self.out, "{}", CLEAR_SCREEN)?;
                writeln!(self.out, "{}", ascii_art::banner())?;
            }
            Some(command) => {
                if let Some(reply) = self.actions.run(&command) {
                    writeln!(self.out, "Assistent: {}", reply)?;
                    self.session.record_assistant(&reply);
                }
            }
            None => {
                writeln!(self.out, "Assistent: {}", THINKING_PLACEHOLDER)?;
                self.out.flush()?;

                let ticket = self.session.begin_request();
                let reply = self.dispatcher.reply(ticket, text.to_string(), prior).await;
                if self.session.accept(&reply) {
                    writeln!(self.out, "Assistent: {}", reply.text)?;
                }
            }
        }

        writeln!(self.out)?;
        Ok(Flow::Continue)
    }
}
