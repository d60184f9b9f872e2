//! Interactive chat loop
//!
//! Reads one line at a time, forwards it to the [`ConversationEngine`] under a
//! single session identifier and prints `Agente: ...` or `Erro: ...`. A turn
//! failure is reported and the loop keeps going; only an exit keyword or end
//! of input ends it.

use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use crate::conversation::{ConversationEngine, ConversationError};
use crate::errors::{AgentErrorExt, EngineError};
use crate::secrets::scrub;

pub const BANNER_TITLE: &str = "🌎 Bem-vindo à Viagens dos Sonhos! 🌎";
pub const BANNER_SUBTITLE: &str = "Como posso ajudá-lo a planejar sua próxima aventura?";
pub const FAREWELL: &str = "Obrigado por usar a Viagens dos Sonhos! Boa viagem! 🧳✈️";
pub const PROMPT: &str = "\nVocê: ";

/// True if `input` is one of the exit keywords, ignoring case and surrounding whitespace.
/// `keywords` must already be lowercase.
pub fn is_exit_command(input: &str, keywords: &[String]) -> bool {
    let normalized = input.trim().to_lowercase();
    keywords.iter().any(|k| *k == normalized)
}

/// Read one line, decoding invalid UTF-8 lossily. `None` at end of input.
async fn read_line<R>(input: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    if input.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    let line = String::from_utf8_lossy(&buf[..]);
    Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
}

/// Print the outcome of one turn
pub fn write_turn_result<W: Write>(
    out: &mut W,
    result: &Result<String, ConversationError>,
) -> std::io::Result<()> {
    match result {
        Ok(reply) => writeln!(out, "\nAgente: {}", reply),
        Err(e) => {
            writeln!(out, "Erro: {}", scrub(&e.to_string()))?;
            writeln!(out, "{}", e.user_hint())
        }
    }
}

/// Read-eval-print loop bound to one session
pub struct Repl<'a> {
    engine: &'a ConversationEngine,
    session_id: String,
    exit_keywords: Vec<String>,
}

impl<'a> Repl<'a> {
    pub fn new(
        engine: &'a ConversationEngine,
        session_id: impl Into<String>,
        exit_keywords: Vec<String>,
    ) -> Self {
        Self {
            engine,
            session_id: session_id.into(),
            exit_keywords,
        }
    }

    fn write_banner<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "{}", BANNER_TITLE)?;
        writeln!(out, "{}", BANNER_SUBTITLE)?;
        let first = self.exit_keywords.first().map(String::as_str).unwrap_or("sair");
        writeln!(out, "(Digite '{}' para encerrar)", first)?;
        writeln!(out, "{}", "-".repeat(50))
    }

    /// Run until an exit keyword or end of input
    pub async fn run<R, W>(&self, mut input: R, out: &mut W) -> Result<(), EngineError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        self.write_banner(out)?;
        let mut buf = Vec::new();

        loop {
            write!(out, "{}", PROMPT)?;
            out.flush()?;

            let Some(line) = read_line(&mut input, &mut buf).await? else {
                debug!("End of input, leaving chat loop");
                writeln!(out)?;
                writeln!(out, "{}", FAREWELL)?;
                break;
            };

            if is_exit_command(&line, &self.exit_keywords) {
                writeln!(out, "{}", FAREWELL)?;
                break;
            }

            if line.trim().is_empty() {
                continue;
            }

            let result = self.engine.respond(&self.session_id, &line).await;
            if let Err(e) = &result {
                warn!("Turn failed: {}", scrub(&e.to_string()));
            }
            write_turn_result(out, &result)?;
        }

        out.flush()?;
        Ok(())
    }
}
