use std::io::Write;

use crate::error::{Error, Result};
use crate::message::{PeekedMessage, SubQueue};
use crate::options::OutputFormat;

/// Writes peek results to an output stream.
///
/// In [`OutputFormat::JsonLines`] mode only message objects reach the
/// stream; headers and notices go to the log.
pub struct Printer<W> {
    out: W,
    format: OutputFormat,
}

impl<W: Write> Printer<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    pub fn section(&mut self, sub_queue: SubQueue, queue: &str, max: u32) -> Result<()> {
        let header = format!(">>> Peeking {} queue: {queue} (up to {max})", sub_queue.title());
        match self.format {
            OutputFormat::Human => self.line(&format!("\n{header}")),
            OutputFormat::JsonLines => {
                log::info!("{header}");
                Ok(())
            }
        }
    }

    /// Prints every message, or exactly one notice line when there are none.
    pub fn messages(&mut self, sub_queue: SubQueue, messages: &[PeekedMessage]) -> Result<()> {
        if messages.is_empty() {
            let notice = match sub_queue {
                SubQueue::Active => "[info] No active messages available to peek.",
                SubQueue::DeadLetter => "[info] No dead-letter messages available to peek.",
            };
            return match self.format {
                OutputFormat::Human => self.line(notice),
                OutputFormat::JsonLines => {
                    log::info!("{notice}");
                    Ok(())
                }
            };
        }

        for (i, message) in messages.iter().enumerate() {
            match self.format {
                OutputFormat::Human => self.block(sub_queue, message, i + 1)?,
                OutputFormat::JsonLines => {
                    let mut json = serde_json::Map::new();
                    json.insert("sub_queue".into(), sub_queue.label().into());
                    if let serde_json::Value::Object(fields) = message.to_json() {
                        json.extend(fields);
                    }
                    self.line(&serde_json::Value::Object(json).to_string())?;
                }
            }
        }

        Ok(())
    }

    pub fn summary(&mut self, total: usize) -> Result<()> {
        let summary = format!("Done. Total messages peeked: {total}");
        match self.format {
            OutputFormat::Human => self.line(&format!("\n{summary}")),
            OutputFormat::JsonLines => {
                log::info!("{summary}");
                Ok(())
            }
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn block(&mut self, sub_queue: SubQueue, message: &PeekedMessage, index: usize) -> Result<()> {
        let metadata = serde_json::to_string_pretty(&message.metadata())
            .map_err(|e| Error::Transport(format!("rendering message metadata: {e}")))?;

        self.line(&format!("\n=== {} MESSAGE #{index} ===", sub_queue.label()))?;
        self.line(&metadata)?;
        self.line("-- body --")?;
        self.line(&message.render_body())
    }

    fn line(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{text}").map_err(|e| Error::Transport(format!("writing output: {e}")))
    }
}
