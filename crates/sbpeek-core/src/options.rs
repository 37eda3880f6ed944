use crate::error::{Error, Result};

pub const DEFAULT_MAX_MESSAGES: u32 = 10;

/// Which sub-queues a run peeks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PeekMode {
    #[default]
    Both,
    ActiveOnly,
    DlqOnly,
}

impl PeekMode {
    /// Builds the mode from the two exclusive flags.
    pub fn from_flags(active_only: bool, dlq_only: bool) -> Result<Self> {
        match (active_only, dlq_only) {
            (true, true) => Err(Error::Usage(
                "--active-only and --dlq-only cannot be used together".to_string(),
            )),
            (true, false) => Ok(PeekMode::ActiveOnly),
            (false, true) => Ok(PeekMode::DlqOnly),
            (false, false) => Ok(PeekMode::Both),
        }
    }

    pub fn includes_active(self) -> bool {
        self != PeekMode::DlqOnly
    }

    pub fn includes_dead_letter(self) -> bool {
        self != PeekMode::ActiveOnly
    }
}

/// How the results are written to stdout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Headed blocks with pretty-printed metadata.
    #[default]
    Human,
    /// One compact JSON object per line.
    JsonLines,
}

/// Validated settings for a single run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOptions {
    pub max: u32,
    pub queue: Option<String>,
    pub mode: PeekMode,
    pub format: OutputFormat,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max: DEFAULT_MAX_MESSAGES,
            queue: None,
            mode: PeekMode::Both,
            format: OutputFormat::Human,
        }
    }
}

impl RunOptions {
    /// Validates raw flag values.
    ///
    /// `max` is taken as a signed integer so that `--max -5` is reported as
    /// a usage error rather than silently wrapping.
    pub fn new(
        max: i64,
        queue: Option<String>,
        active_only: bool,
        dlq_only: bool,
    ) -> Result<Self> {
        let mode = PeekMode::from_flags(active_only, dlq_only)?;

        let max = u32::try_from(max)
            .ok()
            .filter(|m| *m > 0)
            .ok_or_else(|| Error::Usage(format!("--max must be a positive integer, got {max}")))?;

        if queue.as_deref() == Some("") {
            return Err(Error::Usage("--queue must not be empty".to_string()));
        }

        Ok(Self {
            max,
            queue,
            mode,
            format: OutputFormat::Human,
        })
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }
}
