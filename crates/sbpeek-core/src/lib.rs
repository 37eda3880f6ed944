//! # sbpeek-core
//!
//! Core library for non-destructively peeking Azure Service Bus queues.
//!
//! This crate parses SAS connection strings, resolves the queue to inspect,
//! peeks the active queue and its dead-letter sub-queue, and renders what it
//! finds. Peeking never locks, completes or removes a message.
//!
//! ## Features
//!
//! - **Connection strings**: Parse `Endpoint=..;SharedAccessKeyName=..;SharedAccessKey=..;EntityPath=..`
//! - **Peeking**: One receiver per sub-queue, opened and disposed around a single peek
//! - **Rendering**: Headed text blocks or one JSON object per line
//!
//! ## Example
//!
//! ```no_run
//! use sbpeek::RunOptions;
//!
//! # async fn example() -> sbpeek::Result<()> {
//! let options = RunOptions::new(5, None, false, true)?;
//! let total = sbpeek::peek(
//!     "Endpoint=sb://x.servicebus.windows.net/;SharedAccessKeyName=read;SharedAccessKey=K;EntityPath=q1",
//!     &options,
//!     std::io::stdout(),
//! )
//! .await?;
//! println!("{total} message(s) in the DLQ");
//! # Ok(())
//! # }
//! ```

mod connection;
mod error;
mod message;
mod options;
mod printer;
mod servicebus;

use std::io::Write;

pub use connection::ConnectionDescriptor;
pub use error::{Error, Result};
pub use message::{format_timestamp, Body, PeekedMessage, SubQueue};
pub use options::{OutputFormat, PeekMode, RunOptions, DEFAULT_MAX_MESSAGES};
pub use printer::Printer;
pub use servicebus::{PeekSource, ServiceBus};

/// Resolves the queue, connects, and peeks the selected sub-queues.
///
/// The queue name is resolved before connecting, so a missing name fails
/// with [`Error::Configuration`] without any network access. Returns the
/// number of messages printed.
pub async fn peek<W: Write>(
    connection_string: &str,
    options: &RunOptions,
    out: W,
) -> Result<usize> {
    let descriptor = ConnectionDescriptor::parse(connection_string);
    let queue = descriptor.resolve_queue(options.queue.as_deref())?;
    log::debug!("resolved queue {queue}");

    let mut service_bus = ServiceBus::connect(&descriptor).await?;
    let mut printer = Printer::new(out, options.format);
    let result = run(&mut service_bus, &queue, options, &mut printer).await;
    service_bus.close().await;

    result
}

/// Peeks the active queue, then the dead-letter queue, as selected by
/// `options.mode`, printing each section as soon as it arrives.
///
/// A failure in the second section leaves the first one printed.
pub async fn run<S: PeekSource, W: Write>(
    source: &mut S,
    queue: &str,
    options: &RunOptions,
    printer: &mut Printer<W>,
) -> Result<usize> {
    let mut sub_queues = Vec::with_capacity(2);
    if options.mode.includes_active() {
        sub_queues.push(SubQueue::Active);
    }
    if options.mode.includes_dead_letter() {
        sub_queues.push(SubQueue::DeadLetter);
    }

    let mut total = 0;
    for sub_queue in sub_queues {
        printer.section(sub_queue, queue, options.max)?;
        let messages = source.peek(queue, sub_queue, options.max).await?;
        printer.messages(sub_queue, &messages)?;
        total += messages.len();
    }

    printer.summary(total)?;
    Ok(total)
}

#[cfg(test)]
mod test_utils;
