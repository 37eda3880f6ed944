use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::message::{Body, PeekedMessage, SubQueue};
use crate::servicebus::PeekSource;

/// In-memory broker that records every peek it serves.
#[derive(Default)]
pub struct FakeBroker {
    messages: HashMap<SubQueue, Vec<PeekedMessage>>,
    failures: HashMap<SubQueue, Error>,
    pub calls: Vec<(String, SubQueue, u32)>,
}

impl FakeBroker {
    pub fn with(mut self, sub_queue: SubQueue, messages: Vec<PeekedMessage>) -> Self {
        self.messages.insert(sub_queue, messages);
        self
    }

    pub fn failing(mut self, sub_queue: SubQueue, error: Error) -> Self {
        self.failures.insert(sub_queue, error);
        self
    }
}

impl PeekSource for FakeBroker {
    async fn peek(
        &mut self,
        queue: &str,
        sub_queue: SubQueue,
        max: u32,
    ) -> Result<Vec<PeekedMessage>> {
        self.calls.push((queue.to_string(), sub_queue, max));

        if let Some(error) = self.failures.get(&sub_queue) {
            return Err(error.clone());
        }

        Ok(self
            .messages
            .get(&sub_queue)
            .map(|m| m.iter().take(max as usize).cloned().collect())
            .unwrap_or_default())
    }
}

pub fn message(sequence_number: i64, body: &str) -> PeekedMessage {
    PeekedMessage {
        sequence_number,
        message_id: Some(format!("msg-{sequence_number}")),
        body: Body::Bytes(body.as_bytes().to_vec()),
        ..Default::default()
    }
}
