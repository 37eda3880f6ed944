//! Azure Service Bus boundary.

use azservicebus::core::BasicRetryPolicy;
use azservicebus::{
    ServiceBusClient, ServiceBusClientOptions, ServiceBusReceiverOptions, ServiceBusRetryOptions,
};
use chrono::{DateTime, Utc};
use fe2o3_amqp_types::primitives::SimpleValue;
use serde_json::Value;

use crate::connection::ConnectionDescriptor;
use crate::error::{Error, Result};
use crate::message::{base64_placeholder, format_timestamp, Body, PeekedMessage, SubQueue};

/// Anything that can peek a queue or its dead-letter sub-queue.
///
/// Implementations must leave the messages untouched: no lock is taken, the
/// delivery count does not move, nothing is removed.
#[allow(async_fn_in_trait)]
pub trait PeekSource {
    /// Returns at most `max` messages in broker order. An empty queue is an
    /// empty `Vec`, not an error.
    async fn peek(
        &mut self,
        queue: &str,
        sub_queue: SubQueue,
        max: u32,
    ) -> Result<Vec<PeekedMessage>>;
}

/// Namespace level client. Receivers are opened per peek and disposed
/// straight after.
pub struct ServiceBus {
    client: ServiceBusClient<BasicRetryPolicy>,
}

impl ServiceBus {
    /// Connects to the namespace named by the descriptor.
    ///
    /// Missing credential parts fail with [`Error::Authentication`] before
    /// anything is sent over the wire.
    pub async fn connect(descriptor: &ConnectionDescriptor) -> Result<Self> {
        let connection_string = descriptor.namespace_connection_string()?;

        log::debug!("connecting to {}", descriptor.endpoint.as_deref().unwrap_or_default());

        let client =
            ServiceBusClient::new_from_connection_string(connection_string, client_options())
                .await
                .map_err(|e| Error::from_broker(e).context("connecting to namespace"))?;

        Ok(Self { client })
    }

    /// Disposes the namespace connection.
    pub async fn close(self) {
        if let Err(e) = self.client.dispose().await {
            log::warn!("failed to close service bus client: {e}");
        }
    }
}

impl PeekSource for ServiceBus {
    async fn peek(
        &mut self,
        queue: &str,
        sub_queue: SubQueue,
        max: u32,
    ) -> Result<Vec<PeekedMessage>> {
        let step = format!("peeking {} of {queue}", sub_queue.label());

        let options = ServiceBusReceiverOptions {
            sub_queue: match sub_queue {
                SubQueue::Active => azservicebus::SubQueue::None,
                SubQueue::DeadLetter => azservicebus::SubQueue::DeadLetter,
            },
            ..Default::default()
        };

        let mut receiver = self
            .client
            .create_receiver_for_queue(queue, options)
            .await
            .map_err(|e| Error::from_broker(e).context(&step))?;
        log::debug!("opened {} receiver for {queue}", sub_queue.label());

        let peeked = receiver
            .peek_messages(max, None)
            .await
            .map_err(|e| Error::from_broker(e).context(&step));

        // the receiver goes away whether or not the peek worked
        if let Err(e) = receiver.dispose().await {
            log::warn!("failed to close receiver for {queue}: {e}");
        }

        let messages = peeked?
            .iter()
            .map(|m| PeekedMessage {
                sequence_number: m.sequence_number(),
                message_id: m.message_id().map(|id| id.to_string()),
                enqueued_time: to_utc(m.enqueued_time()),
                expires_at: to_utc(m.expires_at()),
                delivery_count: m.delivery_count(),
                content_type: m.content_type().map(|s| s.to_string()),
                subject: m.subject().map(|s| s.to_string()),
                correlation_id: m.correlation_id().map(|s| s.to_string()),
                to: m.to().map(|s| s.to_string()),
                reply_to: m.reply_to().map(|s| s.to_string()),
                session_id: m.session_id().map(|s| s.to_string()),
                partition_key: m.partition_key().map(|s| s.to_string()),
                dead_letter_reason: m.dead_letter_reason().map(|s| s.to_string()),
                dead_letter_error_description: m
                    .dead_letter_error_description()
                    .map(|s| s.to_string()),
                application_properties: m
                    .application_properties()
                    .map(|props| {
                        props
                            .0
                            .iter()
                            .map(|(k, v)| (k.to_string(), simple_value_to_json(v)))
                            .collect()
                    })
                    .unwrap_or_default(),
                body: match m.body() {
                    Ok(bytes) => Body::Bytes(bytes.to_vec()),
                    Err(e) => Body::Unreadable(e.to_string()),
                },
            })
            .collect::<Vec<_>>();

        log::debug!(
            "peeked {} message(s) from {} of {queue}",
            messages.len(),
            sub_queue.label()
        );

        Ok(messages)
    }
}

/// Client options with retries disabled: every broker call is made once.
fn client_options() -> ServiceBusClientOptions {
    ServiceBusClientOptions {
        retry_options: ServiceBusRetryOptions {
            max_retries: 0,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn to_utc(time: time::OffsetDateTime) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(time.unix_timestamp(), time.nanosecond())
}

/// Application property value as a plain JSON scalar.
fn simple_value_to_json(value: &SimpleValue) -> Value {
    match value {
        SimpleValue::Null => Value::Null,
        SimpleValue::Bool(b) => Value::Bool(*b),
        SimpleValue::Ubyte(n) => Value::from(*n),
        SimpleValue::Ushort(n) => Value::from(*n),
        SimpleValue::Uint(n) => Value::from(*n),
        SimpleValue::Ulong(n) => Value::from(*n),
        SimpleValue::Byte(n) => Value::from(*n),
        SimpleValue::Short(n) => Value::from(*n),
        SimpleValue::Int(n) => Value::from(*n),
        SimpleValue::Long(n) => Value::from(*n),
        SimpleValue::Float(f) => Value::from(f64::from(f.0)),
        SimpleValue::Double(f) => Value::from(f.0),
        SimpleValue::Char(c) => Value::String(c.to_string()),
        SimpleValue::Timestamp(t) => {
            let millis = t.milliseconds();
            DateTime::<Utc>::from_timestamp_millis(millis)
                .map(|t| Value::String(format_timestamp(&t)))
                .unwrap_or_else(|| Value::from(millis))
        }
        SimpleValue::Binary(bytes) => Value::String(base64_placeholder(bytes)),
        SimpleValue::String(s) => Value::String(s.clone()),
        SimpleValue::Symbol(s) => Value::String(s.0.clone()),
        other => Value::String(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_never_retries() {
        assert_eq!(client_options().retry_options.max_retries, 0);
    }

    #[test]
    fn application_properties_become_json_scalars() {
        assert_eq!(
            simple_value_to_json(&SimpleValue::String("acme".into())),
            Value::from("acme")
        );
        assert_eq!(simple_value_to_json(&SimpleValue::Int(5)), Value::from(5));
        assert_eq!(simple_value_to_json(&SimpleValue::Long(-7)), Value::from(-7));
        assert_eq!(simple_value_to_json(&SimpleValue::Bool(true)), Value::Bool(true));
        assert_eq!(simple_value_to_json(&SimpleValue::Null), Value::Null);
        assert_eq!(
            simple_value_to_json(&SimpleValue::Binary(vec![0xff, 0xfe, 0x00].into())),
            Value::from("base64://4A")
        );
    }
}
