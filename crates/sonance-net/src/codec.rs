use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::NetError;

/// A message type that can cross the wire.
pub trait NetMessage: Serialize + DeserializeOwned {
    /// Numeric type id carried in the envelope
    const TYPE_ID: u8;
    /// Whether the message must be delivered on the reliable stream
    const RELIABLE: bool;

    /// Reject values the receiver must never act on.
    fn validate(&self) -> Result<(), NetError> {
        Ok(())
    }
}

#[derive(Serialize)]
struct OutgoingEnvelope<'a, T> {
    #[serde(rename = "type")]
    type_id: u8,
    reliable: bool,
    body: &'a T,
}

#[derive(Deserialize)]
struct IncomingEnvelope {
    #[serde(rename = "type")]
    type_id: u8,
    body: serde_json::Value,
}

/// Serialize a message into a JSON text frame.
pub fn encode<M: NetMessage>(message: &M) -> Result<String, NetError> {
    message.validate()?;
    let text = serde_json::to_string(&OutgoingEnvelope {
        type_id: M::TYPE_ID,
        reliable: M::RELIABLE,
        body: message,
    })?;
    trace!(type_id = M::TYPE_ID, bytes = text.len(), "encoded message");
    Ok(text)
}

/// Parse a JSON text frame into a message of type `M`.
pub fn decode<M: NetMessage>(text: &str) -> Result<M, NetError> {
    let envelope: IncomingEnvelope = serde_json::from_str(text)?;
    if envelope.type_id != M::TYPE_ID {
        return Err(NetError::UnexpectedType {
            expected: M::TYPE_ID,
            found: envelope.type_id,
        });
    }
    let message: M = serde_json::from_value(envelope.body)?;
    message.validate()?;
    Ok(message)
}
