//! Per-recipient envelope encoding.

use std::fmt;

use crate::domain::{ClientId, Envelope};
use crate::error::HubError;

/// Turns an envelope into the text frame queued for one recipient.
///
/// The hub calls this once per member during fan-out. A failure only skips
/// that member.
pub trait EnvelopeEncoder: fmt::Debug + Send + Sync {
    /// Encodes `envelope` for delivery to `recipient`.
    ///
    /// # Errors
    ///
    /// Returns a [`HubError`] if the envelope cannot be encoded for this
    /// recipient.
    fn encode(&self, envelope: &Envelope, recipient: &ClientId) -> Result<String, HubError>;
}

/// Encodes envelopes as compact JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl EnvelopeEncoder for JsonEncoder {
    fn encode(&self, envelope: &Envelope, _recipient: &ClientId) -> Result<String, HubError> {
        Ok(serde_json::to_string(envelope)?)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn json_encoder_round_trips_through_wire_shape() {
        let env = Envelope::join("lobby", ClientId::from("a"));
        let Ok(frame) = JsonEncoder.encode(&env, &ClientId::from("b")) else {
            panic!("encode failed");
        };
        assert!(frame.contains(r#""type":"join""#));
        assert!(frame.contains(r#""data":null"#));

        let Ok(back) = serde_json::from_str::<Envelope>(&frame) else {
            panic!("decode failed");
        };
        assert_eq!(back, env);
    }
}
