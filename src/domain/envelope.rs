//! The routed message envelope.
//!
//! An [`Envelope`] is the single unit exchanged between the hub and its
//! clients. It is produced either by the hub itself (join/leave synthesis)
//! or by a connection relaying a client-originated payload. The hub routes on
//! `room` only and never inspects `data`.
//!
//! Wire shape:
//!
//! ```json
//! {
//!   "room": "lobby",
//!   "type": "chat",
//!   "data": {"msg": "hi"},
//!   "sender": "alice",
//!   "target": "bob",
//!   "instanceId": "tab-2",
//!   "currentPCInfo": ""
//! }
//! ```
//!
//! `data` and `currentPCInfo` are always written; `target` and `instanceId`
//! are omitted when absent.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::ClientId;

/// Envelope type tag.
///
/// `join` and `leave` are synthetic: only the hub emits them. Any other
/// string is an application-defined type carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageType {
    /// A client joined the room.
    Join,
    /// A client left the room.
    Leave,
    /// Application-defined type.
    Custom(String),
}

impl MessageType {
    /// Returns `true` for the hub-generated `join`/`leave` types.
    #[must_use]
    pub const fn is_synthetic(&self) -> bool {
        matches!(self, Self::Join | Self::Leave)
    }

    /// Returns the wire string for this type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Join => "join",
            Self::Leave => "leave",
            Self::Custom(s) => s,
        }
    }
}

impl From<String> for MessageType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "join" => Self::Join,
            "leave" => Self::Leave,
            _ => Self::Custom(s),
        }
    }
}

impl From<&str> for MessageType {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<MessageType> for String {
    fn from(kind: MessageType) -> Self {
        match kind {
            MessageType::Custom(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable routed message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default, deserialize_with = "null_as_default")]
    room: String,
    #[serde(rename = "type")]
    kind: MessageType,
    #[serde(default)]
    data: serde_json::Value,
    #[serde(default, deserialize_with = "null_as_default")]
    sender: ClientId,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_as_none"
    )]
    target: Option<ClientId>,
    #[serde(
        rename = "instanceId",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_as_none"
    )]
    instance_id: Option<String>,
    #[serde(
        rename = "currentPCInfo",
        default,
        deserialize_with = "null_as_default"
    )]
    context: String,
}

impl Envelope {
    /// Creates an envelope with no target, instance id, or context.
    #[must_use]
    pub fn new(
        room: impl Into<String>,
        kind: impl Into<MessageType>,
        data: serde_json::Value,
        sender: ClientId,
    ) -> Self {
        Self {
            room: room.into(),
            kind: kind.into(),
            data,
            sender,
            target: None,
            instance_id: None,
            context: String::new(),
        }
    }

    /// Synthesizes the `join` notification for `sender` entering `room`.
    #[must_use]
    pub fn join(room: impl Into<String>, sender: ClientId) -> Self {
        Self::new(room, MessageType::Join, serde_json::Value::Null, sender)
    }

    /// Synthesizes the `leave` notification for `sender` leaving `room`.
    #[must_use]
    pub fn leave(room: impl Into<String>, sender: ClientId) -> Self {
        Self::new(room, MessageType::Leave, serde_json::Value::Null, sender)
    }

    /// Returns a copy addressed to `target`.
    #[must_use]
    pub fn with_target(self, target: ClientId) -> Self {
        Self {
            target: Some(target),
            ..self
        }
    }

    /// Returns a copy tagged with the sender's instance id.
    #[must_use]
    pub fn with_instance_id(self, instance_id: impl Into<String>) -> Self {
        Self {
            instance_id: Some(instance_id.into()),
            ..self
        }
    }

    /// Returns a copy carrying the free-form context field.
    #[must_use]
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            ..self
        }
    }

    /// Returns a copy whose routing metadata is pinned to `room` and `sender`.
    ///
    /// Connections use this so a client can only publish into the room it
    /// joined, under its own id.
    #[must_use]
    pub fn bound_to(self, room: &str, sender: &ClientId) -> Self {
        Self {
            room: room.to_string(),
            sender: sender.clone(),
            ..self
        }
    }

    /// Target room.
    #[must_use]
    pub fn room(&self) -> &str {
        &self.room
    }

    /// Type tag.
    #[must_use]
    pub const fn kind(&self) -> &MessageType {
        &self.kind
    }

    /// Opaque application payload (`Null` for synthetic envelopes).
    #[must_use]
    pub const fn data(&self) -> &serde_json::Value {
        &self.data
    }

    /// Originating client.
    #[must_use]
    pub const fn sender(&self) -> &ClientId {
        &self.sender
    }

    /// Directed-delivery target, if any.
    #[must_use]
    pub const fn target(&self) -> Option<&ClientId> {
        self.target.as_ref()
    }

    /// Sender instance id, if any.
    #[must_use]
    pub fn instance_id(&self) -> Option<&str> {
        self.instance_id.as_deref()
    }

    /// Free-form context (`currentPCInfo` on the wire).
    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }
}

/// Deserializes an optional string-like field, mapping `""` to `None`.
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()).map(T::from))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
