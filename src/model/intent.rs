//! Routing intents — value objects describing a desired send.
//!
//! Intents are side-effect-free; the host executes them. User-visible
//! failures are ordinary payloads (`SimpleMessage`, `RequestError`) sent
//! back to the actor concerned — there is no separate error channel.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::actor::Actor;
use super::message::{tags, MessageEnvelope, SignedObject};

// ── Send metadata ───────────────────────────────────────────────────

/// Side-channel metadata annotating a send.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMetadata {
    /// The party the payload is really from, when the bot relays it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_sender: Option<String>,
    /// The party a cc'd payload was originally delivered to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_recipient: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Delivery override for the host's outbound path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward: Option<String>,
}

impl SendMetadata {
    pub fn from_sender(sender_id: impl Into<String>) -> Self {
        Self {
            original_sender: Some(sender_id.into()),
            ..Self::default()
        }
    }

    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = context;
        self
    }
}

// ── Routing intent ──────────────────────────────────────────────────

/// What a send carries: an object, a whole recorded envelope, or a link to
/// an already-stored object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "payload", rename_all = "snake_case")]
pub enum OutboundPayload {
    Object { object: SignedObject },
    /// The full envelope, for hosts configured to wrap forwards.
    Envelope { envelope: MessageEnvelope },
    Link { link: String },
}

impl OutboundPayload {
    /// Wire type tag of the carried object, where there is one.
    pub fn type_tag(&self) -> Option<&str> {
        match self {
            Self::Object { object } => Some(object.object_type.as_str()),
            Self::Envelope { envelope } => Some(envelope.object.object_type.as_str()),
            Self::Link { .. } => None,
        }
    }
}

/// A single desired send, decoupled from its execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingIntent {
    /// Recipient permalink.
    pub to: String,
    pub payload: OutboundPayload,
    pub other: SendMetadata,
}

impl RoutingIntent {
    pub fn object(to: impl Into<String>, object: SignedObject, other: SendMetadata) -> Self {
        Self {
            to: to.into(),
            payload: OutboundPayload::Object { object },
            other,
        }
    }

    pub fn link(to: impl Into<String>, link: impl Into<String>, other: SendMetadata) -> Self {
        Self {
            to: to.into(),
            payload: OutboundPayload::Link { link: link.into() },
            other,
        }
    }
}

// ── Payload builders ────────────────────────────────────────────────

/// Plain-text notice.
pub fn simple_message(message: impl Into<String>) -> SignedObject {
    SignedObject::new(tags::SIMPLE_MESSAGE, json!({ "message": message.into() }))
}

/// Structured error notice.
pub fn request_error(message: impl Into<String>, error: impl Into<String>) -> SignedObject {
    SignedObject::new(
        tags::REQUEST_ERROR,
        json!({
            "message": message.into(),
            "error": error.into(),
        }),
    )
}

/// Introduction of one actor to another, carrying the introduced party's
/// identity record and profile when present.
pub fn introduction(introduced: &Actor, identity: &serde_json::Value) -> SignedObject {
    let mut body = json!({ "identity": identity });
    if let Some(profile) = &introduced.profile {
        body["profile"] = profile.clone();
    }
    SignedObject::new(tags::INTRODUCTION, body)
}

/// Verification wrapping an instrument the bot accepted.
pub fn verification_for(document: &SignedObject) -> SignedObject {
    let mut object = SignedObject::new(
        tags::VERIFICATION,
        json!({
            "document": document,
            "dateVerified": Utc::now().timestamp_millis(),
        }),
    );
    object.link = Some(Uuid::new_v4().to_string());
    object
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::message::MessageKind;

    #[test]
    fn metadata_serialization_omits_absent_fields() {
        let other = SendMetadata::from_sender("ted");
        let value = serde_json::to_value(&other).unwrap();
        assert_eq!(value["original_sender"], "ted");
        assert!(value.get("context").is_none());
        assert!(value.get("forward").is_none());
        assert!(value.get("original_recipient").is_none());
    }

    #[test]
    fn verification_wraps_the_document() {
        let document = simple_message("assignment");
        let verification = verification_for(&document);
        assert_eq!(verification.kind(), MessageKind::Verification);
        assert_eq!(
            verification.body["document"]["message"],
            "assignment"
        );
        assert!(verification.body["dateVerified"].is_i64());
    }

    #[test]
    fn introduction_includes_profile_when_present() {
        let mut actor = Actor::new("bill");
        actor.profile = Some(json!({ "name": "Bill" }));
        let identity = json!({ "permalink": "bill", "pubkeys": [] });

        let intro = introduction(&actor, &identity);
        assert_eq!(intro.kind(), MessageKind::Introduction);
        assert_eq!(intro.body["identity"]["permalink"], "bill");
        assert_eq!(intro.body["profile"]["name"], "Bill");

        let bare = introduction(&Actor::new("ted"), &identity);
        assert!(bare.body.get("profile").is_none());
    }
}
