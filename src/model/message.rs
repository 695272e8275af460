//! Message envelopes, signed objects, and the closed dispatch enum.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::PayloadError;

use super::actor::IdentityStub;
use super::application::ApplicationRef;

/// Wire type tags for the object kinds the plugin handles.
pub mod tags {
    pub const ASSIGN_RM: &str = "AssignRelationshipManager";
    pub const APPROVAL: &str = "ApplicationApproval";
    pub const DENIAL: &str = "ApplicationDenial";
    pub const VERIFICATION: &str = "Verification";
    pub const SHARE_REQUEST: &str = "ShareRequest";
    pub const FORM_REQUEST: &str = "FormRequest";
    pub const FORM_ERROR: &str = "FormError";
    pub const INTRODUCTION: &str = "Introduction";
    pub const SIMPLE_MESSAGE: &str = "SimpleMessage";
    pub const REQUEST_ERROR: &str = "RequestError";
    /// Credential issued on approval of an employee-onboarding application.
    pub const EMPLOYEE_PASS: &str = "MyEmployeeOnboarding";
}

// ── Signed object ───────────────────────────────────────────────────

/// A signed payload carried inside a message envelope.
///
/// The body stays opaque JSON; typed access goes through
/// [`SignedObject::payload`] so unknown object kinds flow through the
/// router untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedObject {
    #[serde(rename = "type")]
    pub object_type: String,
    /// Permalink of the signer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Hash of this object version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(flatten)]
    pub body: serde_json::Value,
}

impl SignedObject {
    pub fn new(object_type: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            object_type: object_type.into(),
            author: None,
            link: None,
            signature: None,
            body,
        }
    }

    pub fn kind(&self) -> MessageKind {
        MessageKind::of(&self.object_type)
    }

    /// Decode the body into a typed payload.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T, PayloadError> {
        serde_json::from_value(self.body.clone()).map_err(|source| PayloadError::Decode {
            kind: MessageKind::of(&self.object_type).label(),
            source,
        })
    }

    /// Copy of this object with the signature stripped, for relays the bot
    /// does not vouch for.
    pub fn unsigned(&self) -> Self {
        let mut copy = self.clone();
        copy.signature = None;
        copy
    }
}

// ── Dispatch enum ───────────────────────────────────────────────────

/// Closed set of object kinds the router dispatches on.
///
/// Anything outside the known set maps to `Other` and is treated as plain
/// content — relayed where routing applies, never acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    AssignRelationshipManager,
    Approval,
    Denial,
    Verification,
    ShareRequest,
    FormRequest,
    FormError,
    Introduction,
    SimpleMessage,
    Other,
}

impl MessageKind {
    pub fn of(type_tag: &str) -> Self {
        match type_tag {
            tags::ASSIGN_RM => Self::AssignRelationshipManager,
            tags::APPROVAL => Self::Approval,
            tags::DENIAL => Self::Denial,
            tags::VERIFICATION => Self::Verification,
            tags::SHARE_REQUEST => Self::ShareRequest,
            tags::FORM_REQUEST => Self::FormRequest,
            tags::FORM_ERROR => Self::FormError,
            tags::INTRODUCTION => Self::Introduction,
            tags::SIMPLE_MESSAGE => Self::SimpleMessage,
            _ => Self::Other,
        }
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::AssignRelationshipManager => "assign_rm",
            Self::Approval => "approval",
            Self::Denial => "denial",
            Self::Verification => "verification",
            Self::ShareRequest => "share_request",
            Self::FormRequest => "form_request",
            Self::FormError => "form_error",
            Self::Introduction => "introduction",
            Self::SimpleMessage => "simple_message",
            Self::Other => "other",
        }
    }

    /// Kinds that act on an application rather than carrying content.
    pub fn is_action(&self) -> bool {
        matches!(
            self,
            Self::AssignRelationshipManager
                | Self::Verification
                | Self::Approval
                | Self::Denial
                | Self::FormRequest
                | Self::FormError
        )
    }
}

// ── Typed payloads ──────────────────────────────────────────────────

/// Payload of an `AssignRelationshipManager` instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentPayload {
    /// Identity of the employee to assign.
    pub employee: IdentityStub,
    /// The application being assigned to.
    pub application: ApplicationRef,
}

/// Payload of an `ApplicationApproval` / `ApplicationDenial` instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgmentPayload {
    pub application: ApplicationRef,
}

/// Payload of a `ShareRequest`: share each link with each recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharePayload {
    pub links: Vec<String>,
    #[serde(rename = "with")]
    pub recipients: Vec<IdentityStub>,
}

// ── Envelope ────────────────────────────────────────────────────────

/// An inbound or recorded message: a signed object plus routing metadata.
///
/// `forward` and application-scoped routing are mutually exclusive — when
/// `forward` is present, context-based routing is skipped entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEnvelope {
    /// Permalink of the sending actor.
    pub author: String,
    pub object: SignedObject,
    /// Correlation token grouping related messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Explicit relay target, overriding application-based routing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward: Option<String>,
    /// Set when this message was itself relayed on someone's behalf.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_sender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
}

impl MessageEnvelope {
    pub fn new(author: impl Into<String>, object: SignedObject) -> Self {
        Self {
            author: author.into(),
            object,
            context: None,
            forward: None,
            original_sender: None,
            time: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_forward(mut self, forward: impl Into<String>) -> Self {
        self.forward = Some(forward.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn known_tags_map_to_kinds() {
        assert_eq!(
            MessageKind::of(tags::ASSIGN_RM),
            MessageKind::AssignRelationshipManager
        );
        assert_eq!(MessageKind::of(tags::APPROVAL), MessageKind::Approval);
        assert_eq!(MessageKind::of(tags::DENIAL), MessageKind::Denial);
        assert_eq!(MessageKind::of("SomethingElse"), MessageKind::Other);
    }

    #[test]
    fn action_kinds() {
        assert!(MessageKind::AssignRelationshipManager.is_action());
        assert!(MessageKind::FormError.is_action());
        assert!(!MessageKind::SimpleMessage.is_action());
        assert!(!MessageKind::Other.is_action());
    }

    #[test]
    fn signed_object_round_trips_flattened_body() {
        let object = SignedObject::new(tags::SIMPLE_MESSAGE, json!({ "message": "hey" }));
        let value = serde_json::to_value(&object).unwrap();
        assert_eq!(value["type"], tags::SIMPLE_MESSAGE);
        assert_eq!(value["message"], "hey");

        let back: SignedObject = serde_json::from_value(value).unwrap();
        assert_eq!(back.kind(), MessageKind::SimpleMessage);
        assert_eq!(back.body["message"], "hey");
    }

    #[test]
    fn typed_payload_decodes_from_body() {
        let object = SignedObject::new(
            tags::ASSIGN_RM,
            json!({
                "employee": { "permalink": "bill" },
                "application": { "id": "app-1" },
            }),
        );
        let payload: AssignmentPayload = object.payload().unwrap();
        assert_eq!(payload.employee.permalink, "bill");
        assert_eq!(payload.application.id, "app-1");
    }

    #[test]
    fn payload_decode_failure_names_the_kind() {
        let object = SignedObject::new(tags::ASSIGN_RM, json!({ "employee": 42 }));
        let err = object.payload::<AssignmentPayload>().unwrap_err();
        assert!(err.to_string().contains("assign_rm"));
    }

    #[test]
    fn unsigned_copy_drops_only_the_signature() {
        let mut object = SignedObject::new(tags::FORM_REQUEST, json!({ "form": "Passport" }));
        object.signature = Some("sig".into());
        object.author = Some("bill".into());

        let stripped = object.unsigned();
        assert!(stripped.signature.is_none());
        assert_eq!(stripped.author.as_deref(), Some("bill"));
        assert_eq!(stripped.body["form"], "Passport");
    }
}
