//! Value objects shared across the plugin.

pub mod actor;
pub mod application;
pub mod intent;
pub mod message;

pub use actor::{Actor, ActorOrId, ApprovedApplicationStub, IdentityStub, EMPLOYEE_ROLE};
pub use application::{Application, ApplicationRef, FormStub, ImportedVerification, EMPLOYEE_ONBOARDING};
pub use intent::{introduction, request_error, simple_message, verification_for, OutboundPayload, RoutingIntent, SendMetadata};
pub use message::{
    tags, AssignmentPayload, JudgmentPayload, MessageEnvelope, MessageKind, SharePayload,
    SignedObject,
};
