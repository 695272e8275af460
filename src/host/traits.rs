//! The `Host` trait — everything the plugin asks of the host platform.
//!
//! Identity resolution, signing, durable storage, and delivery all live on
//! the host side of this seam. The plugin holds no storage of its own: it
//! reads through these methods and requests mutations through them.

use async_trait::async_trait;

use crate::error::HostError;
use crate::model::{
    Actor, Application, ApplicationRef, MessageEnvelope, RoutingIntent, SendMetadata, SignedObject,
};

/// A judgment request against an application.
#[derive(Debug, Clone)]
pub struct Judgment {
    /// The applicant the decision applies to.
    pub applicant: Actor,
    pub application: Application,
    /// Permalink of the deciding party; absent for host-initiated approvals
    /// (e.g. the first-employee bootstrap).
    pub judge: Option<String>,
}

/// Relay of an employee-authored form request to the applicant.
#[derive(Debug, Clone)]
pub struct ItemRequest {
    pub user: String,
    pub application_id: String,
    pub item: SignedObject,
    pub other: SendMetadata,
}

/// Relay of an employee-authored correction request to the applicant.
#[derive(Debug, Clone)]
pub struct EditRequest {
    pub user: String,
    pub application_id: String,
    pub details: SignedObject,
    pub other: SendMetadata,
}

/// An active employee-pass credential.
#[derive(Debug, Clone)]
pub struct EmployeePass {
    /// Permalink of the credential holder.
    pub holder: String,
    pub revoked: bool,
}

/// Host capability trait covering lookup, delivery, judgment, and roles.
#[async_trait]
pub trait Host: Send + Sync {
    // ── Delivery ────────────────────────────────────────────────────

    /// Deliver a payload to an actor, annotated with side-channel metadata.
    async fn send(&self, intent: RoutingIntent) -> Result<(), HostError>;

    /// Ask the applicant for a form on the employee's behalf.
    async fn request_item(&self, request: ItemRequest) -> Result<(), HostError>;

    /// Ask the applicant to correct a form on the employee's behalf.
    async fn request_edit(&self, request: EditRequest) -> Result<(), HostError>;

    // ── Lookup ──────────────────────────────────────────────────────

    /// Fetch an actor record. `NotFound` when the id is unknown.
    async fn resolve_actor(&self, id: &str) -> Result<Actor, HostError>;

    /// Fetch the full identity record behind a permalink.
    async fn get_identity(&self, permalink: &str) -> Result<serde_json::Value, HostError>;

    async fn get_application(&self, reference: &ApplicationRef)
        -> Result<Application, HostError>;

    /// Find the application whose activity carries the given context token.
    async fn find_application_by_context(
        &self,
        context: &str,
    ) -> Result<Option<Application>, HostError>;

    /// Most recent inbound message with the given context authored by
    /// someone other than `exclude_author`, if any.
    async fn find_inbound_by_context(
        &self,
        context: &str,
        exclude_author: &str,
    ) -> Result<Option<MessageEnvelope>, HostError>;

    /// Active (unrevoked) employee passes, newest first.
    async fn list_employee_passes(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<EmployeePass>, HostError>;

    // ── Mutation ────────────────────────────────────────────────────

    /// Persist a mutated application record.
    async fn save_application(&self, application: &Application) -> Result<(), HostError>;

    /// Approve an application; returns the issued certificate.
    ///
    /// Fails with `Duplicate` when the application was already judged and
    /// `Aborted` when the host loses a conditional write.
    async fn approve_application(&self, judgment: &Judgment) -> Result<SignedObject, HostError>;

    async fn deny_application(&self, judgment: &Judgment) -> Result<(), HostError>;

    /// Revoke the certificate previously issued for an application.
    async fn revoke_certificate(
        &self,
        holder: &str,
        application_id: &str,
    ) -> Result<(), HostError>;

    async fn grant_role(&self, actor_id: &str, role: &str) -> Result<(), HostError>;

    async fn revoke_role(&self, actor_id: &str, role: &str) -> Result<(), HostError>;

    // ── Signing ─────────────────────────────────────────────────────

    /// Permalink of the bot's own identity.
    async fn bot_identity(&self) -> Result<String, HostError>;

    /// Re-sign a payload under the bot's own key.
    async fn resign(&self, object: &SignedObject) -> Result<SignedObject, HostError>;
}
