//! Actor snapshots, role tags, and identity stubs.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::HostError;
use crate::host::Host;

/// Well-known role tag granted by an approved employee pass.
pub const EMPLOYEE_ROLE: &str = "employee";

/// Reference to an addressable identity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityStub {
    /// Stable permalink of the identity.
    pub permalink: String,
    /// Hash of the latest identity version, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Display title, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl IdentityStub {
    /// Stub with only a permalink.
    pub fn bare(permalink: impl Into<String>) -> Self {
        Self {
            permalink: permalink.into(),
            link: None,
            title: None,
        }
    }
}

/// Stub of an application the actor has had approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovedApplicationStub {
    pub id: String,
    /// Product the application was for.
    pub request_for: String,
}

/// Immutable snapshot of a party known to the host platform.
///
/// One snapshot is resolved fresh per routing decision; the router never
/// mutates a shared actor object. Role changes go through the host's
/// grant/revoke primitives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    /// Identity permalink — the actor's stable id.
    pub id: String,
    #[serde(default)]
    pub roles: BTreeSet<String>,
    /// Addressable identity record reference, once the actor has published one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentityStub>,
    /// Free-form profile forwarded in introductions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<serde_json::Value>,
    /// Applications the host has approved for this actor.
    #[serde(default)]
    pub applications_approved: Vec<ApprovedApplicationStub>,
}

impl Actor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            roles: BTreeSet::new(),
            identity: None,
            profile: None,
            applications_approved: Vec::new(),
        }
    }

    /// An actor is an employee iff its role set carries the employee tag.
    ///
    /// Every employee check in the plugin goes through here.
    pub fn is_employee(&self) -> bool {
        self.roles.contains(EMPLOYEE_ROLE)
    }

    /// Identity stub for this actor, falling back to a bare permalink when
    /// the actor has not published an identity record yet.
    pub fn identity_stub(&self) -> IdentityStub {
        self.identity
            .clone()
            .unwrap_or_else(|| IdentityStub::bare(&self.id))
    }
}

/// Either a resolved actor record or a bare id still to be looked up.
///
/// Assignment requests may carry either; resolution is deferred until the
/// record is actually needed.
#[derive(Debug, Clone)]
pub enum ActorOrId {
    Actor(Actor),
    Id(String),
}

impl ActorOrId {
    pub fn permalink(&self) -> &str {
        match self {
            Self::Actor(actor) => &actor.id,
            Self::Id(id) => id,
        }
    }

    /// Resolve to a full actor record, fetching from the host if needed.
    pub async fn resolve(self, host: &dyn Host) -> Result<Actor, HostError> {
        match self {
            Self::Actor(actor) => Ok(actor),
            Self::Id(id) => host.resolve_actor(&id).await,
        }
    }
}

impl From<Actor> for ActorOrId {
    fn from(actor: Actor) -> Self {
        Self::Actor(actor)
    }
}

impl From<String> for ActorOrId {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}
