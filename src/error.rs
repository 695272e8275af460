//! Error types for the employee-relay plugin.

/// Top-level error type for the plugin.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Payload error: {0}")]
    Payload(#[from] PayloadError),

    #[error("Roster error: {0}")]
    Roster(#[from] RosterError),
}

/// Errors surfaced by host capability calls.
///
/// The router recovers from `NotFound` locally (routing degrades to a
/// no-op), converts `Duplicate` and `Aborted` into user-visible notices on
/// the judgment path, and propagates everything else.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("application {id} has already been judged")]
    Duplicate { id: String },

    #[error("host aborted the operation: {reason}")]
    Aborted { reason: String },

    #[error("host call failed: {0}")]
    Other(String),
}

impl HostError {
    /// True for lookup misses the router swallows on best-effort paths.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Malformed or undecodable message payloads.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("failed to decode {kind} payload: {source}")]
    Decode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("missing required field {field} on {kind}")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },
}

/// Employee-lifecycle errors.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("actor {id} is not an employee")]
    NotAnEmployee { id: String },

    #[error("actor {id} has no approved employee-onboarding application")]
    NoOnboardingApplication { id: String },
}

/// Result type alias for the plugin.
pub type Result<T> = std::result::Result<T, Error>;
