//! Plugin configuration.

use async_trait::async_trait;

use crate::model::{Actor, MessageEnvelope};

/// Configuration knobs for the plugin. Everything defaults to off.
#[derive(Debug, Clone, Default)]
pub struct PluginConfig {
    /// Approve every employee-onboarding application instead of only the
    /// first one submitted while the roster is empty.
    pub approve_all_employee_applications: bool,
    /// Forward the whole envelope to employees instead of the bare payload.
    pub wrap_entire_message_when_forwarding: bool,
    /// Assign a random employee as RM when a customer message arrives on an
    /// application with no RM.
    pub auto_assign_rm: bool,
}

/// Injectable veto over explicit-forward requests.
///
/// Consulted after the structural guards (self-forward, employee-gating)
/// pass; returning `false` refuses the forward silently. The default
/// implementation allows everything.
#[async_trait]
pub trait ForwardPolicy: Send + Sync {
    /// An employee asked the bot to relay a message to `target`.
    async fn should_forward_from_employee(
        &self,
        _sender: &Actor,
        _message: &MessageEnvelope,
        _target: &str,
    ) -> bool {
        true
    }

    /// A customer addressed a message to the employee `target`.
    async fn should_forward_to_employee(
        &self,
        _sender: &Actor,
        _message: &MessageEnvelope,
        _target: &str,
    ) -> bool {
        true
    }
}

/// Default allow-all policy.
pub struct AllowAllForwards;

#[async_trait]
impl ForwardPolicy for AllowAllForwards {}
