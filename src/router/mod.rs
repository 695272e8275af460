//! The message router — decides, per inbound message event, what to relay,
//! to whom, and what side-channel sends to emit.

mod assignment;
mod engine;
mod forward;
mod judgment;

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::debug;

use crate::config::{ForwardPolicy, PluginConfig};
use crate::error::Result;
use crate::host::Host;
use crate::model::{
    Actor, Application, MessageEnvelope, OutboundPayload, RoutingIntent, SendMetadata,
    SignedObject,
};
use crate::roster::Roster;

/// One inbound message event, as the host hands it to the plugin.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    /// Fresh snapshot of the sending actor.
    pub sender: Actor,
    /// The application this message belongs to, when the host (or
    /// [`crate::plugin::Plugin::deduce_application`]) attached one.
    pub application: Option<Application>,
    pub message: MessageEnvelope,
}

impl RouteRequest {
    pub fn new(sender: Actor, application: Option<Application>, message: MessageEnvelope) -> Self {
        Self {
            sender,
            application,
            message,
        }
    }
}

/// What the router decided for one message.
#[derive(Debug, Clone)]
pub struct RouteOutcome {
    /// The sends that were emitted (already executed by the host).
    pub intents: Vec<RoutingIntent>,
    /// Whether the host's default processing of the message should proceed.
    pub continue_default: bool,
}

impl RouteOutcome {
    /// The message was handled here; suppress default processing.
    fn handled(intents: Vec<RoutingIntent>) -> Self {
        Self {
            intents,
            continue_default: false,
        }
    }

    /// Nothing (or only side-channel sends) happened; let the host's
    /// default processing continue.
    fn passthrough(intents: Vec<RoutingIntent>) -> Self {
        Self {
            intents,
            continue_default: true,
        }
    }
}

/// Deterministic routing decision engine over message metadata.
///
/// Holds no mutable state: every decision works on snapshots resolved
/// fresh for that message, and all I/O goes through the [`Host`] seam.
pub struct MessageRouter {
    host: Arc<dyn Host>,
    config: PluginConfig,
    policy: Arc<dyn ForwardPolicy>,
    roster: Roster,
}

impl MessageRouter {
    pub fn new(
        host: Arc<dyn Host>,
        config: PluginConfig,
        policy: Arc<dyn ForwardPolicy>,
    ) -> Self {
        let roster = Roster::new(Arc::clone(&host), config.clone());
        Self {
            host,
            config,
            policy,
            roster,
        }
    }

    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    /// Execute a batch of intents as one fan-out, failing the batch if any
    /// send fails.
    pub(crate) async fn dispatch(&self, intents: &[RoutingIntent]) -> Result<()> {
        try_join_all(intents.iter().cloned().map(|intent| self.host.send(intent))).await?;
        Ok(())
    }

    /// Build the intent for relaying a message to an employee.
    ///
    /// Propagates the message context and stamps the original sender, so
    /// the employee's client can thread replies back through the bot.
    pub(crate) fn employee_relay_intent(&self, req: &RouteRequest, to: &str) -> RoutingIntent {
        let payload = if self.config.wrap_entire_message_when_forwarding {
            OutboundPayload::Envelope {
                envelope: req.message.clone(),
            }
        } else {
            OutboundPayload::Object {
                object: req.message.object.clone(),
            }
        };

        let mut other = SendMetadata::from_sender(&req.sender.id);
        if let Some(context) = &req.message.context {
            debug!(context = %context, "propagating context on forwarded message");
            other.context = Some(context.clone());
        }

        RoutingIntent {
            to: to.to_string(),
            payload,
            other,
        }
    }

    /// Send a plain notice back to an actor.
    pub(crate) async fn notify(&self, to: &str, object: SignedObject) -> Result<RoutingIntent> {
        let intent = RoutingIntent::object(to, object, SendMetadata::default());
        self.host.send(intent.clone()).await?;
        Ok(intent)
    }

    pub(crate) fn policy(&self) -> &Arc<dyn ForwardPolicy> {
        &self.policy
    }
}
