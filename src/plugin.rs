//! The hook surface the host platform drives.
//!
//! The host calls these methods at fixed points in its message lifecycle:
//!
//! - `deduce_application` — before routing, to attach an application to an
//!   employee message that arrived without one
//! - `on_message` — the routing decision itself
//! - `will_send` — before any outbound send, to thread replies back to the
//!   relayed-for party
//! - `did_send` — after any outbound send, to cc relationship managers and
//!   to notice pass revocations
//! - `on_forms_collected` — when an application's forms are complete, for
//!   the first-employee bootstrap
//! - `did_approve_application` — when a certificate is issued, to grant
//!   the employee role

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::debug;

use crate::config::{AllowAllForwards, ForwardPolicy, PluginConfig};
use crate::error::Result;
use crate::host::Host;
use crate::model::{
    tags, Actor, Application, JudgmentPayload, MessageEnvelope, MessageKind, RoutingIntent,
    SendMetadata, SignedObject,
};
use crate::roster::Roster;
use crate::router::{MessageRouter, RouteOutcome, RouteRequest};

/// Record of a send the host just executed, as passed to [`Plugin::did_send`].
#[derive(Debug, Clone)]
pub struct SentRecord {
    /// Recipient permalink.
    pub to: String,
    pub object: SignedObject,
    /// The application the send belonged to, if any.
    pub application: Option<Application>,
    pub other: SendMetadata,
}

/// The employee-relay plugin.
pub struct Plugin {
    host: Arc<dyn Host>,
    config: PluginConfig,
    router: MessageRouter,
    roster: Roster,
}

impl Plugin {
    pub fn new(host: Arc<dyn Host>, config: PluginConfig) -> Self {
        Self::with_policy(host, config, Arc::new(AllowAllForwards))
    }

    pub fn with_policy(
        host: Arc<dyn Host>,
        config: PluginConfig,
        policy: Arc<dyn ForwardPolicy>,
    ) -> Self {
        let router = MessageRouter::new(Arc::clone(&host), config.clone(), policy);
        let roster = Roster::new(Arc::clone(&host), config.clone());
        Self {
            host,
            config,
            router,
            roster,
        }
    }

    pub fn router(&self) -> &MessageRouter {
        &self.router
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Route one inbound message event.
    pub async fn on_message(&self, req: RouteRequest) -> Result<RouteOutcome> {
        self.router.route(&req).await
    }

    /// Attach an application to an employee action message that arrived
    /// without one.
    ///
    /// Judgment and assignment instruments name their application directly;
    /// other action types fall back to a context lookup. Misses are
    /// non-fatal.
    pub async fn deduce_application(
        &self,
        sender: &Actor,
        message: &MessageEnvelope,
    ) -> Result<Option<Application>> {
        if !sender.is_employee() {
            return Ok(None);
        }

        let kind = message.object.kind();
        if matches!(
            kind,
            MessageKind::AssignRelationshipManager | MessageKind::Approval | MessageKind::Denial
        ) {
            // all three payloads carry an application reference
            let payload: JudgmentPayload = message.object.payload()?;
            return match self.host.get_application(&payload.application).await {
                Ok(application) => Ok(Some(application)),
                Err(err) if err.is_not_found() => {
                    debug!(application = %payload.application.id, "referenced application not found");
                    Ok(None)
                }
                Err(err) => Err(err.into()),
            };
        }

        if message.forward.is_some() && !kind.is_action() {
            return Ok(None);
        }

        let Some(context) = &message.context else {
            return Ok(None);
        };
        if !kind.is_action() {
            return Ok(None);
        }

        match self.host.find_application_by_context(context).await {
            Ok(application) => Ok(application),
            Err(err) => {
                debug!(context = %context, error = %err, "failed to get application by context");
                Ok(None)
            }
        }
    }

    /// Thread an outbound reply back to the party it was relayed for.
    ///
    /// When the message being replied to was itself a relay (it carries
    /// `original_sender`), the reply's delivery is overridden to that
    /// party.
    pub fn will_send(&self, reply_to: Option<&MessageEnvelope>, other: &mut SendMetadata) {
        if let Some(original_sender) = reply_to.and_then(|message| message.original_sender.clone())
        {
            debug!(original_sender = %original_sender, "setting forward based on original sender");
            other.forward = Some(original_sender);
        }
    }

    /// Post-send bookkeeping: drop the role behind a revoked pass, and cc
    /// the application's RMs on anything sent to the applicant.
    pub async fn did_send(&self, record: &SentRecord) -> Result<()> {
        if record.object.object_type == tags::EMPLOYEE_PASS
            && record.object.body["revoked"].as_bool() == Some(true)
        {
            self.roster.revoke_employee_role(&record.to).await?;
            return Ok(());
        }

        // introductions are already targeted; never cc them
        if record.object.kind() == MessageKind::Introduction {
            return Ok(());
        }

        let Some(application) = &record.application else {
            return Ok(());
        };
        if application.relationship_managers.is_empty() {
            return Ok(());
        }
        if record.to != application.applicant_permalink() {
            return Ok(());
        }

        let mut other = record.other.clone();
        other.original_recipient = Some(record.to.clone());

        let ccs: Vec<RoutingIntent> = application
            .relationship_managers
            .iter()
            .filter(|stub| {
                // a cc back to a relay party would forward forever
                other.original_sender.as_deref() != Some(stub.permalink.as_str())
                    && other.original_recipient.as_deref() != Some(stub.permalink.as_str())
            })
            .map(|stub| {
                debug!(
                    kind = record.object.kind().label(),
                    recipient = %stub.permalink,
                    original_recipient = %record.to,
                    "cc'ing relationship manager"
                );
                RoutingIntent::object(&stub.permalink, record.object.clone(), other.clone())
            })
            .collect();

        try_join_all(ccs.into_iter().map(|intent| self.host.send(intent))).await?;
        Ok(())
    }

    /// First-employee bootstrap: auto-approve a qualifying onboarding
    /// application once its forms are in.
    ///
    /// Returns the issued pass when a hire happened.
    pub async fn on_forms_collected(
        &self,
        actor: &Actor,
        application: &Application,
    ) -> Result<Option<SignedObject>> {
        if !self.roster.should_auto_hire(actor, application).await? {
            return Ok(None);
        }
        self.roster.hire(actor, application.clone()).await
    }

    /// Grant the employee role when an employee pass is issued.
    pub async fn did_approve_application(
        &self,
        actor: &Actor,
        certificate: &SignedObject,
    ) -> Result<()> {
        if certificate.object_type == tags::EMPLOYEE_PASS {
            self.roster.grant_employee_role(&actor.id).await?;
        }
        Ok(())
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }
}
