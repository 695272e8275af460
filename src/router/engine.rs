//! The core `route` decision procedure.
//!
//! Branches are evaluated in precedence order; the first match wins:
//! 1. employee judgment (approval/denial) on a known application
//! 2. employee verification — deferred to the host's default import
//! 3. employee form request / form error — relayed to the applicant
//! 4. employee RM assignment
//! 5. employee share request
//! 6. explicit `forward` field (suppresses default delivery)
//! 7. no application — context-based employee discovery
//! 8. default relay: customer message to the application's RMs

use tracing::debug;

use crate::error::Result;
use crate::host::{EditRequest, Host, ItemRequest};
use crate::model::{MessageKind, RoutingIntent, SendMetadata, SharePayload};

use super::{MessageRouter, RouteOutcome, RouteRequest};

impl MessageRouter {
    /// Route one inbound message.
    pub async fn route(&self, req: &RouteRequest) -> Result<RouteOutcome> {
        let kind = req.message.object.kind();
        debug!(
            kind = kind.label(),
            sender = %req.sender.id,
            forward = req.message.forward.as_deref(),
            original_sender = req.message.original_sender.as_deref(),
            "routing inbound message"
        );

        if req.sender.is_employee() {
            match (kind, &req.application) {
                (MessageKind::Approval | MessageKind::Denial, _) => {
                    let intents = self.approve_or_deny(req).await?;
                    return Ok(RouteOutcome::handled(intents));
                }
                // the host's default verification import handles these
                (MessageKind::Verification, Some(_)) => {
                    return Ok(RouteOutcome::passthrough(Vec::new()));
                }
                (MessageKind::FormRequest, Some(application)) => {
                    self.host
                        .request_item(ItemRequest {
                            user: application.applicant_permalink().to_string(),
                            application_id: application.id.clone(),
                            item: req.message.object.unsigned(),
                            other: SendMetadata::from_sender(&req.sender.id),
                        })
                        .await?;
                    return Ok(RouteOutcome::handled(Vec::new()));
                }
                (MessageKind::FormError, Some(application)) => {
                    self.host
                        .request_edit(EditRequest {
                            user: application.applicant_permalink().to_string(),
                            application_id: application.id.clone(),
                            details: req.message.object.unsigned(),
                            other: SendMetadata::from_sender(&req.sender.id),
                        })
                        .await?;
                    return Ok(RouteOutcome::handled(Vec::new()));
                }
                (MessageKind::AssignRelationshipManager, _) => {
                    let intents = self.maybe_assign_relationship_manager(req).await?;
                    return Ok(RouteOutcome::handled(intents));
                }
                (MessageKind::ShareRequest, _) => {
                    let intents = self.share(req).await?;
                    return Ok(RouteOutcome::handled(intents));
                }
                _ => {}
            }
        }

        if let Some(forward) = req.message.forward.clone() {
            let intents = self.forward_explicit(req, &forward).await?;
            // forwarding suppresses default delivery regardless of outcome
            debug!("preventing further processing of forwarded message");
            return Ok(RouteOutcome::handled(intents));
        }

        let Some(application) = &req.application else {
            let intents = self.forward_by_context(req).await?;
            return Ok(RouteOutcome::passthrough(intents));
        };

        // default relay runs customer → RM only
        if req.sender.is_employee() {
            return Ok(RouteOutcome::passthrough(Vec::new()));
        }

        let mut application = application.clone();
        if application.relationship_managers.is_empty()
            && self.config.auto_assign_rm
            && let Some(pick) = self.roster.choose_relationship_manager().await?
        {
            match self.host.resolve_actor(&pick).await {
                Ok(rm) => {
                    debug!(rm = %rm.id, applicant = %application.applicant_permalink(), "auto-assigning relationship manager");
                    application.relationship_managers.push(rm.identity_stub());
                    self.host.save_application(&application).await?;
                }
                Err(err) if err.is_not_found() => {
                    debug!(rm = %pick, "auto-assignment candidate no longer resolvable");
                }
                Err(err) => return Err(err.into()),
            }
        }

        let intents: Vec<RoutingIntent> = application
            .relationship_managers
            .iter()
            .map(|stub| {
                debug!(
                    kind = kind.label(),
                    context = req.message.context.as_deref(),
                    author = %req.sender.id,
                    recipient = %stub.permalink,
                    "forwarding to relationship manager"
                );
                self.employee_relay_intent(req, &stub.permalink)
            })
            .collect();
        self.dispatch(&intents).await?;

        Ok(RouteOutcome::passthrough(intents))
    }

    /// Share each requested link with each requested recipient.
    pub(super) async fn share(&self, req: &RouteRequest) -> Result<Vec<RoutingIntent>> {
        let payload: SharePayload = req.message.object.payload()?;
        debug!(
            links = payload.links.len(),
            recipients = payload.recipients.len(),
            "processing share request"
        );

        let other =
            SendMetadata::from_sender(&req.sender.id).with_context(req.message.context.clone());
        let intents: Vec<RoutingIntent> = payload
            .links
            .iter()
            .flat_map(|link| {
                let other = other.clone();
                payload
                    .recipients
                    .iter()
                    .map(move |recipient| RoutingIntent::link(&recipient.permalink, link, other.clone()))
            })
            .collect();
        self.dispatch(&intents).await?;
        Ok(intents)
    }
}
