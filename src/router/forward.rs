//! Explicit-forward and context-discovery sub-procedures.

use tracing::debug;

use crate::config::ForwardPolicy;
use crate::error::Result;
use crate::host::Host;
use crate::model::{RoutingIntent, SendMetadata};

use super::{MessageRouter, RouteRequest};

impl MessageRouter {
    /// Honor a message's explicit `forward` field.
    ///
    /// Forwarding must terminate at or originate from an employee: an
    /// employee sender may forward anywhere but to the bot itself, a
    /// customer sender only to an employee. Refusals are silent.
    pub(super) async fn forward_explicit(
        &self,
        req: &RouteRequest,
        forward: &str,
    ) -> Result<Vec<RoutingIntent>> {
        let kind = req.message.object.kind();

        if req.sender.is_employee() {
            let bot = self.host.bot_identity().await?;
            if bot == forward {
                debug!(kind = kind.label(), "not forwarding to self");
                return Ok(Vec::new());
            }

            if !self
                .policy()
                .should_forward_from_employee(&req.sender, &req.message, forward)
                .await
            {
                debug!(
                    kind = kind.label(),
                    sender = %req.sender.id,
                    recipient = forward,
                    "policy declined forward from employee"
                );
                return Ok(Vec::new());
            }

            debug!(
                kind = kind.label(),
                context = req.message.context.as_deref(),
                author = %req.sender.id,
                recipient = forward,
                "forwarding to customer named in message forward"
            );
            let intent = self.resign_and_forward(req, forward, &bot).await?;
            return Ok(vec![intent]);
        }

        let recipient = match self.host.resolve_actor(forward).await {
            Ok(recipient) => recipient,
            Err(err) if err.is_not_found() => {
                debug!(recipient = forward, "forward target not found");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        if !recipient.is_employee() {
            debug!(
                sender = %req.sender.id,
                recipient = forward,
                "refusing to forward: neither sender nor recipient is an employee"
            );
            return Ok(Vec::new());
        }

        if !self
            .policy()
            .should_forward_to_employee(&req.sender, &req.message, forward)
            .await
        {
            debug!(
                kind = kind.label(),
                sender = %req.sender.id,
                recipient = forward,
                "policy declined forward to employee"
            );
            return Ok(Vec::new());
        }

        debug!(
            kind = kind.label(),
            context = req.message.context.as_deref(),
            author = %req.sender.id,
            recipient = forward,
            "forwarding to employee named in message forward"
        );
        // addressed to an employee: routed, not vouched for — no re-sign
        let intent = self.employee_relay_intent(req, forward);
        self.host.send(intent.clone()).await?;
        Ok(vec![intent])
    }

    /// Relay on an employee's behalf, re-signing under the bot's identity
    /// unless the object is already the bot's own.
    async fn resign_and_forward(
        &self,
        req: &RouteRequest,
        to: &str,
        bot: &str,
    ) -> Result<RoutingIntent> {
        let object = &req.message.object;
        let outbound = if object.author.as_deref() == Some(bot) {
            debug!("not re-signing, original is already signed by the bot");
            object.clone()
        } else {
            debug!(kind = object.kind().label(), recipient = to, "re-signing before forwarding");
            self.host.resign(object).await?
        };

        let other = SendMetadata::from_sender(&req.sender.id)
            .with_context(req.message.context.clone());
        let intent = RoutingIntent::object(to, outbound, other);
        self.host.send(intent.clone()).await?;
        Ok(intent)
    }

    /// Guess a forward target from the message context.
    ///
    /// Looks for the latest inbound message sharing the context authored by
    /// someone else; forwards only when that author is an employee. Every
    /// miss is non-fatal — this is a heuristic fallback, not a guaranteed
    /// routing path.
    pub(super) async fn forward_by_context(&self, req: &RouteRequest) -> Result<Vec<RoutingIntent>> {
        // never guess a target for an employee sender
        if req.sender.is_employee() {
            return Ok(Vec::new());
        }
        let Some(context) = req.message.context.clone() else {
            return Ok(Vec::new());
        };

        let last = match self.host.find_inbound_by_context(&context, &req.sender.id).await {
            Ok(Some(envelope)) => envelope,
            Ok(None) => {
                debug!(context = %context, "no prior message for context");
                return Ok(Vec::new());
            }
            Err(err) => {
                debug!(context = %context, error = %err, "failed to determine forward target by context");
                return Ok(Vec::new());
            }
        };

        let candidate = match self.host.resolve_actor(&last.author).await {
            Ok(candidate) => candidate,
            Err(err) if err.is_not_found() => {
                debug!(author = %last.author, "context candidate no longer resolvable");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        if !candidate.is_employee() {
            return Ok(Vec::new());
        }

        debug!(
            kind = req.message.object.kind().label(),
            context = %context,
            author = %req.sender.id,
            recipient = %candidate.id,
            "forwarding to employee guessed from context"
        );
        let mut intent = self.employee_relay_intent(req, &candidate.id);
        intent.other.context = Some(context);
        self.host.send(intent.clone()).await?;
        Ok(vec![intent])
    }
}
