//! RM-assignment sub-procedure.

use tracing::debug;

use crate::error::Result;
use crate::host::Host;
use crate::model::{
    introduction, simple_message, verification_for, Actor, ActorOrId, Application,
    AssignmentPayload, RoutingIntent, SendMetadata, SignedObject,
};

use super::{MessageRouter, RouteRequest};

impl MessageRouter {
    /// Handle an employee-authored `AssignRelationshipManager` instrument.
    pub(super) async fn maybe_assign_relationship_manager(
        &self,
        req: &RouteRequest,
    ) -> Result<Vec<RoutingIntent>> {
        if !req.sender.is_employee() {
            debug!(
                sender = %req.sender.id,
                "refusing to assign relationship manager: sender is not an employee"
            );
            return Ok(Vec::new());
        }

        let instrument = &req.message.object;
        let payload: AssignmentPayload = instrument.payload()?;

        let application = match &req.application {
            Some(application) => application.clone(),
            None => match self.host.get_application(&payload.application).await {
                Ok(application) => application,
                Err(err) if err.is_not_found() => {
                    debug!(
                        application = %payload.application.id,
                        "assignment names an unknown application"
                    );
                    return Ok(Vec::new());
                }
                Err(err) => return Err(err.into()),
            },
        };

        // an employee may assign themselves; skip the redundant lookup
        let relationship_manager = if payload.employee.permalink == req.sender.id {
            ActorOrId::from(req.sender.clone())
        } else {
            ActorOrId::from(payload.employee.permalink.clone())
        };

        self.assign_relationship_manager(application, relationship_manager, instrument)
            .await
    }

    /// Attach an RM to an application and introduce the parties.
    ///
    /// Idempotent on the `(application, rm)` pair. The membership check is
    /// best-effort: two concurrent assignments of the same RM can both pass
    /// it before either write lands.
    pub(super) async fn assign_relationship_manager(
        &self,
        mut application: Application,
        relationship_manager: ActorOrId,
        instrument: &SignedObject,
    ) -> Result<Vec<RoutingIntent>> {
        let rm_permalink = relationship_manager.permalink().to_string();

        if rm_permalink == application.applicant_permalink() {
            debug!(
                applicant = %rm_permalink,
                application = %application.id,
                "refusing assignment: applicant cannot be their own relationship manager"
            );
            let notice = self
                .notify(
                    application.applicant_permalink(),
                    simple_message("You can't be your own relationship manager."),
                )
                .await?;
            return Ok(vec![notice]);
        }

        if application.has_relationship_manager(&rm_permalink) {
            debug!(
                rm = %rm_permalink,
                application = %application.id,
                "ignoring request to assign existing relationship manager"
            );
            return Ok(Vec::new());
        }

        let (applicant, relationship_manager) = futures::try_join!(
            ActorOrId::from(application.applicant_permalink().to_string()).resolve(&*self.host),
            relationship_manager.resolve(&*self.host),
        )?;

        debug!(
            rm = %relationship_manager.id,
            applicant = %applicant.id,
            application = %application.id,
            "assigning relationship manager"
        );
        application
            .relationship_managers
            .push(relationship_manager.identity_stub());

        let context = application.context.clone();
        let (mut intents, verification) = futures::try_join!(
            self.mutually_introduce(&applicant, &relationship_manager, context.clone()),
            self.send_verification(&relationship_manager.id, instrument, context.clone()),
        )?;
        intents.push(verification);

        self.host.save_application(&application).await?;
        Ok(intents)
    }

    /// Send each party the other's identity record.
    async fn mutually_introduce(
        &self,
        a: &Actor,
        b: &Actor,
        context: Option<String>,
    ) -> Result<Vec<RoutingIntent>> {
        let (a_identity, b_identity) = futures::try_join!(
            self.host.get_identity(&a.id),
            self.host.get_identity(&b.id),
        )?;

        let other = SendMetadata::default().with_context(context);
        let to_a = RoutingIntent::object(&a.id, introduction(b, &b_identity), other.clone());
        let to_b = RoutingIntent::object(&b.id, introduction(a, &a_identity), other);

        let intents = vec![to_a, to_b];
        self.dispatch(&intents).await?;
        Ok(intents)
    }

    /// Send the RM a verification wrapping the assignment instrument.
    async fn send_verification(
        &self,
        to: &str,
        instrument: &SignedObject,
        context: Option<String>,
    ) -> Result<RoutingIntent> {
        let intent = RoutingIntent::object(
            to,
            verification_for(instrument),
            SendMetadata::default().with_context(context),
        );
        self.host.send(intent.clone()).await?;
        Ok(intent)
    }
}
