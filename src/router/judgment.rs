//! Approve/deny sub-procedure.

use tracing::debug;

use crate::error::{HostError, Result};
use crate::host::{Host, Judgment};
use crate::model::{request_error, simple_message, JudgmentPayload, MessageKind, RoutingIntent};

use super::{MessageRouter, RouteRequest};

impl MessageRouter {
    /// Act on an employee-authored approval or denial.
    ///
    /// Self-approval and already-judged applications come back to the judge
    /// as notices; any other host failure is fatal to this message.
    pub(super) async fn approve_or_deny(&self, req: &RouteRequest) -> Result<Vec<RoutingIntent>> {
        let judgment_object = &req.message.object;
        let approve = judgment_object.kind() == MessageKind::Approval;
        let judge = &req.sender;

        let application = match &req.application {
            Some(application) => application.clone(),
            None => {
                let payload: JudgmentPayload = judgment_object.payload()?;
                self.host.get_application(&payload.application).await?
            }
        };

        if application.applicant_permalink() == judge.id {
            debug!(judge = %judge.id, application = %application.id, "applicant cannot judge their own application");
            let notice = self
                .notify(
                    &judge.id,
                    simple_message("You can't approve or deny your own application."),
                )
                .await?;
            return Ok(vec![notice]);
        }

        let applicant = self
            .host
            .resolve_actor(application.applicant_permalink())
            .await?;

        let judgment = Judgment {
            applicant,
            application: application.clone(),
            judge: Some(judge.id.clone()),
        };

        let result = if approve {
            self.host.approve_application(&judgment).await.map(|_| ())
        } else {
            self.host.deny_application(&judgment).await
        };

        match result {
            Ok(()) => Ok(Vec::new()),
            Err(HostError::Duplicate { id }) => {
                debug!(application = %id, "application was already judged");
                let notice = self
                    .notify(
                        &judge.id,
                        simple_message("This application has already been approved or denied."),
                    )
                    .await?;
                Ok(vec![notice])
            }
            Err(HostError::Aborted { reason }) => {
                let notice = self
                    .notify(
                        &judge.id,
                        request_error("The host could not record your decision.", reason),
                    )
                    .await?;
                Ok(vec![notice])
            }
            Err(err) => Err(err.into()),
        }
    }
}
