//! Employee lifecycle: onboarding, role grants, revocation, and the roster
//! queries the router leans on.
//!
//! Employee status is derived from role-tag membership on an actor
//! snapshot; the roster itself is derived from the host's active
//! employee-pass credentials. Nothing here caches either.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::try_join_all;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::config::PluginConfig;
use crate::error::{Result, RosterError};
use crate::host::{EmployeePass, Host, Judgment};
use crate::model::{Actor, Application, SignedObject, EMPLOYEE_ONBOARDING, EMPLOYEE_ROLE};

/// Queries and mutations over the employee roster.
pub struct Roster {
    host: Arc<dyn Host>,
    config: PluginConfig,
}

impl Roster {
    pub fn new(host: Arc<dyn Host>, config: PluginConfig) -> Self {
        Self { host, config }
    }

    /// Active employee passes.
    pub async fn list_employees(&self, limit: Option<usize>) -> Result<Vec<EmployeePass>> {
        Ok(self.host.list_employee_passes(limit).await?)
    }

    pub async fn has_employees(&self) -> Result<bool> {
        Ok(!self.list_employees(Some(1)).await?.is_empty())
    }

    /// Pick a uniformly random employee for auto-assignment.
    pub async fn choose_relationship_manager(&self) -> Result<Option<String>> {
        let employees = self.list_employees(None).await?;
        Ok(employees
            .choose(&mut rand::thread_rng())
            .map(|pass| pass.holder.clone()))
    }

    /// Whether a just-collected application qualifies for auto-approval.
    ///
    /// The first employee-onboarding application ever submitted is always
    /// approved — the system must never wait on an employee to approve the
    /// first employee. `approve_all_employee_applications` widens that to
    /// every onboarding application.
    pub async fn should_auto_hire(&self, actor: &Actor, application: &Application) -> Result<bool> {
        if actor.is_employee() || application.request_for != EMPLOYEE_ONBOARDING {
            return Ok(false);
        }
        if self.config.approve_all_employee_applications {
            return Ok(true);
        }
        Ok(!self.has_employees().await?)
    }

    /// Approve an actor's employee-onboarding application.
    ///
    /// Returns the issued pass, or `None` when the actor already holds the
    /// employee role.
    pub async fn hire(
        &self,
        actor: &Actor,
        application: Application,
    ) -> Result<Option<SignedObject>> {
        if actor.is_employee() {
            debug!(actor = %actor.id, "actor is already an employee");
            return Ok(None);
        }

        let judgment = Judgment {
            applicant: actor.clone(),
            application,
            judge: None,
        };
        let pass = self.host.approve_application(&judgment).await?;
        Ok(Some(pass))
    }

    /// Revoke an actor's employee status: drop the role tag and revoke the
    /// certificate behind it.
    ///
    /// `application_id` selects which approved onboarding application to
    /// revoke; with `None` the actor's (first) approved onboarding
    /// application is used.
    pub async fn fire(&self, actor: &Actor, application_id: Option<&str>) -> Result<()> {
        if !actor.is_employee() {
            return Err(RosterError::NotAnEmployee {
                id: actor.id.clone(),
            }
            .into());
        }

        let approved = actor
            .applications_approved
            .iter()
            .find(|stub| match application_id {
                Some(id) => stub.id == id,
                None => stub.request_for == EMPLOYEE_ONBOARDING,
            })
            .ok_or_else(|| RosterError::NoOnboardingApplication {
                id: actor.id.clone(),
            })?;

        debug!(actor = %actor.id, application = %approved.id, "revoking employee status");
        self.host.revoke_role(&actor.id, EMPLOYEE_ROLE).await?;
        self.host.revoke_certificate(&actor.id, &approved.id).await?;
        Ok(())
    }

    /// Grant the employee role tag — called when an employee pass is
    /// approved.
    pub async fn grant_employee_role(&self, actor_id: &str) -> Result<()> {
        debug!(actor = actor_id, "granting employee role");
        Ok(self.host.grant_role(actor_id, EMPLOYEE_ROLE).await?)
    }

    /// Drop the employee role tag — called when an employee pass is
    /// revoked.
    pub async fn revoke_employee_role(&self, actor_id: &str) -> Result<()> {
        debug!(actor = actor_id, "revoking employee role");
        Ok(self.host.revoke_role(actor_id, EMPLOYEE_ROLE).await?)
    }

    /// Whether every submitted form on the application carries at least one
    /// verification imported from an employee.
    pub async fn all_forms_verified_by_employees(
        &self,
        application: &Application,
    ) -> Result<bool> {
        if application.forms.is_empty() {
            return Ok(true);
        }

        let verifier_ids: HashSet<&str> = application
            .verifications_imported
            .iter()
            .map(|verification| verification.verified_by.as_str())
            .collect();

        let verifiers: HashMap<String, Actor> =
            try_join_all(verifier_ids.iter().map(|id| self.host.resolve_actor(id)))
                .await?
                .into_iter()
                .map(|actor| (actor.id.clone(), actor))
                .collect();

        Ok(application.forms.iter().all(|form| {
            application
                .verifications_imported
                .iter()
                .filter(|verification| verification.item.id == form.id)
                .any(|verification| {
                    verifiers
                        .get(&verification.verified_by)
                        .is_some_and(Actor::is_employee)
                })
        }))
    }
}
