//! In-memory reference host.
//!
//! Backs the integration suite: every capability call mutates or reads
//! plain maps behind a mutex, and every delivery is recorded for
//! assertion. Judgment failures (`Duplicate`, `Aborted`) can be staged to
//! exercise the notice paths.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::HostError;
use crate::model::{
    Actor, Application, ApplicationRef, MessageEnvelope, RoutingIntent, SignedObject,
    EMPLOYEE_ONBOARDING,
};

use super::traits::{EditRequest, EmployeePass, Host, ItemRequest, Judgment};

#[derive(Default)]
struct State {
    actors: HashMap<String, Actor>,
    identities: HashMap<String, serde_json::Value>,
    applications: HashMap<String, Application>,
    /// Inbound log, oldest first.
    inbox: Vec<MessageEnvelope>,
    passes: Vec<EmployeePass>,
    judged: HashSet<String>,
    sent: Vec<RoutingIntent>,
    item_requests: Vec<ItemRequest>,
    edit_requests: Vec<EditRequest>,
    abort_next_judgment: bool,
}

/// Host double holding everything in memory.
pub struct InMemoryHost {
    bot_id: String,
    state: Mutex<State>,
}

impl InMemoryHost {
    pub fn new(bot_id: impl Into<String>) -> Self {
        Self {
            bot_id: bot_id.into(),
            state: Mutex::new(State::default()),
        }
    }

    pub async fn add_actor(&self, actor: Actor) {
        let mut state = self.state.lock().await;
        state
            .identities
            .entry(actor.id.clone())
            .or_insert_with(|| serde_json::json!({ "permalink": actor.id }));
        state.actors.insert(actor.id.clone(), actor);
    }

    pub async fn add_application(&self, application: Application) {
        self.state
            .lock()
            .await
            .applications
            .insert(application.id.clone(), application);
    }

    pub async fn record_inbound(&self, envelope: MessageEnvelope) {
        self.state.lock().await.inbox.push(envelope);
    }

    /// Stage an `Aborted` failure for the next judgment call.
    pub async fn abort_next_judgment(&self) {
        self.state.lock().await.abort_next_judgment = true;
    }

    pub async fn sent(&self) -> Vec<RoutingIntent> {
        self.state.lock().await.sent.clone()
    }

    pub async fn item_requests(&self) -> Vec<ItemRequest> {
        self.state.lock().await.item_requests.clone()
    }

    pub async fn edit_requests(&self) -> Vec<EditRequest> {
        self.state.lock().await.edit_requests.clone()
    }

    pub async fn application(&self, id: &str) -> Option<Application> {
        self.state.lock().await.applications.get(id).cloned()
    }

    pub async fn actor(&self, id: &str) -> Option<Actor> {
        self.state.lock().await.actors.get(id).cloned()
    }

    fn certificate_for(&self, application: &Application) -> SignedObject {
        let mut certificate = SignedObject::new(
            format!("My{}", application.request_for),
            serde_json::json!({ "application": { "id": application.id } }),
        );
        certificate.author = Some(self.bot_id.clone());
        certificate.link = Some(Uuid::new_v4().to_string());
        certificate
    }
}

#[async_trait]
impl Host for InMemoryHost {
    async fn send(&self, intent: RoutingIntent) -> Result<(), HostError> {
        self.state.lock().await.sent.push(intent);
        Ok(())
    }

    async fn request_item(&self, request: ItemRequest) -> Result<(), HostError> {
        self.state.lock().await.item_requests.push(request);
        Ok(())
    }

    async fn request_edit(&self, request: EditRequest) -> Result<(), HostError> {
        self.state.lock().await.edit_requests.push(request);
        Ok(())
    }

    async fn resolve_actor(&self, id: &str) -> Result<Actor, HostError> {
        self.state
            .lock()
            .await
            .actors
            .get(id)
            .cloned()
            .ok_or_else(|| HostError::NotFound {
                entity: "actor",
                id: id.to_string(),
            })
    }

    async fn get_identity(&self, permalink: &str) -> Result<serde_json::Value, HostError> {
        self.state
            .lock()
            .await
            .identities
            .get(permalink)
            .cloned()
            .ok_or_else(|| HostError::NotFound {
                entity: "identity",
                id: permalink.to_string(),
            })
    }

    async fn get_application(
        &self,
        reference: &ApplicationRef,
    ) -> Result<Application, HostError> {
        self.state
            .lock()
            .await
            .applications
            .get(&reference.id)
            .cloned()
            .ok_or_else(|| HostError::NotFound {
                entity: "application",
                id: reference.id.clone(),
            })
    }

    async fn find_application_by_context(
        &self,
        context: &str,
    ) -> Result<Option<Application>, HostError> {
        Ok(self
            .state
            .lock()
            .await
            .applications
            .values()
            .find(|application| application.context.as_deref() == Some(context))
            .cloned())
    }

    async fn find_inbound_by_context(
        &self,
        context: &str,
        exclude_author: &str,
    ) -> Result<Option<MessageEnvelope>, HostError> {
        Ok(self
            .state
            .lock()
            .await
            .inbox
            .iter()
            .rev()
            .find(|envelope| {
                envelope.context.as_deref() == Some(context) && envelope.author != exclude_author
            })
            .cloned())
    }

    async fn list_employee_passes(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<EmployeePass>, HostError> {
        let state = self.state.lock().await;
        let active = state.passes.iter().filter(|pass| !pass.revoked).cloned();
        Ok(match limit {
            Some(limit) => active.take(limit).collect(),
            None => active.collect(),
        })
    }

    async fn save_application(&self, application: &Application) -> Result<(), HostError> {
        self.state
            .lock()
            .await
            .applications
            .insert(application.id.clone(), application.clone());
        Ok(())
    }

    async fn approve_application(&self, judgment: &Judgment) -> Result<SignedObject, HostError> {
        let mut state = self.state.lock().await;
        if state.abort_next_judgment {
            state.abort_next_judgment = false;
            return Err(HostError::Aborted {
                reason: "conditional write lost".to_string(),
            });
        }
        if !state.judged.insert(judgment.application.id.clone()) {
            return Err(HostError::Duplicate {
                id: judgment.application.id.clone(),
            });
        }

        let certificate = self.certificate_for(&judgment.application);
        if judgment.application.request_for == EMPLOYEE_ONBOARDING {
            state.passes.push(EmployeePass {
                holder: judgment.applicant.id.clone(),
                revoked: false,
            });
        }
        Ok(certificate)
    }

    async fn deny_application(&self, judgment: &Judgment) -> Result<(), HostError> {
        let mut state = self.state.lock().await;
        if state.abort_next_judgment {
            state.abort_next_judgment = false;
            return Err(HostError::Aborted {
                reason: "conditional write lost".to_string(),
            });
        }
        if !state.judged.insert(judgment.application.id.clone()) {
            return Err(HostError::Duplicate {
                id: judgment.application.id.clone(),
            });
        }
        Ok(())
    }

    async fn revoke_certificate(
        &self,
        holder: &str,
        _application_id: &str,
    ) -> Result<(), HostError> {
        let mut state = self.state.lock().await;
        for pass in state.passes.iter_mut().filter(|pass| pass.holder == holder) {
            pass.revoked = true;
        }
        Ok(())
    }

    async fn grant_role(&self, actor_id: &str, role: &str) -> Result<(), HostError> {
        let mut state = self.state.lock().await;
        let actor = state
            .actors
            .get_mut(actor_id)
            .ok_or_else(|| HostError::NotFound {
                entity: "actor",
                id: actor_id.to_string(),
            })?;
        actor.roles.insert(role.to_string());
        Ok(())
    }

    async fn revoke_role(&self, actor_id: &str, role: &str) -> Result<(), HostError> {
        let mut state = self.state.lock().await;
        let actor = state
            .actors
            .get_mut(actor_id)
            .ok_or_else(|| HostError::NotFound {
                entity: "actor",
                id: actor_id.to_string(),
            })?;
        actor.roles.remove(role);
        Ok(())
    }

    async fn bot_identity(&self) -> Result<String, HostError> {
        Ok(self.bot_id.clone())
    }

    async fn resign(&self, object: &SignedObject) -> Result<SignedObject, HostError> {
        let mut resigned = object.clone();
        resigned.author = Some(self.bot_id.clone());
        resigned.link = Some(Uuid::new_v4().to_string());
        resigned.signature = Some(format!("signed-by-{}", self.bot_id));
        Ok(resigned)
    }
}
