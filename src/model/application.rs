//! Application records and references.

use serde::{Deserialize, Serialize};

use super::actor::IdentityStub;

/// Product type whose approval grants the employee role.
pub const EMPLOYEE_ONBOARDING: &str = "EmployeeOnboarding";

/// Opaque reference to an application owned by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRef {
    pub id: String,
}

impl ApplicationRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A form submitted on an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormStub {
    pub id: String,
}

/// A verification imported onto an application for one of its forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedVerification {
    /// The form the verification covers.
    pub item: FormStub,
    /// Permalink of the verifying party.
    pub verified_by: String,
}

/// A customer's in-flight application, as owned and persisted by the host.
///
/// Relationship managers are a list: an application may have several, and
/// assignment appends. Membership is checked by permalink before appending,
/// so re-assigning an already-assigned RM is a no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub applicant: IdentityStub,
    #[serde(default)]
    pub relationship_managers: Vec<IdentityStub>,
    /// Correlation token grouping the application's message activity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Product the applicant is applying for.
    pub request_for: String,
    #[serde(default)]
    pub forms: Vec<FormStub>,
    #[serde(default)]
    pub verifications_imported: Vec<ImportedVerification>,
}

impl Application {
    pub fn new(
        id: impl Into<String>,
        applicant: IdentityStub,
        request_for: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            applicant,
            relationship_managers: Vec::new(),
            context: None,
            request_for: request_for.into(),
            forms: Vec::new(),
            verifications_imported: Vec::new(),
        }
    }

    pub fn reference(&self) -> ApplicationRef {
        ApplicationRef::new(&self.id)
    }

    pub fn applicant_permalink(&self) -> &str {
        &self.applicant.permalink
    }

    /// Whether the given permalink is already assigned as an RM.
    pub fn has_relationship_manager(&self, permalink: &str) -> bool {
        self.relationship_managers
            .iter()
            .any(|stub| stub.permalink == permalink)
    }
}
