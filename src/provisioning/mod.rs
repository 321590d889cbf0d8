pub mod policy;
pub mod saga;

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::db::{ProjectStore, StoreError};
use crate::middleware::audit;
use crate::models::Project;
use crate::registrar::{DomainRegistrar, RegistrarError};

pub use policy::{ProjectInput, ProjectPolicy, ValidationError};
pub use saga::{Compensation, InvalidTransition, Saga, SagaState};

const STEP_RESERVE_DOMAIN: &str = "reserve_domain";
const STEP_PERSIST_PROJECT: &str = "persist_project";

/// A committed project and the registrar's confirmation for its domain.
#[derive(Debug, Serialize)]
pub struct Provisioned {
    pub project: Project,
    pub domain: serde_json::Value,
}

#[derive(Debug)]
pub enum ProvisionError {
    Invalid(ValidationError),
    /// The registrar refused the domain; nothing was persisted.
    DomainRejected(String),
    /// Slug or domain already taken at commit time; the domain was released.
    Conflict,
    /// The registrar could not be reached while reserving.
    Registrar(RegistrarError),
    /// Persisting failed for a reason other than a conflict; the domain was released.
    Store(StoreError),
    Saga(InvalidTransition),
}

impl std::fmt::Display for ProvisionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProvisionError::Invalid(err) => write!(f, "Invalid project: {err:?}"),
            ProvisionError::DomainRejected(msg) => write!(f, "Domain rejected: {msg}"),
            ProvisionError::Conflict => write!(f, "Project slug already exists"),
            ProvisionError::Registrar(err) => write!(f, "{err}"),
            ProvisionError::Store(err) => write!(f, "{err}"),
            ProvisionError::Saga(err) => write!(f, "{err}"),
        }
    }
}

impl From<InvalidTransition> for ProvisionError {
    fn from(err: InvalidTransition) -> Self {
        ProvisionError::Saga(err)
    }
}

/// Creates projects: validate, reserve the domain, persist, and undo the
/// reservation when persisting fails.
pub struct Provisioner {
    store: Arc<dyn ProjectStore>,
    registrar: Arc<dyn DomainRegistrar>,
    policy: Arc<ProjectPolicy>,
}

impl Provisioner {
    pub fn new(
        store: Arc<dyn ProjectStore>,
        registrar: Arc<dyn DomainRegistrar>,
        policy: Arc<ProjectPolicy>,
    ) -> Self {
        Self {
            store,
            registrar,
            policy,
        }
    }

    pub async fn provision(
        &self,
        user_id: Uuid,
        input: &ProjectInput,
    ) -> Result<Provisioned, ProvisionError> {
        let mut saga = Saga::new();
        let result = self.run(&mut saga, user_id, input).await;
        debug_assert!(saga.state().is_terminal() || matches!(result, Err(ProvisionError::Saga(_))));

        match &result {
            Ok(provisioned) => tracing::info!(
                project_id = %provisioned.project.id,
                slug = %provisioned.project.slug,
                trail = ?saga.trail(),
                "Project provisioned"
            ),
            Err(err) => tracing::debug!(trail = ?saga.trail(), "Project not provisioned: {err}"),
        }
        result
    }

    async fn run(
        &self,
        saga: &mut Saga,
        user_id: Uuid,
        input: &ProjectInput,
    ) -> Result<Provisioned, ProvisionError> {
        let new_project = match self.policy.validate(input) {
            Ok(project) => project,
            Err(err) => {
                saga.advance(SagaState::Rejected)?;
                return Err(ProvisionError::Invalid(err));
            }
        };

        saga.advance(SagaState::ReservingDomain)?;
        let confirmation = match self.registrar.add_domain(&new_project.domain).await {
            Ok(confirmation) => confirmation,
            Err(RegistrarError::Rejected(msg)) => {
                saga.advance(SagaState::Rejected)?;
                return Err(ProvisionError::DomainRejected(msg));
            }
            Err(err) => {
                saga.advance(SagaState::Faulted)?;
                return Err(ProvisionError::Registrar(err));
            }
        };
        saga.complete_step(
            STEP_RESERVE_DOMAIN,
            Some(Compensation::ReleaseDomain {
                domain: new_project.domain.clone(),
            }),
        );

        saga.advance(SagaState::Persisting)?;
        match self.store.create_with_owner(&new_project, user_id).await {
            Ok(project) => {
                saga.complete_step(STEP_PERSIST_PROJECT, None);
                saga.advance(SagaState::Committed)?;

                audit::log_event(
                    self.store.as_ref(),
                    Some(user_id),
                    "project.created",
                    "project",
                    Some(project.id),
                    Some(json!({ "slug": project.slug, "domain": project.domain })),
                )
                .await;

                Ok(Provisioned {
                    project,
                    domain: confirmation,
                })
            }
            Err(err) => {
                saga.advance(SagaState::Compensating)?;
                self.compensate(saga, user_id).await;

                if err.is_conflict() {
                    saga.advance(SagaState::Rejected)?;
                    Err(ProvisionError::Conflict)
                } else {
                    saga.advance(SagaState::Faulted)?;
                    Err(ProvisionError::Store(err))
                }
            }
        }
    }

    /// Best effort: a failed undo is logged and audited, never retried, and
    /// does not change the outcome reported to the caller.
    async fn compensate(&self, saga: &mut Saga, user_id: Uuid) {
        for (step, compensation) in saga.take_compensations() {
            match compensation {
                Compensation::ReleaseDomain { domain } => {
                    match self.registrar.remove_domain(&domain).await {
                        Ok(()) => tracing::info!(%domain, step, "Released domain after failed provisioning"),
                        Err(err) => {
                            tracing::error!(%domain, step, "Compensating domain release failed: {err}");
                            audit::log_event(
                                self.store.as_ref(),
                                Some(user_id),
                                "domain.release_failed",
                                "domain",
                                None,
                                Some(json!({ "domain": domain, "error": err.to_string() })),
                            )
                            .await;
                        }
                    }
                }
            }
        }
    }
}
