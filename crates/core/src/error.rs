use uuid::Uuid;

/// Error taxonomy for patient provisioning.
///
/// Every variant maps to one stable, user-visible error kind. The first four
/// mean "nothing happened"; `BillingProvisioning` means the patient record
/// exists but the downstream billing account does not. `Publish` is never
/// surfaced to callers of the orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("invalid patient data: {0}")]
    InvalidInput(String),
    #[error("a patient with email {0} already exists")]
    DuplicateEmail(String),
    #[error("no patient found with id {0}")]
    NotFound(Uuid),
    #[error("record store failure: {0}")]
    Store(String),
    #[error("billing provisioning failed for patient {patient_id}: {reason}")]
    BillingProvisioning { patient_id: Uuid, reason: String },
    #[error("failed to publish patient event: {0}")]
    Publish(String),
}

pub type ProvisionResult<T> = std::result::Result<T, ProvisionError>;
