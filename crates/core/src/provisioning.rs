//! The patient provisioning orchestrator.
//!
//! `ProvisioningService` composes the record store, the billing provisioning
//! client, and the change notifier to implement the create/update/delete/list
//! use cases, and owns the policy for what happens when any of the three
//! fails independently:
//!
//! - validation, duplicate, and not-found failures happen before any side
//!   effect and abort the operation;
//! - a billing failure after persistence surfaces to the caller, but the
//!   patient record stays — the record is the source of truth the rest of
//!   the system depends on, and reconciling a missing billing account is an
//!   operational concern;
//! - a publish failure is logged and swallowed: event delivery is
//!   at-most-once and best-effort.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::{ProvisionError, ProvisionResult};
use crate::event::PatientEvent;
use crate::patient::{Patient, PatientDraft};
use crate::store::RecordStore;
use crate::validation::validate_draft;

/// The billing RPC response value. Not persisted here; the billing subsystem
/// owns the account record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingAccount {
    pub account_id: String,
    pub status: String,
}

/// Synchronous request/response call to the external billing subsystem.
///
/// Implementations perform no retries and report every non-success outcome
/// (transport error, timeout, non-`SUCCESS` status) as
/// [`ProvisionError::BillingProvisioning`].
#[tonic::async_trait]
pub trait BillingProvisioner: Send + Sync {
    async fn create_account(
        &self,
        patient_id: Uuid,
        name: &str,
        email: &str,
    ) -> ProvisionResult<BillingAccount>;
}

/// Fire-and-forget publisher of patient lifecycle events.
///
/// Delivery is at-most-once: implementations report a failed hand-off as
/// [`ProvisionError::Publish`] and never retry; a lost event stays lost.
#[tonic::async_trait]
pub trait ChangeNotifier: Send + Sync {
    async fn publish(&self, event: &PatientEvent) -> ProvisionResult<()>;
}

/// Orchestrates patient provisioning across the store, the billing client,
/// and the notifier. Holds no mutable state of its own; collaborators are
/// supplied at construction so tests can substitute doubles.
#[derive(Clone)]
pub struct ProvisioningService {
    store: Arc<dyn RecordStore>,
    billing: Arc<dyn BillingProvisioner>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl ProvisioningService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        billing: Arc<dyn BillingProvisioner>,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Self {
        Self {
            store,
            billing,
            notifier,
        }
    }

    /// Creates a patient record, provisions its billing account, and
    /// announces the creation.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` / `DuplicateEmail` / `Store`: nothing was persisted.
    /// - `BillingProvisioning`: the record **was** persisted and stays; only
    ///   the billing account is missing, and no event is emitted for this
    ///   attempt.
    pub async fn create_patient(&self, draft: PatientDraft) -> ProvisionResult<Patient> {
        let fields = validate_draft(&draft)?;

        // Fast-path rejection; the insert below is the final arbiter.
        if self.store.exists_by_email(fields.email.as_str())? {
            return Err(ProvisionError::DuplicateEmail(fields.email.into_inner()));
        }

        let patient = self.store.insert(Patient::create(fields))?;

        self.billing
            .create_account(patient.id, &patient.name, &patient.email)
            .await?;

        self.emit(PatientEvent::created(&patient)).await;
        Ok(patient)
    }

    /// Replaces every field of an existing record from the draft.
    ///
    /// The email uniqueness re-check runs only when the requested email
    /// differs from the stored one. No billing call is made on update —
    /// billing provisioning happens once, at creation.
    pub async fn update_patient(&self, id: Uuid, draft: PatientDraft) -> ProvisionResult<Patient> {
        let fields = validate_draft(&draft)?;
        let mut patient = self.store.find_by_id(id)?;

        if fields.email.as_str() != patient.email
            && self.store.exists_by_email(fields.email.as_str())?
        {
            return Err(ProvisionError::DuplicateEmail(fields.email.into_inner()));
        }

        patient.apply(fields);
        let patient = self.store.update(patient)?;

        self.emit(PatientEvent::updated(&patient)).await;
        Ok(patient)
    }

    /// Removes a patient record and announces the deletion.
    pub async fn delete_patient(&self, id: Uuid) -> ProvisionResult<()> {
        let patient = self.store.find_by_id(id)?;
        self.store.delete(id)?;

        self.emit(PatientEvent::deleted(&patient)).await;
        Ok(())
    }

    /// Pure read: an unordered snapshot of all patient records.
    pub fn list_patients(&self) -> ProvisionResult<Vec<Patient>> {
        self.store.find_all()
    }

    /// Best-effort event hand-off. A publish failure never fails the
    /// operation that triggered it.
    async fn emit(&self, event: PatientEvent) {
        if let Err(e) = self.notifier.publish(&event).await {
            tracing::warn!(
                "failed to publish {:?} event for patient {}: {}",
                event.event_type,
                event.patient_id,
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use crate::store::InMemoryRecordStore;
    use std::sync::Mutex;

    /// Billing double: records every request, fails on demand.
    #[derive(Default)]
    struct StubBilling {
        fail: bool,
        requests: Mutex<Vec<(Uuid, String, String)>>,
    }

    impl StubBilling {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn requests(&self) -> Vec<(Uuid, String, String)> {
            self.requests.lock().expect("lock should not be poisoned").clone()
        }
    }

    #[tonic::async_trait]
    impl BillingProvisioner for StubBilling {
        async fn create_account(
            &self,
            patient_id: Uuid,
            name: &str,
            email: &str,
        ) -> ProvisionResult<BillingAccount> {
            self.requests
                .lock()
                .expect("lock should not be poisoned")
                .push((patient_id, name.to_owned(), email.to_owned()));

            if self.fail {
                return Err(ProvisionError::BillingProvisioning {
                    patient_id,
                    reason: "stubbed remote failure".into(),
                });
            }
            Ok(BillingAccount {
                account_id: "12345".into(),
                status: "SUCCESS".into(),
            })
        }
    }

    /// Notifier double: records every event, fails on demand.
    #[derive(Default)]
    struct StubNotifier {
        fail: bool,
        events: Mutex<Vec<PatientEvent>>,
    }

    impl StubNotifier {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn events(&self) -> Vec<PatientEvent> {
            self.events.lock().expect("lock should not be poisoned").clone()
        }
    }

    #[tonic::async_trait]
    impl ChangeNotifier for StubNotifier {
        async fn publish(&self, event: &PatientEvent) -> ProvisionResult<()> {
            if self.fail {
                return Err(ProvisionError::Publish("stubbed publish failure".into()));
            }
            self.events
                .lock()
                .expect("lock should not be poisoned")
                .push(event.clone());
            Ok(())
        }
    }

    struct Harness {
        store: Arc<InMemoryRecordStore>,
        billing: Arc<StubBilling>,
        notifier: Arc<StubNotifier>,
        service: ProvisioningService,
    }

    fn harness(billing: StubBilling, notifier: StubNotifier) -> Harness {
        let store = Arc::new(InMemoryRecordStore::new());
        let billing = Arc::new(billing);
        let notifier = Arc::new(notifier);
        let service = ProvisioningService::new(
            store.clone() as Arc<dyn RecordStore>,
            billing.clone() as Arc<dyn BillingProvisioner>,
            notifier.clone() as Arc<dyn ChangeNotifier>,
        );
        Harness {
            store,
            billing,
            notifier,
            service,
        }
    }

    fn healthy_harness() -> Harness {
        harness(StubBilling::default(), StubNotifier::default())
    }

    fn draft(name: &str, email: &str) -> PatientDraft {
        PatientDraft {
            name: name.into(),
            email: email.into(),
            address: "1 Main St".into(),
            date_of_birth: "1990-01-01".into(),
            registered_date: "2024-01-01".into(),
        }
    }

    #[tokio::test]
    async fn creates_with_distinct_emails_yield_distinct_ids() {
        let h = healthy_harness();

        let jane = h
            .service
            .create_patient(draft("Jane Doe", "jane@example.com"))
            .await
            .expect("create should succeed");
        let john = h
            .service
            .create_patient(draft("John Roe", "john@example.com"))
            .await
            .expect("create should succeed");

        assert_ne!(jane.id, john.id);
        assert_eq!(h.service.list_patients().expect("list should succeed").len(), 2);
    }

    #[tokio::test]
    async fn create_scenario_provisions_billing_and_publishes_created_event() {
        let h = healthy_harness();

        let jane = h
            .service
            .create_patient(draft("Jane Doe", "jane@example.com"))
            .await
            .expect("create should succeed");

        assert_eq!(jane.name, "Jane Doe");
        assert_eq!(jane.address, "1 Main St");

        let billing_requests = h.billing.requests();
        assert_eq!(billing_requests.len(), 1, "billing should be called once");
        assert_eq!(
            billing_requests[0],
            (jane.id, "Jane Doe".to_owned(), "jane@example.com".to_owned())
        );

        let events = h.notifier.events();
        assert_eq!(events.len(), 1, "one CREATED event should be published");
        assert_eq!(events[0].event_type, EventKind::Created);
        assert_eq!(events[0].patient_id, jane.id);
    }

    #[tokio::test]
    async fn second_create_with_same_email_fails_and_store_keeps_one_record() {
        let h = healthy_harness();

        h.service
            .create_patient(draft("Jane Doe", "jane@example.com"))
            .await
            .expect("first create should succeed");

        let err = h
            .service
            .create_patient(draft("Other Jane", "jane@example.com"))
            .await
            .expect_err("second create should fail");

        assert!(matches!(err, ProvisionError::DuplicateEmail(_)));
        let patients = h.service.list_patients().expect("list should succeed");
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].name, "Jane Doe");
        assert_eq!(h.billing.requests().len(), 1, "only the winner reaches billing");
    }

    #[tokio::test]
    async fn racing_creates_with_same_email_produce_exactly_one_winner() {
        let h = healthy_harness();

        let (a, b) = tokio::join!(
            h.service.create_patient(draft("Jane Doe", "jane@example.com")),
            h.service.create_patient(draft("Other Jane", "jane@example.com")),
        );

        let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1, "exactly one create should win");
        assert!([a, b]
            .iter()
            .any(|r| matches!(r, Err(ProvisionError::DuplicateEmail(_)))));
        assert_eq!(h.service.list_patients().expect("list should succeed").len(), 1);
    }

    #[tokio::test]
    async fn invalid_draft_reaches_no_collaborator() {
        let h = healthy_harness();

        let err = h
            .service
            .create_patient(draft("Jane Doe", "not-an-email"))
            .await
            .expect_err("invalid draft should fail");

        assert!(matches!(err, ProvisionError::InvalidInput(_)));
        assert!(h.service.list_patients().expect("list should succeed").is_empty());
        assert!(h.billing.requests().is_empty());
        assert!(h.notifier.events().is_empty());
    }

    #[tokio::test]
    async fn billing_failure_keeps_patient_and_publishes_nothing() {
        let h = harness(StubBilling::failing(), StubNotifier::default());

        let err = h
            .service
            .create_patient(draft("Jane Doe", "jane@example.com"))
            .await
            .expect_err("create should surface the billing failure");

        let patient_id = match err {
            ProvisionError::BillingProvisioning { patient_id, .. } => patient_id,
            other => panic!("expected BillingProvisioning, got {other:?}"),
        };

        // The record survives the billing failure and stays retrievable.
        let persisted = h.store.find_by_id(patient_id).expect("patient should be persisted");
        assert_eq!(persisted.email, "jane@example.com");
        assert!(h.notifier.events().is_empty(), "no event for a failed attempt");
    }

    #[tokio::test]
    async fn notifier_failure_never_fails_the_operation() {
        let h = harness(StubBilling::default(), StubNotifier::failing());

        let jane = h
            .service
            .create_patient(draft("Jane Doe", "jane@example.com"))
            .await
            .expect("create should succeed despite publish failure");

        let updated = h
            .service
            .update_patient(jane.id, draft("Jane Q. Doe", "jane@example.com"))
            .await
            .expect("update should succeed despite publish failure");
        assert_eq!(updated.name, "Jane Q. Doe");

        h.service
            .delete_patient(jane.id)
            .await
            .expect("delete should succeed despite publish failure");

        assert!(h.service.list_patients().expect("list should succeed").is_empty());
    }

    #[tokio::test]
    async fn update_replaces_all_fields_and_publishes_updated_event() {
        let h = healthy_harness();

        let jane = h
            .service
            .create_patient(draft("Jane Doe", "jane@example.com"))
            .await
            .expect("create should succeed");

        let mut change = draft("Jane Q. Doe", "janeq@example.com");
        change.address = "2 Side St".into();
        change.date_of_birth = "1991-02-02".into();
        change.registered_date = "2024-06-01".into();

        let updated = h
            .service
            .update_patient(jane.id, change)
            .await
            .expect("update should succeed");

        assert_eq!(updated.id, jane.id, "the id never changes");
        assert_eq!(updated.name, "Jane Q. Doe");
        assert_eq!(updated.email, "janeq@example.com");
        assert_eq!(updated.address, "2 Side St");

        let events = h.notifier.events();
        assert_eq!(events.last().map(|e| e.event_type), Some(EventKind::Updated));
        assert_eq!(h.billing.requests().len(), 1, "no billing call on update");
    }

    #[tokio::test]
    async fn update_keeping_own_email_is_not_a_duplicate() {
        let h = healthy_harness();

        let jane = h
            .service
            .create_patient(draft("Jane Doe", "jane@example.com"))
            .await
            .expect("create should succeed");

        h.service
            .update_patient(jane.id, draft("Jane Q. Doe", "jane@example.com"))
            .await
            .expect("update keeping the same email should succeed");
    }

    #[tokio::test]
    async fn update_to_taken_email_fails_and_leaves_both_records_unchanged() {
        let h = healthy_harness();

        let jane = h
            .service
            .create_patient(draft("Jane Doe", "jane@example.com"))
            .await
            .expect("create should succeed");
        let john = h
            .service
            .create_patient(draft("John Roe", "john@example.com"))
            .await
            .expect("create should succeed");

        let err = h
            .service
            .update_patient(john.id, draft("John Roe", "jane@example.com"))
            .await
            .expect_err("update to a taken email should fail");
        assert!(matches!(err, ProvisionError::DuplicateEmail(_)));

        let jane_after = h.store.find_by_id(jane.id).expect("jane should remain");
        let john_after = h.store.find_by_id(john.id).expect("john should remain");
        assert_eq!(jane_after, jane);
        assert_eq!(john_after, john);
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let h = healthy_harness();

        let err = h
            .service
            .update_patient(Uuid::new_v4(), draft("Ghost", "ghost@example.com"))
            .await
            .expect_err("update of unknown id should fail");

        assert!(matches!(err, ProvisionError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_publishes_deleted_event_with_the_removed_identity() {
        let h = healthy_harness();

        let jane = h
            .service
            .create_patient(draft("Jane Doe", "jane@example.com"))
            .await
            .expect("create should succeed");

        h.service
            .delete_patient(jane.id)
            .await
            .expect("delete should succeed");

        let events = h.notifier.events();
        let deleted = events.last().expect("a DELETED event should be published");
        assert_eq!(deleted.event_type, EventKind::Deleted);
        assert_eq!(deleted.patient_id, jane.id);
        assert_eq!(deleted.email, "jane@example.com");
    }

    #[tokio::test]
    async fn delete_unknown_id_is_not_found_and_store_count_unchanged() {
        let h = healthy_harness();

        h.service
            .create_patient(draft("Jane Doe", "jane@example.com"))
            .await
            .expect("create should succeed");

        let err = h
            .service
            .delete_patient(Uuid::new_v4())
            .await
            .expect_err("delete of unknown id should fail");

        assert!(matches!(err, ProvisionError::NotFound(_)));
        assert_eq!(h.service.list_patients().expect("list should succeed").len(), 1);
    }

    #[tokio::test]
    async fn list_is_a_pure_read() {
        let h = healthy_harness();

        h.service
            .create_patient(draft("Jane Doe", "jane@example.com"))
            .await
            .expect("create should succeed");

        let before_billing = h.billing.requests().len();
        let before_events = h.notifier.events().len();

        let patients = h.service.list_patients().expect("list should succeed");
        assert_eq!(patients.len(), 1);
        assert_eq!(h.billing.requests().len(), before_billing);
        assert_eq!(h.notifier.events().len(), before_events);
    }
}
