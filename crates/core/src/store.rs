//! The record store abstraction and its in-memory reference implementation.
//!
//! The store is the single shared mutable resource in the system and the
//! final arbiter of email uniqueness: `insert` and `update` re-check the
//! invariant under the write lock, so the orchestrator's `exists_by_email`
//! pre-check is only a fast-path rejection and the check-then-act race is
//! closed here.

use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use crate::error::{ProvisionError, ProvisionResult};
use crate::patient::Patient;

/// Durable keyed storage for patient records.
///
/// All operations are atomic with respect to a single record; no multi-record
/// transactions are offered.
pub trait RecordStore: Send + Sync {
    /// Reports whether any live record holds the given email (exact match).
    fn exists_by_email(&self, email: &str) -> ProvisionResult<bool>;

    /// Persists a new record. Fails with `DuplicateEmail` if another live
    /// record already holds the email, atomically with the uniqueness check.
    fn insert(&self, patient: Patient) -> ProvisionResult<Patient>;

    /// Fetches a record by id, failing with `NotFound` on a miss.
    fn find_by_id(&self, id: Uuid) -> ProvisionResult<Patient>;

    /// Returns an unordered snapshot of all live records.
    fn find_all(&self) -> ProvisionResult<Vec<Patient>>;

    /// Replaces an existing record. Fails with `NotFound` for an unknown id
    /// and with `DuplicateEmail` if the new email collides with another record.
    fn update(&self, patient: Patient) -> ProvisionResult<Patient>;

    /// Removes a record by id, failing with `NotFound` on a miss.
    fn delete(&self, id: Uuid) -> ProvisionResult<()>;
}

/// In-memory `RecordStore` backed by a `RwLock<HashMap>`.
///
/// Each operation takes the lock exactly once, which makes the uniqueness
/// check inside `insert`/`update` atomic with respect to concurrent writers.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RwLock<HashMap<Uuid, Patient>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(_: impl std::fmt::Debug) -> ProvisionError {
    ProvisionError::Store("record store lock poisoned".into())
}

impl RecordStore for InMemoryRecordStore {
    fn exists_by_email(&self, email: &str) -> ProvisionResult<bool> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.values().any(|p| p.email == email))
    }

    fn insert(&self, patient: Patient) -> ProvisionResult<Patient> {
        let mut records = self.records.write().map_err(poisoned)?;

        if records.values().any(|p| p.email == patient.email) {
            return Err(ProvisionError::DuplicateEmail(patient.email));
        }
        if records.contains_key(&patient.id) {
            // Ids are never reused; a collision means the caller is broken.
            return Err(ProvisionError::Store(format!(
                "id {} already allocated",
                patient.id
            )));
        }

        records.insert(patient.id, patient.clone());
        Ok(patient)
    }

    fn find_by_id(&self, id: Uuid) -> ProvisionResult<Patient> {
        let records = self.records.read().map_err(poisoned)?;
        records
            .get(&id)
            .cloned()
            .ok_or(ProvisionError::NotFound(id))
    }

    fn find_all(&self) -> ProvisionResult<Vec<Patient>> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.values().cloned().collect())
    }

    fn update(&self, patient: Patient) -> ProvisionResult<Patient> {
        let mut records = self.records.write().map_err(poisoned)?;

        if !records.contains_key(&patient.id) {
            return Err(ProvisionError::NotFound(patient.id));
        }
        if records
            .values()
            .any(|p| p.id != patient.id && p.email == patient.email)
        {
            return Err(ProvisionError::DuplicateEmail(patient.email));
        }

        records.insert(patient.id, patient.clone());
        Ok(patient)
    }

    fn delete(&self, id: Uuid) -> ProvisionResult<()> {
        let mut records = self.records.write().map_err(poisoned)?;
        records
            .remove(&id)
            .map(|_| ())
            .ok_or(ProvisionError::NotFound(id))
    }
}
