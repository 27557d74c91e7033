//! Patient records and the inbound draft payload.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::ValidatedDraft;

/// A persisted patient record.
///
/// The `id` is assigned at creation and never changes; `email` is unique
/// across all live records (case-sensitive exact match).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub address: String,
    pub date_of_birth: NaiveDate,
    pub registered_date: NaiveDate,
}

impl Patient {
    /// Builds a new patient record from validated fields, assigning a fresh id.
    pub fn create(fields: ValidatedDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: fields.name.into_inner(),
            email: fields.email.into_inner(),
            address: fields.address,
            date_of_birth: fields.date_of_birth,
            registered_date: fields.registered_date,
        }
    }

    /// Replaces every mutable field from validated fields. The id is kept.
    pub fn apply(&mut self, fields: ValidatedDraft) {
        self.name = fields.name.into_inner();
        self.email = fields.email.into_inner();
        self.address = fields.address;
        self.date_of_birth = fields.date_of_birth;
        self.registered_date = fields.registered_date;
    }
}

/// The unvalidated inbound patient payload.
///
/// Dates are ISO `YYYY-MM-DD` strings; validation happens in
/// [`crate::validation::validate_draft`] before any side effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientDraft {
    pub name: String,
    pub email: String,
    pub address: String,
    pub date_of_birth: String,
    pub registered_date: String,
}
