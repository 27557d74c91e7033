//! Patient lifecycle events.
//!
//! One event is emitted per successful mutation and consumed by external
//! systems; this crate never reads them back. Events for the same patient are
//! keyed by `patient_id` downstream so a consumer sees them in emission order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::patient::Patient;

/// The kind of lifecycle change an event announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Created,
    Updated,
    Deleted,
}

/// An immutable notification value describing one patient mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientEvent {
    pub event_type: EventKind,
    pub patient_id: Uuid,
    pub name: String,
    pub email: String,
    pub timestamp: DateTime<Utc>,
}

impl PatientEvent {
    fn new(event_type: EventKind, patient: &Patient) -> Self {
        Self {
            event_type,
            patient_id: patient.id,
            name: patient.name.clone(),
            email: patient.email.clone(),
            timestamp: Utc::now(),
        }
    }

    pub fn created(patient: &Patient) -> Self {
        Self::new(EventKind::Created, patient)
    }

    pub fn updated(patient: &Patient) -> Self {
        Self::new(EventKind::Updated, patient)
    }

    pub fn deleted(patient: &Patient) -> Self {
        Self::new(EventKind::Deleted, patient)
    }
}
