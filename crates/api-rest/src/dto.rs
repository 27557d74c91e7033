//! Request and response shapes for the REST surface.

use enrol_core::{Patient, PatientDraft};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Inbound patient payload. Dates are ISO `YYYY-MM-DD` strings; validation
/// happens in the core, before any side effect.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PatientRequest {
    pub name: String,
    pub email: String,
    pub address: String,
    pub date_of_birth: String,
    pub registered_date: String,
}

impl From<PatientRequest> for PatientDraft {
    fn from(req: PatientRequest) -> Self {
        PatientDraft {
            name: req.name,
            email: req.email,
            address: req.address,
            date_of_birth: req.date_of_birth,
            registered_date: req.registered_date,
        }
    }
}

/// Outbound patient representation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PatientResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub address: String,
    pub date_of_birth: String,
    pub registered_date: String,
}

impl From<Patient> for PatientResponse {
    fn from(patient: Patient) -> Self {
        PatientResponse {
            id: patient.id.to_string(),
            name: patient.name,
            email: patient.email,
            address: patient.address,
            date_of_birth: patient.date_of_birth.to_string(),
            registered_date: patient.registered_date.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListPatientsRes {
    pub patients: Vec<PatientResponse>,
}

/// Structured error payload: a stable machine-readable kind plus a
/// human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}
