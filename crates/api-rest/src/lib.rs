//! REST API for the Enrol patient provisioning service.
//!
//! ## Purpose
//! Exposes the provisioning orchestrator over HTTP with OpenAPI/Swagger
//! documentation. This crate builds the router; the workspace's `enrol-run`
//! binary binds and serves it.

use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use api_shared::health::HealthRes;
use api_shared::HealthService;
use enrol_core::ProvisioningService;

pub mod dto;
pub mod error;

use dto::{ErrorBody, ListPatientsRes, PatientRequest, PatientResponse};
use error::error_response;

/// Application state shared across REST API handlers
///
/// Holds the provisioning orchestrator used by every patient endpoint.
#[derive(Clone)]
pub struct AppState {
    pub provisioning: ProvisioningService,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, list_patients, create_patient, update_patient, delete_patient),
    components(schemas(
        HealthRes,
        PatientRequest,
        PatientResponse,
        ListPatientsRes,
        ErrorBody
    ))
)]
struct ApiDoc;

/// Builds the REST router with all patient routes, Swagger UI, and CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/patients", get(list_patients))
        .route("/patients", post(create_patient))
        .route("/patients/:id", put(update_patient))
        .route("/patients/:id", delete(delete_patient))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/patients",
    responses(
        (status = 200, description = "List of patients", body = ListPatientsRes),
        (status = 500, description = "Record store failure", body = ErrorBody)
    )
)]
/// List all patients in the system
///
/// Pure read through the record store; no billing call and no event are
/// triggered by listing.
#[axum::debug_handler]
async fn list_patients(
    State(state): State<AppState>,
) -> Result<Json<ListPatientsRes>, (StatusCode, Json<ErrorBody>)> {
    let patients = state
        .provisioning
        .list_patients()
        .map_err(|e| error_response("List patients", e))?;

    Ok(Json(ListPatientsRes {
        patients: patients.into_iter().map(PatientResponse::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/patients",
    request_body = PatientRequest,
    responses(
        (status = 201, description = "Patient created", body = PatientResponse),
        (status = 400, description = "Invalid patient payload", body = ErrorBody),
        (status = 409, description = "Email already in use", body = ErrorBody),
        (status = 502, description = "Patient created but billing provisioning failed", body = ErrorBody),
        (status = 500, description = "Record store failure", body = ErrorBody)
    )
)]
/// Create a new patient record
///
/// Persists the patient, provisions a billing account for it, and announces
/// the creation to the event stream. A 502 means the patient record exists
/// but the billing account could not be provisioned.
#[axum::debug_handler]
async fn create_patient(
    State(state): State<AppState>,
    Json(req): Json<PatientRequest>,
) -> Result<(StatusCode, Json<PatientResponse>), (StatusCode, Json<ErrorBody>)> {
    let patient = state
        .provisioning
        .create_patient(req.into())
        .await
        .map_err(|e| error_response("Create patient", e))?;

    Ok((StatusCode::CREATED, Json(PatientResponse::from(patient))))
}

#[utoipa::path(
    put,
    path = "/patients/{id}",
    request_body = PatientRequest,
    params(
        ("id" = String, Path, description = "Patient id")
    ),
    responses(
        (status = 200, description = "Patient updated", body = PatientResponse),
        (status = 400, description = "Invalid patient payload", body = ErrorBody),
        (status = 404, description = "Unknown patient id", body = ErrorBody),
        (status = 409, description = "Email already in use", body = ErrorBody),
        (status = 500, description = "Record store failure", body = ErrorBody)
    )
)]
/// Update an existing patient record
///
/// Replaces every field from the payload. No billing call is made on
/// update; billing provisioning happens once, at creation.
#[axum::debug_handler]
async fn update_patient(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
    Json(req): Json<PatientRequest>,
) -> Result<Json<PatientResponse>, (StatusCode, Json<ErrorBody>)> {
    let patient = state
        .provisioning
        .update_patient(id, req.into())
        .await
        .map_err(|e| error_response("Update patient", e))?;

    Ok(Json(PatientResponse::from(patient)))
}

#[utoipa::path(
    delete,
    path = "/patients/{id}",
    params(
        ("id" = String, Path, description = "Patient id")
    ),
    responses(
        (status = 204, description = "Patient deleted"),
        (status = 404, description = "Unknown patient id", body = ErrorBody),
        (status = 500, description = "Record store failure", body = ErrorBody)
    )
)]
/// Delete a patient record
#[axum::debug_handler]
async fn delete_patient(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<StatusCode, (StatusCode, Json<ErrorBody>)> {
    state
        .provisioning
        .delete_patient(id)
        .await
        .map_err(|e| error_response("Delete patient", e))?;

    Ok(StatusCode::NO_CONTENT)
}
