//! Mapping from the core error taxonomy to HTTP responses.
//!
//! Every `ProvisionError` variant maps to one stable error kind and one
//! status code, so callers can tell "nothing happened" (400/404/409/500)
//! apart from "the patient now exists but billing did not complete" (502).

use axum::http::StatusCode;
use axum::response::Json;
use enrol_core::ProvisionError;

use crate::dto::ErrorBody;

/// The stable, machine-readable kind for an error.
pub fn error_kind(err: &ProvisionError) -> &'static str {
    match err {
        ProvisionError::InvalidInput(_) => "invalid_input",
        ProvisionError::DuplicateEmail(_) => "duplicate_email",
        ProvisionError::NotFound(_) => "not_found",
        ProvisionError::Store(_) => "store_error",
        ProvisionError::BillingProvisioning { .. } => "billing_provisioning_failed",
        ProvisionError::Publish(_) => "publish_failure",
    }
}

/// The status classification for an error.
pub fn status_for(err: &ProvisionError) -> StatusCode {
    match err {
        ProvisionError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ProvisionError::DuplicateEmail(_) => StatusCode::CONFLICT,
        ProvisionError::NotFound(_) => StatusCode::NOT_FOUND,
        ProvisionError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ProvisionError::BillingProvisioning { .. } => StatusCode::BAD_GATEWAY,
        // Publish failures are swallowed by the orchestrator; this arm only
        // exists to keep the mapping total.
        ProvisionError::Publish(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Logs the failure and renders the structured error response.
pub fn error_response(context: &str, err: ProvisionError) -> (StatusCode, Json<ErrorBody>) {
    tracing::error!("{} error: {}", context, err);

    (
        status_for(&err),
        Json(ErrorBody {
            error: error_kind(&err).to_owned(),
            message: err.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn pre_write_failures_map_to_client_errors() {
        assert_eq!(
            status_for(&ProvisionError::InvalidInput("name: empty".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&ProvisionError::DuplicateEmail("jane@example.com".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&ProvisionError::NotFound(Uuid::new_v4())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn billing_failure_is_distinguishable_from_nothing_happened() {
        let err = ProvisionError::BillingProvisioning {
            patient_id: Uuid::new_v4(),
            reason: "unreachable".into(),
        };
        assert_eq!(status_for(&err), StatusCode::BAD_GATEWAY);
        assert_eq!(error_kind(&err), "billing_provisioning_failed");
    }

    #[test]
    fn store_failure_is_a_server_error() {
        let err = ProvisionError::Store("lock poisoned".into());
        assert_eq!(status_for(&err), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error_kind(&err), "store_error");
    }
}
