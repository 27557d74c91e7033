//! gRPC client for the external billing subsystem.
//!
//! The client owns a single lazily-connected channel that is reused for the
//! process lifetime; every non-success outcome of a call — transport error,
//! timeout, or a response whose status is not `"SUCCESS"` — is reported as
//! `ProvisionError::BillingProvisioning`. Retry policy belongs to the
//! orchestrator, which deliberately performs none.

use api_shared::pb::billing_service_client::BillingServiceClient;
use api_shared::pb::{BillingRequest, BillingResponse};
use enrol_core::{BillingAccount, BillingProvisioner, CoreConfig, ProvisionError, ProvisionResult};
use tonic::metadata::{Ascii, MetadataValue};
use tonic::transport::{Channel, Endpoint};
use tonic::Request;
use uuid::Uuid;

/// The only response status treated as success.
const SUCCESS_STATUS: &str = "SUCCESS";

/// Failures while building the billing client. These happen once, at
/// startup; per-call failures surface as `ProvisionError` instead.
#[derive(Debug, thiserror::Error)]
pub enum BillingClientError {
    #[error("invalid billing endpoint: {0}")]
    Endpoint(#[from] tonic::transport::Error),
    #[error("invalid billing API key: {0}")]
    ApiKey(#[from] tonic::metadata::errors::InvalidMetadataValue),
}

/// `BillingProvisioner` implementation over a tonic channel.
#[derive(Clone)]
pub struct GrpcBillingClient {
    channel: Channel,
    api_key: Option<MetadataValue<Ascii>>,
}

impl GrpcBillingClient {
    /// Builds the client from configuration.
    ///
    /// The channel connects on first use and is then reused; the configured
    /// timeout bounds both connection establishment and each request, so a
    /// stalled billing endpoint fails the call instead of hanging it.
    pub fn connect(cfg: &CoreConfig) -> Result<Self, BillingClientError> {
        tracing::info!("connecting to billing service at {}", cfg.billing_endpoint());

        let endpoint = Endpoint::from_shared(cfg.billing_endpoint().to_owned())?
            .connect_timeout(cfg.billing_timeout())
            .timeout(cfg.billing_timeout());

        let api_key: Option<MetadataValue<Ascii>> = cfg
            .billing_api_key()
            .map(MetadataValue::try_from)
            .transpose()?;

        Ok(Self {
            channel: endpoint.connect_lazy(),
            api_key,
        })
    }
}

#[tonic::async_trait]
impl BillingProvisioner for GrpcBillingClient {
    async fn create_account(
        &self,
        patient_id: Uuid,
        name: &str,
        email: &str,
    ) -> ProvisionResult<BillingAccount> {
        let mut client = BillingServiceClient::new(self.channel.clone());

        let mut request = Request::new(BillingRequest {
            patient_id: patient_id.to_string(),
            name: name.to_owned(),
            email: email.to_owned(),
        });
        if let Some(key) = &self.api_key {
            request.metadata_mut().insert("x-api-key", key.clone());
        }

        let response = client
            .create_billing_account(request)
            .await
            .map_err(|status| remote_failure(patient_id, status.to_string()))?
            .into_inner();

        let account = account_from_response(patient_id, response)?;
        tracing::info!(
            "received billing account {} for patient {}",
            account.account_id,
            patient_id
        );
        Ok(account)
    }
}

fn remote_failure(patient_id: Uuid, reason: impl Into<String>) -> ProvisionError {
    ProvisionError::BillingProvisioning {
        patient_id,
        reason: reason.into(),
    }
}

/// Maps a wire response to an account, treating anything but `"SUCCESS"` as
/// a remote failure.
fn account_from_response(
    patient_id: Uuid,
    response: BillingResponse,
) -> ProvisionResult<BillingAccount> {
    if response.status != SUCCESS_STATUS {
        return Err(remote_failure(
            patient_id,
            format!("billing responded with status {:?}", response.status),
        ));
    }

    Ok(BillingAccount {
        account_id: response.account_id,
        status: response.status,
    })
}
