//! Standalone billing stub server binary.
//!
//! ## Purpose
//! Serves the billing gRPC boundary with the reference answer: every
//! `CreateBillingAccount` request is granted account `12345` with status
//! `SUCCESS`.
//!
//! ## Intended use
//! Local development and integration exercises for the patient provisioning
//! service when the real billing subsystem is unavailable.

use std::net::SocketAddr;
use tonic::transport::Server;
use tonic::{Request, Response, Status};
use tonic_reflection::server::Builder;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_shared::pb::billing_service_server::{BillingService, BillingServiceServer};
use api_shared::pb::{BillingRequest, BillingResponse};
use api_shared::{auth, FILE_DESCRIPTOR_SET};

/// Authentication interceptor for gRPC requests
#[allow(clippy::result_large_err)]
fn auth_interceptor(req: Request<()>) -> Result<Request<()>, Status> {
    let api_key = req
        .metadata()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| Status::unauthenticated("Missing x-api-key header"))?;

    auth::validate_api_key(api_key)?;
    Ok(req)
}

#[derive(Default, Clone)]
struct StubBillingService;

#[tonic::async_trait]
impl BillingService for StubBillingService {
    async fn create_billing_account(
        &self,
        req: Request<BillingRequest>,
    ) -> Result<Response<BillingResponse>, Status> {
        let req = req.into_inner();
        tracing::info!(
            "create billing account request received for patient {} ({})",
            req.patient_id,
            req.email
        );

        Ok(Response::new(BillingResponse {
            account_id: "12345".to_string(),
            status: "SUCCESS".to_string(),
        }))
    }
}

/// Main entry point for the billing stub server
///
/// # Environment Variables
/// - `BILLING_ADDR`: gRPC server address (default: "0.0.0.0:9091")
/// - `API_KEY`: expected x-api-key value for inbound requests
/// - `BILLING_ENABLE_REFLECTION`: set to "true" to enable gRPC reflection
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the server address cannot be bound, or
/// - the gRPC server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("billing_stub=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr: SocketAddr = std::env::var("BILLING_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:9091".into())
        .parse()?;

    tracing::info!("-- Starting billing stub gRPC on {}", addr);

    let svc = BillingServiceServer::with_interceptor(StubBillingService, auth_interceptor);
    let mut server_builder = Server::builder().add_service(svc);

    if std::env::var("BILLING_ENABLE_REFLECTION").unwrap_or_else(|_| "false".to_string()) == "true"
    {
        let reflection_service = Builder::configure()
            .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
            .build_v1()?;
        server_builder = server_builder.add_service(reflection_service);
        tracing::info!("gRPC server reflection enabled");
    } else {
        tracing::info!("gRPC server reflection disabled");
    }

    server_builder.serve(addr).await?;

    Ok(())
}
