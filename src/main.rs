//! Main entry point for the Enrol patient provisioning service.
//!
//! Composes the record store, the billing gRPC client, and the Kafka change
//! notifier into the provisioning orchestrator, then serves the REST API.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use enrol_billing::GrpcBillingClient;
use enrol_core::{CoreConfig, InMemoryRecordStore, ProvisioningService};
use enrol_events::KafkaNotifier;

/// Starts the Enrol REST server.
///
/// # Environment Variables
/// - `ENROL_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `BILLING_SERVICE_ADDR`: billing gRPC endpoint (default: "http://localhost:9091")
/// - `BILLING_API_KEY`: optional x-api-key attached to billing requests
/// - `BILLING_TIMEOUT_SECS`: billing connect/request timeout (default: 5)
/// - `KAFKA_BOOTSTRAP_SERVERS`: Kafka brokers (default: "localhost:9092")
/// - `PATIENT_EVENTS_TOPIC`: lifecycle event topic (default: "patient-events")
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is incomplete or the billing client cannot be built, or
/// - the server address cannot be bound or the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("enrol_run=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("ENROL_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let billing_endpoint = std::env::var("BILLING_SERVICE_ADDR")
        .unwrap_or_else(|_| "http://localhost:9091".into());
    let billing_api_key = std::env::var("BILLING_API_KEY").ok();
    let billing_timeout_secs: u64 = std::env::var("BILLING_TIMEOUT_SECS")
        .unwrap_or_else(|_| "5".into())
        .parse()?;
    let kafka_brokers =
        std::env::var("KAFKA_BOOTSTRAP_SERVERS").unwrap_or_else(|_| "localhost:9092".into());
    let events_topic =
        std::env::var("PATIENT_EVENTS_TOPIC").unwrap_or_else(|_| "patient-events".into());

    let cfg = CoreConfig::new(
        billing_endpoint,
        billing_api_key,
        Duration::from_secs(billing_timeout_secs),
        kafka_brokers,
        events_topic,
    )?;

    tracing::info!("++ Starting Enrol REST on {}", rest_addr);

    let store = Arc::new(InMemoryRecordStore::new());
    let billing = Arc::new(GrpcBillingClient::connect(&cfg)?);
    let notifier = Arc::new(KafkaNotifier::new(cfg.kafka_brokers(), cfg.events_topic())?);

    let provisioning = ProvisioningService::new(store, billing, notifier);

    let app = router(AppState { provisioning });

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
