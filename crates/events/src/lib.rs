//! Kafka-backed change notifier.
//!
//! Publishes one JSON message per successful patient mutation, keyed by the
//! patient id so a downstream consumer observing multiple events for one
//! patient sees them in emission order. Delivery is at-most-once: a failed
//! hand-off is reported to the caller (which logs and swallows it) and never
//! retried here.
//!
//! Kafka support is compiled in behind the `kafka` feature. Without it the
//! notifier still constructs, warns once, and reports every publish as
//! failed, which the orchestrator's best-effort policy absorbs.

use enrol_core::{ChangeNotifier, PatientEvent, ProvisionError, ProvisionResult};

#[cfg(feature = "kafka")]
use rdkafka::{
    config::ClientConfig,
    producer::{FutureProducer, FutureRecord},
    util::Timeout,
};

/// How long a publish may block on the broker hand-off.
#[cfg(feature = "kafka")]
const PUBLISH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

/// Failures while creating the notifier.
#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[cfg(feature = "kafka")]
    #[error("failed to create Kafka producer: {0}")]
    Producer(#[from] rdkafka::error::KafkaError),
}

/// `ChangeNotifier` implementation over an rdkafka `FutureProducer`.
pub struct KafkaNotifier {
    topic: String,
    #[cfg(feature = "kafka")]
    producer: FutureProducer,
}

impl KafkaNotifier {
    /// Creates a notifier producing to `topic` via the given brokers.
    pub fn new(brokers: &str, topic: impl Into<String>) -> Result<Self, NotifierError> {
        let topic = topic.into();

        #[cfg(feature = "kafka")]
        {
            tracing::info!(
                "creating Kafka producer: brokers={}, topic={}",
                brokers,
                topic
            );

            let producer: FutureProducer = ClientConfig::new()
                .set("bootstrap.servers", brokers)
                .set("acks", "all")
                .set(
                    "message.timeout.ms",
                    PUBLISH_TIMEOUT.as_millis().to_string(),
                )
                .create()?;

            Ok(Self { topic, producer })
        }

        #[cfg(not(feature = "kafka"))]
        {
            let _ = brokers;
            tracing::warn!(
                "kafka feature not enabled - events for topic '{}' will not be published",
                topic
            );
            Ok(Self { topic })
        }
    }

    /// The topic this notifier produces to.
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

#[tonic::async_trait]
impl ChangeNotifier for KafkaNotifier {
    async fn publish(&self, event: &PatientEvent) -> ProvisionResult<()> {
        #[cfg(feature = "kafka")]
        {
            let payload = serde_json::to_string(event)
                .map_err(|e| ProvisionError::Publish(format!("failed to serialise event: {e}")))?;
            let key = event.patient_id.to_string();

            let record = FutureRecord::to(&self.topic).key(&key).payload(&payload);

            match self
                .producer
                .send(record, Timeout::After(PUBLISH_TIMEOUT))
                .await
            {
                Ok((partition, offset)) => {
                    tracing::debug!(
                        "published {:?} event for patient {} to partition {} at offset {}",
                        event.event_type,
                        event.patient_id,
                        partition,
                        offset
                    );
                    Ok(())
                }
                Err((e, _)) => Err(ProvisionError::Publish(format!("kafka send error: {e}"))),
            }
        }

        #[cfg(not(feature = "kafka"))]
        {
            let _ = event;
            Err(ProvisionError::Publish(
                "kafka feature not enabled".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifier_keeps_configured_topic() {
        let notifier =
            KafkaNotifier::new("localhost:9092", "patient-events").expect("new should succeed");
        assert_eq!(notifier.topic(), "patient-events");
    }

    #[cfg(not(feature = "kafka"))]
    #[tokio::test]
    async fn publish_without_kafka_support_reports_failure() {
        use enrol_core::{Patient, PatientDraft};

        let notifier =
            KafkaNotifier::new("localhost:9092", "patient-events").expect("new should succeed");

        let draft = PatientDraft {
            name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            address: "1 Main St".into(),
            date_of_birth: "1990-01-01".into(),
            registered_date: "2024-01-01".into(),
        };
        let patient = Patient::create(
            enrol_core::validation::validate_draft(&draft).expect("draft should validate"),
        );
        let event = PatientEvent::created(&patient);

        let err = notifier
            .publish(&event)
            .await
            .expect_err("publish should fail without kafka support");
        assert!(matches!(err, ProvisionError::Publish(_)));
    }
}
