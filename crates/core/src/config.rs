//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. The intent is to avoid reading process-wide environment variables
//! during request handling, which can lead to inconsistent behaviour in multi-threaded runtimes
//! and test harnesses.

use std::time::Duration;

use crate::error::{ProvisionError, ProvisionResult};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    billing_endpoint: String,
    billing_api_key: Option<String>,
    billing_timeout: Duration,
    kafka_brokers: String,
    events_topic: String,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `ProvisionError::InvalidInput` when the billing endpoint,
    /// broker list, or topic name is blank.
    pub fn new(
        billing_endpoint: String,
        billing_api_key: Option<String>,
        billing_timeout: Duration,
        kafka_brokers: String,
        events_topic: String,
    ) -> ProvisionResult<Self> {
        if billing_endpoint.trim().is_empty() {
            return Err(ProvisionError::InvalidInput(
                "billing_endpoint cannot be empty".into(),
            ));
        }
        if kafka_brokers.trim().is_empty() {
            return Err(ProvisionError::InvalidInput(
                "kafka_brokers cannot be empty".into(),
            ));
        }
        if events_topic.trim().is_empty() {
            return Err(ProvisionError::InvalidInput(
                "events_topic cannot be empty".into(),
            ));
        }

        Ok(Self {
            billing_endpoint,
            billing_api_key,
            billing_timeout,
            kafka_brokers,
            events_topic,
        })
    }

    pub fn billing_endpoint(&self) -> &str {
        &self.billing_endpoint
    }

    pub fn billing_api_key(&self) -> Option<&str> {
        self.billing_api_key.as_deref()
    }

    pub fn billing_timeout(&self) -> Duration {
        self.billing_timeout
    }

    pub fn kafka_brokers(&self) -> &str {
        &self.kafka_brokers
    }

    pub fn events_topic(&self) -> &str {
        &self.events_topic
    }
}
