//! # Enrol Core
//!
//! Core business logic for the Enrol patient provisioning system.
//!
//! This crate contains the domain model and the provisioning orchestrator:
//! - Patient records and their lifecycle events
//! - The `RecordStore` abstraction with an in-memory reference implementation
//! - Collaborator seams for billing provisioning and change notification
//! - The `ProvisioningService` that composes the three and owns the failure policy
//!
//! **No API concerns**: HTTP servers, wire codecs, or service interfaces belong in
//! `api-rest`, `enrol-billing`, or `enrol-events`.

pub mod config;
pub mod error;
pub mod event;
pub mod patient;
pub mod provisioning;
pub mod store;
pub mod validation;

pub use config::CoreConfig;
pub use error::{ProvisionError, ProvisionResult};
pub use event::{EventKind, PatientEvent};
pub use patient::{Patient, PatientDraft};
pub use provisioning::{BillingAccount, BillingProvisioner, ChangeNotifier, ProvisioningService};
pub use store::{InMemoryRecordStore, RecordStore};
