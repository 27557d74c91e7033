//! # API Shared
//!
//! Shared utilities and definitions for the Enrol APIs.
//!
//! Contains:
//! - Protobuf-generated types for the billing boundary (`pb` module)
//! - Shared services like `HealthService`
//! - Authentication utilities for the billing gRPC boundary
//!
//! Used by `enrol-billing` (client and stub server) and `api-rest` for common functionality.

// Re-export the generated protobuf module. The generated code will be placed
// into OUT_DIR at build time by the build script.
pub mod pb {
    tonic::include_proto!("billing.v1");
}

pub mod auth;
pub mod health;

pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("proto_descriptor");

pub use health::HealthService;
pub use pb::*;
