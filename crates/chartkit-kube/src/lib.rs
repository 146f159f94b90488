//! Chartkit Kube - Kubernetes integration for chartkit
//!
//! This crate provides:
//! - **Client setup**: explicit kubeconfig, in-cluster, or inferred configuration
//! - **Secret store**: read and patch a single field of a namespaced Secret, with
//!   a Kubernetes-backed implementation and an in-memory one for tests

pub mod client;
pub mod error;
pub mod secrets;

pub use client::connect;
pub use error::{KubeError, Result};
pub use secrets::{
    API_KEY_FIELD, FieldChange, KubeSecretStore, MockSecretStore, OperationCounts, PatchReport,
    SecretStore, patch_field, read_api_key, read_field,
};
