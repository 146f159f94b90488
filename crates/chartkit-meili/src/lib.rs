//! Chartkit Meili - Meilisearch API key provisioning
//!
//! This crate provides:
//!
//! - **Client**: a thin HTTP client for the Meilisearch endpoints the provisioner needs
//!   (health, keys, indexes, tasks), behind the [`SearchEngine`] trait
//! - **Key matching**: reuse of existing keys by description or by capability superset
//! - **Index ensure**: idempotent create-if-absent for requested indexes
//! - **Provisioning flow**: readiness wait, master-key check, key resolution and
//!   secret update
//!
//! ## Example
//!
//! ```rust,no_run
//! use chartkit_kube::KubeSecretStore;
//! use chartkit_meili::{MeiliClient, ProvisionConfig, Provisioner};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ProvisionConfig::new("http://meilisearch:7700", "master-key");
//! let engine = MeiliClient::new(&config.host, Some(&config.master_key))?;
//! let secrets = KubeSecretStore::new(chartkit_kube::connect(None).await?);
//!
//! let outcome = Provisioner::new(&engine, &secrets, &config).run().await?;
//! println!("key source: {}", outcome.source);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod engine;
pub mod error;
pub mod indexes;
pub mod keys;
pub mod matcher;
pub mod mock;
pub mod provision;
pub mod types;

pub use client::MeiliClient;
pub use engine::SearchEngine;
pub use error::{MeiliError, Result};
pub use indexes::{IndexReport, ensure_indexes};
pub use keys::{create_api_key, find_matching_key, validate_api_key};
pub use matcher::{Candidate, MatchReason, candidates};
pub use mock::{EngineCounts, MockSearchEngine};
pub use provision::{
    KeySource, ProvisionConfig, ProvisionOutcome, Provisioner, RetryPolicy, validate_master_key,
    wait_until_ready,
};
pub use types::{ApiKey, Health, KeyCreate, KeyRequest, Scope};
