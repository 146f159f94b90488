//! Kubernetes client construction
//!
//! Resolution order: an explicit kubeconfig file, then `KUBECONFIG`, then the
//! in-cluster service account, then the default `~/.kube/config`.

use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::path::Path;

use crate::error::{KubeError, Result};

/// Build a client, preferring `kubeconfig` when given
pub async fn connect(kubeconfig: Option<&Path>) -> Result<Client> {
    let config = match kubeconfig {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading kubeconfig");
            let kubeconfig = Kubeconfig::read_from(path)
                .map_err(|e| KubeError::Config(format!("{}: {}", path.display(), e)))?;
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .map_err(|e| KubeError::Config(e.to_string()))?
        }
        // `infer` reads KUBECONFIG (possibly several files) before the service account
        None if std::env::var_os("KUBECONFIG").is_some() => infer().await?,
        None => match Config::incluster() {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!(error = %e, "in-cluster config unavailable, inferring");
                infer().await?
            }
        },
    };

    Ok(Client::try_from(config)?)
}

async fn infer() -> Result<Config> {
    Config::infer()
        .await
        .map_err(|e| KubeError::Config(e.to_string()))
}
