//! Provision command - ensure a live Meilisearch key is stored in a secret

use std::time::Duration;

use chartkit_kube::KubeSecretStore;
use chartkit_meili::{KeySource, MeiliClient, ProvisionConfig, Provisioner, RetryPolicy, Scope};
use console::style;

use crate::ProvisionArgs;
use crate::error::Result;

fn config(args: ProvisionArgs) -> ProvisionConfig {
    ProvisionConfig {
        host: args.host,
        master_key: args.master_key,
        supplied_key: args.api_key.filter(|k| !k.trim().is_empty()),
        namespace: args.namespace,
        secret_name: args.secret_name,
        description: args.description,
        indexes: Scope::parse_list(&args.indexes),
        actions: Scope::parse_list(&args.actions),
        dry_run: args.dry_run,
        retry: RetryPolicy {
            max_attempts: args.max_retries,
            delay: Duration::from_secs(args.retry_delay),
        },
    }
}

pub fn run(args: ProvisionArgs) -> Result<()> {
    let kubeconfig = args.kubeconfig.clone();
    let config = config(args);
    config.validate()?;

    tracing::info!(
        "Provisioning API key for secret {}/{} (indexes: {}, actions: {})",
        config.namespace,
        config.secret_name,
        config.indexes,
        config.actions
    );

    let outcome = crate::runtime()?.block_on(async {
        let engine = MeiliClient::new(&config.host, Some(config.master_key.as_str()))?;
        let client = chartkit_kube::connect(kubeconfig.as_deref()).await?;
        let secrets = KubeSecretStore::new(client);
        Provisioner::new(&engine, &secrets, &config)
            .run()
            .await
            .map_err(crate::error::CliError::from)
    })?;

    let verb = match outcome.source {
        KeySource::Supplied => "Supplied key is valid",
        KeySource::Secret => "Stored key is valid",
        KeySource::Reused => "Reused existing key",
        KeySource::Created => "Created new key",
    };
    println!("{} {}", style("✓").green(), verb);
    if let Some(patch) = &outcome.patch {
        let marker = if patch.dry_run {
            style("⚠").yellow()
        } else {
            style("✓").green()
        };
        println!("  {} {}", marker, patch);
    }
    for (index, error) in &outcome.indexes.failed {
        println!("  {} index '{}': {}", style("⚠").yellow(), index, error);
    }
    Ok(())
}
