use crate::adapters::http::DohResolver;
use crate::adapters::storage::{GcsAuth, GcsStorage, LocalStorage};
use crate::app::pipelines::EmailHostPipeline;
use crate::config::{CliConfig, RulesFile};
use crate::core::etl::EtlEngine;
use crate::domain::model::RunReport;
use crate::domain::ports::Storage;
use crate::domain::services::ProviderRules;
use crate::utils::error::Result;
use reqwest::Client;
use std::time::Duration;

const USER_AGENT: &str = concat!("email-host-etl/", env!("CARGO_PKG_VERSION"));

/// Wires storage, resolver and rules from the command line and runs the job once.
pub async fn run_job(config: CliConfig) -> Result<RunReport> {
    let client = Client::builder().user_agent(USER_AGENT).build()?;

    let rules = match &config.rules {
        Some(path) => {
            tracing::info!("Loading provider rules from {}", path.display());
            RulesFile::from_file(path)?.into_rules()
        }
        None => ProviderRules::builtin(),
    };

    let resolver = DohResolver::new(client.clone(), config.resolver_url.clone())
        .with_timeout(Duration::from_secs(config.timeout_secs))
        .with_retries(config.retries, Duration::from_millis(500));

    match config.local_dir.clone() {
        Some(dir) => {
            tracing::info!("Local mode, reading and writing under {}", dir.display());
            run_with(LocalStorage::new(dir), resolver, rules, config).await
        }
        None => {
            let auth = GcsAuth::new(client.clone(), config.token_source()?);
            let storage = GcsStorage::new(client, auth, config.bucket_name())
                .with_endpoint(config.storage_endpoint.clone());
            run_with(storage, resolver, rules, config).await
        }
    }
}

async fn run_with<S: Storage>(
    storage: S,
    resolver: DohResolver,
    rules: ProviderRules,
    config: CliConfig,
) -> Result<RunReport> {
    let monitor = config.monitor;
    let pipeline = EmailHostPipeline::new(storage, resolver, config).with_rules(rules);
    EtlEngine::new_with_monitoring(pipeline, monitor).run().await
}
