use crate::adapters::csv::{parse_table, write_table};
use crate::domain::model::{CsvTable, EnrichmentSummary, HostLabel, TransformResult};
use crate::domain::ports::{ConfigProvider, MxResolver, Pipeline, Storage};
use crate::domain::services::{extract_domain, ProviderRules};
use crate::utils::error::{EtlError, Result};
use crate::utils::progress::lookup_progress;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// What to do with one row during transform.
enum RowAction {
    Keep,
    Invalid,
    Lookup(String),
}

struct DomainOutcome {
    label: HostLabel,
    failed: bool,
}

/// Downloads a contact CSV, tags every untagged row with its email provider and writes it back.
pub struct EmailHostPipeline<S: Storage, R: MxResolver, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) resolver: Arc<R>,
    pub(crate) config: C,
    pub(crate) rules: Arc<ProviderRules>,
}

impl<S, R, C> EmailHostPipeline<S, R, C>
where
    S: Storage,
    R: MxResolver + 'static,
    C: ConfigProvider,
{
    pub fn new(storage: S, resolver: R, config: C) -> Self {
        Self {
            storage,
            resolver: Arc::new(resolver),
            config,
            rules: Arc::new(ProviderRules::builtin()),
        }
    }

    pub fn with_rules(mut self, rules: ProviderRules) -> Self {
        self.rules = Arc::new(rules);
        self
    }

    /// Resolves each domain once, with at most `concurrency` lookups in flight.
    async fn resolve_domains(&self, domains: Vec<String>) -> Result<HashMap<String, DomainOutcome>> {
        let progress = lookup_progress(domains.len(), self.config.show_progress());
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency().max(1)));
        let mut tasks = JoinSet::new();

        for domain in domains {
            let semaphore = Arc::clone(&semaphore);
            let resolver = Arc::clone(&self.resolver);
            let rules = Arc::clone(&self.rules);

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let outcome = match resolver.lookup(&domain).await {
                    Ok(records) => DomainOutcome {
                        label: rules.classify(&records),
                        failed: false,
                    },
                    Err(e) => {
                        tracing::warn!("MX lookup for {} failed: {}", domain, e);
                        DomainOutcome {
                            label: HostLabel::NoEmail,
                            failed: true,
                        }
                    }
                };
                (domain, outcome)
            });
        }

        let mut outcomes = HashMap::new();
        while let Some(joined) = tasks.join_next().await {
            let (domain, outcome) = joined.map_err(|e| EtlError::ProcessingError {
                message: format!("lookup task failed: {}", e),
            })?;
            tracing::debug!("{} -> {}", domain, outcome.label);
            outcomes.insert(domain, outcome);
            progress.inc(1);
        }
        progress.finish_and_clear();

        Ok(outcomes)
    }
}

#[async_trait::async_trait]
impl<S, R, C> Pipeline for EmailHostPipeline<S, R, C>
where
    S: Storage,
    R: MxResolver + 'static,
    C: ConfigProvider,
{
    async fn extract(&self) -> Result<CsvTable> {
        let input = self.config.input_key();
        tracing::info!("Reading {}", self.storage.location(input));

        let data = self.storage.read_file(input).await?;
        let table = parse_table(&data)?;

        tracing::debug!(
            "Parsed {} rows with columns {:?}",
            table.rows.len(),
            table.headers
        );
        Ok(table)
    }

    async fn transform(&self, mut table: CsvTable) -> Result<TransformResult> {
        let mut summary = EnrichmentSummary::start();
        summary.total_rows = table.rows.len();

        let host_idx = table.ensure_column(self.config.host_column());
        let email_idx = table.column_index(self.config.email_column());
        if email_idx.is_none() && !table.rows.is_empty() {
            tracing::warn!(
                "Column '{}' not found, rows without a host will be tagged {}",
                self.config.email_column(),
                HostLabel::InvalidEmail
            );
        }

        let mut seen = HashSet::new();
        let mut domains = Vec::new();
        let actions: Vec<RowAction> = table
            .rows
            .iter()
            .map(|row| {
                if !row[host_idx].is_empty() {
                    return RowAction::Keep;
                }
                let email = email_idx.map(|i| row[i].as_str()).unwrap_or_default();
                match extract_domain(email) {
                    Some(domain) => {
                        if seen.insert(domain.clone()) {
                            domains.push(domain.clone());
                        }
                        RowAction::Lookup(domain)
                    }
                    None => RowAction::Invalid,
                }
            })
            .collect();

        summary.unique_domains = domains.len();
        tracing::info!(
            "Resolving {} unique domains with up to {} concurrent lookups",
            domains.len(),
            self.config.concurrency()
        );
        let outcomes = self.resolve_domains(domains).await?;
        summary.failed_lookups = outcomes.values().filter(|o| o.failed).count();

        for (row, action) in table.rows.iter_mut().zip(actions) {
            let label = match action {
                RowAction::Keep => {
                    summary.skipped_rows += 1;
                    continue;
                }
                RowAction::Invalid => HostLabel::InvalidEmail,
                RowAction::Lookup(domain) => outcomes
                    .get(&domain)
                    .map(|o| o.label.clone())
                    .unwrap_or(HostLabel::NoEmail),
            };
            summary.looked_up_rows += 1;
            summary.record_label(&label);
            row[host_idx] = label.to_string();
        }

        summary.finish();
        tracing::info!(
            "Tagged {} rows ({} already tagged, {} failed lookups)",
            summary.looked_up_rows,
            summary.skipped_rows,
            summary.failed_lookups
        );

        Ok(TransformResult { table, summary })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let output_key = self.config.output_key();
        let data = write_table(&result.table)?;

        tracing::debug!("Writing {} bytes to {}", data.len(), output_key);
        self.storage.write_file(&output_key, &data).await?;

        if self.config.write_summary() {
            let summary_key = format!("{}.summary.json", output_key);
            let json = serde_json::to_vec_pretty(&result.summary)?;
            self.storage.write_file(&summary_key, &json).await?;
            tracing::debug!("Summary saved to {}", self.storage.location(&summary_key));
        }

        Ok(self.storage.location(&output_key))
    }
}
