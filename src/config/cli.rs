use crate::adapters::http::DEFAULT_RESOLVER_URL;
use crate::adapters::storage::gcs_auth::METADATA_TOKEN_URL;
use crate::adapters::storage::{ServiceAccountKey, TokenSource, DEFAULT_STORAGE_ENDPOINT};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::*;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "email-host-etl")]
#[command(about = "Tag each contact in a CSV with the email provider behind its domain")]
pub struct CliConfig {
    /// Cloud Storage bucket holding the input and receiving the output
    #[arg(long, env = "GCS_BUCKET")]
    pub bucket: Option<String>,

    /// Object name of the input CSV (a path relative to --local-dir in local mode)
    #[arg(long, env = "INPUT_CSV")]
    pub input_csv: Option<String>,

    /// Service-account key file; empty falls back to the metadata server
    #[arg(long, env = "GOOGLE_APPLICATION_CREDENTIALS")]
    pub credentials: Option<String>,

    #[arg(long, default_value = "processed/")]
    pub output_prefix: String,

    #[arg(long, default_value = "email")]
    pub email_column: String,

    #[arg(long, default_value = "email_host")]
    pub host_column: String,

    /// Maximum DNS lookups in flight
    #[arg(long, default_value = "10")]
    pub concurrency: usize,

    #[arg(long, default_value = "5")]
    pub timeout_secs: u64,

    /// Extra attempts per failed lookup
    #[arg(long, default_value = "0")]
    pub retries: u32,

    #[arg(long, default_value = DEFAULT_RESOLVER_URL)]
    pub resolver_url: String,

    #[arg(long, env = "GCS_ENDPOINT", default_value = DEFAULT_STORAGE_ENDPOINT)]
    pub storage_endpoint: String,

    /// Talk to the storage endpoint without credentials (emulators)
    #[arg(long)]
    pub anonymous: bool,

    /// Read and write files under this directory instead of Cloud Storage
    #[arg(long)]
    pub local_dir: Option<PathBuf>,

    /// TOML file with extra provider rules
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Also write <output>.summary.json
    #[arg(long)]
    pub write_summary: bool,

    #[arg(long)]
    pub no_progress: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

/// Last path component of an object name.
pub fn object_basename(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

impl CliConfig {
    pub fn is_local(&self) -> bool {
        self.local_dir.is_some()
    }

    pub fn bucket_name(&self) -> &str {
        self.bucket.as_deref().map(str::trim).unwrap_or_default()
    }

    fn credentials_path(&self) -> Option<&str> {
        self.credentials
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    /// Service account when a key file is configured, the metadata server otherwise.
    pub fn token_source(&self) -> Result<TokenSource> {
        if self.anonymous {
            return Ok(TokenSource::Anonymous);
        }

        match self.credentials_path() {
            Some(path) => {
                tracing::debug!("Using service-account credentials from {}", path);
                Ok(TokenSource::ServiceAccount(ServiceAccountKey::from_file(path)?))
            }
            None => Ok(TokenSource::Metadata {
                url: METADATA_TOKEN_URL.to_string(),
            }),
        }
    }
}

impl ConfigProvider for CliConfig {
    fn input_key(&self) -> &str {
        self.input_csv.as_deref().map(str::trim).unwrap_or_default()
    }

    fn output_key(&self) -> String {
        let name = object_basename(self.input_key());
        if self.output_prefix.is_empty() || self.output_prefix.ends_with('/') {
            format!("{}{}", self.output_prefix, name)
        } else {
            format!("{}/{}", self.output_prefix, name)
        }
    }

    fn email_column(&self) -> &str {
        &self.email_column
    }

    fn host_column(&self) -> &str {
        &self.host_column
    }

    fn concurrency(&self) -> usize {
        self.concurrency
    }

    fn show_progress(&self) -> bool {
        !self.no_progress
    }

    fn write_summary(&self) -> bool {
        self.write_summary
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if !self.is_local() {
            let bucket = validate_required("GCS_BUCKET", &self.bucket)?;
            validate_gcs_bucket_name("GCS_BUCKET", bucket)?;
            validate_url("storage_endpoint", &self.storage_endpoint)?;
        }

        let input = validate_required("INPUT_CSV", &self.input_csv)?;
        validate_object_name("INPUT_CSV", input)?;

        validate_non_empty_string("email_column", &self.email_column)?;
        validate_non_empty_string("host_column", &self.host_column)?;
        validate_url("resolver_url", &self.resolver_url)?;
        validate_range("concurrency", self.concurrency, 1, 100)?;
        validate_range("timeout_secs", self.timeout_secs, 1, 300)?;
        validate_range("retries", self.retries, 0, 10)?;

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::EtlError;

    fn parse(args: &[&str]) -> CliConfig {
        let mut argv = vec!["email-host-etl"];
        argv.extend_from_slice(args);
        CliConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["--bucket", "leads", "--input-csv", "in/leads.csv"]);

        assert_eq!(config.concurrency, 10);
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.resolver_url, "https://dns.google/resolve");
        assert_eq!(config.output_key(), "processed/leads.csv");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_output_key_prefix_without_slash() {
        let config = parse(&[
            "--bucket",
            "leads",
            "--input-csv",
            "leads.csv",
            "--output-prefix",
            "done",
        ]);
        assert_eq!(config.output_key(), "done/leads.csv");
    }

    #[test]
    fn test_missing_bucket_fails_validation() {
        let config = parse(&["--bucket", "", "--input-csv", "leads.csv"]);
        assert!(matches!(
            config.validate().unwrap_err(),
            EtlError::MissingConfigError { .. }
        ));
    }

    #[test]
    fn test_local_mode_does_not_need_bucket() {
        let config = parse(&["--local-dir", "/tmp", "--input-csv", "leads.csv", "--bucket", ""]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_concurrency_out_of_range() {
        let config = parse(&[
            "--bucket",
            "leads",
            "--input-csv",
            "leads.csv",
            "--concurrency",
            "0",
        ]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_object_basename() {
        assert_eq!(object_basename("a/b/c.csv"), "c.csv");
        assert_eq!(object_basename("c.csv"), "c.csv");
    }

    #[test]
    fn test_token_source_selection() {
        let anonymous = parse(&["--anonymous", "--credentials", "/nope.json"]);
        assert!(matches!(
            anonymous.token_source().unwrap(),
            TokenSource::Anonymous
        ));

        let metadata = parse(&["--credentials", ""]);
        assert_eq!(metadata.credentials.as_deref(), Some(""));
        assert!(matches!(
            metadata.token_source().unwrap(),
            TokenSource::Metadata { .. }
        ));

        let missing_file = parse(&["--credentials", "/definitely/missing/key.json"]);
        assert!(matches!(
            missing_file.token_source().unwrap_err(),
            EtlError::AuthError { .. }
        ));
    }
}
