use crate::domain::model::MxRecord;
use crate::domain::ports::MxResolver;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_RESOLVER_URL: &str = "https://dns.google/resolve";

#[derive(Debug, Deserialize)]
struct DohResponse {
    #[serde(rename = "Status", default)]
    status: Option<u32>,
    #[serde(rename = "Answer", default)]
    answer: Vec<DohAnswer>,
}

#[derive(Debug, Deserialize)]
struct DohAnswer {
    name: Option<String>,
    #[serde(rename = "type")]
    record_type: Option<u16>,
    data: Option<serde_json::Value>,
}

impl From<DohAnswer> for MxRecord {
    fn from(answer: DohAnswer) -> Self {
        MxRecord {
            name: answer.name,
            record_type: answer.record_type,
            data: answer.data.and_then(|d| d.as_str().map(str::to_string)),
        }
    }
}

/// MX lookups through a JSON DNS-over-HTTPS endpoint (Google Public DNS format).
#[derive(Debug, Clone)]
pub struct DohResolver {
    client: Client,
    endpoint: String,
    timeout: Duration,
    retries: u32,
    retry_delay: Duration,
}

impl DohResolver {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(5),
            retries: 0,
            retry_delay: Duration::from_millis(500),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retries: u32, delay: Duration) -> Self {
        self.retries = retries;
        self.retry_delay = delay;
        self
    }

    async fn lookup_once(&self, domain: &str) -> Result<Vec<MxRecord>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("name", domain), ("type", "MX")])
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EtlError::LookupError {
                domain: domain.to_string(),
                message: format!("resolver returned HTTP {}", status),
            });
        }

        let body: DohResponse = response.json().await?;
        tracing::debug!(
            "{} -> status {:?}, {} answers",
            domain,
            body.status,
            body.answer.len()
        );

        Ok(body.answer.into_iter().map(MxRecord::from).collect())
    }
}

#[async_trait]
impl MxResolver for DohResolver {
    async fn lookup(&self, domain: &str) -> Result<Vec<MxRecord>> {
        let mut attempt = 0;
        loop {
            match self.lookup_once(domain).await {
                Ok(records) => return Ok(records),
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    tracing::debug!(
                        "Lookup for {} failed ({}), retry {}/{}",
                        domain,
                        e,
                        attempt,
                        self.retries
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_lookup_parses_answers() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/resolve")
                    .query_param("name", "acme.com")
                    .query_param("type", "MX");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(serde_json::json!({
                        "Status": 0,
                        "Answer": [
                            {"name": "acme.com.", "type": 15, "TTL": 300, "data": "1 aspmx.l.google.com."},
                            {"name": "acme.com.", "type": 15, "TTL": 300, "data": 42}
                        ]
                    }));
            })
            .await;

        let resolver = DohResolver::new(Client::new(), server.url("/resolve"));
        let records = resolver.lookup("acme.com").await.unwrap();

        mock.assert_async().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].data.as_deref(), Some("1 aspmx.l.google.com."));
        assert_eq!(records[0].record_type, Some(15));
        assert_eq!(records[1].data, None);
    }

    #[tokio::test]
    async fn test_lookup_without_answer_is_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/resolve");
                then.status(200).json_body(serde_json::json!({"Status": 3}));
            })
            .await;

        let resolver = DohResolver::new(Client::new(), server.url("/resolve"));
        assert!(resolver.lookup("nxdomain.invalid").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_recovers_after_retry() {
        let server = MockServer::start_async().await;
        let outage = server
            .mock_async(|when, then| {
                when.method(GET).path("/resolve");
                then.status(503);
            })
            .await;

        let resolver = DohResolver::new(Client::new(), server.url("/resolve"))
            .with_retries(1, Duration::from_millis(300));
        let lookup = tokio::spawn(async move { resolver.lookup("acme.com").await });

        while outage.hits_async().await == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        outage.delete_async().await;
        let healthy = server
            .mock_async(|when, then| {
                when.method(GET).path("/resolve");
                then.status(200).json_body(serde_json::json!({
                    "Status": 0,
                    "Answer": [{"name": "acme.com.", "type": 15, "data": "1 aspmx.l.google.com."}]
                }));
            })
            .await;

        let records = lookup.await.unwrap().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(healthy.hits_async().await, 1);
    }

    #[tokio::test]
    async fn test_lookup_retries_then_fails() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/resolve");
                then.status(502);
            })
            .await;

        let resolver = DohResolver::new(Client::new(), server.url("/resolve"))
            .with_retries(2, Duration::from_millis(1));
        let err = resolver.lookup("acme.com").await.unwrap_err();

        assert_eq!(mock.hits_async().await, 3);
        assert!(matches!(err, EtlError::LookupError { .. }));
    }
}
