use crate::adapters::storage::gcs_auth::GcsAuth;
use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};
use reqwest::{Client, RequestBuilder, Response};
use std::sync::Arc;
use url::Url;

pub const DEFAULT_STORAGE_ENDPOINT: &str = "https://storage.googleapis.com";

/// Cloud Storage objects through the JSON API.
#[derive(Debug, Clone)]
pub struct GcsStorage {
    client: Client,
    auth: Arc<GcsAuth>,
    endpoint: String,
    bucket: String,
}

impl GcsStorage {
    pub fn new(client: Client, auth: GcsAuth, bucket: impl Into<String>) -> Self {
        Self {
            client,
            auth: Arc::new(auth),
            endpoint: DEFAULT_STORAGE_ENDPOINT.to_string(),
            bucket: bucket.into(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn api_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.endpoint).map_err(|e| EtlError::ConfigError {
            message: format!("invalid storage endpoint '{}': {}", self.endpoint, e),
        })?;
        url.path_segments_mut()
            .map_err(|_| EtlError::ConfigError {
                message: format!("storage endpoint '{}' cannot be a base URL", self.endpoint),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Media download URL; the object name is one path segment, so `/` is escaped.
    pub fn download_url(&self, object: &str) -> Result<Url> {
        let mut url = self.api_url(&["storage", "v1", "b", self.bucket.as_str(), "o", object])?;
        url.query_pairs_mut().append_pair("alt", "media");
        Ok(url)
    }

    pub fn upload_url(&self, object: &str) -> Result<Url> {
        let mut url = self.api_url(&["upload", "storage", "v1", "b", self.bucket.as_str(), "o"])?;
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", object);
        Ok(url)
    }

    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        Ok(match self.auth.bearer_token().await? {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }

    async fn check(&self, action: &str, object: &str, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(EtlError::StorageError {
            message: format!(
                "{} gs://{}/{} failed with HTTP {}: {}",
                action,
                self.bucket,
                object,
                status,
                body.trim()
            ),
        })
    }
}

fn content_type_for(path: &str) -> &'static str {
    if path.ends_with(".json") {
        "application/json"
    } else if path.ends_with(".csv") {
        "text/csv"
    } else {
        "application/octet-stream"
    }
}

impl Storage for GcsStorage {
    fn location(&self, path: &str) -> String {
        format!("gs://{}/{}", self.bucket, path)
    }

    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let url = self.download_url(path)?;
        tracing::debug!("Downloading {}", self.location(path));

        let request = self.authorize(self.client.get(url)).await?;
        let response = self.check("download", path, request.send().await?).await?;
        let bytes = response.bytes().await?;

        tracing::info!(
            "Downloaded {} from {} ({} bytes)",
            path,
            self.bucket,
            bytes.len()
        );
        Ok(bytes.to_vec())
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let url = self.upload_url(path)?;
        tracing::debug!("Uploading {} bytes to {}", data.len(), self.location(path));

        let request = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, content_type_for(path))
            .body(data.to_vec());
        let request = self.authorize(request).await?;
        self.check("upload", path, request.send().await?).await?;

        tracing::info!("Uploaded {} to {}", path, self.bucket);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn storage(endpoint: &str) -> GcsStorage {
        GcsStorage::new(Client::new(), GcsAuth::anonymous(Client::new()), "leads-bucket")
            .with_endpoint(endpoint)
    }

    #[test]
    fn test_urls_escape_object_names() {
        let gcs = storage(DEFAULT_STORAGE_ENDPOINT);

        assert_eq!(
            gcs.download_url("exports/leads 1.csv").unwrap().as_str(),
            "https://storage.googleapis.com/storage/v1/b/leads-bucket/o/exports%2Fleads%201.csv?alt=media"
        );
        assert_eq!(
            gcs.upload_url("processed/leads.csv").unwrap().as_str(),
            "https://storage.googleapis.com/upload/storage/v1/b/leads-bucket/o?uploadType=media&name=processed%2Fleads.csv"
        );
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a.csv"), "text/csv");
        assert_eq!(content_type_for("a.csv.summary.json"), "application/json");
        assert_eq!(content_type_for("a.bin"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_read_and_write_objects() {
        let server = MockServer::start_async().await;
        let download = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/storage/v1/b/leads-bucket/o/leads.csv")
                    .query_param("alt", "media");
                then.status(200).body("email\njane@acme.com\n");
            })
            .await;
        let upload = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/upload/storage/v1/b/leads-bucket/o")
                    .query_param("uploadType", "media")
                    .query_param("name", "processed/leads.csv")
                    .header("content-type", "text/csv")
                    .body("email,email_host\n");
                then.status(200).json_body(serde_json::json!({"name": "processed/leads.csv"}));
            })
            .await;

        let gcs = storage(&server.base_url());

        let data = gcs.read_file("leads.csv").await.unwrap();
        assert_eq!(data, b"email\njane@acme.com\n");

        gcs.write_file("processed/leads.csv", b"email,email_host\n")
            .await
            .unwrap();

        download.assert_async().await;
        upload.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_object_is_storage_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/storage/v1/b/leads-bucket/o/missing.csv");
                then.status(404).body("No such object: leads-bucket/missing.csv");
            })
            .await;

        let err = storage(&server.base_url())
            .read_file("missing.csv")
            .await
            .unwrap_err();

        assert!(matches!(err, EtlError::StorageError { .. }));
        assert!(err.to_string().contains("404"));
    }
}
