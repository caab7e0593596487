//! Storage client - Upload dei file nel bucket Supabase

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error, info, instrument};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

#[derive(Serialize)]
struct RemoveBody<'a> {
    prefixes: &'a [String],
}

pub struct StorageClient {
    http: Client,
    base_url: String,
    service_key: String,
    bucket: String,
}

impl StorageClient {
    pub fn new(http: Client, supabase_url: String, service_key: String, bucket: String) -> Self {
        Self {
            http,
            base_url: format!("{}/storage/v1", supabase_url.trim_end_matches('/')),
            service_key,
            bucket,
        }
    }

    async fn check_status(resp: reqwest::Response) -> Result<(), StorageError> {
        if resp.status().is_success() {
            return Ok(());
        }
        let status = resp.status().as_u16();
        let message = resp.text().await.unwrap_or_default();
        error!(status, "Storage service returned an error");
        Err(StorageError::Api { status, message })
    }

    /// Carica il file nel bucket e restituisce il path dell'oggetto
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        mime_type: &str,
    ) -> Result<String, StorageError> {
        debug!("Uploading object");
        let resp = self
            .http
            .post(format!("{}/object/{}/{}", self.base_url, self.bucket, path))
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .header("Content-Type", mime_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;
        Self::check_status(resp).await?;

        info!("Object uploaded");
        Ok(path.to_string())
    }

    /// Rimuove uno o più oggetti dal bucket
    #[instrument(skip(self))]
    pub async fn remove(&self, paths: &[String]) -> Result<(), StorageError> {
        debug!("Removing objects");
        let resp = self
            .http
            .delete(format!("{}/object/{}", self.base_url, self.bucket))
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .json(&RemoveBody { prefixes: paths })
            .send()
            .await?;
        Self::check_status(resp).await?;

        info!(count = paths.len(), "Objects removed");
        Ok(())
    }
}
