//! Supabase client - PostgREST rows and Storage objects over reqwest

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::backend::CardBackend;
use crate::config::BackendConfig;
use crate::error::{BackendError, BackendResult};
use crate::models::{CardRecord, SlotNumber};

/// Talks to one Supabase project with the anon key
#[derive(Clone)]
pub struct SupabaseBackend {
    client: reqwest::Client,
    config: BackendConfig,
}

impl SupabaseBackend {
    pub fn new(config: BackendConfig) -> Self {
        SupabaseBackend {
            client: create_client(config.timeout_secs),
            config,
        }
    }

    fn base(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base(), self.config.table)
    }

    fn object_url(&self, name: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base(), self.config.bucket, name)
    }

    /// Attach credentials, failing fast when none are configured
    fn authorized(&self, builder: reqwest::RequestBuilder) -> BackendResult<reqwest::RequestBuilder> {
        if let Some(reason) = self.config.missing() {
            return Err(BackendError::NotConfigured(reason));
        }
        Ok(builder
            .header("apikey", &self.config.anon_key)
            .header("Authorization", format!("Bearer {}", self.config.anon_key)))
    }

    /// Send and turn non-2xx statuses into errors; returns the body text
    async fn send(&self, builder: reqwest::RequestBuilder) -> BackendResult<String> {
        let resp = self
            .authorized(builder)?
            .send()
            .await
            .map_err(|e| BackendError::from_request(e, self.config.timeout_secs))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| BackendError::from_request(e, self.config.timeout_secs))?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(BackendError::Status {
                status: status.as_u16(),
                body: error_message(&body),
            })
        }
    }
}

#[async_trait]
impl CardBackend for SupabaseBackend {
    async fn fetch_all(&self) -> BackendResult<Vec<CardRecord>> {
        let req = self.client.get(self.table_url()).query(&[("select", "*")]);
        let body = self.send(req).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn upsert_card(&self, record: &CardRecord) -> BackendResult<()> {
        let req = self
            .client
            .post(self.table_url())
            .query(&[("on_conflict", "slot_number")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[record]);
        self.send(req).await.map(|_| ())
    }

    async fn update_favorite(&self, slot: SlotNumber, favorite: bool) -> BackendResult<()> {
        let req = self
            .client
            .patch(self.table_url())
            .query(&[("slot_number", format!("eq.{}", slot))])
            .header("Prefer", "return=minimal")
            .json(&json!({ "is_favorite": favorite }));
        self.send(req).await.map(|_| ())
    }

    async fn delete_card(&self, slot: SlotNumber) -> BackendResult<()> {
        let req = self
            .client
            .delete(self.table_url())
            .query(&[("slot_number", format!("eq.{}", slot))]);
        self.send(req).await.map(|_| ())
    }

    async fn upload_object(&self, name: &str, bytes: Vec<u8>, content_type: &str) -> BackendResult<()> {
        let req = self
            .client
            .post(self.object_url(name))
            .header("Content-Type", content_type)
            .header("x-upsert", "true")
            .body(bytes);
        self.send(req).await.map(|_| ())
    }

    async fn remove_object(&self, name: &str) -> BackendResult<()> {
        let url = format!("{}/storage/v1/object/{}", self.base(), self.config.bucket);
        let req = self.client.delete(url).json(&json!({ "prefixes": [name] }));
        self.send(req).await.map(|_| ())
    }

    fn public_url(&self, name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base(),
            self.config.bucket,
            name
        )
    }
}

/// Pull the human-readable part out of a PostgREST / Storage error body
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

/// Create an HTTP client with the configured timeout
pub fn create_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
