use reqwest::{Client, RequestBuilder, Response};

use crate::{
    config::StoreConfig,
    dto::{ApiErrorBody, CompletedPatch, NewNoteRow},
    models::{Note, NoteId},
    repository::{NoteStore, StoreError},
};

use std::time::Duration;

/// Table client speaking the PostgREST dialect (as served by Supabase).
#[derive(Clone)]
pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: String,
    table: String,
}

impl RestStore {
    pub fn new(config: &StoreConfig, timeout: Option<Duration>) -> Result<Self, StoreError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            table: config.table.clone(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn check(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|e| e.summary())
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or(body);

        Err(StoreError::Status { status, message })
    }
}

impl NoteStore for RestStore {
    async fn list_notes(&self) -> Result<Vec<Note>, StoreError> {
        let url = self.table_url();
        tracing::debug!("Listing notes from {}", url);

        let response = self
            .authorize(self.client.get(&url))
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .send()
            .await?;
        let body = Self::check(response).await?.bytes().await?;

        Ok(serde_json::from_slice(&body)?)
    }

    async fn insert_note(&self, text: &str) -> Result<Note, StoreError> {
        let url = self.table_url();
        tracing::debug!("Inserting note into {}", url);

        let response = self
            .authorize(self.client.post(&url))
            .header("Prefer", "return=representation")
            .json(&[NewNoteRow::new(text)])
            .send()
            .await?;
        let body = Self::check(response).await?.bytes().await?;

        let rows: Vec<Note> = serde_json::from_slice(&body)?;
        rows.into_iter().next().ok_or(StoreError::EmptyInsert)
    }

    async fn set_completed(&self, id: &NoteId, completed: bool) -> Result<(), StoreError> {
        let url = self.table_url();
        tracing::debug!("Setting completed={} on note {} at {}", completed, id, url);

        let response = self
            .authorize(self.client.patch(&url))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=minimal")
            .json(&CompletedPatch { completed })
            .send()
            .await?;
        Self::check(response).await?;

        Ok(())
    }

    async fn delete_note(&self, id: &NoteId) -> Result<(), StoreError> {
        let url = self.table_url();
        tracing::debug!("Deleting note {} at {}", id, url);

        let response = self
            .authorize(self.client.delete(&url))
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await?;
        Self::check(response).await?;

        Ok(())
    }
}
