mod memory;
mod rest;

pub use memory::{MemoryStore, StoreOp};
pub use rest::RestStore;

use reqwest::StatusCode;

use std::future::Future;

use crate::models::{Note, NoteId};

/// A remote operation failed. The variant carries whatever detail the store
/// handed back.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("request to remote store failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("remote store answered {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("failed to decode remote store response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("remote store returned no row for the inserted note")]
    EmptyInsert,

    #[error("remote store unavailable: {0}")]
    Unavailable(String),
}

/// The four table operations the note list needs from its backing store.
pub trait NoteStore: Send + Sync {
    /// All rows, newest `created_at` first.
    fn list_notes(&self) -> impl Future<Output = Result<Vec<Note>, StoreError>> + Send;

    /// Inserts `{text, completed: false}` and returns the stored row.
    fn insert_note(&self, text: &str) -> impl Future<Output = Result<Note, StoreError>> + Send;

    fn set_completed(
        &self,
        id: &NoteId,
        completed: bool,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn delete_note(&self, id: &NoteId) -> impl Future<Output = Result<(), StoreError>> + Send;
}
