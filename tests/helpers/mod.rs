#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::oneshot;

use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use todolist::{
    models::{Note, NoteId},
    repository::{MemoryStore, NoteStore, StoreError, StoreOp},
};

pub fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, hour, min, 0).unwrap()
}

pub fn note(id: i64, text: &str, created_at: DateTime<Utc>) -> Note {
    Note {
        id: NoteId::Int(id),
        text: text.to_string(),
        completed: false,
        created_at,
    }
}

pub fn ids(notes: &[std::sync::Arc<Note>]) -> Vec<NoteId> {
    notes.iter().map(|n| n.id.clone()).collect()
}

/// Store whose list answer is fixed, in whatever order it was given.
pub struct FixedListStore {
    pub rows: Vec<Note>,
}

impl NoteStore for FixedListStore {
    async fn list_notes(&self) -> Result<Vec<Note>, StoreError> {
        Ok(self.rows.clone())
    }

    async fn insert_note(&self, _text: &str) -> Result<Note, StoreError> {
        Err(StoreError::Unavailable("read only".to_string()))
    }

    async fn set_completed(&self, _id: &NoteId, _completed: bool) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("read only".to_string()))
    }

    async fn delete_note(&self, _id: &NoteId) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("read only".to_string()))
    }
}

/// Memory store that can hold back the response of a call after the call has
/// already been applied, so completions can be reordered by the test.
pub struct GatedStore {
    pub inner: MemoryStore,
    held: Mutex<HashMap<StoreOp, VecDeque<oneshot::Receiver<()>>>>,
}

impl GatedStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            held: Mutex::new(HashMap::new()),
        }
    }

    /// The next call of `op` is applied but does not answer until the
    /// returned sender fires (or is dropped).
    pub fn hold_response(&self, op: StoreOp) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.held
            .lock()
            .unwrap()
            .entry(op)
            .or_default()
            .push_back(rx);
        tx
    }

    async fn answer(&self, op: StoreOp) {
        let gate = self
            .held
            .lock()
            .unwrap()
            .get_mut(&op)
            .and_then(VecDeque::pop_front);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
    }
}

impl NoteStore for GatedStore {
    async fn list_notes(&self) -> Result<Vec<Note>, StoreError> {
        let result = self.inner.list_notes().await;
        self.answer(StoreOp::List).await;
        result
    }

    async fn insert_note(&self, text: &str) -> Result<Note, StoreError> {
        let result = self.inner.insert_note(text).await;
        self.answer(StoreOp::Insert).await;
        result
    }

    async fn set_completed(&self, id: &NoteId, completed: bool) -> Result<(), StoreError> {
        let result = self.inner.set_completed(id, completed).await;
        self.answer(StoreOp::Update).await;
        result
    }

    async fn delete_note(&self, id: &NoteId) -> Result<(), StoreError> {
        let result = self.inner.delete_note(id).await;
        self.answer(StoreOp::Delete).await;
        result
    }
}
