use chrono::{DateTime, Duration, TimeZone, Utc};

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard},
};

use crate::{
    models::{Note, NoteId},
    repository::{NoteStore, StoreError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    List,
    Insert,
    Update,
    Delete,
}

#[derive(Debug)]
struct Table {
    rows: Vec<Note>,
    next_id: i64,
    clock: DateTime<Utc>,
    pinned_created_at: Option<DateTime<Utc>>,
    failing: HashSet<StoreOp>,
    calls: HashMap<StoreOp, usize>,
}

impl Table {
    fn next_row(&mut self, text: &str, completed: bool) -> Note {
        let created_at = self.pinned_created_at.take().unwrap_or_else(|| {
            self.clock += Duration::seconds(1);
            self.clock
        });
        let note = Note {
            id: NoteId::Int(self.next_id),
            text: text.to_string(),
            completed,
            created_at,
        };
        self.next_id += 1;
        self.rows.push(note.clone());
        note
    }

    fn enter(&mut self, op: StoreOp) -> Result<(), StoreError> {
        *self.calls.entry(op).or_default() += 1;
        if self.failing.contains(&op) {
            return Err(StoreError::Unavailable(format!("{op:?} rejected")));
        }
        Ok(())
    }
}

/// In-process table with the same observable behaviour as the REST store.
///
/// Clones share the same table, so a test can keep a handle for seeding,
/// failure injection and inspection after moving one into a controller.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    table: Arc<Mutex<Table>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let clock = Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_default();

        Self {
            table: Arc::new(Mutex::new(Table {
                rows: Vec::new(),
                next_id: 1,
                clock,
                pinned_created_at: None,
                failing: HashSet::new(),
                calls: HashMap::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Table> {
        self.table
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Inserts a row directly, bypassing call counting and failure injection.
    pub fn seed(&self, text: &str, completed: bool) -> Note {
        self.lock().next_row(text, completed)
    }

    /// Rows as a fresh list request would return them.
    pub fn rows(&self) -> Vec<Note> {
        let mut rows = self.lock().rows.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }

    /// Makes every following call of `op` fail until [`Self::recover`].
    pub fn fail(&self, op: StoreOp) {
        self.lock().failing.insert(op);
    }

    pub fn recover(&self, op: StoreOp) {
        self.lock().failing.remove(&op);
    }

    /// Number of calls of `op` received so far, failed ones included.
    pub fn calls(&self, op: StoreOp) -> usize {
        self.lock().calls.get(&op).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.lock().calls.values().sum()
    }

    /// Timestamp the next inserted row gets instead of the running clock.
    pub fn pin_next_created_at(&self, created_at: DateTime<Utc>) {
        self.lock().pinned_created_at = Some(created_at);
    }
}

impl NoteStore for MemoryStore {
    async fn list_notes(&self) -> Result<Vec<Note>, StoreError> {
        self.lock().enter(StoreOp::List)?;
        Ok(self.rows())
    }

    async fn insert_note(&self, text: &str) -> Result<Note, StoreError> {
        let mut table = self.lock();
        table.enter(StoreOp::Insert)?;
        Ok(table.next_row(text, false))
    }

    async fn set_completed(&self, id: &NoteId, completed: bool) -> Result<(), StoreError> {
        let mut table = self.lock();
        table.enter(StoreOp::Update)?;
        table
            .rows
            .iter_mut()
            .filter(|row| &row.id == id)
            .for_each(|row| row.completed = completed);
        Ok(())
    }

    async fn delete_note(&self, id: &NoteId) -> Result<(), StoreError> {
        let mut table = self.lock();
        table.enter(StoreOp::Delete)?;
        table.rows.retain(|row| &row.id != id);
        Ok(())
    }
}
