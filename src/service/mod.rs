use tokio::sync::RwLock;

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::{
    models::{Note, NoteId},
    repository::NoteStore,
};

/// What an operation did to the local list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The remote call succeeded and the local list was patched.
    Applied,
    /// Nothing was sent: blank draft, repeated initialize, or the controller
    /// was already disposed.
    Skipped,
    /// The remote call failed (or its result arrived after disposal); local
    /// state is untouched.
    Failed,
}

/// Snapshot of everything the UI renders.
#[derive(Debug, Clone)]
pub struct NoteListView {
    pub notes: Vec<Arc<Note>>,
    pub draft: String,
    pub is_loading: bool,
    pub show_empty_message: bool,
}

#[derive(Debug, Default)]
struct NoteListState {
    notes: Vec<Arc<Note>>,
    draft: String,
    is_loading: bool,
}

impl NoteListState {
    fn show_empty_message(&self) -> bool {
        self.notes.is_empty() && !self.is_loading
    }
}

/// Keeps an in-memory note list in step with a remote table.
///
/// Local state is only patched after the remote call reports success, and the
/// lock on it is never held while a call is outstanding, so operations on
/// different rows may overlap and complete in any order.
pub struct NoteListController<S> {
    store: S,
    state: RwLock<NoteListState>,
    started: AtomicBool,
    disposed: AtomicBool,
}

impl<S: NoteStore> NoteListController<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            state: RwLock::new(NoteListState::default()),
            started: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
        }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Tears the controller down. Results of calls still in flight are
    /// dropped when they arrive.
    pub fn dispose(&self) {
        if !self.disposed.swap(true, Ordering::AcqRel) {
            tracing::info!("Note list controller disposed");
        }
    }

    /// Loads the full list once. Later calls do nothing.
    pub async fn initialize(&self) -> Outcome {
        if self.is_disposed() || self.started.swap(true, Ordering::AcqRel) {
            tracing::warn!("Note list already initialized or disposed, skipping load");
            return Outcome::Skipped;
        }

        self.state.write().await.is_loading = true;

        let result = self.store.list_notes().await;

        if self.is_disposed() {
            tracing::debug!("Dropping note list fetched after dispose");
            return Outcome::Failed;
        }

        let mut state = self.state.write().await;
        state.is_loading = false;
        match result {
            Ok(notes) => {
                tracing::info!("Loaded {} notes", notes.len());
                state.notes = notes.into_iter().map(Arc::new).collect();
                Outcome::Applied
            }
            Err(e) => {
                tracing::error!("failed to load notes: {e}");
                Outcome::Failed
            }
        }
    }

    pub async fn set_draft(&self, text: impl Into<String>) {
        self.state.write().await.draft = text.into();
    }

    pub async fn draft(&self) -> String {
        self.state.read().await.draft.clone()
    }

    /// Creates a note from the draft and puts it at the head of the list.
    ///
    /// The new row goes first whatever its `created_at`; the list is not
    /// re-sorted. The draft is cleared only when the insert succeeds.
    pub async fn submit_draft(&self) -> Outcome {
        if self.is_disposed() {
            return Outcome::Skipped;
        }

        let draft = self.draft().await;
        if draft.trim().is_empty() {
            return Outcome::Skipped;
        }

        let result = self.store.insert_note(&draft).await;

        if self.is_disposed() {
            tracing::debug!("Dropping created note received after dispose");
            return Outcome::Failed;
        }

        match result {
            Ok(note) => {
                tracing::info!("Created note {}", note.id);
                let mut state = self.state.write().await;
                state.notes.insert(0, Arc::new(note));
                state.draft.clear();
                Outcome::Applied
            }
            Err(e) => {
                tracing::error!("failed to create note: {e}");
                Outcome::Failed
            }
        }
    }

    /// Flips the completed flag of `id`, starting from the caller's view of it.
    pub async fn toggle_completion(&self, id: &NoteId, current_completed: bool) -> Outcome {
        if self.is_disposed() {
            return Outcome::Skipped;
        }

        let completed = !current_completed;
        let result = self.store.set_completed(id, completed).await;

        if self.is_disposed() {
            tracing::debug!("Dropping toggle of note {} received after dispose", id);
            return Outcome::Failed;
        }

        match result {
            Ok(()) => {
                tracing::info!("Set completed={} on note {}", completed, id);
                let mut state = self.state.write().await;
                state.notes = state
                    .notes
                    .iter()
                    .map(|note| {
                        if &note.id == id {
                            Arc::new(note.with_completed(completed))
                        } else {
                            Arc::clone(note)
                        }
                    })
                    .collect();
                Outcome::Applied
            }
            Err(e) => {
                tracing::error!("failed to update note {id}: {e}");
                Outcome::Failed
            }
        }
    }

    pub async fn remove_note(&self, id: &NoteId) -> Outcome {
        if self.is_disposed() {
            return Outcome::Skipped;
        }

        let result = self.store.delete_note(id).await;

        if self.is_disposed() {
            tracing::debug!("Dropping delete of note {} received after dispose", id);
            return Outcome::Failed;
        }

        match result {
            Ok(()) => {
                tracing::info!("Deleted note {}", id);
                self.state.write().await.notes.retain(|note| &note.id != id);
                Outcome::Applied
            }
            Err(e) => {
                tracing::error!("failed to delete note {id}: {e}");
                Outcome::Failed
            }
        }
    }

    pub async fn notes(&self) -> Vec<Arc<Note>> {
        self.state.read().await.notes.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.is_loading
    }

    pub async fn show_empty_message(&self) -> bool {
        self.state.read().await.show_empty_message()
    }

    pub async fn view(&self) -> NoteListView {
        let state = self.state.read().await;
        NoteListView {
            notes: state.notes.clone(),
            draft: state.draft.clone(),
            is_loading: state.is_loading,
            show_empty_message: state.show_empty_message(),
        }
    }
}
