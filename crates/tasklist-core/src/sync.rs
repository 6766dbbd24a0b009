use std::fmt;

use tracing::{debug, info, instrument, warn};

use crate::client::TaskApi;
use crate::error::{SyncError, ValidationError};
use crate::store::{EditState, TaskStore};
use crate::task::{Draft, Task};

/// Confirmation of a successful intent, for the caller to show or drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Loaded(usize),
    Created(String),
    Updated(String),
    Completed(String),
    Reopened(String),
    Deleted(String),
    Refreshed(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loaded(count) => write!(f, "loaded {count} task(s)"),
            Self::Created(id) => write!(f, "task {id} created"),
            Self::Updated(id) => write!(f, "task {id} updated"),
            Self::Completed(id) => write!(f, "task {id} completed"),
            Self::Reopened(id) => write!(f, "task {id} reopened"),
            Self::Deleted(id) => write!(f, "task {id} deleted"),
            Self::Refreshed(id) => write!(f, "task {id} refreshed"),
        }
    }
}

/// Issues one REST call per user intent and applies the server's answer to
/// the store it owns. The store changes only after a call succeeds, and
/// always from the response body rather than the request payload.
pub struct SyncController<A> {
    api: A,
    store: TaskStore,
}

impl<A: TaskApi> SyncController<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            store: TaskStore::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Form fields of the active mode. Editing them never reaches the server
    /// on its own.
    pub fn draft_mut(&mut self) -> &mut Draft {
        self.store.draft_mut()
    }

    #[instrument(skip(self))]
    pub async fn fetch_all(&mut self) -> Result<Notice, SyncError> {
        let tasks = self.api.list().await.inspect_err(|err| {
            warn!(error = %err, "fetching tasks failed; keeping current list");
        })?;

        let count = tasks.len();
        self.store.load(tasks);
        info!(count, "task list loaded");
        Ok(Notice::Loaded(count))
    }

    #[instrument(skip(self))]
    pub async fn create(&mut self) -> Result<Notice, SyncError> {
        let draft = match self.store.edit_state() {
            EditState::Create(draft) => draft,
            EditState::Editing { .. } => return Err(ValidationError::EditInProgress.into()),
        };
        if !draft.has_title() {
            debug!("rejecting create with empty title");
            return Err(ValidationError::EmptyTitle.into());
        }

        let payload = draft.to_payload(false);
        let created = self.api.create(&payload).await.inspect_err(|err| {
            warn!(error = %err, "creating task failed; drafts kept");
        })?;

        let id = created.id.clone();
        self.store.append(created);
        self.store.clear_draft();
        info!(id = %id, "task created");
        Ok(Notice::Created(id))
    }

    #[instrument(skip(self))]
    pub fn begin_edit(&mut self, id: &str) -> Result<(), SyncError> {
        let task = self
            .store
            .get(id)
            .cloned()
            .ok_or_else(|| SyncError::UnknownTask(id.to_string()))?;
        self.store.begin_edit(&task);
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn cancel_edit(&mut self) {
        self.store.end_edit();
    }

    /// Saves the edit session's drafts. Completion is sent unchanged; only
    /// `toggle` flips it.
    #[instrument(skip(self))]
    pub async fn update(&mut self) -> Result<Notice, SyncError> {
        let (task_id, draft) = match self.store.edit_state() {
            EditState::Editing { task_id, draft } => (task_id.clone(), draft.clone()),
            EditState::Create(_) => return Err(ValidationError::NotEditing.into()),
        };
        let completed = self
            .store
            .get(&task_id)
            .map(|task| task.completed)
            .ok_or_else(|| SyncError::UnknownTask(task_id.clone()))?;

        let payload = draft.to_payload(completed);
        let updated = self
            .api
            .update(&task_id, &payload)
            .await
            .inspect_err(|err| {
                warn!(id = %task_id, error = %err, "updating task failed; edit session kept");
            })?;

        self.store.replace(&task_id, updated);
        self.store.end_edit();
        info!(id = %task_id, "task updated");
        Ok(Notice::Updated(task_id))
    }

    /// Flips completion on the server. The local copy changes only once the
    /// server answers.
    #[instrument(skip(self))]
    pub async fn toggle(&mut self, id: &str) -> Result<Notice, SyncError> {
        let body = self
            .store
            .get(id)
            .map(Task::toggled)
            .ok_or_else(|| SyncError::UnknownTask(id.to_string()))?;

        let updated = self.api.put_task(&body).await.inspect_err(|err| {
            warn!(id, error = %err, "toggling task failed");
        })?;

        let completed = updated.completed;
        self.store.replace(id, updated);
        info!(id, completed, "task toggled");
        if completed {
            Ok(Notice::Completed(id.to_string()))
        } else {
            Ok(Notice::Reopened(id.to_string()))
        }
    }

    #[instrument(skip(self))]
    pub async fn remove(&mut self, id: &str) -> Result<Notice, SyncError> {
        if self.store.get(id).is_none() {
            return Err(SyncError::UnknownTask(id.to_string()));
        }

        self.api.delete(id).await.inspect_err(|err| {
            warn!(id, error = %err, "deleting task failed");
        })?;

        self.store.remove(id);
        info!(id, "task deleted");
        Ok(Notice::Deleted(id.to_string()))
    }

    /// Re-reads a single task from the server and reconciles it in place.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self, id: &str) -> Result<Notice, SyncError> {
        if self.store.get(id).is_none() {
            return Err(SyncError::UnknownTask(id.to_string()));
        }

        let task = self.api.get(id).await.inspect_err(|err| {
            warn!(id, error = %err, "refreshing task failed");
        })?;

        self.store.replace(id, task);
        Ok(Notice::Refreshed(id.to_string()))
    }
}
