use tracing::{debug, warn};

use crate::task::{Draft, Task};

/// Create mode or editing one task. Drafts only exist inside a variant, so
/// there is never more than one active session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditState {
    Create(Draft),
    Editing { task_id: String, draft: Draft },
}

impl Default for EditState {
    fn default() -> Self {
        Self::Create(Draft::default())
    }
}

impl EditState {
    pub fn draft(&self) -> &Draft {
        match self {
            Self::Create(draft) | Self::Editing { draft, .. } => draft,
        }
    }

    fn draft_mut(&mut self) -> &mut Draft {
        match self {
            Self::Create(draft) | Self::Editing { draft, .. } => draft,
        }
    }
}

/// In-memory projection of the server's task collection. No I/O happens here.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    edit: EditState,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    #[tracing::instrument(skip(self, tasks), fields(count = tasks.len()))]
    pub fn load(&mut self, tasks: Vec<Task>) {
        debug!(previous = self.tasks.len(), "replacing task collection");
        self.tasks = tasks;
    }

    #[tracing::instrument(skip(self, task), fields(id = %task.id))]
    pub fn append(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Swaps the task with `id` for `task`, keeping its position. Returns
    /// false when no such task is held.
    #[tracing::instrument(skip(self, task))]
    pub fn replace(&mut self, id: &str, task: Task) -> bool {
        match self.tasks.iter_mut().find(|existing| existing.id == id) {
            Some(slot) => {
                *slot = task;
                true
            }
            None => {
                warn!(id, "replace target not in store; ignoring");
                false
            }
        }
    }

    #[tracing::instrument(skip(self))]
    pub fn remove(&mut self, id: &str) -> Option<Task> {
        let Some(idx) = self.position(id) else {
            warn!(id, "remove target not in store; ignoring");
            return None;
        };
        Some(self.tasks.remove(idx))
    }

    pub fn edit_state(&self) -> &EditState {
        &self.edit
    }

    pub fn editing_task_id(&self) -> Option<&str> {
        match &self.edit {
            EditState::Editing { task_id, .. } => Some(task_id.as_str()),
            EditState::Create(_) => None,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing_task_id().is_some()
    }

    pub fn draft(&self) -> &Draft {
        self.edit.draft()
    }

    /// Drafts of whichever mode is active.
    pub fn draft_mut(&mut self) -> &mut Draft {
        self.edit.draft_mut()
    }

    pub fn clear_draft(&mut self) {
        self.edit.draft_mut().clear();
    }

    #[tracing::instrument(skip(self, task), fields(id = %task.id))]
    pub fn begin_edit(&mut self, task: &Task) {
        if let Some(previous) = self.editing_task_id() {
            debug!(previous, "abandoning previous edit session");
        }
        self.edit = EditState::Editing {
            task_id: task.id.clone(),
            draft: Draft::seeded_from(task),
        };
    }

    #[tracing::instrument(skip(self))]
    pub fn end_edit(&mut self) {
        self.edit = EditState::default();
    }
}
