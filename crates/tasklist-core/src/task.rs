use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A server-owned task record, exactly as the REST collection returns it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: String,

    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub completed: bool,

    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn has_description(&self) -> bool {
        !self.description.trim().is_empty()
    }

    /// The whole record with completion flipped. Sent as-is on toggle so
    /// the server echoes back the original `id` and `created_at`.
    pub fn toggled(&self) -> Task {
        Task {
            completed: !self.completed,
            ..self.clone()
        }
    }
}

/// Request body of create (POST) and update (PUT).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskPayload {
    pub title: String,
    pub description: String,
    pub completed: bool,
}

/// Free-text form fields. Independent of any stored task until a save is
/// confirmed by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub description: String,
}

impl Draft {
    pub fn seeded_from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
        }
    }

    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }

    pub fn clear(&mut self) {
        self.title.clear();
        self.description.clear();
    }

    pub fn to_payload(&self, completed: bool) -> TaskPayload {
        TaskPayload {
            title: self.title.clone(),
            description: self.description.clone(),
            completed,
        }
    }
}
