use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::TaskId;
use super::errors::ParsePriorityError;

/// Task priority. `Low` unless the user picks something else.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(ParsePriorityError(s.to_string())),
        }
    }
}

/// An operation the table view may offer on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Update,
    Delete,
}

/// Set of actions permitted on a task, derived from its completion flag.
///
/// There is no way to build one except through [`PermittedActions::for_completion`],
/// so it cannot drift from `is_complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PermittedActions {
    update: bool,
    delete: bool,
}

impl PermittedActions {
    pub fn for_completion(is_complete: bool) -> Self {
        Self {
            update: !is_complete,
            delete: true,
        }
    }

    pub fn contains(&self, action: Action) -> bool {
        match action {
            Action::Update => self.update,
            Action::Delete => self.delete,
        }
    }

    pub fn to_vec(&self) -> Vec<Action> {
        [Action::Update, Action::Delete]
            .into_iter()
            .filter(|action| self.contains(*action))
            .collect()
    }
}

/// Candidate task that has not been stored yet (no id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub deadline: DateTime<Utc>,
    pub priority: Priority,
    pub is_complete: bool,
}

impl NewTask {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        deadline: DateTime<Utc>,
        priority: Priority,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            deadline,
            priority,
            is_complete: false,
        }
    }

    /// Attach the id allocated by the store.
    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            deadline: self.deadline,
            priority: self.priority,
            is_complete: self.is_complete,
        }
    }
}

/// A stored task.
///
/// Design:
/// - `id` is the store key; `title` is unique across the store but is just a value.
/// - `permitted_actions` is computed, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub deadline: DateTime<Utc>,
    pub priority: Priority,
    pub is_complete: bool,
}

impl Task {
    pub fn permitted_actions(&self) -> PermittedActions {
        PermittedActions::for_completion(self.is_complete)
    }

    pub fn permits(&self, action: Action) -> bool {
        self.permitted_actions().contains(action)
    }

    /// Copy of this task with the completion flag set to `is_complete`.
    pub fn with_completion(&self, is_complete: bool) -> Self {
        Self {
            is_complete,
            ..self.clone()
        }
    }
}
