//! InMemoryTaskStore - セッション内だけのタスクストア
//!
//! 永続化はしません。プロセスが終われば消えます。

use tracing::{debug, warn};

use crate::domain::{NewTask, Task};
use crate::ports::{Clock, IdGenerator, Rejection, StoreOutcome, SystemClock, TaskStore, UlidGenerator};

/// InMemoryTaskStore は Vec ベースのタスクストア
///
/// # 実装詳細
/// - `Vec<Task>` で挿入順をそのまま保持
/// - ID は `add` のときに IdGenerator から割り当てる
/// - title の一意性は `add` と `update` の両方で検査する
pub struct InMemoryTaskStore<G = UlidGenerator<SystemClock>> {
    tasks: Vec<Task>,
    ids: G,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::with_id_generator(UlidGenerator::new(SystemClock))
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> InMemoryTaskStore<UlidGenerator<C>> {
    /// Store whose ids take their timestamp from `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self::with_id_generator(UlidGenerator::new(clock))
    }
}

impl<G: IdGenerator> InMemoryTaskStore<G> {
    pub fn with_id_generator(ids: G) -> Self {
        Self {
            tasks: Vec::new(),
            ids,
        }
    }

    fn position(&self, task: &Task) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == task.id)
    }

    /// Is `title` held by some record other than `index`?
    fn title_taken_elsewhere(&self, title: &str, index: usize) -> bool {
        self.tasks
            .iter()
            .enumerate()
            .any(|(i, t)| i != index && t.title == title)
    }
}

impl<G: IdGenerator> TaskStore for InMemoryTaskStore<G> {
    fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    fn add(&mut self, task: NewTask) -> StoreOutcome {
        if task.title.trim().is_empty() {
            warn!("add rejected: empty title");
            return StoreOutcome::Rejected(Rejection::EmptyTitle);
        }
        if self.contains_title(&task.title) {
            warn!(title = %task.title, "add rejected: duplicate title");
            return StoreOutcome::Rejected(Rejection::DuplicateTitle);
        }

        let id = self.ids.generate_task_id();
        debug!(%id, title = %task.title, "task added");
        self.tasks.push(task.into_task(id));
        StoreOutcome::Added(id)
    }

    fn update(&mut self, task: Task) -> StoreOutcome {
        let Some(index) = self.position(&task) else {
            debug!(id = %task.id, "update ignored: no such task");
            return StoreOutcome::Missing;
        };
        if task.title.trim().is_empty() {
            warn!(id = %task.id, "update rejected: empty title");
            return StoreOutcome::Rejected(Rejection::EmptyTitle);
        }
        if self.title_taken_elsewhere(&task.title, index) {
            warn!(id = %task.id, title = %task.title, "update rejected: duplicate title");
            return StoreOutcome::Rejected(Rejection::DuplicateTitle);
        }

        debug!(id = %task.id, title = %task.title, is_complete = task.is_complete, "task updated");
        self.tasks[index] = task;
        StoreOutcome::Updated
    }

    fn delete(&mut self, task: &Task) -> StoreOutcome {
        match self.position(task) {
            Some(index) => {
                let removed = self.tasks.remove(index);
                debug!(id = %removed.id, title = %removed.title, "task deleted");
                StoreOutcome::Deleted
            }
            None => {
                debug!(id = %task.id, "delete ignored: no such task");
                StoreOutcome::Missing
            }
        }
    }
}
