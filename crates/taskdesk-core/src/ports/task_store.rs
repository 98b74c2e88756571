//! TaskStore port - タスク一覧の正本（source of truth）
//!
//! ビューはスナップショット（`tasks()`）を読むだけで、変更は
//! `add` / `update` / `delete` の 3 つの操作に限られます。
//!
//! # 設計原則
//! - 挿入順を保持（表示順 = 挿入順、並べ替えはしない）
//! - title の一意性はストア自身が守る（呼び出し側を信用しない）
//! - 失敗は `Result` ではなく `StoreOutcome` で返す（何も変わらない no-op）

use crate::domain::{NewTask, Task, TaskId};

/// Why a store mutation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Title is empty after trimming.
    EmptyTitle,
    /// Another task already has this exact title.
    DuplicateTitle,
}

/// Result of a store mutation.
///
/// Not `#[must_use]`: callers that treat mutations as fire-and-forget
/// are allowed to drop it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    Added(TaskId),
    Updated,
    Deleted,
    /// No task with the given id; nothing changed.
    Missing,
    /// Refused; nothing changed.
    Rejected(Rejection),
}

impl StoreOutcome {
    /// Did the store change?
    pub fn is_applied(&self) -> bool {
        matches!(
            self,
            StoreOutcome::Added(_) | StoreOutcome::Updated | StoreOutcome::Deleted
        )
    }
}

/// TaskStore はタスクの順序付きコレクション
pub trait TaskStore {
    /// Ordered, read-only snapshot.
    fn tasks(&self) -> &[Task];

    fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks().iter().find(|task| task.id == id)
    }

    /// Exact, case-sensitive match.
    fn find_by_title(&self, title: &str) -> Option<&Task> {
        self.tasks().iter().find(|task| task.title == title)
    }

    fn contains_title(&self, title: &str) -> bool {
        self.find_by_title(title).is_some()
    }

    fn len(&self) -> usize {
        self.tasks().len()
    }

    fn is_empty(&self) -> bool {
        self.tasks().is_empty()
    }

    /// Append `task` unless its title is empty or already taken.
    fn add(&mut self, task: NewTask) -> StoreOutcome;

    /// Replace the whole record that has `task.id`.
    fn update(&mut self, task: Task) -> StoreOutcome;

    /// Remove the record that has `task.id`, if any.
    fn delete(&mut self, task: &Task) -> StoreOutcome;
}
