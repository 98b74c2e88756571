//! TaskBoard - テーブルから直接行う操作
//!
//! 完了チェックの切り替えと削除はフォームを経由しません。
//! 自由入力の項目がないので検証も不要です。

use tracing::debug;

use super::notice::{NoticeKind, Notifications};
use super::policy::FormPolicy;
use crate::domain::{Task, TaskId};
use crate::ports::{Clock, StoreOutcome, TaskStore};

/// Owns the store for the session and the table-level notices.
pub struct TaskBoard<S, C> {
    store: S,
    clock: C,
    notices: Notifications,
}

impl<S: TaskStore, C: Clock> TaskBoard<S, C> {
    pub fn new(store: S, clock: C, policy: &FormPolicy) -> Self {
        Self {
            store,
            clock,
            notices: Notifications::new(policy.notice_ttl()),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// For handing to `TaskForm::submit`.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Flip completion and write the task back.
    ///
    /// Permitted actions follow automatically: `{delete}` once complete,
    /// `{update, delete}` when reopened.
    pub fn toggle_complete(&mut self, id: TaskId) -> StoreOutcome {
        let Some(task) = self.store.get(id) else {
            debug!(%id, "toggle ignored: no such task");
            return StoreOutcome::Missing;
        };
        let toggled = task.with_completion(!task.is_complete);
        debug!(%id, is_complete = toggled.is_complete, "toggling completion");
        self.store.update(toggled)
    }

    /// Delete without confirmation; raises `Deleted` when something was removed.
    pub fn delete(&mut self, id: TaskId) -> StoreOutcome {
        let Some(task) = self.store.get(id).cloned() else {
            debug!(%id, "delete ignored: no such task");
            return StoreOutcome::Missing;
        };
        let outcome = self.store.delete(&task);
        if outcome == StoreOutcome::Deleted {
            self.notices.raise(NoticeKind::Deleted, self.clock.now());
        }
        outcome
    }

    pub fn active_notices(&self) -> Vec<NoticeKind> {
        self.notices.active(self.clock.now())
    }

    pub fn is_notice_active(&self, kind: NoticeKind) -> bool {
        self.notices.is_active(kind, self.clock.now())
    }

    pub fn dismiss(&mut self, kind: NoticeKind) -> bool {
        self.notices.dismiss(kind)
    }

    pub fn clear_expired(&mut self) -> Vec<NoticeKind> {
        self.notices.sweep(self.clock.now())
    }
}
