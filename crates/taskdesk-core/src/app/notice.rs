//! Notice - 自動で消える通知
//!
//! 通知ごとに `expires_at` を持たせ、タイマーの代わりに時刻比較で
//! 有効かどうかを判定します。同じ種類を再度 raise すると `expires_at` が
//! 上書きされるので、古い期限が新しい通知を消すことはありません。

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};

use super::policy::saturating_add;

/// Kind of transient notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NoticeKind {
    Success,
    DuplicateWarning,
    DeadlineWarning,
    Deleted,
}

impl NoticeKind {
    pub fn message(self) -> &'static str {
        match self {
            NoticeKind::Success => "Task saved successfully!",
            NoticeKind::DuplicateWarning => "A task with this title already exists.",
            NoticeKind::DeadlineWarning => "Deadline must be more than one day from now.",
            NoticeKind::Deleted => "Task deleted.",
        }
    }

    pub fn is_warning(self) -> bool {
        matches!(self, NoticeKind::DuplicateWarning | NoticeKind::DeadlineWarning)
    }
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// One raised notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub raised_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Notice {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// At most one live notice per kind.
#[derive(Debug, Clone)]
pub struct Notifications {
    ttl: Duration,
    entries: BTreeMap<NoticeKind, Notice>,
}

impl Notifications {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: BTreeMap::new(),
        }
    }

    /// Raise `kind` at `now`, replacing any earlier raise of the same kind.
    pub fn raise(&mut self, kind: NoticeKind, now: DateTime<Utc>) -> Notice {
        let notice = Notice {
            kind,
            raised_at: now,
            expires_at: saturating_add(now, self.ttl),
        };
        self.entries.insert(kind, notice);
        notice
    }

    pub fn get(&self, kind: NoticeKind) -> Option<&Notice> {
        self.entries.get(&kind)
    }

    pub fn is_active(&self, kind: NoticeKind, now: DateTime<Utc>) -> bool {
        self.get(kind).is_some_and(|notice| notice.is_active(now))
    }

    /// Active kinds in a stable order.
    pub fn active(&self, now: DateTime<Utc>) -> Vec<NoticeKind> {
        self.entries
            .values()
            .filter(|notice| notice.is_active(now))
            .map(|notice| notice.kind)
            .collect()
    }

    /// Close a notice before it expires (the banner's close button).
    pub fn dismiss(&mut self, kind: NoticeKind) -> bool {
        self.entries.remove(&kind).is_some()
    }

    /// Drop expired notices and return their kinds.
    pub fn sweep(&mut self, now: DateTime<Utc>) -> Vec<NoticeKind> {
        let expired: Vec<NoticeKind> = self
            .entries
            .values()
            .filter(|notice| !notice.is_active(now))
            .map(|notice| notice.kind)
            .collect();
        for kind in &expired {
            self.entries.remove(kind);
        }
        expired
    }
}
