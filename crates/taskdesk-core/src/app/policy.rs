//! Form policy: notification lifetime and the deadline gate.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Priority;

/// 通知の表示時間の上限 (10 分)
pub const MAX_NOTICE_TTL_MS: u64 = 10 * 60 * 1000;

/// 期限まわりの秒数の上限 (約 10 年)
pub const MAX_DEADLINE_SECS: i64 = 10 * 366 * 24 * 60 * 60;

/// PolicyError はポリシー読み込み時のエラー
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("failed to read policy file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse policy: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid policy: {0}")]
    Invalid(String),
}

/// Tunables for forms and notifications.
///
/// Every field has a default, so a policy file only needs the keys it changes:
///
/// ```json
/// { "notice_ttl_ms": 3000, "default_priority": "medium" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormPolicy {
    /// How long a notification stays visible.
    pub notice_ttl_ms: u64,

    /// A deadline must be strictly later than `now + deadline_lead_secs`.
    pub deadline_lead_secs: i64,

    /// Extra margin on top of the lead for the deadline seeded into a blank draft.
    pub deadline_slack_secs: i64,

    /// Priority seeded into a blank draft.
    pub default_priority: Priority,
}

impl Default for FormPolicy {
    fn default() -> Self {
        Self {
            notice_ttl_ms: 2_000,
            deadline_lead_secs: 24 * 60 * 60,
            deadline_slack_secs: 60,
            default_priority: Priority::Low,
        }
    }
}

impl FormPolicy {
    pub fn from_json_str(json: &str) -> Result<Self, PolicyError> {
        let policy: Self = serde_json::from_str(json)?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.notice_ttl_ms == 0 || self.notice_ttl_ms > MAX_NOTICE_TTL_MS {
            return Err(PolicyError::Invalid(format!(
                "notice_ttl_ms must be in 1..={MAX_NOTICE_TTL_MS}, got {}",
                self.notice_ttl_ms
            )));
        }
        if !(0..=MAX_DEADLINE_SECS).contains(&self.deadline_lead_secs) {
            return Err(PolicyError::Invalid(format!(
                "deadline_lead_secs must be in 0..={MAX_DEADLINE_SECS}, got {}",
                self.deadline_lead_secs
            )));
        }
        if !(1..=MAX_DEADLINE_SECS).contains(&self.deadline_slack_secs) {
            return Err(PolicyError::Invalid(format!(
                "deadline_slack_secs must be in 1..={MAX_DEADLINE_SECS}, got {}",
                self.deadline_slack_secs
            )));
        }
        Ok(())
    }

    // フィールドは pub なので validate を通らない値でも panic しないよう飽和させる
    pub fn notice_ttl(&self) -> Duration {
        i64::try_from(self.notice_ttl_ms)
            .ok()
            .and_then(Duration::try_milliseconds)
            .unwrap_or(Duration::MAX)
    }

    pub fn deadline_lead(&self) -> Duration {
        Duration::try_seconds(self.deadline_lead_secs).unwrap_or(Duration::MAX)
    }

    fn deadline_slack(&self) -> Duration {
        Duration::try_seconds(self.deadline_slack_secs).unwrap_or(Duration::MAX)
    }

    /// Exclusive lower bound for a deadline entered at `now`.
    pub fn deadline_floor(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        saturating_add(now, self.deadline_lead())
    }

    pub fn accepts_deadline(&self, candidate: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        candidate > self.deadline_floor(now)
    }

    /// Deadline placed in a blank draft; passes `accepts_deadline` at `now`
    /// unless the floor already sits at the end of representable time.
    pub fn seeded_deadline(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        saturating_add(self.deadline_floor(now), self.deadline_slack())
    }
}

pub(crate) fn saturating_add(at: DateTime<Utc>, by: Duration) -> DateTime<Utc> {
    at.checked_add_signed(by).unwrap_or(DateTime::<Utc>::MAX_UTC)
}
