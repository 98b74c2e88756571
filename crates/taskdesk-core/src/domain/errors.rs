//! Errors - 本物のエラーとポリシー結果の区別
//!
//! ストアやフォームの「失敗」（重複タイトル、空の説明、近すぎる締切）は
//! ここには置きません。それらは `StoreOutcome` / `SubmitOutcome` などの
//! 結果 enum で表現されます。ここにあるのは呼び出し側のバグや入力の
//! パース失敗など、`Result` で返すべきものだけです。

use thiserror::Error;

/// Input that does not name a [`Priority`](super::Priority).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown priority '{0}' (expected low, medium or high)")]
pub struct ParsePriorityError(pub String);

/// FormError はフォームの呼び出し順序の誤り
///
/// ビュー側の配線ミスを表します。ユーザー入力の検証失敗ではありません。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("form is already open")]
    AlreadyOpen,

    #[error("form is not open")]
    NotOpen,

    #[error("edit form needs a target task")]
    MissingTarget,

    #[error("create form does not take a target task")]
    UnexpectedTarget,

    #[error("task '{0}' does not permit updates")]
    NotEditable(String),

    #[error("field '{0}' is read-only in this form")]
    ReadOnlyField(&'static str),
}
