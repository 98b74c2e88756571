//! taskdesk-core
//!
//! In-memory task list with form validation for a single-user editor.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（TaskId, Task, Priority, PermittedActions, errors）
//! - **ports**: 抽象化レイヤー（Clock, IdGenerator, TaskStore）
//! - **impls**: 実装（InMemoryTaskStore）
//! - **app**: アプリケーションロジック（TaskForm, TaskBoard, Notifications, SweepLoop）

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;

pub use app::{
    FieldEdit, FieldOutcome, FormMode, FormPolicy, FormState, NoticeKind, SubmitOutcome,
    TaskBoard, TaskForm,
};
pub use domain::{Action, FormError, NewTask, Priority, Task, TaskId};
pub use impls::InMemoryTaskStore;
pub use ports::{Clock, FixedClock, StoreOutcome, SystemClock, TaskStore};
