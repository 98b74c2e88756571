//! App - アプリケーション層
//!
//! ports を組み合わせて、ビューから呼ばれる操作を実装します。
//!
//! # 主要コンポーネント
//! - **TaskForm**: 作成／編集ダイアログの状態機械
//! - **TaskBoard**: テーブルからの完了切り替え・削除
//! - **Notifications**: 自動で消える通知
//! - **FormPolicy**: 通知の表示時間・締切の下限などの設定
//! - **SweepLoop**: 期限切れ通知の定期回収

pub mod board;
pub mod form;
pub mod notice;
pub mod policy;
pub mod sweeper;

// 主要な型を再エクスポート
pub use self::board::TaskBoard;
pub use self::form::{Draft, FieldEdit, FieldOutcome, FormMode, FormState, Signals, SubmitOutcome, TaskForm};
pub use self::notice::{Notice, NoticeKind, Notifications};
pub use self::policy::{FormPolicy, PolicyError};
pub use self::sweeper::{Sweep, SweepHandle, SweepLoop};
