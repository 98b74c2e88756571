//! SweepLoop - 期限切れ通知の回収
//!
//! 通知の有効判定は時刻比較なので、掃除しなくても表示は正しくなります。
//! このループは期限切れのエントリを定期的に取り除き、消えた通知を
//! リスナーに知らせる（画面を再描画させる）ためのものです。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::board::TaskBoard;
use super::form::TaskForm;
use super::notice::NoticeKind;
use crate::ports::{Clock, TaskStore};

/// Anything that owns notices and can drop the expired ones.
pub trait Sweep: Send {
    fn sweep(&mut self) -> Vec<NoticeKind>;
}

impl<C: Clock> Sweep for TaskForm<C> {
    fn sweep(&mut self) -> Vec<NoticeKind> {
        self.clear_expired()
    }
}

impl<S: TaskStore + Send, C: Clock> Sweep for TaskBoard<S, C> {
    fn sweep(&mut self) -> Vec<NoticeKind> {
        self.clear_expired()
    }
}

/// Periodic sweep over a shared target.
pub struct SweepLoop<T> {
    target: Arc<Mutex<T>>,
    period: Duration,
    listener: Option<mpsc::UnboundedSender<Vec<NoticeKind>>>,
}

impl<T: Sweep + 'static> SweepLoop<T> {
    pub fn new(target: Arc<Mutex<T>>, period: Duration) -> Self {
        Self {
            target,
            period,
            listener: None,
        }
    }

    /// Receive the kinds cleared by each sweep (non-empty batches only).
    pub fn with_listener(mut self, listener: mpsc::UnboundedSender<Vec<NoticeKind>>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn spawn(self) -> SweepHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(sweep_loop(self, shutdown_rx));
        SweepHandle { shutdown_tx, join }
    }
}

/// Sweep loop handle.
/// - `request_shutdown()` でループを止める
/// - `shutdown_and_join()` で終了を待てる
pub struct SweepHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl SweepHandle {
    pub fn request_shutdown(&self) {
        // ignore send error: the loop may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        let _ = self.join.await;
    }
}

async fn sweep_loop<T: Sweep>(mut sweeper: SweepLoop<T>, mut shutdown_rx: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(sweeper.period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                // lock は sweep の間だけ保持する（送信は lock の外）
                let cleared = sweeper.target.lock().await.sweep();
                if cleared.is_empty() {
                    continue;
                }
                debug!(?cleared, "notices expired");
                if let Some(listener) = &sweeper.listener
                    && listener.send(cleared).is_err()
                {
                    sweeper.listener = None;
                }
            }
        }
    }
    debug!("sweep loop stopped");
}
