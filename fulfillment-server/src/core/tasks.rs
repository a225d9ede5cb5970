//! 订单落库队列
//!
//! Completing an order answers the user first and persists afterwards. Each
//! persistence job runs on its own tokio task; the queue records its status
//! per order id so callers (tests, shutdown) can observe or await it.
//!
//! # 状态
//!
//! - [`JobStatus::Pending`] - 已提交，尚未完成
//! - [`JobStatus::Persisted`] - 已提交事务
//! - [`JobStatus::Failed`] - 已回滚（或任务 panic）

use dashmap::DashMap;
use futures::FutureExt;
use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// 落库任务状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Persisted,
    Failed(String),
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, JobStatus::Pending)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Persisted => write!(f, "persisted"),
            JobStatus::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Deferred order persistence with observable completion
#[derive(Clone, Default)]
pub struct FinalizeQueue {
    jobs: Arc<DashMap<i64, watch::Receiver<JobStatus>>>,
    handles: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl FinalizeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// 提交落库任务
    ///
    /// The job is wrapped to catch panics; a panic is recorded as `Failed`.
    pub fn submit<F, E>(&self, order_id: i64, job: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let (tx, rx) = watch::channel(JobStatus::Pending);
        self.jobs.insert(order_id, rx);

        let wrapped = async move {
            let status = match AssertUnwindSafe(job).catch_unwind().await {
                Ok(Ok(())) => {
                    tracing::info!(order_id, "Order persisted");
                    JobStatus::Persisted
                }
                Ok(Err(e)) => {
                    tracing::error!(order_id, error = %e, "Order persistence failed");
                    JobStatus::Failed(e.to_string())
                }
                Err(panic_info) => {
                    let panic_msg = panic_message(panic_info.as_ref());
                    tracing::error!(order_id, panic = %panic_msg, "Order persistence panicked");
                    JobStatus::Failed(panic_msg)
                }
            };
            // Receivers live in the map; a send error means the job was pruned
            let _ = tx.send(status);
        };

        let handle = tokio::spawn(wrapped);
        tracing::debug!(order_id, "Submitted finalize job");
        self.handles.lock().push(handle);
    }

    /// Current status; `None` for unknown (or pruned) order ids
    pub fn status(&self, order_id: i64) -> Option<JobStatus> {
        self.jobs.get(&order_id).map(|rx| rx.value().borrow().clone())
    }

    /// Wait until the job for `order_id` finishes
    pub async fn wait(&self, order_id: i64) -> Option<JobStatus> {
        let mut rx = self.jobs.get(&order_id).map(|rx| rx.value().clone())?;
        // The sender only drops after publishing a final status
        let _ = rx.wait_for(JobStatus::is_finished).await;
        let status = rx.borrow().clone();
        Some(status)
    }

    /// Number of jobs still running
    pub fn pending(&self) -> usize {
        self.jobs
            .iter()
            .filter(|entry| !entry.value().borrow().is_finished())
            .count()
    }

    /// Forget finished jobs; returns how many were dropped
    pub fn prune_finished(&self) -> usize {
        let before = self.jobs.len();
        self.jobs.retain(|_, rx| !rx.borrow().is_finished());
        self.handles.lock().retain(|h| !h.is_finished());
        before - self.jobs.len()
    }

    /// Await every submitted job (graceful shutdown)
    pub async fn drain(&self) {
        let handles: Vec<_> = std::mem::take(&mut *self.handles.lock());
        if handles.is_empty() {
            return;
        }
        tracing::info!(jobs = handles.len(), "Draining finalize queue");
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Finalize task join failed");
            }
        }
    }
}

/// 提取 panic 信息 (`&str` / `String` payloads)
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

impl fmt::Debug for FinalizeQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinalizeQueue")
            .field("jobs", &self.jobs.len())
            .field("pending", &self.pending())
            .finish()
    }
}
