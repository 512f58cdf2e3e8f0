use std::any::Any;
use std::num::NonZeroUsize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use tokio::task::JoinHandle;
use tracing::{debug, error, trace, warn, Instrument};

use crate::engine::metrics::RunStats;
use crate::engine::queue::{WorkItem, WorkReceiver};
use crate::engine::result::JobError;
use crate::executor::Executor;

/// Fixed set of workers draining the work queue until it closes.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn spawn(
        size: NonZeroUsize,
        queue: WorkReceiver,
        executor: Arc<dyn Executor>,
        page_size: i64,
        stats: Arc<RunStats>,
    ) -> Self {
        let handles = (0..size.get())
            .map(|id| {
                let worker = Worker {
                    id,
                    queue: queue.clone(),
                    executor: Arc::clone(&executor),
                    page_size,
                    stats: Arc::clone(&stats),
                };
                tokio::spawn(worker.run().in_current_span())
            })
            .collect();
        Self { handles }
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Waits for every worker to exit. Workers only exit once the queue is
    /// closed and drained, so the caller must drop all senders first.
    pub async fn join(self) -> Result<(), JobError> {
        let mut first_err = None;
        for (id, handle) in self.handles.into_iter().enumerate() {
            if let Err(e) = handle.await {
                error!(worker = id, error = %e, "worker task failed");
                first_err.get_or_insert(JobError::Worker(format!("worker {id}: {e}")));
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

struct Worker {
    id: usize,
    queue: WorkReceiver,
    executor: Arc<dyn Executor>,
    page_size: i64,
    stats: Arc<RunStats>,
}

impl Worker {
    async fn run(self) {
        while let Some(item) = self.queue.recv().await {
            self.process(&item).await;
        }
        debug!(worker = self.id, "work queue closed, worker exiting");
    }

    /// Never fails: errors and panics are logged and counted, then the item
    /// is dropped with the rest of the iteration.
    async fn process(&self, item: &WorkItem) {
        let tenant = item.context.tenant();
        let call = self.executor.execute_job(&item.context, self.page_size, item.offset);
        match AssertUnwindSafe(call).catch_unwind().await {
            Ok(Ok(())) => {
                trace!(worker = self.id, %tenant, offset = item.offset, "page done");
                self.stats.record_page_success();
            }
            Ok(Err(e)) => {
                warn!(worker = self.id, %tenant, offset = item.offset, error = %e, "page failed");
                self.stats.record_page_failure();
            }
            Err(panic) => {
                error!(
                    worker = self.id,
                    %tenant,
                    offset = item.offset,
                    panic = panic_message(panic.as_ref()),
                    "executor panicked"
                );
                self.stats.record_page_panic();
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
