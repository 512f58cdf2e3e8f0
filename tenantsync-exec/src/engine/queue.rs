use std::num::NonZeroUsize;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::context::TenantContext;
use crate::engine::tracker::CompletionTicket;

/// One page of one tenant. Dropping the item, processed or not, completes its ticket.
#[derive(Debug)]
pub struct WorkItem {
    pub offset: i64,
    pub context: TenantContext,
    _ticket: CompletionTicket,
}

impl WorkItem {
    pub fn new(offset: i64, context: TenantContext, ticket: CompletionTicket) -> Self {
        Self {
            offset,
            context,
            _ticket: ticket,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("work queue closed")]
pub struct QueueClosed;

/// Bounded queue shared by the publisher and every worker. Its capacity is the
/// only backpressure between them. The queue closes when every sender is dropped.
pub fn work_queue(capacity: NonZeroUsize) -> (WorkSender, WorkReceiver) {
    let (tx, rx) = mpsc::channel(capacity.get());
    (
        WorkSender { tx },
        WorkReceiver {
            rx: Arc::new(Mutex::new(rx)),
        },
    )
}

#[derive(Debug, Clone)]
pub struct WorkSender {
    tx: mpsc::Sender<WorkItem>,
}

impl WorkSender {
    /// Suspends while the queue is full. A rejected item is dropped, which
    /// releases its ticket.
    pub async fn send(&self, item: WorkItem) -> Result<(), QueueClosed> {
        self.tx.send(item).await.map_err(|_| QueueClosed)
    }
}

#[derive(Debug, Clone)]
pub struct WorkReceiver {
    rx: Arc<Mutex<mpsc::Receiver<WorkItem>>>,
}

impl WorkReceiver {
    /// `None` once the queue is closed and drained.
    pub async fn recv(&self) -> Option<WorkItem> {
        self.rx.lock().await.recv().await
    }
}
