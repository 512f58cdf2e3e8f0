use std::sync::Arc;

use tokio::sync::watch;

/// Counts enqueued-but-unfinished work items. Each enqueue takes a
/// [`CompletionTicket`]; dropping the ticket marks the item complete.
#[derive(Debug, Clone)]
pub struct CompletionTracker {
    pending: Arc<watch::Sender<usize>>,
}

impl Default for CompletionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self {
            pending: Arc::new(tx),
        }
    }

    pub fn ticket(&self) -> CompletionTicket {
        self.pending.send_modify(|n| *n += 1);
        CompletionTicket {
            pending: Arc::clone(&self.pending),
        }
    }

    pub fn pending(&self) -> usize {
        *self.pending.borrow()
    }

    /// Resolves once the counter is zero.
    pub async fn wait(&self) {
        let mut rx = self.pending.subscribe();
        // The sender lives as long as `self`, so this cannot observe a closed channel.
        let _ = rx.wait_for(|n| *n == 0).await;
    }
}

/// Outstanding claim on the tracker. Not `Clone`: each ticket completes once.
#[derive(Debug)]
pub struct CompletionTicket {
    pending: Arc<watch::Sender<usize>>,
}

impl Drop for CompletionTicket {
    fn drop(&mut self) {
        self.pending.send_modify(|n| {
            debug_assert!(*n > 0, "completion tracker went negative");
            *n = n.saturating_sub(1);
        });
    }
}
