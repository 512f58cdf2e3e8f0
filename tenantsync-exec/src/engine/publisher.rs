use std::sync::Arc;

use tracing::debug;

use crate::context::TenantContext;
use crate::engine::paginate::page_offsets;
use crate::engine::queue::{WorkItem, WorkSender};
use crate::engine::result::PublishError;
use crate::engine::tracker::CompletionTracker;
use crate::executor::Executor;

/// Turns one tenant into page-sized work items on the queue.
pub struct Publisher {
    executor: Arc<dyn Executor>,
    page_size: i64,
    queue: WorkSender,
    tracker: CompletionTracker,
}

impl Publisher {
    pub fn new(
        executor: Arc<dyn Executor>,
        page_size: i64,
        queue: WorkSender,
        tracker: CompletionTracker,
    ) -> Self {
        Self {
            executor,
            page_size,
            queue,
            tracker,
        }
    }

    /// Returns the number of pages enqueued. `get_total` errors are reported
    /// as such even when the returned total would have meant "nothing to do".
    pub async fn publish(&self, ctx: TenantContext) -> Result<usize, PublishError> {
        self.executor
            .pre_execute(&ctx)
            .await
            .map_err(PublishError::PreExecute)?;

        let total = self
            .executor
            .get_total(&ctx)
            .await
            .map_err(PublishError::Total)?;

        if total < 1 {
            debug!(tenant = %ctx.tenant(), "no rows to sync");
            return Ok(0);
        }

        let mut pages = 0;
        for offset in page_offsets(total, self.page_size) {
            let item = WorkItem::new(offset, ctx.clone(), self.tracker.ticket());
            self.queue
                .send(item)
                .await
                .map_err(|_| PublishError::QueueClosed)?;
            pages += 1;
        }

        debug!(tenant = %ctx.tenant(), total, pages, "tenant published");
        Ok(pages)
    }
}
