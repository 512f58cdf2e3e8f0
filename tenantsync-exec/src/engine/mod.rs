pub mod coordinator;
mod metrics;
pub mod paginate;
pub mod publisher;
pub mod queue;
mod result;
pub mod tracker;
mod types;
pub mod worker;

pub use coordinator::{Cleanup, Coordinator, RunState};
pub use metrics::{PageCounts, RunReport, RunStats, TenantCounts};
pub use publisher::Publisher;
pub use queue::{work_queue, QueueClosed, WorkItem, WorkReceiver, WorkSender};
pub use result::{JobError, PublishError, SetupFailures, TenantFailure};
pub use tracker::{CompletionTicket, CompletionTracker};
pub use types::{ConfigError, JobConfig, SetupFailurePolicy, DEFAULT_CONCURRENCY, DEFAULT_PAGE_SIZE};
pub use worker::WorkerPool;
