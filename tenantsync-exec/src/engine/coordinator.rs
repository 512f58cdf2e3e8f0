use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use tenantsync_store::{PostgresStore, StoreError, TenantSource};
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::context::{AdminContextBuilder, ContextBuilder};
use crate::engine::metrics::{RunReport, RunStats};
use crate::engine::publisher::Publisher;
use crate::engine::queue::work_queue;
use crate::engine::result::{JobError, SetupFailures, TenantFailure};
use crate::engine::tracker::CompletionTracker;
use crate::engine::types::{ConfigError, JobConfig, SetupFailurePolicy};
use crate::engine::worker::WorkerPool;
use crate::executor::Executor;

/// Resource released when a run ends, on every exit path.
#[async_trait]
pub trait Cleanup: Send + Sync {
    async fn release(&self);
}

#[async_trait]
impl Cleanup for PostgresStore {
    async fn release(&self) {
        self.close().await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Created,
    Enumerating,
    /// Index of the tenant being published.
    Publishing(usize),
    Draining,
    CleanedUp,
    /// Terminal state of a run that hit an enumeration or setup error. Queued
    /// work is still drained and cleanup still runs.
    Aborted,
}

enum DispatchError {
    Enumeration(StoreError),
    Setup(Vec<TenantFailure>),
}

/// Drives one run: starts the workers, publishes every tenant, closes the
/// queue, waits for the queued work and releases resources.
pub struct Coordinator {
    config: JobConfig,
    workers: NonZeroUsize,
    tenants: Arc<dyn TenantSource>,
    executor: Arc<dyn Executor>,
    contexts: Arc<dyn ContextBuilder>,
    cleanup: Vec<Arc<dyn Cleanup>>,
    tracker: CompletionTracker,
    state: RunState,
}

impl Coordinator {
    pub fn new(
        config: JobConfig,
        tenants: Arc<dyn TenantSource>,
        executor: Arc<dyn Executor>,
    ) -> Result<Self, JobError> {
        config.validate()?;
        let workers = NonZeroUsize::new(config.concurrency).ok_or(ConfigError::ZeroConcurrency)?;
        Ok(Self {
            config,
            workers,
            tenants,
            executor,
            contexts: Arc::new(AdminContextBuilder::default()),
            cleanup: Vec::new(),
            tracker: CompletionTracker::new(),
            state: RunState::Created,
        })
    }

    pub fn with_context_builder(mut self, contexts: Arc<dyn ContextBuilder>) -> Self {
        self.contexts = contexts;
        self
    }

    pub fn with_cleanup(mut self, cleanup: Arc<dyn Cleanup>) -> Self {
        self.cleanup.push(cleanup);
        self
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    /// Handle on the run's completion tracker, for observing pending work.
    pub fn tracker(&self) -> CompletionTracker {
        self.tracker.clone()
    }

    pub async fn run(self) -> Result<RunReport, JobError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("job_run", %run_id);
        self.run_inner(run_id).instrument(span).await
    }

    async fn run_inner(mut self, run_id: Uuid) -> Result<RunReport, JobError> {
        let started_at = Utc::now();
        let clock = Instant::now();
        info!(
            concurrency = self.config.concurrency,
            page_size = self.config.page_size,
            policy = ?self.config.setup_failure,
            "job run starting"
        );

        let stats = Arc::new(RunStats::default());
        let (sender, receiver) = work_queue(self.workers);
        let workers = WorkerPool::spawn(
            self.workers,
            receiver,
            Arc::clone(&self.executor),
            self.config.page_size,
            Arc::clone(&stats),
        );
        debug!(workers = workers.size(), "worker pool started");

        let publisher = Publisher::new(
            Arc::clone(&self.executor),
            self.config.page_size,
            sender,
            self.tracker.clone(),
        );
        let dispatched = self.dispatch(&publisher, &stats).await;
        // Last sender: dropping it closes the queue so workers exit once drained.
        drop(publisher);

        self.transition(RunState::Draining);
        self.tracker.wait().await;
        let joined = workers.join().await;

        self.release().await;
        let terminal = if dispatched.is_ok() && joined.is_ok() {
            RunState::CleanedUp
        } else {
            RunState::Aborted
        };
        self.transition(terminal);

        let report = stats.report(run_id, started_at, clock.elapsed(), terminal);
        info!(
            state = ?report.state,
            tenants = report.tenants.total,
            tenants_failed = report.tenants.failed,
            pages = report.pages.dispatched,
            pages_failed = report.pages.failed + report.pages.panicked,
            duration_ms = report.duration_ms,
            "job run finished"
        );

        match (dispatched, joined) {
            (Err(DispatchError::Enumeration(e)), _) => Err(JobError::Enumeration(e)),
            (Err(DispatchError::Setup(failures)), _) => Err(JobError::TenantSetup {
                failures: SetupFailures::new(failures),
                report,
            }),
            (Ok(()), Err(e)) => Err(e),
            (Ok(()), Ok(())) => Ok(report),
        }
    }

    async fn dispatch(&mut self, publisher: &Publisher, stats: &RunStats) -> Result<(), DispatchError> {
        self.transition(RunState::Enumerating);
        let tenants = match self.tenants.list_tenants().await {
            Ok(tenants) => tenants,
            Err(e) => {
                error!(error = %e, "tenant enumeration failed");
                return Err(DispatchError::Enumeration(e));
            }
        };
        info!(tenants = tenants.len(), "tenants enumerated");

        let mut failures = Vec::new();
        for (index, tenant) in tenants.iter().enumerate() {
            self.transition(RunState::Publishing(index));
            let ctx = self.contexts.build(tenant);
            match publisher.publish(ctx).await {
                Ok(pages) => stats.record_tenant_published(pages),
                Err(e) => {
                    error!(%tenant, error = %e, "tenant setup failed");
                    stats.record_tenant_failed();
                    failures.push(TenantFailure {
                        tenant: tenant.clone(),
                        error: e,
                    });
                    if self.config.setup_failure == SetupFailurePolicy::Abort {
                        warn!(
                            skipped = tenants.len() - index - 1,
                            "not publishing remaining tenants"
                        );
                        break;
                    }
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DispatchError::Setup(failures))
        }
    }

    async fn release(&self) {
        for resource in &self.cleanup {
            resource.release().await;
        }
    }

    fn transition(&mut self, next: RunState) {
        debug!(from = ?self.state, to = ?next, "run state");
        self.state = next;
    }
}
