use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::engine::coordinator::RunState;

/// Live counters shared by the coordinator and the workers.
#[derive(Debug, Default)]
pub struct RunStats {
    tenants_total: AtomicU64,
    tenants_published: AtomicU64,
    tenants_empty: AtomicU64,
    tenants_failed: AtomicU64,
    pages_succeeded: AtomicU64,
    pages_failed: AtomicU64,
    pages_panicked: AtomicU64,
}

impl RunStats {
    pub fn record_tenant_published(&self, pages: usize) {
        self.tenants_total.fetch_add(1, Ordering::Relaxed);
        if pages == 0 {
            self.tenants_empty.fetch_add(1, Ordering::Relaxed);
        } else {
            self.tenants_published.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_tenant_failed(&self) {
        self.tenants_total.fetch_add(1, Ordering::Relaxed);
        self.tenants_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_page_success(&self) {
        self.pages_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_page_failure(&self) {
        self.pages_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_page_panic(&self) {
        self.pages_panicked.fetch_add(1, Ordering::Relaxed);
    }

    pub fn report(
        &self,
        run_id: Uuid,
        started_at: DateTime<Utc>,
        elapsed: Duration,
        state: RunState,
    ) -> RunReport {
        let pages_succeeded = self.pages_succeeded.load(Ordering::Relaxed);
        let pages_failed = self.pages_failed.load(Ordering::Relaxed);
        let pages_panicked = self.pages_panicked.load(Ordering::Relaxed);
        RunReport {
            run_id,
            state,
            started_at,
            duration_ms: elapsed.as_millis() as u64,
            tenants: TenantCounts {
                total: self.tenants_total.load(Ordering::Relaxed),
                published: self.tenants_published.load(Ordering::Relaxed),
                empty: self.tenants_empty.load(Ordering::Relaxed),
                failed: self.tenants_failed.load(Ordering::Relaxed),
            },
            pages: PageCounts {
                dispatched: pages_succeeded + pages_failed + pages_panicked,
                succeeded: pages_succeeded,
                failed: pages_failed,
                panicked: pages_panicked,
            },
        }
    }
}

/// Summary of a finished run. Taken after the queue is drained, so every
/// dispatched page is counted in exactly one outcome.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub state: RunState,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub tenants: TenantCounts,
    pub pages: PageCounts,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TenantCounts {
    /// Tenants the coordinator attempted.
    pub total: u64,
    pub published: u64,
    /// Tenants with no rows.
    pub empty: u64,
    pub failed: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageCounts {
    pub dispatched: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub panicked: u64,
}
