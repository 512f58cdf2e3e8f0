#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::Semaphore;

use async_trait::async_trait;
use tenantsync_exec::engine::CompletionTracker;
use tenantsync_exec::{Cleanup, Executor, ExecutorError, TenantClaims, TenantContext, TenantId};
use tenantsync_store::{StoreError, TenantSource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub tenant: String,
    pub limit: i64,
    pub offset: i64,
    pub claims: TenantClaims,
}

/// Executor activity in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// `pending` is the tracker's count when `pre_execute` was entered.
    PreExecute { tenant: String, pending: Option<usize> },
    Page { tenant: String, offset: i64 },
}

/// Scriptable executor that records every call it receives.
#[derive(Default)]
pub struct MockExecutor {
    totals: HashMap<String, Result<i64, String>>,
    failing_pre_execute: HashSet<String>,
    failing_pages: HashSet<(String, i64)>,
    panicking_pages: HashSet<(String, i64)>,
    delay: Duration,
    pre_executed: Mutex<Vec<String>>,
    counted: Mutex<Vec<String>>,
    calls: Mutex<Vec<Call>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    events: Mutex<Vec<Event>>,
    tracker: Mutex<Option<CompletionTracker>>,
    /// Pages wait on this until `pre_execute` runs for the named tenant.
    page_gate: Option<(String, Semaphore)>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_total(mut self, tenant: &str, total: i64) -> Self {
        self.totals.insert(tenant.to_string(), Ok(total));
        self
    }

    pub fn with_total_error(mut self, tenant: &str, message: &str) -> Self {
        self.totals.insert(tenant.to_string(), Err(message.to_string()));
        self
    }

    pub fn failing_pre_execute(mut self, tenant: &str) -> Self {
        self.failing_pre_execute.insert(tenant.to_string());
        self
    }

    pub fn failing_page(mut self, tenant: &str, offset: i64) -> Self {
        self.failing_pages.insert((tenant.to_string(), offset));
        self
    }

    pub fn panicking_page(mut self, tenant: &str, offset: i64) -> Self {
        self.panicking_pages.insert((tenant.to_string(), offset));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn hold_pages_until_pre_execute(mut self, tenant: &str) -> Self {
        self.page_gate = Some((tenant.to_string(), Semaphore::new(0)));
        self
    }

    /// Snapshot the tracker's pending count at every `pre_execute`.
    pub fn observe(&self, tracker: CompletionTracker) {
        *self.tracker.lock().unwrap() = Some(tracker);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn pre_executed(&self) -> Vec<String> {
        self.pre_executed.lock().unwrap().clone()
    }

    pub fn counted(&self) -> Vec<String> {
        self.counted.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Offsets executed for one tenant, sorted.
    pub fn offsets_for(&self, tenant: &str) -> Vec<i64> {
        let mut offsets: Vec<i64> = self
            .calls()
            .into_iter()
            .filter(|c| c.tenant == tenant)
            .map(|c| c.offset)
            .collect();
        offsets.sort_unstable();
        offsets
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Executor for MockExecutor {
    async fn pre_execute(&self, ctx: &TenantContext) -> Result<(), ExecutorError> {
        let tenant = ctx.tenant().as_str().to_string();
        self.pre_executed.lock().unwrap().push(tenant.clone());
        let pending = self.tracker.lock().unwrap().as_ref().map(|t| t.pending());
        self.events.lock().unwrap().push(Event::PreExecute {
            tenant: tenant.clone(),
            pending,
        });
        if let Some((gate_tenant, gate)) = &self.page_gate {
            if *gate_tenant == tenant {
                gate.close();
            }
        }
        if self.failing_pre_execute.contains(&tenant) {
            return Err(ExecutorError::failed(format!("pre-execute refused for {tenant}")));
        }
        Ok(())
    }

    async fn get_total(&self, ctx: &TenantContext) -> Result<i64, ExecutorError> {
        let tenant = ctx.tenant().as_str();
        self.counted.lock().unwrap().push(tenant.to_string());
        match self.totals.get(tenant) {
            Some(Ok(total)) => Ok(*total),
            Some(Err(message)) => Err(ExecutorError::failed(message.clone())),
            None => Ok(0),
        }
    }

    async fn execute_job(&self, ctx: &TenantContext, limit: i64, offset: i64) -> Result<(), ExecutorError> {
        let tenant = ctx.tenant().as_str().to_string();
        if let Some((_, gate)) = &self.page_gate {
            // No permits are ever added; `close` is what releases waiters.
            let _ = gate.acquire().await;
        }
        self.events.lock().unwrap().push(Event::Page {
            tenant: tenant.clone(),
            offset,
        });
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.calls.lock().unwrap().push(Call {
            tenant: tenant.clone(),
            limit,
            offset,
            claims: ctx.claims().clone(),
        });

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let key = (tenant, offset);
        if self.panicking_pages.contains(&key) {
            panic!("executor blew up at offset {offset}");
        }
        if self.failing_pages.contains(&key) {
            return Err(ExecutorError::failed(format!("page {offset} rejected")));
        }
        Ok(())
    }
}

pub struct MockTenants {
    result: Result<Vec<TenantId>, String>,
}

impl MockTenants {
    pub fn new(tenants: &[&str]) -> Self {
        Self {
            result: Ok(tenants.iter().map(|t| TenantId::new(*t)).collect()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
        }
    }
}

#[async_trait]
impl TenantSource for MockTenants {
    async fn list_tenants(&self) -> Result<Vec<TenantId>, StoreError> {
        self.result.clone().map_err(StoreError::Other)
    }
}

#[derive(Default)]
pub struct RecordingCleanup {
    released: AtomicUsize,
}

impl RecordingCleanup {
    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Cleanup for RecordingCleanup {
    async fn release(&self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}
