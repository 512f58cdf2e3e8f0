#![forbid(unsafe_code)]

//! Multi-tenant batch synchronization engine.
//!
//! A [`Coordinator`] lists every tenant, asks an [`Executor`] how many rows
//! each tenant has, and feeds page-sized [`WorkItem`]s through a bounded
//! queue to a fixed pool of workers. Page failures are logged and counted;
//! tenant setup failures are collected and returned once all queued work has
//! drained.

pub mod context;
pub mod engine;
pub mod executor;
pub mod registry;

pub use crate::context::{AdminContextBuilder, ContextBuilder, TenantClaims, TenantContext};
pub use crate::engine::{
    Cleanup, CompletionTracker, Coordinator, JobConfig, JobError, PublishError, RunReport, RunState,
    SetupFailurePolicy, WorkItem,
};
pub use crate::executor::{Executor, ExecutorError, JobsFile, JobsFileError, SqlExecutor, SqlJob};
pub use crate::registry::{JobKind, JobRegistry, RegistryError};
pub use tenantsync_store::TenantId;
