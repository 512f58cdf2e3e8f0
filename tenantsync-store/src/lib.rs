#![forbid(unsafe_code)]

pub mod store;
pub mod postgres;

pub use crate::store::{SessionScope, StoreError, TenantId, TenantSource, TenantTable};
pub use crate::postgres::PostgresStore;
