mod trait_store;
mod types;

pub use trait_store::{StoreError, TenantSource};
pub use types::{SessionScope, TenantId, TenantTable};
