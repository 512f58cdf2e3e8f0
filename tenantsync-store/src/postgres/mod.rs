mod statements;
mod store;
mod tenants;

pub use store::PostgresStore;
