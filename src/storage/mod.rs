//! Storage adapters implementing the authentication storage ports.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStorage;
pub use postgres::{PgStorage, PoolOptions};
