pub mod store;
pub mod postgres;
pub mod memory;

pub use store::*;
pub use postgres::{PgItemStore, PoolSettings};
pub use memory::MemoryItemStore;
