pub mod context_store;
pub mod kv_store;
pub mod schema;

pub use context_store::PersistedContext;
pub use kv_store::{JsonKvStore, KeyValueStore, MemoryStore};
