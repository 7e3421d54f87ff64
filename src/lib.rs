// tasklist - Task list manager with a persistent key-value backed store

pub mod config;
pub mod confirm;
pub mod filter;
pub mod kv;
pub mod models;
pub mod render;
pub mod store;
pub mod theme;

// Re-export main types for convenience
pub use config::Config;
pub use confirm::Confirm;
pub use filter::Filter;
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use models::{Priority, Stats, Task, TaskDetails, TaskId, now_ms};
pub use store::{Defaults, StoreEvent, TaskStore, Toggle};
pub use theme::{Theme, ThemeStore};
