// The engine itself. Nothing in here touches a database directly.
pub mod competition;
pub mod config;
pub mod error;
pub mod operation_lock;
pub mod store;
pub mod team;
pub mod time;
pub mod types;
