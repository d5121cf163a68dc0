//! pagekeep database layer.
//!
//! Provides SQLite connection management, schema migrations, the record
//! codec and the shared [`Store`] handle.
//!
//! # Usage
//!
//! ```no_run
//! use pagekeep::database::{Database, Store};
//!
//! // Open a persistent database
//! let db = Database::open("pagekeep.db").expect("failed to open database");
//!
//! // Or get a handle that falls back to memory-only mode on failure
//! let store = Store::open("pagekeep.db");
//! assert!(!store.is_degraded());
//! ```

pub mod codec;
pub mod connection;
pub mod migrations;
pub mod record;
pub mod store;

pub use connection::Database;
pub use record::{RecordFamily, StoredRecord};
pub use store::Store;
