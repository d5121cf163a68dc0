//! pagekeep: local-first boosts, collections, notes, reading list and link previews.
//!
//! This library crate exposes all modules for use by the RPC binary and integration tests.

pub mod app;
pub mod database;
pub mod rpc_handler;
pub mod services;
pub mod types;
