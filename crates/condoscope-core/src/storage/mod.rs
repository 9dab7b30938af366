//! # Storage Module
//!
//! Persistent row storage backed by redb.

mod redb_store;

pub use redb_store::RedbStore;
