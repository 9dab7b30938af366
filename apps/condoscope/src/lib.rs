//! # condoscope
//!
//! The Condoscope application layer: HTTP API, CLI and configuration on top
//! of the pure `condoscope-core` evaluation engine.
//!
//! The binary in `main.rs` is a thin entry point over this library so the
//! integration tests can build routers and resolve configuration directly.

pub mod api;
pub mod cli;
pub mod config;
