//! Purpose: Synchronous Rust client for the Pushover push-notification API.
//! Exports: `api` (client, transport, errors) and `core` (error primitives).
//! Role: Library crate root; the `api` module is the stable public surface.
//! Invariants: One blocking HTTP request per network operation, no retries.
//! Invariants: Parameter validation happens before any network I/O.

pub mod api;
pub mod core;
