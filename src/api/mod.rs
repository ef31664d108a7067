//! Purpose: Define the stable public API surface for the Pushover client.
//! Exports: `Pushover`, `Transport`, `UreqTransport`, `IntArg`, errors.
//! Role: Public, additive-only surface; internal modules stay private.
//! Invariants: This module is the only public path to client internals.

mod client;
mod coerce;
mod transport;

pub use crate::core::error::{Error, ErrorKind};
pub use client::{ApiResult, Pushover};
pub use coerce::IntArg;
pub use transport::{Transport, UreqTransport};
