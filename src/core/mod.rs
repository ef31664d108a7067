//! Purpose: Internal primitives shared across the crate.
//! Exports: `error` (error type and kinds).
//! Role: Foundation layer; `api` re-exports what callers need.

pub mod error;
