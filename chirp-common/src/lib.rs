//! Utilities shared across the chirp crates.
//!
//! Only observability lives here for now: [`observability::init_logging`]
//! wires the `tracing` subscriber used by the `chirp` binary and by the
//! integration tests of the other crates.
pub mod observability;
