//! Service layer containing verification logic and side-effect helpers.
//!
//! ## Service map
//! - `manifest.rs` — manifest parsing, freshness, lookups, store swap.
//! - `integrity.rs` — size + digest trust predicate for local files.
//! - `library.rs` — reference image acquisition and library sync.
//! - `handshake.rs` — device reset/query/collect/parse state machine.
//! - `port.rs` — serialport-backed `DevicePort` + port enumeration.
//! - `validator.rs` — mod policy evaluation against the active manifest.
//! - `compare.rs` — device dump vs reference image byte comparison.
//! - `programmer.rs` — external programmer (avrdude) invocation.
//! - `output.rs` — JSON/text output helpers + report rendering.
//!
//! ## Conventions
//! - Prefer pure helpers where possible.
//! - Integrity outcomes are booleans with logged causes, not errors.
//! - Keep command handlers thin; delegate to services.

pub mod compare;
pub mod handshake;
pub mod integrity;
pub mod library;
pub mod manifest;
pub mod output;
pub mod port;
pub mod programmer;
pub mod validator;
