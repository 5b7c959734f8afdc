//! Shared data model layer (structs/constants only).
//!
//! ## Purpose
//! - Keep manifest/report/output structs in one place.
//! - Avoid cyclic imports and duplicated type definitions.
//! - Make JSON output schema changes explicit and reviewable.
//!
//! ## Files
//! - `models.rs` — manifest, device report, verdict/report structs.
//! - `constants.rs` — protocol token, timings, caps, default paths.
//!
//! ## Rule of thumb
//! Domain types should be data-only: no filesystem/network/serial side effects.

pub mod constants;
pub mod models;
