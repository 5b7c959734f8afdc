//! Command handler layer.
//!
//! This module owns CLI-oriented orchestration and output wiring.
//!
//! ## Files
//! - `verify.rs` — verify/params/image/ports session handlers.
//! - `admin.rs` — manifest and library maintenance handlers.
//!
//! ## Principles
//! - Parse/match CLI inputs here.
//! - Delegate verification logic to `services/*`.
//! - Keep behavior and output schema stable.

pub mod admin;
pub mod verify;
