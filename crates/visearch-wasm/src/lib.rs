#![forbid(unsafe_code)]

//! Browser bridge for visual search trial planning.
//!
//! The session UI calls these exports once at session start and keeps the
//! returned plan JSON for the rest of the session. All JSON shaping and
//! validation lives in `bridge_core`, which is plain Rust and tested
//! natively; the `wasm` module only converts between JS and Rust types.

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;

pub mod bridge_core;
