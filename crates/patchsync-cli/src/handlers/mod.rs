//! Command handlers.
//!
//! Each handler builds an engine through the bootstrap, drives it, and
//! formats the result for the terminal. No reconciliation logic lives here.

pub mod check;
pub mod sync;
pub mod validate;
