//! ui
//!
//! User-facing output utilities.
//!
//! The core produces structured diagnostics; this layer is the only
//! place they are turned into human text or JSON.

pub mod output;
