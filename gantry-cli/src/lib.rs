//! Gantry CLI Library
//!
//! Formatting helpers for the `gantry` binary (main.rs). Kept separate so
//! the output shapes can be tested without spawning the binary.

pub mod report;
