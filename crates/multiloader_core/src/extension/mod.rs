//! Extension model and activation pipeline.
//!
//! This module covers everything between "manifest bytes" and "entrypoints
//! invoked": descriptor parsing, identity registry, per-archive symbol
//! resolution and failure-isolated activation. Directory scanning lives in
//! `crate::ecosystem`.

pub mod activator;
pub mod isolation;
pub mod manifest;
pub mod registry;
pub mod symbols;
