//! Core form model – component descriptors, registry, and layout resolution.
//!
//! Nothing in this module depends on any TUI or rendering crate.
//! Every type is plain data, so the whole build pass is testable headlessly.

pub mod component;
pub mod data;
pub mod error;
pub mod layout;
pub mod registry;
