//! luma: an embedded Lua scripting runtime.
//!
//! The crate wraps a Lua 5.4 state behind [`engine::Engine`] and layers on
//! the host-integration pieces an embedder needs: value marshaling
//! ([`marshal`]), dotted-path capability registration ([`registry`]), a
//! `require` resolver rooted at a host-controlled directory ([`resolver`]),
//! and a runtime-error capture and formatting pipeline ([`report`]).

pub mod builtins;
pub mod cli;
pub mod console;
pub mod engine;
pub mod fsio;
pub mod marshal;
pub mod registry;
pub mod report;
pub mod resolver;
