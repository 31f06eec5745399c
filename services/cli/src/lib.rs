//! LangChat Terminal Client Library
//!
//! Configuration, rendering, and the input loop for the `langchat` binary.
//! The binary in `bin/langchat.rs` is a thin wrapper around this library.

pub mod config;
pub mod render;
pub mod repl;
