#![forbid(unsafe_code)]
//! Sophia contract language parser
//!
//! This crate builds on the [`sophia_syntax`] frontend and adds everything a
//! whole-project parse needs: resolution of `include` declarations against a
//! caller-supplied content resolver, the bundled standard library modules, a
//! position query for editor tooling, and the `sophia-parser` command line
//! front end.
//!
//! ## Panic Policy
//!
//! Diagnostics are data, never panics: a parse always returns a best-effort
//! tree plus ordered error and warning lists. The only panic in production
//! code is registering the same file URI twice in a [`cache::ParsedFileCache`],
//! which is a caller bug (callers must check [`cache::ParsedFileCache::get_file`]
//! first). The `cli` module enforces `#![deny(clippy::unwrap_used)]`.

pub mod cache;
pub mod cli;
pub mod position;
pub mod stdlib;

pub use sophia_syntax::ast;
pub use sophia_syntax::diagnostics;
pub use sophia_syntax::parser;
pub use sophia_syntax::scanner;
