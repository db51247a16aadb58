//! Shared syntax frontend for the Sophia contract language: scanner, parser, AST, diagnostics.
//!
//! This crate is dependency-light and intended for reuse across command-line tooling
//! and future editor integrations.
//!
//! ## Notes
//! - This crate is intentionally "syntax-only": it does not resolve includes or check
//!   semantics. Include resolution lives in the `sophia-parser` root crate.
//! - The parser is a backtracking recursive-descent parser that always produces a
//!   best-effort tree plus diagnostics; it never fails with an error value.
//!
//! ## Examples
//! ```rust,no_run
//! use sophia_syntax::parser;
//!
//! let result = parser::parse("contract C =\n  entrypoint f() = 1\n");
//! assert!(result.ast.is_some());
//! assert!(result.errors.is_empty());
//! ```

#![forbid(unsafe_code)]

pub mod ast;
pub mod diagnostics;
pub mod parser;
pub mod scanner;
