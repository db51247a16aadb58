//! Backtracking recursive-descent parser for Sophia.
//!
//! The parser works directly on a [`Scanner`] cursor. Each grammar alternative
//! is tried in order; an alternative that does not apply fails with a
//! structural [`NoMatch`], which rolls the cursor (and any diagnostics the
//! attempt committed) back to the checkpoint. Once an alternative has
//! committed, problems inside it are recorded as diagnostics and parsing
//! continues, so a best-effort tree is produced for malformed input.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use sophia_syntax::parser;
//!
//! let result = parser::parse("contract C =\n  entrypoint f() = 1\n");
//! let ast = result.ast.expect("tree");
//! assert_eq!(ast.children.len(), 1);
//! ```

use crate::ast::*;
use crate::diagnostics::Diagnostic;
use crate::scanner::{Scanner, ScannerPos, Token, TokenKind};

// NOTE: This module is split across multiple files using `include!` to keep all parser
// methods in the same Rust module (preserving privacy + call patterns) while avoiding
// a single large source file.

include!("parser/core.rs");
include!("parser/helpers.rs");
include!("parser/decl.rs");
include!("parser/types.rs");
include!("parser/stmts.rs");
include!("parser/expr.rs");
include!("parser/api.rs");
include!("parser/tests.rs");
