/// Parser core: state, checkpointing, and the backtracking primitive.
///
/// ## Notes
/// - This file is `include!`'d into `crate::parser` to keep all parser methods in a
///   single module while avoiding a single "god file".

/// Structural "no match": the tried alternative does not apply at the cursor.
///
/// This is ordinary control flow, not an error. It never reaches callers of
/// the public API; the entry point turns a top-level `NoMatch` into
/// `ast: None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoMatch;

pub type MatchResult<T> = Result<T, NoMatch>;

/// Saved parser state: scanner cursor plus the diagnostic high-water marks.
/// Rolling back truncates the diagnostic lists instead of copying them.
struct Checkpoint {
    cursor: ScannerPos,
    errors_len: usize,
    warnings_len: usize,
}

/// Parser state.
///
/// Diagnostics are accumulated in order of commitment; a rolled-back
/// alternative leaves no trace in them.
pub struct Parser<'a> {
    scanner: Scanner<'a>,
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            scanner: Scanner::new(source),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            cursor: self.scanner.pos(),
            errors_len: self.errors.len(),
            warnings_len: self.warnings.len(),
        }
    }

    fn rollback(&mut self, cp: Checkpoint) {
        self.scanner.set_pos(cp.cursor);
        self.errors.truncate(cp.errors_len);
        self.warnings.truncate(cp.warnings_len);
    }

    /// Try an alternative; on `NoMatch` the cursor and any diagnostics the
    /// attempt recorded are rolled back.
    fn try_match<T>(&mut self, f: impl FnOnce(&mut Self) -> MatchResult<T>) -> MatchResult<T> {
        let cp = self.checkpoint();
        let result = f(self);
        if result.is_err() {
            self.rollback(cp);
        }
        result
    }
}
