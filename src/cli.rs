//! Command-line front end.
//!
//! `sophia-parser [options] <file>...` parses Sophia sources and prints
//! diagnostics in `file:line:col: error: message` form.
//!
//! - No file arguments: parse standard input.
//! - One file: parse it, resolve its include closure (bundled stdlib first,
//!   then the search paths and the file's own directory), and print the
//!   aggregated, sorted diagnostics.
//! - Several files: parse each on its own and print an OK/FAILED summary.
//!
//! `--rule <RULE>` parses the input from a single grammar rule (for example
//! `expr` or `stmt`) instead of the whole-file rule, skipping include
//! resolution.
//!
//! Exit code 0 when no errors were produced, 1 otherwise.
//!
//! ## Design
//!
//! Command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`; only the top-level `run()` exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use sophia_syntax::diagnostics::{self, Diagnostic};
use sophia_syntax::parser::{self, ParseResult, Rule};

use crate::cache::{ParsedFile, ParsedFileCache};
use crate::stdlib;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct CliError {
    pub message: String,
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// The Sophia contract language parser
#[derive(Parser, Debug)]
#[command(name = "sophia-parser")]
#[command(version = VERSION)]
#[command(about = "Parse Sophia contract sources and report diagnostics", long_about = None)]
pub struct Cli {
    /// Source files to parse; standard input is parsed when none are given
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Add a directory to the include search path (repeatable)
    #[arg(short = 'p', long = "path", value_name = "DIRECTORY")]
    pub search_paths: Vec<PathBuf>,

    /// Parse from a single grammar rule instead of a whole file
    /// (e.g. "expr", "stmt", "type"); skips include resolution
    #[arg(long = "rule", value_name = "RULE")]
    pub rule: Option<String>,
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    let rule = cli.rule.as_deref().map(rule_from_name).transpose()?;

    match (cli.files.len(), rule) {
        (0, rule) => parse_stdin(rule),
        (1, Some(rule)) => parse_one_file_rule(&cli.files[0], rule),
        (1, None) => parse_one_file(&cli, &cli.files[0]),
        (_, Some(_)) => Err(CliError::failure(
            "--rule takes at most one input file".to_string(),
        )),
        (_, None) => parse_multiple_files(&cli.files),
    }
}

// ============================================================================
// Commands
// ============================================================================

fn parse_stdin(rule: Option<Rule>) -> CliResult<ExitCode> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .map_err(|e| CliError::failure(format!("Failed to read standard input: {e}")))?;

    let result = match rule {
        Some(rule) => parser::parse_rule(&text, rule),
        None => parser::parse(&text),
    };
    Ok(report(result.errors, result.warnings, None))
}

/// Parse one file from a single grammar rule; no include resolution.
fn parse_one_file_rule(path: &Path, rule: Rule) -> CliResult<ExitCode> {
    let filename = path.to_string_lossy().to_string();
    let text = read_file(path)?;

    let result = parser::parse_rule(&text, rule);
    Ok(report(result.errors, result.warnings, Some(&filename)))
}

/// Parse one file and its include closure.
fn parse_one_file(cli: &Cli, path: &Path) -> CliResult<ExitCode> {
    let filename = path.to_string_lossy().to_string();
    let text = read_file(path)?;

    tracing::debug!(file = %filename, "parsing");
    let result = parser::parse(&text);

    let mut errors = result.errors.clone();
    let mut warnings = result.warnings.clone();

    if result.ast.is_some() {
        let mut search_paths = cli.search_paths.clone();
        if let Some(dir) = path.parent() {
            search_paths.push(dir.to_path_buf());
        }
        let resolve = |uri: &str| resolve_content(uri, &search_paths);
        let parse_text = |text: &str| -> ParseResult { parser::parse(text) };

        let mut cache = ParsedFileCache::new();
        cache.add_parsed_file(
            ParsedFile::new(Some(filename.clone()), result),
            &resolve,
            &parse_text,
        );
        errors = cache.get_errors();
        warnings = cache.get_warnings();
    }

    // The root file's own diagnostics sort before those of its includes.
    for d in errors.iter_mut().chain(warnings.iter_mut()) {
        if d.location.is_some() && d.filename.as_deref() == Some(filename.as_str()) {
            d.filename = None;
        }
    }

    Ok(report(errors, warnings, Some(&filename)))
}

/// Parse each file on its own and print a summary.
fn parse_multiple_files(files: &[PathBuf]) -> CliResult<ExitCode> {
    let mut success = 0usize;
    let mut failed = 0usize;

    for file in files {
        let ok = match fs::read_to_string(file) {
            Ok(text) => parser::parse(&text).errors.is_empty(),
            Err(_) => false,
        };
        if ok {
            println!("{} : OK", file.display());
            success += 1;
        } else {
            println!("{} : FAILED", file.display());
            failed += 1;
        }
    }

    println!("Total    : {}", files.len());
    println!("Success  : {success}");
    println!("Fail     : {failed}");

    Ok(if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

// ============================================================================
// Helpers
// ============================================================================

fn rule_from_name(name: &str) -> CliResult<Rule> {
    let rule = match name {
        "file" => Rule::File,
        "top-decl" => Rule::TopDecl,
        "include-decl" => Rule::IncludeDecl,
        "contract-decl" => Rule::ContractDecl,
        "type-decl" => Rule::TypeDecl,
        "record-decl" => Rule::RecordDecl,
        "datatype-decl" => Rule::DatatypeDecl,
        "entrypoint-decl" => Rule::EntrypointDecl,
        "function-decl" => Rule::FunctionDecl,
        "stmt" => Rule::Stmt,
        "type" => Rule::Type,
        "expr" => Rule::Expr,
        "path" => Rule::Path,
        _ => return Err(CliError::failure(format!("Unknown grammar rule: '{name}'"))),
    };
    Ok(rule)
}

fn read_file(path: &Path) -> CliResult<String> {
    fs::read_to_string(path)
        .map_err(|_| CliError::failure(format!("No such file: '{}'", path.display())))
}

/// Resolve an include URI: bundled stdlib first, then the search paths.
fn resolve_content(uri: &str, search_paths: &[PathBuf]) -> Option<String> {
    if let Some(content) = stdlib::stdlib_content(uri) {
        return Some(content.to_string());
    }
    search_paths
        .iter()
        .find_map(|dir| fs::read_to_string(dir.join(uri)).ok())
}

/// Sort and print diagnostics; the exit code is decided by errors alone.
fn report(
    mut errors: Vec<Diagnostic>,
    mut warnings: Vec<Diagnostic>,
    filename: Option<&str>,
) -> ExitCode {
    diagnostics::sort(&mut errors);
    diagnostics::sort(&mut warnings);

    for e in &errors {
        log_diagnostic("error", e, filename);
    }
    for w in &warnings {
        log_diagnostic("warning", w, filename);
    }

    if errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn log_diagnostic(kind: &str, d: &Diagnostic, default_filename: Option<&str>) {
    let filename = d.filename.as_deref().or(default_filename);

    let message = match &d.location {
        Some(span) => format!(
            "{}:{}: {kind}: {}",
            span.begin.line, span.begin.col, d.message
        ),
        None => format!("{kind}: {}", d.message),
    };

    match filename {
        Some(f) => println!("{}:{message}", basename(f)),
        None => println!("{message}"),
    }
}

fn basename(filename: &str) -> String {
    Path::new(filename)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| filename.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sophia_syntax::ast::{Pos, Span};

    #[test]
    fn test_arg_parsing() {
        let cli = Cli::parse_from(["sophia-parser", "-p", "lib", "main.aes"]);
        assert_eq!(cli.files, [PathBuf::from("main.aes")]);
        assert_eq!(cli.search_paths, [PathBuf::from("lib")]);

        let cli = Cli::parse_from(["sophia-parser", "a.aes", "b.aes"]);
        assert_eq!(cli.files.len(), 2);
        assert!(cli.search_paths.is_empty());
    }

    #[test]
    fn test_report_exit_code_follows_errors_only() {
        let warning = Diagnostic::new("w", Span::at(Pos::new(0, 1, 1)));
        assert_eq!(report(Vec::new(), vec![warning], None), ExitCode::SUCCESS);

        let error = Diagnostic::new("e", Span::at(Pos::new(0, 1, 1)));
        assert_eq!(report(vec![error], Vec::new(), None), ExitCode::FAILURE);
    }

    #[test]
    fn test_stdlib_resolution_needs_no_search_paths() {
        assert!(resolve_content("List.aes", &[]).is_some());
        assert!(resolve_content("Missing.aes", &[]).is_none());
    }

    #[test]
    fn test_rule_names() {
        assert!(matches!(rule_from_name("expr"), Ok(Rule::Expr)));
        assert!(matches!(rule_from_name("record-decl"), Ok(Rule::RecordDecl)));
        assert!(rule_from_name("nonsense").is_err());
    }

    #[test]
    fn test_basename() {
        assert_eq!(basename("dir/sub/Main.aes"), "Main.aes");
        assert_eq!(basename("Main.aes"), "Main.aes");
    }
}
