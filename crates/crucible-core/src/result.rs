//! Per-case result recording: assertion failures and the fatal error.

use std::path::Path;

/// A single assertion that did not hold.
///
/// Captures the literal source text of the failed expression plus its
/// location. Immutable once recorded; only read back by the reporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    condition: String,
    file: String,
    line: u32,
}

impl Failure {
    /// Record a failed condition. `file` is reduced to its final path
    /// component, which is all a report needs.
    pub fn new(condition: impl Into<String>, file: &str, line: u32) -> Self {
        let file = Path::new(file)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.to_string());
        Self {
            condition: condition.into(),
            file,
            line,
        }
    }

    /// The literal source text of the failed expression.
    pub fn condition(&self) -> &str {
        &self.condition
    }

    /// File name (final path component) of the failed check.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Line number of the failed check.
    pub fn line(&self) -> u32 {
        self.line
    }
}

/// Everything recorded while one test case ran.
///
/// A *failure* is an assertion that did not hold; a *fatal error* is a panic
/// (or an explicit setup/teardown refusal) that aborted the case's normal
/// flow. A case may hold any number of failures but at most one error.
#[derive(Debug, Clone, Default)]
pub struct ResultLog {
    failures: Vec<Failure>,
    error: Option<String>,
}

impl ResultLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a failure. Insertion order is preserved for the report.
    pub fn fail(&mut self, condition: impl Into<String>, file: &str, line: u32) {
        self.failures.push(Failure::new(condition, file, line));
    }

    /// Record the fatal error. A later error replaces an earlier one.
    pub fn error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Recorded failures, in insertion order.
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    pub fn fail_count(&self) -> usize {
        self.failures.len()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// A case has failed iff it recorded a fatal error or any failure.
    pub fn has_failed(&self) -> bool {
        self.has_error() || !self.failures.is_empty()
    }
}
