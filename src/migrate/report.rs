//! Run statistics and the closing summary.

use std::collections::BTreeMap;
use std::fmt;

use owo_colors::OwoColorize;

use crate::core::RefKind;
use crate::utils::{plural_count, plural_s};

/// One reference that could not be migrated.
#[derive(Debug, Clone)]
pub struct Failure {
    pub kind: RefKind,
    /// Url or local path that failed.
    pub target: String,
    pub reason: String,
}

/// Counters accumulated over a run. Never persisted.
#[derive(Debug, Default)]
pub struct RunStats {
    pub uploaded: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Failures grouped by document for the summary.
    pub failures: BTreeMap<String, Vec<Failure>>,
    /// Documents rewritten (or that would be, in dry-run).
    pub rewritten: usize,
}

impl RunStats {
    pub fn record_failure(&mut self, document: &str, failure: Failure) {
        self.failed += 1;
        self.failures
            .entry(document.to_string())
            .or_default()
            .push(failure);
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Print failed references grouped by document.
    pub fn print_failures(&self) {
        if self.failures.is_empty() {
            return;
        }
        eprintln!();
        eprintln!(
            "{} {}",
            "failed".red().bold(),
            format!(
                "({}, {} reference{})",
                plural_count(self.failures.len(), "post"),
                self.failed,
                plural_s(self.failed)
            )
            .dimmed()
        );
        for (document, failures) in &self.failures {
            eprintln!("{}{}{}", "[".dimmed(), document.cyan(), "]".dimmed());
            for f in failures {
                eprintln!("{} {} {} {}", "→".red(), f.kind.dimmed(), f.target, f.reason);
            }
        }
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} uploaded, {} skipped, {} failed, {} rewritten",
            self.uploaded.to_string().green().bold(),
            self.skipped.to_string().cyan(),
            if self.failed > 0 {
                self.failed.to_string().red().bold().to_string()
            } else {
                self.failed.to_string()
            },
            plural_count(self.rewritten, "post"),
        )
    }
}
