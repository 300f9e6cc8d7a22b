use std::cell::RefCell;
use std::collections::HashSet;
use std::io::{self, Write};

use colored::Colorize;

/// Verbose-mode diagnostics written to stderr.
///
/// Nothing is printed unless verbose output was requested. Repeated messages are
/// printed once, since the same unresolved name is often looked up many times.
#[derive(Debug, Default)]
pub struct Diagnostics {
    verbose: bool,
    seen: RefCell<HashSet<String>>,
}

impl Diagnostics {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            seen: RefCell::new(HashSet::new()),
        }
    }

    /// Something was approximated, e.g. a name resolved to unknown.
    pub fn warn(&self, message: impl Into<String>) {
        self.emit("warning:".bold().yellow().to_string(), message.into());
    }

    pub fn info(&self, message: impl Into<String>) {
        self.emit("info:".bold().cyan().to_string(), message.into());
    }

    fn emit(&self, label: String, message: String) {
        if !self.verbose || !self.seen.borrow_mut().insert(message.clone()) {
            return;
        }
        let _ = writeln!(io::stderr().lock(), "{} {}", label, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_diagnostics_record_nothing() {
        let diagnostics = Diagnostics::new(false);
        diagnostics.warn("cannot resolve 'x'");
        assert!(diagnostics.seen.borrow().is_empty());
    }

    #[test]
    fn test_verbose_diagnostics_deduplicate() {
        let diagnostics = Diagnostics::new(true);
        diagnostics.warn("cannot resolve 'x'");
        diagnostics.warn("cannot resolve 'x'");
        diagnostics.info("indexed module a.js");
        assert_eq!(diagnostics.seen.borrow().len(), 2);
    }
}
