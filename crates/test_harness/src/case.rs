use std::{path::PathBuf, time::Duration};

use compact_str::CompactString;

/// A registered test case. The closure panics to fail; whatever assertion
/// macros run inside it behave exactly as they would under the standard
/// harness.
pub struct Case {
    pub name: CompactString,
    pub file: PathBuf,
    pub line: u32,
    pub(crate) run: Box<dyn Fn()>,
}

impl Case {
    pub fn new(
        name: impl Into<CompactString>,
        file: impl Into<PathBuf>,
        line: u32,
        run: impl Fn() + 'static,
    ) -> Self {
        Self { name: name.into(), file: file.into(), line, run: Box::new(run) }
    }
}

impl std::fmt::Debug for Case {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Case")
            .field("name", &self.name)
            .field("file", &self.file)
            .field("line", &self.line)
            .finish_non_exhaustive()
    }
}

/// Payload the run loop recognizes as a skip rather than a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skip(pub CompactString);

/// Abort the current case and record it as skipped.
pub fn skip(reason: &str) -> ! {
    std::panic::panic_any(Skip(reason.into()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Fail { message: String, backtrace: Vec<String> },
    Skip { reason: CompactString },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseResult {
    pub name: CompactString,
    pub file: PathBuf,
    pub line: u32,
    pub outcome: Outcome,
    pub time: Duration,
}

impl CaseResult {
    pub fn failed(&self) -> bool {
        matches!(self.outcome, Outcome::Fail { .. })
    }

    pub fn skipped(&self) -> bool {
        matches!(self.outcome, Outcome::Skip { .. })
    }

    /// `file:line` of the case, the form the runner accepts back as a
    /// pattern.
    pub fn location(&self) -> String {
        format!("{}:{}", self.file.display(), self.line)
    }
}
