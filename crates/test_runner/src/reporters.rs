use test_harness::{CaseResult, Outcome, OutputStream, Reporter, ReporterKind, SummaryReporter};

use crate::{
    options::{EXECUTABLE, RunOptions},
    style::Style,
};

/// Summary reporter that keeps quiet about details the run already showed
/// inline.
pub struct SuppressedSummaryReporter {
    inner: SummaryReporter,
    output_inline: bool,
}

impl SuppressedSummaryReporter {
    pub fn new(out: OutputStream, options: &RunOptions) -> Self {
        Self { inner: SummaryReporter::new(out), output_inline: options.output_inline }
    }
}

impl Reporter for SuppressedSummaryReporter {
    fn kind(&self) -> ReporterKind {
        ReporterKind::Summary
    }

    fn record(&mut self, result: &CaseResult) {
        self.inner.record(result);
    }

    fn report(&mut self) {
        self.inner.statistics();
        if !self.output_inline {
            self.inner.aggregated_results();
        }
    }
}

/// The application reporter: progress characters, plus an immediate failure
/// block with a rerun snippet for the failing case.
pub struct InlineReporter {
    out: OutputStream,
    style: Style,
    output_inline: bool,
}

impl InlineReporter {
    pub fn new(out: OutputStream, style: Style, options: &RunOptions) -> Self {
        Self { out, style, output_inline: options.output_inline }
    }

    fn failure_block(&self, result: &CaseResult) -> String {
        let Outcome::Fail { message, backtrace } = &result.outcome else {
            return String::new();
        };

        let mut block = format!(
            "\n\n{}\n{} [{}]:\n{message}\n",
            self.style.failure("Failure:"),
            result.name,
            self.style.location(&result.location()),
        );
        for frame in backtrace {
            block.push_str(frame);
            block.push('\n');
        }
        block.push_str(&format!("\n{EXECUTABLE} {}\n\n", result.location()));
        block
    }
}

impl Reporter for InlineReporter {
    fn kind(&self) -> ReporterKind {
        ReporterKind::Progress
    }

    fn record(&mut self, result: &CaseResult) {
        let mut out = self.out.borrow_mut();
        match &result.outcome {
            Outcome::Pass => {
                let _ = write!(out, ".");
            }
            Outcome::Skip { .. } => {
                let _ = write!(out, "{}", self.style.skip("S"));
            }
            Outcome::Fail { .. } => {
                let _ = write!(out, "{}", self.style.failure("F"));
                if self.output_inline {
                    let _ = write!(out, "{}", self.failure_block(result));
                }
            }
        }
        let _ = out.flush();
    }

    fn report(&mut self) {
        let mut out = self.out.borrow_mut();
        let _ = writeln!(out);
    }
}
