use std::{
    cell::RefCell,
    io::{self, Write},
    rc::Rc,
    time::Duration,
};

use crate::case::{CaseResult, Outcome};

/// Sink the reporters of a run share. The whole runner is single-threaded,
/// so a plain `Rc<RefCell<..>>` carries the stream between them.
pub type OutputStream = Rc<RefCell<dyn Write>>;

pub fn stdout_stream() -> OutputStream {
    Rc::new(RefCell::new(io::stdout()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReporterKind {
    Summary,
    Progress,
}

/// Observes case results as they arrive and renders at run end.
pub trait Reporter {
    fn kind(&self) -> ReporterKind;
    fn record(&mut self, result: &CaseResult);
    fn report(&mut self);
}

/// Ordered reporter list shared by a run.
#[derive(Default)]
pub struct Reporters {
    list: Vec<Box<dyn Reporter>>,
}

impl Reporters {
    pub fn push(&mut self, reporter: Box<dyn Reporter>) {
        self.list.push(reporter);
    }

    /// Swap every reporter of `kind` for `reporter`, appended at the end of
    /// the list. A default reporter never survives its replacement, so
    /// nothing reports twice.
    pub fn replace(&mut self, kind: ReporterKind, reporter: Box<dyn Reporter>) {
        self.list.retain(|r| r.kind() != kind);
        self.list.push(reporter);
    }

    pub fn kinds(&self) -> Vec<ReporterKind> {
        self.list.iter().map(|r| r.kind()).collect()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn record(&mut self, result: &CaseResult) {
        for reporter in &mut self.list {
            reporter.record(result);
        }
    }

    pub fn report(&mut self) {
        for reporter in &mut self.list {
            reporter.report();
        }
    }
}

/// Default end-of-run reporter: a statistics line plus the collected
/// failure details.
pub struct SummaryReporter {
    out: OutputStream,
    runs: usize,
    skips: usize,
    failures: Vec<CaseResult>,
    time: Duration,
}

impl SummaryReporter {
    pub fn new(out: OutputStream) -> Self {
        Self { out, runs: 0, skips: 0, failures: Vec::new(), time: Duration::ZERO }
    }

    /// One-line run statistics.
    pub fn statistics(&mut self) {
        let mut out = self.out.borrow_mut();
        let _ = writeln!(
            out,
            "\n{} runs, {} failures, {} skips in {:.2}s",
            self.runs,
            self.failures.len(),
            self.skips,
            self.time.as_secs_f64()
        );
    }

    /// Failure details collected over the run.
    pub fn aggregated_results(&mut self) {
        let mut out = self.out.borrow_mut();
        for result in &self.failures {
            let Outcome::Fail { message, .. } = &result.outcome else {
                continue;
            };
            let _ = writeln!(out, "\nFailure:\n{} [{}]:\n{message}", result.name, result.location());
        }
    }
}

impl Reporter for SummaryReporter {
    fn kind(&self) -> ReporterKind {
        ReporterKind::Summary
    }

    fn record(&mut self, result: &CaseResult) {
        self.runs += 1;
        self.time += result.time;
        match result.outcome {
            Outcome::Fail { .. } => self.failures.push(result.clone()),
            Outcome::Skip { .. } => self.skips += 1,
            Outcome::Pass => {}
        }
    }

    fn report(&mut self) {
        self.statistics();
        self.aggregated_results();
    }
}

/// Default progress reporter: one status character per case.
pub struct ProgressReporter {
    out: OutputStream,
}

impl ProgressReporter {
    pub fn new(out: OutputStream) -> Self {
        Self { out }
    }
}

impl Reporter for ProgressReporter {
    fn kind(&self) -> ReporterKind {
        ReporterKind::Progress
    }

    fn record(&mut self, result: &CaseResult) {
        let mut out = self.out.borrow_mut();
        let _ = match result.outcome {
            Outcome::Pass => write!(out, "."),
            Outcome::Fail { .. } => write!(out, "F"),
            Outcome::Skip { .. } => write!(out, "S"),
        };
        let _ = out.flush();
    }

    fn report(&mut self) {
        let mut out = self.out.borrow_mut();
        let _ = writeln!(out);
    }
}
