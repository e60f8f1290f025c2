use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    rc::Rc,
    time::{Duration, Instant},
};

use rustc_hash::FxHashSet;

use crate::{
    backtrace::{self, BacktraceFilter},
    case::{Case, CaseResult, Outcome, Skip},
    reporter::{OutputStream, ProgressReporter, Reporters, SummaryReporter},
    selection::{FileSelection, Selection},
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub runs: usize,
    pub failures: usize,
    pub skips: usize,
    pub time: Duration,
}

impl RunSummary {
    pub fn passed(&self) -> bool {
        self.failures == 0
    }
}

/// The run loop: a registry of cases, the reporter list, and the knobs the
/// adapter sets between parsing and execution.
///
/// Execution is sequential on the calling thread. Cases signal failure by
/// unwinding; [`crate::skip`] records a skip instead.
pub struct Engine {
    cases: Vec<Case>,
    pub reporters: Reporters,
    filter: BacktraceFilter,
    selection: Selection,
    autorun: bool,
    fail_fast: bool,
}

impl Engine {
    pub fn new(out: OutputStream) -> Self {
        let mut reporters = Reporters::default();
        reporters.push(Box::new(SummaryReporter::new(Rc::clone(&out))));
        reporters.push(Box::new(ProgressReporter::new(out)));
        Self {
            cases: Vec::new(),
            reporters,
            filter: BacktraceFilter::passthrough(),
            selection: Selection::default(),
            autorun: false,
            fail_fast: false,
        }
    }

    pub fn register(&mut self, case: Case) {
        self.cases.push(case);
    }

    pub fn autorun(&self) -> bool {
        self.autorun
    }

    pub fn set_autorun(&mut self, autorun: bool) {
        self.autorun = autorun;
    }

    pub fn set_fail_fast(&mut self, fail_fast: bool) {
        self.fail_fast = fail_fast;
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
    }

    pub fn backtrace_filter(&self) -> &BacktraceFilter {
        &self.filter
    }

    pub fn set_backtrace_filter(&mut self, filter: BacktraceFilter) {
        self.filter = filter;
    }

    /// Indices of the cases this run executes, in registration order. An
    /// empty selection runs everything.
    fn plan(&self) -> Vec<usize> {
        if self.selection.is_empty() {
            return (0..self.cases.len()).collect();
        }

        let mut picked = FxHashSet::default();
        for path in self.selection.files() {
            match self.selection.entry(path) {
                Some(FileSelection::Whole) => {
                    picked.extend(
                        self.cases.iter().enumerate().filter(|(_, c)| c.file == path).map(|(i, _)| i),
                    );
                }
                Some(FileSelection::Lines(lines)) => {
                    for &line in lines {
                        // The case spanning the line: greatest start <= line.
                        let best = self
                            .cases
                            .iter()
                            .enumerate()
                            .filter(|(_, c)| c.file == path && c.line <= line)
                            .max_by_key(|&(_, c)| c.line);
                        if let Some((idx, _)) = best {
                            picked.insert(idx);
                        }
                    }
                }
                None => {}
            }
        }

        let mut plan: Vec<_> = picked.into_iter().collect();
        plan.sort_unstable();
        plan
    }

    pub fn run(&mut self) -> RunSummary {
        let plan = self.plan();
        tracing::debug!(selected = plan.len(), registered = self.cases.len(), "starting run");

        let started = Instant::now();
        let mut summary = RunSummary::default();
        let previous_hook = backtrace::install_capture_hook();

        for idx in plan {
            let case = &self.cases[idx];
            let case_started = Instant::now();
            let outcome = match panic::catch_unwind(AssertUnwindSafe(|| (case.run)())) {
                Ok(()) => Outcome::Pass,
                Err(payload) => {
                    let captured = backtrace::take_captured();
                    match payload.downcast::<Skip>() {
                        Ok(skip) => Outcome::Skip { reason: skip.0 },
                        Err(payload) => Outcome::Fail {
                            message: panic_message(payload.as_ref()),
                            backtrace: captured
                                .map(|raw| self.filter.clean(&raw))
                                .unwrap_or_default(),
                        },
                    }
                }
            };

            let result = CaseResult {
                name: case.name.clone(),
                file: case.file.clone(),
                line: case.line,
                outcome,
                time: case_started.elapsed(),
            };
            summary.runs += 1;
            match result.outcome {
                Outcome::Fail { .. } => summary.failures += 1,
                Outcome::Skip { .. } => summary.skips += 1,
                Outcome::Pass => {}
            }

            let failed = result.failed();
            self.reporters.record(&result);
            if self.fail_fast && failed {
                break;
            }
        }

        panic::set_hook(previous_hook);
        summary.time = started.elapsed();
        self.reporters.report();
        summary
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "case panicked with a non-string payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, path::Path};

    use compact_str::CompactString;

    use super::*;
    use crate::reporter::{Reporter, ReporterKind, testing::BufStream};

    fn case(name: &str, file: &str, line: u32, run: impl Fn() + 'static) -> Case {
        Case::new(name, file, line, run)
    }

    fn engine() -> (Engine, BufStream) {
        let buf = BufStream::default();
        (Engine::new(buf.stream()), buf)
    }

    /// Records the names fed to `record` so tests can see what actually ran.
    struct Probe(Rc<RefCell<Vec<CompactString>>>);

    impl Reporter for Probe {
        fn kind(&self) -> ReporterKind {
            ReporterKind::Progress
        }

        fn record(&mut self, result: &CaseResult) {
            self.0.borrow_mut().push(result.name.clone());
        }

        fn report(&mut self) {}
    }

    fn probe(engine: &mut Engine) -> Rc<RefCell<Vec<CompactString>>> {
        let ran = Rc::new(RefCell::new(Vec::new()));
        engine.reporters.replace(ReporterKind::Progress, Box::new(Probe(Rc::clone(&ran))));
        ran
    }

    #[test]
    fn empty_selection_runs_everything() {
        let (mut engine, _buf) = engine();
        engine.register(case("passes", "a_test.rs", 5, || {}));
        engine.register(case("fails", "a_test.rs", 15, || panic!("boom")));
        engine.register(case("skips", "b_test.rs", 5, || crate::case::skip("later")));

        let summary = engine.run();
        assert_eq!(
            summary,
            RunSummary { runs: 3, failures: 1, skips: 1, time: summary.time }
        );
        assert!(!summary.passed());
    }

    #[test]
    fn whole_file_selection_filters_by_file() {
        let (mut engine, _buf) = engine();
        engine.register(case("a1", "a_test.rs", 5, || {}));
        engine.register(case("b1", "b_test.rs", 5, || {}));
        let ran = probe(&mut engine);

        let mut selection = Selection::default();
        selection.insert_file("b_test.rs".into());
        engine.set_selection(selection);

        let summary = engine.run();
        assert_eq!(summary.runs, 1);
        assert_eq!(*ran.borrow(), ["b1"]);
    }

    #[test]
    fn line_selection_picks_the_spanning_case() {
        let (mut engine, _buf) = engine();
        engine.register(case("first", "a_test.rs", 10, || {}));
        engine.register(case("second", "a_test.rs", 25, || {}));
        engine.register(case("third", "a_test.rs", 40, || {}));
        let ran = probe(&mut engine);

        let mut selection = Selection::default();
        selection.insert_line("a_test.rs".into(), 27);
        engine.set_selection(selection);

        engine.run();
        assert_eq!(*ran.borrow(), ["second"]);
    }

    #[test]
    fn line_above_the_first_case_selects_nothing() {
        let (mut engine, _buf) = engine();
        engine.register(case("first", "a_test.rs", 10, || {}));

        let mut selection = Selection::default();
        selection.insert_line("a_test.rs".into(), 3);
        engine.set_selection(selection);

        assert_eq!(engine.run().runs, 0);
    }

    #[test]
    fn fail_fast_stops_after_the_first_failure() {
        let (mut engine, _buf) = engine();
        engine.register(case("fails", "a_test.rs", 5, || panic!("boom")));
        engine.register(case("never_runs", "a_test.rs", 15, || {}));
        let ran = probe(&mut engine);
        engine.set_fail_fast(true);

        let summary = engine.run();
        assert_eq!(summary.runs, 1);
        assert_eq!(*ran.borrow(), ["fails"]);
    }

    #[test]
    fn failure_message_comes_from_the_panic_payload() {
        let (mut engine, _buf) = engine();
        engine.register(case("fails", "a_test.rs", 5, || panic!("expected 2, got {}", 3)));
        let ran = Rc::new(RefCell::new(Vec::new()));

        struct Messages(Rc<RefCell<Vec<CompactString>>>);
        impl Reporter for Messages {
            fn kind(&self) -> ReporterKind {
                ReporterKind::Progress
            }
            fn record(&mut self, result: &CaseResult) {
                if let Outcome::Fail { message, .. } = &result.outcome {
                    self.0.borrow_mut().push(message.as_str().into());
                }
            }
            fn report(&mut self) {}
        }
        engine.reporters.replace(ReporterKind::Progress, Box::new(Messages(Rc::clone(&ran))));

        engine.run();
        assert_eq!(*ran.borrow(), ["expected 2, got 3"]);
    }

    #[test]
    fn selection_accessor_reflects_what_was_set() {
        let (mut engine, _buf) = engine();
        let mut selection = Selection::default();
        selection.insert_file("a_test.rs".into());
        engine.set_selection(selection);

        let files: Vec<_> = engine.selection().files().collect();
        assert_eq!(files, [Path::new("a_test.rs")]);
    }
}
