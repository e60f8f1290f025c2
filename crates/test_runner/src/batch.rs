use std::process;

use test_harness::{Engine, OutputStream, RunSummary};

use crate::{
    host::HostApp,
    init::{RunContext, init},
    options::RunOptions,
    requirer::PatternError,
};

/// Entry point for task-automation drivers. `patterns` arrive pre-split, so
/// a driver invoking several tasks in one command never leaks its other
/// task names into the selection.
///
/// A run that does not pass terminates the process with a non-zero status;
/// callers only ever see the summary of a passing run.
///
/// # Errors
///
/// When pattern resolution fails; see [`crate::require_files`].
pub fn batch_run(
    engine: &mut Engine,
    host: &mut dyn HostApp,
    patterns: Vec<String>,
    options: &RunOptions,
    out: &OutputStream,
) -> Result<RunSummary, PatternError> {
    let mut ctx = RunContext { batch_patterns: Some(patterns), ..RunContext::default() };
    init(engine, host, &mut ctx, options, out)?;

    let summary = engine.run();
    if !summary.passed() {
        #[expect(clippy::exit)]
        process::exit(1);
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;
    use test_harness::Case;

    use super::*;
    use crate::{
        host::DefaultHost,
        testing::{BufStream, ENV_LOCK},
    };

    #[test]
    fn passing_run_returns_the_summary() {
        let _guard = ENV_LOCK.lock().unwrap();
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("orders_test.rs");
        fs::write(&file, "").unwrap();

        let buf = BufStream::default();
        let out = buf.stream();
        let mut engine = Engine::new(std::rc::Rc::clone(&out));
        engine.register(Case::new("orders_total", &file, 3, || {}));

        let mut host = DefaultHost::default();
        let summary = batch_run(
            &mut engine,
            &mut host,
            vec![file.display().to_string()],
            &RunOptions::default(),
            &out,
        )
        .unwrap();

        assert_eq!(summary.runs, 1);
        assert!(summary.passed());
        assert!(buf.contents().contains("1 runs, 0 failures, 0 skips"));
    }

    #[test]
    fn unresolvable_batch_patterns_error_out() {
        let _guard = ENV_LOCK.lock().unwrap();
        let buf = BufStream::default();
        let out = buf.stream();
        let mut engine = Engine::new(std::rc::Rc::clone(&out));
        let mut host = DefaultHost::default();

        let err = batch_run(
            &mut engine,
            &mut host,
            vec!["missing_test.rs".to_string()],
            &RunOptions::default(),
            &out,
        )
        .unwrap_err();
        assert_eq!(err, PatternError::NotFound("missing_test.rs".to_string()));
    }
}
