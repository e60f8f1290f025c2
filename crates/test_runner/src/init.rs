use std::{
    env,
    io::{self, IsTerminal},
    rc::Rc,
};

use test_harness::{Engine, OutputStream, ReporterKind};

use crate::{
    host::HostApp,
    options::RunOptions,
    reporters::{InlineReporter, SuppressedSummaryReporter},
    requirer::{self, PatternError},
    style::Style,
};

/// Environment profile selected when `--environment` is absent.
pub const DEFAULT_ENVIRONMENT: &str = "test";

/// Invocation-scoped state the outer driver hands to [`init`].
///
/// This is the only channel between drivers and initialization; nothing
/// here lives in process globals.
#[derive(Debug, Default)]
pub struct RunContext {
    /// Patterns supplied by a batch driver. When `Some`, they are used and
    /// the CLI-parsed patterns are ignored.
    pub batch_patterns: Option<Vec<String>>,
    /// True once the runner has claimed the process; the host bootstrap
    /// checks it before wiring its own entry points.
    pub runner_extension: bool,
}

/// One-time initialization between option parsing and the run loop.
///
/// Selects the host environment profile, resolves patterns into the
/// engine's selection (batch patterns win over CLI ones), installs the
/// host's backtrace cleaner, and swaps the default reporters for the
/// runner's own pair.
///
/// # Errors
///
/// When pattern resolution fails; see [`requirer::require_files`].
pub fn init(
    engine: &mut Engine,
    host: &mut dyn HostApp,
    ctx: &mut RunContext,
    options: &RunOptions,
    out: &OutputStream,
) -> Result<(), PatternError> {
    ctx.runner_extension = true;
    host.extension_enabled(true);

    let environment = options.environment.as_deref().unwrap_or(DEFAULT_ENVIRONMENT);
    // SAFETY: runs on the main thread before the host boots; no other
    // thread exists yet to read the environment concurrently.
    unsafe { env::set_var("RAILS_ENV", environment) };

    if !engine.autorun() {
        let patterns = ctx.batch_patterns.as_deref().unwrap_or(&options.patterns);
        engine.set_selection(requirer::require_files(patterns)?);
    }

    if !options.full_backtrace && env::var_os("BACKTRACE").is_none() {
        if let Some(cleaner) = host.backtrace_cleaner() {
            engine.set_backtrace_filter(cleaner);
        }
    }

    engine.set_fail_fast(options.fail_fast);

    let style = Style::new(options.color, io::stdout().is_terminal());
    engine.reporters.replace(
        ReporterKind::Summary,
        Box::new(SuppressedSummaryReporter::new(Rc::clone(out), options)),
    );
    engine
        .reporters
        .replace(ReporterKind::Progress, Box::new(InlineReporter::new(Rc::clone(out), style, options)));

    Ok(())
}
