use std::process::ExitCode;

use clap::Parser;
use test_harness::{Engine, stdout_stream};

use crate::{
    host::DefaultHost,
    init::{RunContext, init},
    options::Cli,
};

/// Parse the command line, run the cases `register` adds, and map the
/// summary onto the process exit code.
pub fn run_with(register: impl FnOnce(&mut Engine)) -> ExitCode {
    run_inner(register, false)
}

/// Self-discovery mode: every registered case runs, patterns are ignored.
pub fn autorun(register: impl FnOnce(&mut Engine)) -> ExitCode {
    run_inner(register, true)
}

fn run_inner(register: impl FnOnce(&mut Engine), autorun: bool) -> ExitCode {
    let options = Cli::parse().into_options();

    let out = stdout_stream();
    let mut engine = Engine::new(std::rc::Rc::clone(&out));
    engine.set_autorun(autorun);
    register(&mut engine);

    let mut host = DefaultHost::default();
    let mut ctx = RunContext::default();
    if let Err(err) = init(&mut engine, &mut host, &mut ctx, &options, &out) {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    let summary = engine.run();
    if summary.passed() { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
