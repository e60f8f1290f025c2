use std::process::ExitCode;

fn main() -> ExitCode {
    // Log filter comes from the environment; user-facing output goes
    // through the reporters, not the log stream.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();

    // Embedding applications register their cases through `run_with`; the
    // bare binary runs whatever the patterns select out of an empty
    // registry.
    test_runner::run_with(|_| {})
}
