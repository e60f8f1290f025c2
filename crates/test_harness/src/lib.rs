mod backtrace;
mod case;
mod engine;
mod reporter;
mod selection;

pub use backtrace::BacktraceFilter;
pub use case::{Case, CaseResult, Outcome, Skip, skip};
pub use engine::{Engine, RunSummary};
pub use reporter::{
    OutputStream, ProgressReporter, Reporter, ReporterKind, Reporters, SummaryReporter,
    stdout_stream,
};
pub use selection::Selection;
