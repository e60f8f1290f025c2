mod batch;
mod host;
mod init;
mod options;
mod reporters;
mod requirer;
mod run;
mod style;
#[cfg(test)]
mod testing;

pub use batch::batch_run;
pub use host::{DefaultHost, HostApp};
pub use init::{DEFAULT_ENVIRONMENT, RunContext, init};
pub use options::{Cli, EXECUTABLE, RunOptions};
pub use reporters::{InlineReporter, SuppressedSummaryReporter};
pub use requirer::{PatternError, TEST_SUFFIX, require_files};
pub use run::{autorun, run_with};
pub use style::Style;
