use clap::Parser;

/// Name the runner is invoked as. Both the usage text and the rerun
/// snippets printed under failures come from here.
pub const EXECUTABLE: &str = "test-runner";

fn usage() -> String {
    format!("{EXECUTABLE} [options] [files or directories]")
}

fn help_examples() -> String {
    format!(
        "You can run a single test by appending a line number to a filename:\n\n    \
         {EXECUTABLE} tests/models/user_test.rs:27\n\n\
         You can run multiple files and directories at the same time:\n\n    \
         {EXECUTABLE} tests/controllers tests/integration/login_test.rs\n\n\
         By default test failures and errors are reported inline during a run."
    )
}

#[derive(Parser, Debug)]
#[command(
    name = EXECUTABLE,
    version,
    about = "Run the application's test suite",
    override_usage = usage(),
    after_help = help_examples()
)]
pub struct Cli {
    #[arg(short, long, value_name = "ENV", help = "Run tests in the ENV environment")]
    pub environment: Option<String>,
    #[arg(short, long, help = "Show the complete backtrace")]
    pub backtrace: bool,
    #[arg(short, long, help = "Output test failures and errors after the test run")]
    pub defer_output: bool,
    #[arg(short, long, help = "Abort test run on first failure or error")]
    pub fail_fast: bool,
    #[arg(short, long, overrides_with = "no_color", help = "Enable color in the output")]
    pub color: bool,
    #[arg(long, overrides_with = "color", help = "Disable color in the output")]
    pub no_color: bool,
    #[arg(value_name = "PATTERN", help = "Test files, directories, or file:LINE selections")]
    pub patterns: Vec<String>,
}

impl Cli {
    pub fn into_options(self) -> RunOptions {
        RunOptions {
            environment: self.environment.map(|env| env.trim().to_string()),
            full_backtrace: self.backtrace,
            output_inline: !self.defer_output,
            fail_fast: self.fail_fast,
            color: !self.no_color,
            patterns: self.patterns,
        }
    }
}

/// Options for one run, built from the command line or by a batch driver
/// and discarded when the process exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub environment: Option<String>,
    pub full_backtrace: bool,
    pub output_inline: bool,
    pub fail_fast: bool,
    pub color: bool,
    pub patterns: Vec<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            environment: None,
            full_backtrace: false,
            output_inline: true,
            fail_fast: false,
            color: true,
            patterns: Vec::new(),
        }
    }
}
