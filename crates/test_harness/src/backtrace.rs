use std::{backtrace::Backtrace, cell::Cell, panic};

use compact_str::CompactString;

thread_local! {
    static CAPTURED: Cell<Option<String>> = const { Cell::new(None) };
}

type PanicHook = Box<dyn Fn(&panic::PanicHookInfo<'_>) + Sync + Send>;

/// Swap in a hook that captures a backtrace for the run loop and keeps the
/// default printer quiet while cases execute. Returns the previous hook so
/// the caller can restore it.
pub(crate) fn install_capture_hook() -> PanicHook {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(|_| {
        CAPTURED.set(Some(Backtrace::force_capture().to_string()));
    }));
    previous
}

pub(crate) fn take_captured() -> Option<String> {
    CAPTURED.take()
}

/// Drops stack frames matching any silencer substring from failure output.
///
/// An empty filter keeps every frame.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BacktraceFilter {
    silencers: Vec<CompactString>,
}

impl BacktraceFilter {
    pub fn new(silencers: impl IntoIterator<Item = impl Into<CompactString>>) -> Self {
        Self { silencers: silencers.into_iter().map(Into::into).collect() }
    }

    pub fn passthrough() -> Self {
        Self::default()
    }

    pub fn is_passthrough(&self) -> bool {
        self.silencers.is_empty()
    }

    pub fn clean(&self, backtrace: &str) -> Vec<String> {
        let mut kept = Vec::new();
        let mut keep_current = true;
        for line in backtrace.lines() {
            // An `at file:line` continuation belongs to the previous frame.
            if line.trim_start().starts_with("at ") {
                if keep_current {
                    kept.push(line.to_string());
                }
                continue;
            }

            keep_current = !self.silencers.iter().any(|s| line.contains(s.as_str()));
            if keep_current {
                kept.push(line.to_string());
            }
        }

        kept
    }
}
