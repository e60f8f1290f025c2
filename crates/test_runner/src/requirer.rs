use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    sync::{Arc, Condvar, Mutex},
};

use memchr::memrchr;
use test_harness::Selection;
use thiserror::Error;

/// Files ending with this are test files when a directory is expanded.
pub const TEST_SUFFIX: &str = "_test.rs";

const THREADS: u8 = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("no test file matches {0:?}")]
    NotFound(String),
}

/// Resolve `patterns` into the run's file selection.
///
/// A trailing `:LINE` selects the test spanning that line, a directory
/// expands to the `_test.rs` files beneath it, and a plain path names one
/// file. The CLI and batch drivers both come through here, so resolution is
/// idempotent across duplicated patterns.
///
/// # Errors
///
/// When a pattern names neither an existing path nor a `file:LINE` of an
/// existing file.
pub fn require_files(patterns: &[String]) -> Result<Selection, PatternError> {
    let mut selection = Selection::default();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_dir() {
            let mut files = walk_test_files(vec![path.to_path_buf()]);
            files.sort();
            tracing::debug!(%pattern, count = files.len(), "expanded test directory");
            for file in files {
                selection.insert_file(file);
            }
        } else if path.is_file() {
            selection.insert_file(path.to_path_buf());
        } else if let Some((file, line)) = split_line_suffix(pattern) {
            if !file.is_file() {
                return Err(PatternError::NotFound(pattern.clone()));
            }
            selection.insert_line(file.to_path_buf(), line);
        } else {
            return Err(PatternError::NotFound(pattern.clone()));
        }
    }

    Ok(selection)
}

fn split_line_suffix(pattern: &str) -> Option<(&Path, u32)> {
    let colon = memrchr(b':', pattern.as_bytes())?;
    // A suffix that is not a line number is part of the path.
    let line = pattern[colon + 1..].parse().ok()?;
    Some((Path::new(&pattern[..colon]), line))
}

fn is_test_file(path: &Path) -> bool {
    path.file_name().and_then(OsStr::to_str).is_some_and(|name| name.ends_with(TEST_SUFFIX))
}

struct WorkQueue<'a> {
    queue: &'a mut Vec<PathBuf>,
    workers: u8,
}

impl<'a> WorkQueue<'a> {
    fn new(init_queue: &'a mut Vec<PathBuf>) -> Self {
        Self { queue: init_queue, workers: 0 }
    }
}

/// Walk `roots`, collecting every test file beneath them. Unreadable
/// directories are skipped. The worker pool joins before returning, so
/// nothing concurrent outlives the call.
fn walk_test_files(roots: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut result: [Vec<PathBuf>; THREADS as usize] = Default::default();

    let mut queue = roots;
    std::thread::scope(|s| {
        let queue = Arc::new((Mutex::new(WorkQueue::new(&mut queue)), Condvar::new()));

        for result in &mut result {
            let queue = Arc::clone(&queue);
            s.spawn(move || {
                let (queue, cvar) = &*queue;
                let mut working: u8 = 0;
                loop {
                    let path = {
                        let mut queue = queue.lock().unwrap();
                        loop {
                            if let Some(path) = queue.queue.pop() {
                                queue.workers += 1 - working;
                                working = 1;
                                break path;
                            }

                            queue.workers -= working;
                            working = 0;

                            if queue.workers == 0 {
                                cvar.notify_all();
                                return;
                            }
                            queue = cvar.wait(queue).unwrap();
                        }
                    };

                    let Ok(dir) = path.read_dir() else {
                        continue;
                    };
                    for entry in dir {
                        let Ok(entry) = entry else {
                            continue;
                        };

                        let path = entry.path();
                        if !path.is_dir() {
                            if is_test_file(&path) {
                                result.push(path);
                            }
                            continue;
                        }

                        queue.lock().unwrap().queue.push(path);
                        cvar.notify_one();
                    }
                }
            });
        }
    });

    result.into_iter().flatten().collect()
}
