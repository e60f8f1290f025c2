use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum FileSelection {
    Whole,
    Lines(Vec<u32>),
}

/// Which test files, and lines within them, a run is restricted to.
///
/// Empty means no restriction. Files keep first-seen order, repeated inserts
/// are no-ops, and a line selection on a file already selected as a whole
/// dissolves into the whole-file selection.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Selection {
    order: Vec<PathBuf>,
    entries: FxHashMap<PathBuf, FileSelection>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn insert_file(&mut self, path: PathBuf) {
        match self.entries.get_mut(&path) {
            Some(entry @ FileSelection::Lines(_)) => *entry = FileSelection::Whole,
            Some(FileSelection::Whole) => {}
            None => {
                self.order.push(path.clone());
                self.entries.insert(path, FileSelection::Whole);
            }
        }
    }

    pub fn insert_line(&mut self, path: PathBuf, line: u32) {
        match self.entries.get_mut(&path) {
            Some(FileSelection::Whole) => {}
            Some(FileSelection::Lines(lines)) => {
                if !lines.contains(&line) {
                    lines.push(line);
                }
            }
            None => {
                self.order.push(path.clone());
                self.entries.insert(path, FileSelection::Lines(vec![line]));
            }
        }
    }

    /// Selected files in first-seen order.
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.order.iter().map(PathBuf::as_path)
    }

    pub(crate) fn entry(&self, path: &Path) -> Option<&FileSelection> {
        self.entries.get(path)
    }
}
