//! Best-effort diagnostic side files for responses that needed repair.
//!
//! When the pipeline escalates beyond a direct parse, the raw response
//! and the extracted candidate are written next to the store so a human
//! can inspect what the model actually said. Writes never fail the
//! pipeline, and nothing here is ever read back. Filenames carry a local
//! timestamp at second resolution; rapid successive calls in the same
//! second overwrite each other, which is an accepted limitation.

use std::fs;
use std::path::{Path, PathBuf};

pub struct DiagnosticSink {
    dir: Option<PathBuf>,
    response_path: Option<PathBuf>,
    candidate_path: Option<PathBuf>,
}

impl DiagnosticSink {
    /// Sink that writes into `dir` (created on first write).
    pub fn rooted_at(dir: &Path) -> Self {
        Self {
            dir: Some(dir.to_path_buf()),
            response_path: None,
            candidate_path: None,
        }
    }

    /// Sink that records nothing.
    pub fn disabled() -> Self {
        Self {
            dir: None,
            response_path: None,
            candidate_path: None,
        }
    }

    pub(crate) fn record_response(&mut self, text: &str) {
        self.response_path = self.write("response", text);
    }

    pub(crate) fn record_candidate(&mut self, text: &str) {
        self.candidate_path = self.write("candidate", text);
    }

    /// Paths actually written, raw response first.
    pub fn pointers(&self) -> Vec<PathBuf> {
        self.response_path
            .iter()
            .chain(self.candidate_path.iter())
            .cloned()
            .collect()
    }

    fn write(&self, label: &str, text: &str) -> Option<PathBuf> {
        let dir = self.dir.as_ref()?;
        if fs::create_dir_all(dir).is_err() {
            return None;
        }
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let path = dir.join(format!("{}_{}.txt", label, stamp));
        fs::write(&path, text).ok()?;
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_sink_records_nothing() {
        let mut sink = DiagnosticSink::disabled();
        sink.record_response("raw");
        sink.record_candidate("candidate");
        assert!(sink.pointers().is_empty());
    }

    #[test]
    fn test_rooted_sink_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DiagnosticSink::rooted_at(dir.path());
        sink.record_response("raw text");
        sink.record_candidate("{\"title\":");
        let pointers = sink.pointers();
        assert_eq!(pointers.len(), 2);
        assert_eq!(fs::read_to_string(&pointers[0]).unwrap(), "raw text");
        assert_eq!(fs::read_to_string(&pointers[1]).unwrap(), "{\"title\":");
    }
}
