//! Durable store for plans and reviews under .compass/.
//!
//! # Error Handling
//!
//! Store operations are best-effort from the pipeline's point of view:
//! a plan that failed to persist is still a valid plan, so callers warn
//! and move on rather than aborting. The lock file keeps concurrent
//! compass runs in the same repo from interleaving writes.

use crate::plan::{FileReview, ReviewPlan};
use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const STORE_DIR: &str = ".compass";
const PLAN_FILE: &str = "plan.json";
const PLAN_REPORT_FILE: &str = "plan.md";
const REVIEWS_DIR: &str = "reviews";
const DIAGNOSTICS_DIR: &str = "diagnostics";
const LOCK_TIMEOUT_SECS: u64 = 5;
const LOCK_RETRY_MS: u64 = 50;

/// The store manager for one repository.
pub struct PlanStore {
    store_dir: PathBuf,
}

struct StoreLock {
    file: std::fs::File,
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

impl PlanStore {
    pub fn new(repo_root: &Path) -> Self {
        Self {
            store_dir: repo_root.join(STORE_DIR),
        }
    }

    /// Where the diagnostic sink should write its side files.
    pub fn diagnostics_dir(&self) -> PathBuf {
        self.store_dir.join(DIAGNOSTICS_DIR)
    }

    pub fn plan_path(&self) -> PathBuf {
        self.store_dir.join(PLAN_FILE)
    }

    pub fn report_path(&self) -> PathBuf {
        self.store_dir.join(PLAN_REPORT_FILE)
    }

    /// Persist the plan as pretty JSON plus its rendered report.
    pub fn save_plan(&self, plan: &ReviewPlan, report: &str) -> anyhow::Result<()> {
        let _lock = self.lock(true)?;
        let content = serde_json::to_string_pretty(plan)?;
        write_atomic(&self.plan_path(), &content)?;
        write_atomic(&self.report_path(), report)?;
        Ok(())
    }

    /// Load the last saved plan, if any.
    pub fn load_plan(&self) -> Option<ReviewPlan> {
        let path = self.plan_path();
        if !path.exists() {
            return None;
        }
        let _lock = self.lock(false).ok()?;
        let content = fs::read_to_string(&path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Persist a file review under reviews/, returning the report path.
    pub fn save_review(&self, review: &FileReview, report: &str) -> anyhow::Result<PathBuf> {
        let _lock = self.lock(true)?;
        let dir = self.store_dir.join(REVIEWS_DIR);
        fs::create_dir_all(&dir)?;

        let stem = review_stem(&review.file_path);
        let content = serde_json::to_string_pretty(review)?;
        write_atomic(&dir.join(format!("{}.json", stem)), &content)?;
        let report_path = dir.join(format!("{}.md", stem));
        write_atomic(&report_path, report)?;
        Ok(report_path)
    }

    /// Ensure the store directory exists
    fn ensure_dir(&self) -> anyhow::Result<()> {
        if !self.store_dir.exists() {
            fs::create_dir_all(&self.store_dir)?;
        }
        self.ensure_store_ignored()?;
        Ok(())
    }

    fn ensure_store_ignored(&self) -> anyhow::Result<()> {
        let Some(repo_root) = self.store_dir.parent() else {
            return Ok(());
        };
        // Only repositories get .gitignore maintenance.
        if !repo_root.join(".git").is_dir() {
            return Ok(());
        }
        append_ignore_entry(&repo_root.join(".gitignore"), ".compass/")
    }

    fn lock(&self, exclusive: bool) -> anyhow::Result<StoreLock> {
        if exclusive {
            self.ensure_dir()?;
        } else if !self.store_dir.exists() {
            return Err(anyhow::anyhow!("Store directory missing"));
        }

        let lock_path = self.store_dir.join(".lock");
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false) // Lock file content doesn't matter, just the lock
            .open(&lock_path)?;

        let start = Instant::now();
        loop {
            let result = if exclusive {
                FileExt::try_lock_exclusive(&file)
            } else {
                FileExt::try_lock_shared(&file)
            };
            match result {
                Ok(()) => break,
                Err(err) => {
                    if err.kind() != ErrorKind::WouldBlock {
                        return Err(err.into());
                    }
                    if start.elapsed() >= Duration::from_secs(LOCK_TIMEOUT_SECS) {
                        return Err(anyhow::anyhow!(
                            "Timed out waiting for store lock ({}s)",
                            LOCK_TIMEOUT_SECS
                        ));
                    }
                    std::thread::sleep(Duration::from_millis(LOCK_RETRY_MS));
                }
            }
        }

        Ok(StoreLock { file })
    }
}

/// Filesystem-safe stem for a review file derived from the reviewed path.
fn review_stem(file_path: &str) -> String {
    let stem: String = file_path
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    stem.trim_matches('_').to_string()
}

fn write_atomic(path: &Path, content: &str) -> anyhow::Result<()> {
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, content)?;

    #[cfg(windows)]
    {
        // Rename over an existing file fails on Windows
        if path.exists() {
            let _ = fs::remove_file(path);
        }
    }

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err.into());
    }
    Ok(())
}

fn append_ignore_entry(path: &Path, entry: &str) -> anyhow::Result<()> {
    let existing = fs::read_to_string(path).unwrap_or_default();
    if existing.lines().any(|line| line.trim() == entry) {
        return Ok(());
    }
    let mut updated = existing;
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(entry);
    updated.push('\n');
    fs::write(path, updated)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{assemble_file_review, assemble_plan, FileReviewWire, PlanWire};

    #[test]
    fn test_save_and_load_plan_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlanStore::new(dir.path());
        let plan = assemble_plan(PlanWire {
            title: "T".to_string(),
            description: "D".to_string(),
            tech_stack: vec!["Rust".to_string()],
            categories: vec![],
        });

        store.save_plan(&plan, "# T\n").unwrap();
        let loaded = store.load_plan().unwrap();
        assert_eq!(loaded, plan);
        assert!(store.report_path().exists());
    }

    #[test]
    fn test_plan_json_is_pretty_with_stable_field_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlanStore::new(dir.path());
        let plan = assemble_plan(PlanWire {
            title: "T".to_string(),
            description: "D".to_string(),
            ..Default::default()
        });
        store.save_plan(&plan, "").unwrap();

        let raw = fs::read_to_string(store.plan_path()).unwrap();
        assert!(raw.contains('\n'), "plan JSON should be pretty-printed");
        let title = raw.find("\"title\"").unwrap();
        let description = raw.find("\"description\"").unwrap();
        let stack = raw.find("\"techStack\"").unwrap();
        assert!(title < description && description < stack);
    }

    #[test]
    fn test_save_review_uses_sanitized_stem() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlanStore::new(dir.path());
        let review = assemble_file_review("src/llm/client.rs", FileReviewWire::default());

        let report_path = store.save_review(&review, "# Review\n").unwrap();
        assert!(report_path.ends_with("reviews/src_llm_client_rs.md"));
        assert!(report_path.exists());
    }

    #[test]
    fn test_load_plan_missing_store_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlanStore::new(dir.path());
        assert!(store.load_plan().is_none());
    }
}
