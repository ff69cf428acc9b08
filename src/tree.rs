//! Repository tree scanning and markdown rendering for prompt input.

use anyhow::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Cap on files included in the rendered tree so prompts stay bounded.
const MAX_TREE_FILES: usize = 2000;

/// Walks a repository and collects the files worth showing the model.
pub struct RepoScanner {
    ignore_dirs: Vec<String>,
}

impl RepoScanner {
    pub fn new() -> Self {
        let ignore_dirs = vec![
            ".git".to_string(),
            "node_modules".to_string(),
            "target".to_string(),
            "vendor".to_string(),
            "dist".to_string(),
            "build".to_string(),
            ".next".to_string(),
            "__pycache__".to_string(),
            ".venv".to_string(),
            "venv".to_string(),
        ];
        Self { ignore_dirs }
    }

    /// Collect repo-relative file paths, sorted for deterministic output.
    pub fn scan(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !self.should_ignore(e))
        {
            let entry = match entry {
                Ok(e) => e,
                Err(_) => continue,
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(root)
                .unwrap_or(entry.path())
                .to_path_buf();
            files.push(relative);
        }

        files.sort();
        Ok(files)
    }

    fn should_ignore(&self, entry: &walkdir::DirEntry) -> bool {
        // Never filter the walk root itself.
        if entry.depth() == 0 {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        if entry.file_type().is_dir() && self.ignore_dirs.iter().any(|d| d == name.as_ref()) {
            return true;
        }
        // Hidden files and directories (.gitignore, .compass, ...)
        name.starts_with('.')
    }
}

impl Default for RepoScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Render sorted file paths as a nested markdown bullet list, directories
/// carrying a trailing slash. Elides everything past the file cap.
pub fn render_tree_markdown(paths: &[PathBuf]) -> String {
    let shown = paths.len().min(MAX_TREE_FILES);
    let mut out = String::new();
    let mut seen_dirs: HashSet<PathBuf> = HashSet::new();

    for path in &paths[..shown] {
        let components: Vec<String> = path
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();

        let mut prefix = PathBuf::new();
        for (depth, component) in components.iter().enumerate() {
            prefix.push(component);
            let indent = "  ".repeat(depth);
            if depth == components.len() - 1 {
                out.push_str(&format!("{}- {}\n", indent, component));
            } else if seen_dirs.insert(prefix.clone()) {
                out.push_str(&format!("{}- {}/\n", indent, component));
            }
        }
    }

    if paths.len() > shown {
        out.push_str(&format!("\n... and {} more files\n", paths.len() - shown));
    }
    out
}
