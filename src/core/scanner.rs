// src/core/scanner.rs
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use serde::{Serialize, Deserialize};
use sha2::{Sha256, Digest};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::ProjectConfig;
use super::call_graph::number_lines;

/// A source file selected for relationship extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: PathBuf,
    /// File name
    pub name: String,
    /// Extension with its leading dot, or empty
    pub extension: String,
    /// Line-numbered content
    pub source_code: String,
}

/// Immutable directory tree of selected files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDir {
    pub path: PathBuf,
    pub name: String,
    pub dirs: Vec<SourceDir>,
    pub files: Vec<SourceFile>,
}

impl SourceDir {
    /// Files in breadth-first order: this directory's files, then each level below
    pub fn files_breadth_first(&self) -> Vec<&SourceFile> {
        let mut files = Vec::new();
        let mut queue = VecDeque::from([self]);

        while let Some(dir) = queue.pop_front() {
            files.extend(dir.files.iter());
            queue.extend(dir.dirs.iter());
        }

        files
    }

    pub fn file_count(&self) -> usize {
        self.files.len() + self.dirs.iter().map(SourceDir::file_count).sum::<usize>()
    }

    /// Draw the tree with box characters, files before subdirectories
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, "", true, true);
        out
    }

    fn render_into(&self, out: &mut String, prefix: &str, is_last: bool, is_root: bool) {
        let child_prefix = if is_root {
            out.push_str(&format!("{}\n", self.name));
            String::new()
        } else {
            out.push_str(&format!("{}{}{}\n", prefix, if is_last { "└─ " } else { "├─ " }, self.name));
            format!("{}{}", prefix, if is_last { "   " } else { "│  " })
        };

        for (i, file) in self.files.iter().enumerate() {
            let last = i + 1 == self.files.len() && self.dirs.is_empty();
            out.push_str(&format!(
                "{}{}{} ({})\n",
                child_prefix,
                if last { "└─ " } else { "├─ " },
                file.name,
                file.extension
            ));
        }

        for (i, dir) in self.dirs.iter().enumerate() {
            dir.render_into(out, &child_prefix, i + 1 == self.dirs.len(), false);
        }
    }
}

/// SHA-256 of the rendered tree; keys checkpoint and report files
pub fn project_hash(root: &SourceDir) -> String {
    let mut hasher = Sha256::new();
    hasher.update(root.render_tree().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Scan a project directory into an immutable tree.
///
/// `skip_dir`, when it lies inside the project, is left out of the tree entirely.
pub fn scan_project<P: AsRef<Path>>(dir: P, config: &ProjectConfig, skip_dir: Option<&Path>) -> SourceDir {
    let root = dir.as_ref();
    let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    let skip_dir = skip_dir.map(|p| p.canonicalize().unwrap_or_else(|_| p.to_path_buf()));
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| root.display().to_string());

    scan_dir(&root, name, config, skip_dir.as_deref())
}

/// One directory level; subdirectories are scanned first and composed into the result
fn scan_dir(path: &Path, name: String, config: &ProjectConfig, skip_dir: Option<&Path>) -> SourceDir {
    let mut dirs = Vec::new();
    let mut files = Vec::new();

    let entries = WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Failed to read directory entry in {}: {}", path.display(), e);
                continue;
            }
        };

        let entry_path = entry.path();
        let entry_name = entry.file_name().to_string_lossy().to_string();
        // Ancestors were checked on the way down, so the entry's own name is enough
        if config.exclude_dir.contains(&entry_name) {
            debug!("Excluded: {}", entry_path.display());
            continue;
        }
        if skip_dir == Some(entry_path) {
            debug!("Skipping output directory {}", entry_path.display());
            continue;
        }

        if entry.file_type().is_dir() {
            dirs.push(scan_dir(entry_path, entry_name, config, skip_dir));
        } else if entry.file_type().is_file() {
            if let Some(file) = read_source_file(entry_path, entry_name, config) {
                files.push(file);
            }
        }
    }

    SourceDir {
        path: path.to_path_buf(),
        name,
        dirs,
        files,
    }
}

fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

fn read_source_file(path: &Path, name: String, config: &ProjectConfig) -> Option<SourceFile> {
    let extension = extension_of(&name);
    let wanted = config.source_file_ext.contains(&extension)
        || config.config_file_ext.contains(&extension);
    if !wanted {
        return None;
    }

    let size = match std::fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) => {
            warn!("Failed to stat {}: {}", path.display(), e);
            return None;
        }
    };
    if size as f64 / (1024.0 * 1024.0) > config.max_file_size_mb {
        debug!("Skipping oversized file {} ({} bytes)", path.display(), size);
        return None;
    }

    match std::fs::read_to_string(path) {
        Ok(content) => Some(SourceFile {
            path: path.to_path_buf(),
            name,
            extension,
            source_code: number_lines(&content),
        }),
        Err(e) => {
            warn!("Failed to read file {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use assert_fs::prelude::*;
    use assert_fs::TempDir;

    fn project() -> TempDir {
        let temp = TempDir::new().unwrap();
        temp.child("app.py").write_str("def main():\n    run()\n").unwrap();
        temp.child("README.md").write_str("# ignored").unwrap();
        temp.child("pkg/util.go").write_str("func run() {}").unwrap();
        temp.child("pkg/deep/conf.yaml").write_str("a: 1").unwrap();
        temp.child("node_modules/lib.js").write_str("x()").unwrap();
        temp.child("tests/test_app.py").write_str("t()").unwrap();
        temp
    }

    #[test]
    fn test_scan_filters_and_numbers() {
        let temp = project();
        let root = scan_project(temp.path(), &Config::default().project, None);

        let names: Vec<&str> = root.files_breadth_first().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["app.py", "util.go", "conf.yaml"]);
        assert_eq!(root.file_count(), 3);

        let app = &root.files[0];
        assert_eq!(app.extension, ".py");
        assert_eq!(app.source_code, "1: def main():\n2:     run()");
    }

    #[test]
    fn test_oversized_files_skipped() {
        let temp = project();
        temp.child("big.py").write_str(&"x".repeat(4096)).unwrap();
        let mut config = Config::default().project;
        config.max_file_size_mb = 0.001;

        let root = scan_project(temp.path(), &config, None);
        assert!(root.files.iter().all(|f| f.name != "big.py"));
        assert!(root.files.iter().any(|f| f.name == "app.py"));
    }

    #[test]
    fn test_non_utf8_file_skipped() {
        let temp = project();
        temp.child("bin.py").write_binary(&[0xff, 0xfe, 0x00, 0x80]).unwrap();

        let root = scan_project(temp.path(), &Config::default().project, None);
        assert!(root.files.iter().all(|f| f.name != "bin.py"));
    }

    #[test]
    fn test_render_tree_and_hash_are_stable() {
        let temp = project();
        let config = Config::default().project;
        let root = scan_project(temp.path(), &config, None);

        let tree = root.render_tree();
        let lines: Vec<&str> = tree.lines().collect();
        assert_eq!(lines[1], "├─ app.py (.py)");
        assert_eq!(lines[2], "└─ pkg");
        assert_eq!(lines[3], "   ├─ util.go (.go)");
        assert_eq!(lines[4], "   └─ deep");
        assert_eq!(lines[5], "      └─ conf.yaml (.yaml)");

        let again = scan_project(temp.path(), &config, None);
        assert_eq!(project_hash(&root), project_hash(&again));
        assert_eq!(project_hash(&root).len(), 64);

        temp.child("pkg/more.py").write_str("y()").unwrap();
        let changed = scan_project(temp.path(), &config, None);
        assert_ne!(project_hash(&root), project_hash(&changed));
    }

    #[test]
    fn test_skip_dir_left_out_of_tree() {
        let temp = project();
        temp.child("artifacts/abc.graph.json").write_str("{}").unwrap();
        let config = Config::default().project;

        let with_output = scan_project(temp.path(), &config, None);
        assert!(with_output.dirs.iter().any(|d| d.name == "artifacts"));

        let skipped = scan_project(temp.path(), &config, Some(temp.child("artifacts").path()));
        assert!(skipped.dirs.iter().all(|d| d.name != "artifacts"));
        assert_eq!(skipped.file_count(), 3);

        temp.child("artifacts/def.graph.json").write_str("{}").unwrap();
        let again = scan_project(temp.path(), &config, Some(temp.child("artifacts").path()));
        assert_eq!(project_hash(&skipped), project_hash(&again));
    }
}
