use anyhow::Result;
use log::{debug, warn};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// File scanner for traversing project directories.
///
/// The `FileScanner` recursively walks through a project directory to find all Rust source files
/// and derives the module path each file contributes to. It automatically skips common
/// directories that should be ignored, such as `target` and hidden directories (those starting
/// with `.`).
///
/// # Example
///
/// ```no_run
/// use rest_action_openapi::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./my-project"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} Rust files", result.rust_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
}

/// A discovered Rust source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path to the file
    pub path: PathBuf,
    /// Module the file defines, e.g. `users::list` for `src/users/list.rs`; empty for the crate root
    pub module_path: String,
}

/// Result of directory scanning operation.
///
/// Contains the list of discovered Rust files and any warnings encountered during scanning.
pub struct ScanResult {
    /// All discovered `.rs` files, in walk order
    pub rust_files: Vec<SourceFile>,
    /// Warning messages for any issues encountered (e.g., inaccessible directories)
    pub warnings: Vec<String>,
}

impl FileScanner {
    /// Creates a new `FileScanner` for the specified root directory.
    ///
    /// # Arguments
    ///
    /// * `root_path` - The root directory to scan for Rust files
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Scans the directory tree and collects all `.rs` files.
    ///
    /// This method recursively traverses the directory tree starting from the root path,
    /// collecting all files with the `.rs` extension. It automatically skips:
    /// - The `target` directory (build artifacts)
    /// - Hidden directories (starting with `.`)
    ///
    /// Entries are visited in file name order so that repeated runs see the same sequence.
    /// If any directories or files cannot be accessed, warnings are logged and added to
    /// the result, but scanning continues.
    ///
    /// # Returns
    ///
    /// Returns a `ScanResult` containing the list of discovered files and any warnings.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be accessed.
    pub fn scan(&self) -> Result<ScanResult> {
        let mut rust_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                // Don't filter the root directory itself
                if e.path() == self.root_path {
                    return true;
                }

                let file_name = e.file_name().to_string_lossy();
                let is_hidden = file_name.starts_with('.');
                let is_target = file_name == "target";

                !is_hidden && !is_target
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();

                    if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("rs") {
                        let module_path = module_path_for(&self.root_path, path);
                        debug!("Found {} (module '{}')", path.display(), module_path);
                        rust_files.push(SourceFile {
                            path: path.to_path_buf(),
                            module_path,
                        });
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        Ok(ScanResult {
            rust_files,
            warnings,
        })
    }
}

/// Derive the module path of `path` relative to `root`.
///
/// Everything up to and including the last `src` directory is dropped, the `.rs`
/// extension is removed and `lib.rs`, `main.rs` and `mod.rs` map to their parent module.
pub fn module_path_for(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let mut segments: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if let Some(src_index) = segments.iter().rposition(|s| s == "src") {
        segments.drain(..=src_index);
    }

    if let Some(file_name) = segments.pop() {
        let stem = file_name.strip_suffix(".rs").unwrap_or(&file_name);
        if !matches!(stem, "lib" | "main" | "mod") {
            segments.push(stem.to_string());
        }
    }

    segments.join("::")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn file_names(result: &ScanResult) -> Vec<String> {
        result
            .rust_files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_scan_normal_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("main.rs"), "fn main() {}").unwrap();
        fs::write(root.join("lib.rs"), "pub fn test() {}").unwrap();
        fs::write(root.join("readme.md"), "# README").unwrap();

        let scanner = FileScanner::new(root.to_path_buf());
        let result = scanner.scan().unwrap();

        assert_eq!(result.rust_files.len(), 2);
        assert!(result.warnings.is_empty());
        assert_eq!(file_names(&result), vec!["lib.rs", "main.rs"]);
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();

        let scanner = FileScanner::new(temp_dir.path().to_path_buf());
        let result = scanner.scan().unwrap();

        assert!(result.rust_files.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_scan_assigns_module_paths() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("src/users")).unwrap();
        fs::write(root.join("src/lib.rs"), "pub mod users;").unwrap();
        fs::write(root.join("src/users/mod.rs"), "pub mod list;").unwrap();
        fs::write(root.join("src/users/list.rs"), "pub struct ListUsersRestAction;").unwrap();

        let scanner = FileScanner::new(root.to_path_buf());
        let result = scanner.scan().unwrap();

        let modules: Vec<&str> = result
            .rust_files
            .iter()
            .map(|f| f.module_path.as_str())
            .collect();
        assert_eq!(modules, vec!["", "users::list", "users"]);
    }

    #[test]
    fn test_scan_skips_target_and_hidden_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir(root.join("target")).unwrap();
        fs::write(root.join("target/build.rs"), "fn main() {}").unwrap();
        fs::create_dir(root.join(".git")).unwrap();
        fs::write(root.join(".git/config.rs"), "// config").unwrap();
        fs::write(root.join("main.rs"), "fn main() {}").unwrap();

        let scanner = FileScanner::new(root.to_path_buf());
        let result = scanner.scan().unwrap();

        assert_eq!(file_names(&result), vec!["main.rs"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_scan_filters_non_rust_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("main.rs"), "fn main() {}").unwrap();
        fs::write(root.join("readme.md"), "# README").unwrap();
        fs::write(root.join("Cargo.toml"), "[package]").unwrap();

        let scanner = FileScanner::new(root.to_path_buf());
        let result = scanner.scan().unwrap();

        assert_eq!(file_names(&result), vec!["main.rs"]);
    }

    #[test]
    fn test_module_path_for() {
        let root = Path::new("/project");
        assert_eq!(module_path_for(root, Path::new("/project/src/lib.rs")), "");
        assert_eq!(module_path_for(root, Path::new("/project/src/main.rs")), "");
        assert_eq!(
            module_path_for(root, Path::new("/project/src/actions/users.rs")),
            "actions::users"
        );
        assert_eq!(
            module_path_for(root, Path::new("/project/src/actions/mod.rs")),
            "actions"
        );
        // Workspace members: the innermost src wins
        assert_eq!(
            module_path_for(root, Path::new("/project/crates/api/src/model.rs")),
            "model"
        );
        assert_eq!(module_path_for(root, Path::new("/project/build.rs")), "build");
    }
}
