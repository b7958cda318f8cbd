use crate::annotation::AnnotationParser;
use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use crate::parser::{AstParser, StructDecl};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use walkdir::WalkDir;

/// Directory names skipped unless configured otherwise
pub const DEFAULT_EXCLUDES: [&str; 5] = ["vendor", "node_modules", ".git", "test", "tests"];

/// Default number of files parsed at the same time
pub const DEFAULT_MAX_CONCURRENT: usize = 4;

/// File scanner for traversing Go project directories.
///
/// The `FileScanner` recursively walks a project directory to find all Go source files. It
/// skips directories whose name is in the exclusion list and files named `*_test.go`.
///
/// # Example
///
/// ```no_run
/// use swag_gen::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./my-project"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} Go files", result.go_files.len());
/// ```
#[derive(Debug, Clone)]
pub struct FileScanner {
    root_path: PathBuf,
    exclude: Vec<String>,
}

/// Result of directory scanning operation.
///
/// Contains the list of discovered Go files and any warnings encountered during scanning.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// List of paths to all discovered `.go` files
    pub go_files: Vec<PathBuf>,
    /// Warning messages for any issues encountered (e.g., inaccessible directories)
    pub warnings: Vec<String>,
}

impl FileScanner {
    /// Creates a new `FileScanner` for the specified root directory with the default
    /// exclusion list.
    ///
    /// # Arguments
    ///
    /// * `root_path` - The root directory to scan for Go files
    pub fn new(root_path: PathBuf) -> Self {
        Self {
            root_path,
            exclude: DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replace the list of excluded directory names
    pub fn with_excludes<I, S>(mut self, exclude: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = exclude.into_iter().map(Into::into).collect();
        self
    }

    /// The root directory being scanned
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Excluded directory names
    pub fn excludes(&self) -> &[String] {
        &self.exclude
    }

    /// Scans the directory tree and collects all `.go` files.
    ///
    /// This method recursively traverses the directory tree starting from the root path. It
    /// skips:
    /// - Directories whose name is in the exclusion list
    /// - Test files (`*_test.go`)
    ///
    /// If any directories or files cannot be accessed, warnings are logged and added to
    /// the result, but scanning continues.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProjectPath`] if the root cannot be read or is not a directory.
    pub fn scan(&self) -> Result<ScanResult> {
        let metadata = fs::metadata(&self.root_path).map_err(|e| Error::InvalidProjectPath {
            path: self.root_path.clone(),
            message: e.to_string(),
        })?;
        if !metadata.is_dir() {
            return Err(Error::InvalidProjectPath {
                path: self.root_path.clone(),
                message: "not a directory".to_string(),
            });
        }
        fs::read_dir(&self.root_path).map_err(|e| Error::InvalidProjectPath {
            path: self.root_path.clone(),
            message: e.to_string(),
        })?;

        let mut result = ScanResult::default();

        for entry in WalkDir::new(&self.root_path)
            .into_iter()
            .filter_entry(|e| {
                // Don't filter the root directory itself
                if e.depth() == 0 || !e.file_type().is_dir() {
                    return true;
                }
                let name = e.file_name().to_string_lossy();
                !self.exclude.iter().any(|x| x.as_str() == name)
            })
        {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && is_go_source(entry.path()) {
                        result.go_files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    result.warnings.push(warning);
                }
            }
        }

        debug!(
            "Found {} Go files under {}",
            result.go_files.len(),
            self.root_path.display()
        );
        Ok(result)
    }
}

fn is_go_source(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.ends_with(".go") && !name.ends_with("_test.go")
}

/// A file that could not be processed during a project scan.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: Error,
}

/// Everything a project scan produced.
///
/// `endpoints` and `structs` are collected from files as they finish, so their order is not
/// meaningful.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub endpoints: Vec<Endpoint>,
    /// Struct declarations from every successfully parsed file
    pub structs: Vec<StructDecl>,
    /// Files skipped because they could not be read or parsed
    pub failures: Vec<FileFailure>,
    /// Number of candidate files dispatched
    pub files_scanned: usize,
    /// Discovery warnings (inaccessible paths)
    pub warnings: Vec<String>,
}

struct FileOutcome {
    endpoints: Vec<Endpoint>,
    structs: Vec<StructDecl>,
}

/// Scans a whole project: discovery, then per-file extraction on a bounded set of worker
/// threads.
#[derive(Debug, Clone)]
pub struct ProjectScanner {
    files: FileScanner,
    max_concurrent: usize,
}

impl ProjectScanner {
    /// Create a scanner for `root_path` with the default exclusions and concurrency
    pub fn new(root_path: PathBuf) -> Self {
        Self {
            files: FileScanner::new(root_path),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }

    /// Replace the list of excluded directory names
    pub fn with_excludes<I, S>(mut self, exclude: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = self.files.with_excludes(exclude);
        self
    }

    /// Limit the number of files processed at once; values below 1 are raised to 1
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Scans the project and collects every documented endpoint.
    ///
    /// Files are distributed over at most `max_concurrent` worker threads. A file that fails
    /// to parse is logged, recorded in [`ScanReport::failures`] and skipped; it never fails
    /// the scan. The call returns once every worker has finished.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProjectPath`] if the root cannot be read. No file is processed
    /// in that case.
    pub fn scan_project(&self) -> Result<ScanReport> {
        let discovered = self.files.scan()?;
        let files = discovered.go_files;
        let annotations = AnnotationParser::new();

        let mut report = ScanReport {
            files_scanned: files.len(),
            warnings: discovered.warnings,
            ..ScanReport::default()
        };

        let workers = self.max_concurrent.min(files.len());
        info!(
            "Scanning {} Go files under {} with {} workers",
            files.len(),
            self.files.root_path().display(),
            workers
        );

        let next = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel::<(PathBuf, Result<FileOutcome>)>();

        thread::scope(|scope| {
            for _ in 0..workers {
                let tx = tx.clone();
                let next = &next;
                let files = &files;
                let annotations = &annotations;

                scope.spawn(move || loop {
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    let Some(path) = files.get(index) else {
                        break;
                    };
                    let outcome = scan_file(annotations, path);
                    if tx.send((path.clone(), outcome)).is_err() {
                        break;
                    }
                });
            }
            drop(tx);

            for (path, outcome) in rx {
                match outcome {
                    Ok(outcome) => {
                        report.endpoints.extend(outcome.endpoints);
                        report.structs.extend(outcome.structs);
                    }
                    Err(error) => {
                        warn!("Skipping {}: {}", path.display(), error);
                        report.failures.push(FileFailure { path, error });
                    }
                }
            }
        });

        info!(
            "Found {} endpoints in {} files ({} failed)",
            report.endpoints.len(),
            report.files_scanned,
            report.failures.len()
        );
        Ok(report)
    }
}

fn scan_file(annotations: &AnnotationParser, path: &Path) -> Result<FileOutcome> {
    let parsed = AstParser::parse_file(path)?;

    let endpoints = parsed
        .documented_functions()
        .filter_map(|func| annotations.parse_endpoint(&func.doc_lines, path, func.line))
        .collect();

    Ok(FileOutcome {
        endpoints,
        structs: parsed.structs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    const USERS_GO: &str = r#"package api

// GetUsers lists users
// @Router /users [GET]
func GetUsers() {}

// CreateUser creates a user
// @Router /users [POST]
func CreateUser() {}

// helper is not an endpoint
func helper() {}
"#;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn file_names(result: &ScanResult) -> BTreeSet<String> {
        result
            .go_files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_scan_collects_go_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "main.go", "package main");
        write(root, "api/user.go", "package api");
        write(root, "README.md", "# README");

        let result = FileScanner::new(root.to_path_buf()).scan().unwrap();

        assert_eq!(
            file_names(&result),
            BTreeSet::from(["main.go".to_string(), "user.go".to_string()])
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_scan_skips_excluded_dirs_and_test_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "api/user.go", "package api");
        write(root, "api/user_test.go", "package api");
        write(root, "vendor/lib/lib.go", "package lib");
        write(root, "node_modules/x.go", "package x");
        write(root, "tests/e2e.go", "package tests");

        let result = FileScanner::new(root.to_path_buf()).scan().unwrap();
        assert_eq!(file_names(&result), BTreeSet::from(["user.go".to_string()]));
    }

    #[test]
    fn test_scan_custom_excludes() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "api/user.go", "package api");
        write(root, "internal/db.go", "package internal");
        write(root, "vendor/lib.go", "package lib");

        let result = FileScanner::new(root.to_path_buf())
            .with_excludes(["internal"])
            .scan()
            .unwrap();
        assert_eq!(
            file_names(&result),
            BTreeSet::from(["user.go".to_string(), "lib.go".to_string()])
        );
    }

    #[test]
    fn test_scan_invalid_root() {
        let err = FileScanner::new(PathBuf::from("/no/such/project"))
            .scan()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidProjectPath { .. }));
        assert!(err.to_string().contains("/no/such/project"));

        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("main.go");
        fs::write(&file, "package main").unwrap();
        let err = FileScanner::new(file).scan().unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn test_scan_project_collects_endpoints() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "api/users.go", USERS_GO);

        let report = ProjectScanner::new(temp_dir.path().to_path_buf())
            .scan_project()
            .unwrap();

        assert_eq!(report.files_scanned, 1);
        assert_eq!(report.endpoints.len(), 2);
        let methods: BTreeSet<&str> = report.endpoints.iter().map(|e| e.method.as_str()).collect();
        assert_eq!(methods, BTreeSet::from(["GET", "POST"]));
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_scan_project_tolerates_invalid_files() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "good.go", USERS_GO);
        write(
            temp_dir.path(),
            "bad.go",
            "package api\n\n// @Router /bad [GET]\nfunc Bad( {\n",
        );

        let report = ProjectScanner::new(temp_dir.path().to_path_buf())
            .with_max_concurrent(2)
            .scan_project()
            .unwrap();

        assert_eq!(report.files_scanned, 2);
        assert_eq!(report.endpoints.len(), 2);
        assert!(report.endpoints.iter().all(|e| e.path == "/users"));
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].path.ends_with("bad.go"));
    }

    #[test]
    fn test_scan_project_same_result_for_any_concurrency() {
        let temp_dir = TempDir::new().unwrap();
        for i in 0..10 {
            write(
                temp_dir.path(),
                &format!("pkg{}/api.go", i),
                &format!("package pkg{i}\n\n// @Router /items/{i} [GET]\nfunc Get{i}() {{}}\n"),
            );
        }

        let collect = |n: usize| -> BTreeSet<String> {
            ProjectScanner::new(temp_dir.path().to_path_buf())
                .with_max_concurrent(n)
                .scan_project()
                .unwrap()
                .endpoints
                .into_iter()
                .map(|e| e.path)
                .collect()
        };

        let sequential = collect(1);
        assert_eq!(sequential.len(), 10);
        assert_eq!(sequential, collect(4));
        assert_eq!(sequential, collect(32));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_unreadable_root() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("locked");
        write(&root, "api.go", USERS_GO);
        fs::set_permissions(&root, fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users can still list the directory
        let readable = fs::read_dir(&root).is_ok();
        let result = ProjectScanner::new(root.clone()).scan_project();
        fs::set_permissions(&root, fs::Permissions::from_mode(0o755)).unwrap();
        if readable {
            return;
        }

        let err = result.unwrap_err();
        assert!(matches!(err, Error::InvalidProjectPath { .. }));
        assert!(err.to_string().contains("locked"));
    }

    #[test]
    fn test_scan_project_invalid_root_fails_fast() {
        let err = ProjectScanner::new(PathBuf::from("/no/such/project"))
            .scan_project()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidProjectPath { .. }));
    }

    #[test]
    fn test_zero_concurrency_is_raised() {
        let scanner = ProjectScanner::new(PathBuf::from(".")).with_max_concurrent(0);
        assert_eq!(scanner.max_concurrent(), 1);
    }
}
