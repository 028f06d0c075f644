//! Web file scaffolding: `index.html`, `style.css` and `script.js` in a folder.
//!
//! Existing files are never overwritten. When a name is taken, a numeric
//! suffix is inserted before the extension (`index-1.html`, `index-2.html`, ...).

use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

pub const INDEX_FILE_NAME: &str = "index.html";
pub const STYLE_FILE_NAME: &str = "style.css";
pub const SCRIPT_FILE_NAME: &str = "script.js";

/// Skeleton written to the index file.
pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Document</title>
    <link rel="stylesheet" href="style.css">
</head>
<body>
    <script src="script.js"></script>
</body>
</html>"#;

#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error("Failed to create folder {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The three files a scaffolding run actually wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSet {
    pub index: PathBuf,
    pub style: PathBuf,
    pub script: PathBuf,
}

impl FileSet {
    pub fn paths(&self) -> [&Path; 3] {
        [
            self.index.as_path(),
            self.style.as_path(),
            self.script.as_path(),
        ]
    }
}

/// True when nothing, not even a dangling symlink, occupies `path`.
fn is_free(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_err()
}

/// `path` itself for `counter == 0`, otherwise `<stem>-<counter>.<ext>`.
fn candidate_path(path: &Path, counter: u64) -> PathBuf {
    if counter == 0 {
        path.to_path_buf()
    } else {
        suffixed_path(path, counter)
    }
}

/// Returns `path` if nothing exists there, otherwise the first free
/// `<stem>-<n>.<ext>` sibling, counting up from 1.
///
/// Symlinks count as taken whether or not their target exists.
/// A name without an extension gets the suffix at the end (`Makefile-1`).
pub fn unique_path(path: &Path) -> PathBuf {
    first_free_from(path, 0).1
}

fn first_free_from(path: &Path, start: u64) -> (u64, PathBuf) {
    let mut counter = start;
    loop {
        let candidate = candidate_path(path, counter);
        if is_free(&candidate) {
            if counter > 0 {
                debug!(
                    original = %path.display(),
                    resolved = %candidate.display(),
                    "Resolved name collision"
                );
            }
            return (counter, candidate);
        }
        counter += 1;
    }
}

fn suffixed_path(path: &Path, counter: u64) -> PathBuf {
    let mut name = OsString::new();
    if let Some(stem) = path.file_stem() {
        name.push(stem);
    }
    name.push(format!("-{counter}"));
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    path.with_file_name(name)
}

/// Creates a new file at the first free name derived from `path` and writes `contents`.
///
/// The file is opened with create-new semantics, so a file that shows up
/// between name resolution and creation is skipped rather than overwritten.
fn create_unique_file(path: &Path, contents: &str) -> Result<PathBuf, ScaffoldError> {
    let mut start = 0;
    loop {
        let (counter, target) = first_free_from(path, start);
        let opened = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target);

        let mut file = match opened {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                start = counter + 1;
                continue;
            }
            Err(source) => return Err(ScaffoldError::Write { path: target, source }),
        };

        file.write_all(contents.as_bytes())
            .map_err(|source| ScaffoldError::Write {
                path: target.clone(),
                source,
            })?;

        info!(path = %target.display(), bytes = contents.len(), "Created file");
        return Ok(target);
    }
}

/// Scaffolds `index.html`, `style.css` and `script.js` inside `folder`.
///
/// The folder and any missing parents are created first. Each file name is
/// resolved on its own, so an existing `index.html` does not push
/// `style.css` to `style-1.css`.
///
/// # Errors
///
/// - [`ScaffoldError::CreateDir`] if the folder cannot be created.
/// - [`ScaffoldError::Write`] if a file cannot be created or written.
pub fn create_web_files(folder: &Path) -> Result<FileSet, ScaffoldError> {
    std::fs::create_dir_all(folder).map_err(|source| ScaffoldError::CreateDir {
        path: folder.to_path_buf(),
        source,
    })?;

    let index = create_unique_file(&folder.join(INDEX_FILE_NAME), INDEX_HTML)?;
    let style = create_unique_file(&folder.join(STYLE_FILE_NAME), "")?;
    let script = create_unique_file(&folder.join(SCRIPT_FILE_NAME), "")?;

    Ok(FileSet {
        index,
        style,
        script,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn fresh_folder_gets_three_files() {
        let tmp = TempDir::new().unwrap();

        let set = create_web_files(tmp.path()).unwrap();

        assert_eq!(names(tmp.path()), ["index.html", "script.js", "style.css"]);
        assert_eq!(set.index, tmp.path().join("index.html"));
        assert_eq!(fs::read_to_string(&set.index).unwrap(), INDEX_HTML);
        assert_eq!(fs::read_to_string(&set.style).unwrap(), "");
        assert_eq!(fs::read_to_string(&set.script).unwrap(), "");
    }

    #[test]
    fn index_skeleton_links_assets() {
        assert!(INDEX_HTML.starts_with("<!DOCTYPE html>"));
        assert!(INDEX_HTML.contains(r#"<meta charset="UTF-8">"#));
        assert!(INDEX_HTML.contains(r#"name="viewport""#));
        assert!(INDEX_HTML.contains(r#"<link rel="stylesheet" href="style.css">"#));
        assert!(INDEX_HTML.contains(r#"<script src="script.js"></script>"#));
    }

    #[test]
    fn missing_parents_are_created() {
        let tmp = TempDir::new().unwrap();
        let folder = tmp.path().join("site").join("nested").join("deep");

        create_web_files(&folder).unwrap();

        assert!(folder.join("index.html").is_file());
    }

    #[test]
    fn existing_index_is_not_overwritten() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("index.html"), "mine").unwrap();

        let set = create_web_files(tmp.path()).unwrap();

        assert_eq!(set.index, tmp.path().join("index-1.html"));
        assert_eq!(set.style, tmp.path().join("style.css"));
        assert_eq!(set.script, tmp.path().join("script.js"));
        assert_eq!(
            fs::read_to_string(tmp.path().join("index.html")).unwrap(),
            "mine"
        );
        assert_eq!(fs::read_to_string(&set.index).unwrap(), INDEX_HTML);
    }

    #[test]
    fn second_run_uses_next_suffix() {
        let tmp = TempDir::new().unwrap();

        create_web_files(tmp.path()).unwrap();
        let second = create_web_files(tmp.path()).unwrap();

        assert_eq!(second.index, tmp.path().join("index-1.html"));
        assert_eq!(second.style, tmp.path().join("style-1.css"));
        assert_eq!(second.script, tmp.path().join("script-1.js"));

        let third = create_web_files(tmp.path()).unwrap();
        assert_eq!(third.index, tmp.path().join("index-2.html"));
        assert_eq!(names(tmp.path()).len(), 9);
    }

    #[test]
    fn counters_are_independent_per_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("style.css"), "").unwrap();
        fs::write(tmp.path().join("style-1.css"), "").unwrap();
        fs::write(tmp.path().join("script.js"), "").unwrap();

        let set = create_web_files(tmp.path()).unwrap();

        assert_eq!(set.index, tmp.path().join("index.html"));
        assert_eq!(set.style, tmp.path().join("style-2.css"));
        assert_eq!(set.script, tmp.path().join("script-1.js"));
    }

    #[test]
    fn unique_path_without_extension() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Makefile");
        fs::write(&path, "").unwrap();

        assert_eq!(unique_path(&path), tmp.path().join("Makefile-1"));
    }

    #[test]
    fn unique_path_splits_on_last_dot() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("archive.tar.gz");
        fs::write(&path, "").unwrap();

        assert_eq!(unique_path(&path), tmp.path().join("archive.tar-1.gz"));
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_counts_as_taken() {
        let tmp = TempDir::new().unwrap();
        std::os::unix::fs::symlink(tmp.path().join("gone.html"), tmp.path().join("index.html"))
            .unwrap();

        let set = create_web_files(tmp.path()).unwrap();

        assert_eq!(set.index, tmp.path().join("index-1.html"));
        assert_eq!(fs::read_to_string(&set.index).unwrap(), INDEX_HTML);
        assert!(fs::symlink_metadata(tmp.path().join("index.html"))
            .unwrap()
            .file_type()
            .is_symlink());
        assert!(!tmp.path().join("gone.html").exists());
    }

    #[test]
    fn unique_path_free_name_is_unchanged() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("index.html");
        assert_eq!(unique_path(&path), path);
    }

    #[test]
    fn folder_that_is_a_file_returns_create_dir_error() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("taken");
        fs::write(&file, "").unwrap();

        let err = create_web_files(&file).unwrap_err();
        assert!(matches!(err, ScaffoldError::CreateDir { .. }));
    }
}
