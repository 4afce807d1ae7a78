//! Output store: generated pages, the `tmp/` staging area and the
//! published library artifact.
//!
//! ```text
//! <output>/
//!   test_<module>.html
//!   tmp/            # staged fixtures and scripts
//! ```
//!
//! The store holds no authoritative state. Everything in it can be
//! regenerated from the source tree, the tests tree and the template.

use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::{config::PathsConfig, debug, suite::output_file_name};

/// Name of the staging subdirectory, also the prefix used in page references.
pub const STAGING_DIR: &str = "tmp";

#[derive(Debug, Error)]
#[error("failed to {op} {}", path.display())]
pub struct StoreError {
    op: &'static str,
    path: PathBuf,
    #[source]
    source: io::Error,
}

impl StoreError {
    fn new(op: &'static str, path: &Path) -> impl FnOnce(io::Error) -> Self {
        let path = path.to_path_buf();
        move |source| Self { op, path, source }
    }
}

type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone)]
pub struct OutputStore {
    root: PathBuf,
    staging: PathBuf,
}

impl OutputStore {
    pub fn new(paths: &PathsConfig) -> Self {
        Self {
            root: paths.output.clone(),
            staging: paths.staging(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn staging(&self) -> &Path {
        &self.staging
    }

    /// Path of the generated page for `module`.
    pub fn page_path(&self, module: &str) -> PathBuf {
        self.root.join(output_file_name(module))
    }

    /// Create the output and staging directories.
    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.staging).map_err(StoreError::new("create", &self.staging))
    }

    /// Remove the whole output directory. Missing is fine.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::new("remove", &self.root)(e)),
        }
    }

    /// Copy `file` into the staging area under its own name.
    ///
    /// Returns the page-relative reference (`tmp/<name>`).
    pub fn stage(&self, file: &Path) -> Result<String> {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.stage_as(file, &name)
    }

    /// Copy `file` into the staging area as `name`, overwriting.
    pub fn stage_as(&self, file: &Path, name: &str) -> Result<String> {
        let target = self.staging.join(name);
        fs::copy(file, &target).map_err(StoreError::new("stage", file))?;
        Ok(format!("{STAGING_DIR}/{name}"))
    }

    /// Remove `test_<module>.html` and every staged file whose name starts
    /// with `module`.
    ///
    /// Returns the names of the removed staged files. Other modules may
    /// reference some of them (`form` also matches `formatting_test.js`).
    pub fn remove_module_artifacts(&self, module: &str) -> Result<Vec<String>> {
        remove_if_present(&self.page_path(module))?;

        let entries = match fs::read_dir(&self.staging) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::new("read", &self.staging)(e)),
        };

        let mut removed = Vec::new();
        for entry in entries.filter_map(std::result::Result::ok) {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.starts_with(module) && path.is_file() && remove_if_present(&path)? {
                removed.push(name.to_string());
            }
        }
        removed.sort();

        debug!("store"; "removed {} staged file(s) of {}", removed.len(), module);
        Ok(removed)
    }

    /// Write the final page for `module`.
    ///
    /// Written under a temporary name and renamed into place so the HTTP
    /// layer never serves a half-written page.
    pub fn write_final_artifact(&self, module: &str, bytes: &[u8]) -> Result<PathBuf> {
        let target = self.page_path(module);
        write_atomic(&target, bytes)?;
        Ok(target)
    }
}

/// Copy the library artifact into `dir`, overwriting any previous copy.
pub fn publish(artifact: &Path, dir: &Path) -> Result<PathBuf> {
    let name = artifact.file_name().unwrap_or(artifact.as_os_str());
    let target = dir.join(name);
    fs::create_dir_all(dir).map_err(StoreError::new("create", dir))?;

    let bytes = fs::read(artifact).map_err(StoreError::new("read", artifact))?;
    write_atomic(&target, &bytes)?;
    Ok(target)
}

fn write_atomic(target: &Path, bytes: &[u8]) -> Result<()> {
    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = target.with_file_name(format!(".{file_name}.partial"));

    fs::write(&temp, bytes).map_err(StoreError::new("write", &temp))?;
    fs::rename(&temp, target).map_err(StoreError::new("rename", target))
}

fn remove_if_present(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(StoreError::new("remove", path)(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, OutputStore) {
        let temp = TempDir::new().unwrap();
        let store = OutputStore {
            root: temp.path().join("out"),
            staging: temp.path().join("out/tmp"),
        };
        (temp, store)
    }

    #[test]
    fn test_ensure_and_clear() {
        let (_temp, store) = store();
        store.ensure().unwrap();
        assert!(store.staging().is_dir());

        store.clear().unwrap();
        assert!(!store.root().exists());

        // clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_stage_and_stage_as() {
        let (temp, store) = store();
        store.ensure().unwrap();
        let fixture = temp.path().join("ajax.css");
        fs::write(&fixture, "body {}").unwrap();

        assert_eq!(store.stage(&fixture).unwrap(), "tmp/ajax.css");
        assert_eq!(fs::read_to_string(store.staging().join("ajax.css")).unwrap(), "body {}");

        assert_eq!(store.stage_as(&fixture, "renamed.css").unwrap(), "tmp/renamed.css");
        assert!(store.staging().join("renamed.css").is_file());
    }

    #[test]
    fn test_stage_overwrites() {
        let (temp, store) = store();
        store.ensure().unwrap();
        let fixture = temp.path().join("ajax.css");

        fs::write(&fixture, "old").unwrap();
        store.stage(&fixture).unwrap();
        fs::write(&fixture, "new").unwrap();
        store.stage(&fixture).unwrap();

        assert_eq!(fs::read_to_string(store.staging().join("ajax.css")).unwrap(), "new");
    }

    #[test]
    fn test_stage_missing_source_is_error() {
        let (temp, store) = store();
        store.ensure().unwrap();
        let err = store.stage(&temp.path().join("gone.js")).unwrap_err();
        assert!(err.to_string().contains("stage"));
    }

    #[test]
    fn test_remove_module_artifacts() {
        let (_temp, store) = store();
        store.ensure().unwrap();
        store.write_final_artifact("ajax", b"<html>").unwrap();
        store.write_final_artifact("dom", b"<html>").unwrap();
        for name in ["ajax.css", "ajax_test.js", "ajax_logo.gif", "dom_test.js"] {
            fs::write(store.staging().join(name), "").unwrap();
        }

        let removed = store.remove_module_artifacts("ajax").unwrap();
        assert_eq!(removed, vec!["ajax.css", "ajax_logo.gif", "ajax_test.js"]);
        assert!(!store.page_path("ajax").exists());
        assert!(store.page_path("dom").exists());
        assert!(store.staging().join("dom_test.js").exists());
        assert!(!store.staging().join("ajax_logo.gif").exists());
    }

    #[test]
    fn test_remove_module_artifacts_without_store() {
        let (_temp, store) = store();
        assert!(store.remove_module_artifacts("ajax").unwrap().is_empty());
    }

    #[test]
    fn test_write_final_artifact_leaves_no_temp() {
        let (_temp, store) = store();
        store.ensure().unwrap();
        let path = store.write_final_artifact("ajax", b"first").unwrap();
        store.write_final_artifact("ajax", b"second").unwrap();

        assert_eq!(path, store.root().join("test_ajax.html"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        let leftovers: Vec<_> = fs::read_dir(store.root())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".partial"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_publish_overwrites() {
        let temp = TempDir::new().unwrap();
        let artifact = temp.path().join("dist/prototype.js");
        fs::create_dir_all(artifact.parent().unwrap()).unwrap();
        let public = temp.path().join("public");

        fs::write(&artifact, "v1").unwrap();
        publish(&artifact, &public).unwrap();
        fs::write(&artifact, "v2").unwrap();
        let target = publish(&artifact, &public).unwrap();

        assert_eq!(target, public.join("prototype.js"));
        assert_eq!(fs::read_to_string(target).unwrap(), "v2");
    }
}
