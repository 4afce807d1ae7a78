use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use super::TestModule;

/// How a fixture is referenced from the generated page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureKind {
    /// `<link rel='stylesheet'>`
    Stylesheet,
    /// `<script src>`
    Script,
    /// Referenced with a script tag, like the original logo fixtures.
    Image,
    /// Inlined verbatim into the page body.
    Markup,
    /// Staged but not referenced.
    Other,
}

impl FixtureKind {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("css") => Self::Stylesheet,
            Some("js") => Self::Script,
            Some("gif" | "png" | "jpg" | "jpeg" | "svg") => Self::Image,
            Some("html" | "htm") => Self::Markup,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    pub path: PathBuf,
    pub file_name: String,
    pub kind: FixtureKind,
}

impl Fixture {
    fn new(path: PathBuf) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?.to_string();
        Some(Self {
            kind: FixtureKind::from_path(&path),
            file_name,
            path,
        })
    }

    /// Case-sensitive substring match of the module name in the file name.
    ///
    /// Deliberately coarse: `form2_extra.css` also belongs to `form`.
    pub fn belongs_to(&self, module: &str) -> bool {
        self.file_name.contains(module)
    }
}

/// Snapshot of the fixtures directory, sorted by file name.
#[derive(Debug, Clone, Default)]
pub struct FixtureSet {
    fixtures: Vec<Fixture>,
}

impl FixtureSet {
    /// Scan files directly inside `dir`. A missing directory is an empty set.
    pub fn discover(dir: &Path) -> io::Result<Self> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e),
        };

        let mut fixtures: Vec<Fixture> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter_map(Fixture::new)
            .collect();
        fixtures.sort_by(|a, b| a.file_name.cmp(&b.file_name));

        Ok(Self { fixtures })
    }

    #[cfg(test)]
    pub fn from_paths(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut fixtures: Vec<Fixture> = paths.into_iter().filter_map(Fixture::new).collect();
        fixtures.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Self { fixtures }
    }

    /// Fixtures owned by `module`, in file-name order.
    pub fn matching(&self, module: &str) -> Vec<&Fixture> {
        self.fixtures.iter().filter(|f| f.belongs_to(module)).collect()
    }

    /// Module name → owned fixtures, for every given module.
    pub fn by_module<'a>(&'a self, modules: &[TestModule]) -> BTreeMap<String, Vec<&'a Fixture>> {
        modules
            .iter()
            .map(|m| (m.name.clone(), self.matching(&m.name)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.fixtures.len()
    }
}
