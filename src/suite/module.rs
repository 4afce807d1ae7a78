use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// One test script and the page generated for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestModule {
    /// First underscore-delimited segment of the script stem.
    pub name: String,
    /// Script path inside the tests directory.
    pub script: PathBuf,
}

impl TestModule {
    /// Derive a module from a script path. `None` if the stem is empty.
    pub fn from_script(script: &Path) -> Option<Self> {
        let stem = script.file_stem()?.to_str()?;
        let name = stem.split('_').next().filter(|s| !s.is_empty())?;
        Some(Self {
            name: name.to_string(),
            script: script.to_path_buf(),
        })
    }

    /// `test_<module>.html`
    pub fn output_file_name(&self) -> String {
        output_file_name(&self.name)
    }

    /// The staged copy of the script is always `<module>_test.js`,
    /// whatever the script's full file name.
    pub fn staged_script_name(&self) -> String {
        format!("{}_test.js", self.name)
    }

    /// Page title: `ajax` → `Ajax test`.
    pub fn title(&self) -> String {
        format!("{} test", capitalize(&self.name))
    }

    /// Name shown on the listing page: `ajax_request_test.js` → `Ajax request test`.
    pub fn display_name(&self) -> String {
        let stem = self
            .script
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        capitalize(&stem.split('_').collect::<Vec<_>>().join(" "))
    }
}

/// `test_<module>.html`
pub fn output_file_name(module: &str) -> String {
    format!("test_{module}.html")
}

/// Uppercase the first character, lowercase the rest.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Key used to regenerate after a modification: file stem with a trailing
/// `_test` removed.
///
/// `ajax_test.js` → `ajax`, `ajax.css` → `ajax`, `ajax_logo.gif` → `ajax_logo`.
pub fn changed_module_key(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let key = stem.strip_suffix("_test").unwrap_or(stem);
    (!key.is_empty()).then(|| key.to_string())
}

/// Every `*.js` file directly inside `tests_dir`, sorted by file name.
pub fn discover_modules(tests_dir: &Path) -> io::Result<Vec<TestModule>> {
    let mut scripts: Vec<PathBuf> = fs::read_dir(tests_dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|e| e == "js"))
        .collect();
    scripts.sort();

    Ok(scripts
        .iter()
        .filter_map(|script| TestModule::from_script(script))
        .collect())
}

/// Locate `<key>_test.js` in `tests_dir`.
pub fn find_script(tests_dir: &Path, key: &str) -> Option<PathBuf> {
    let candidate = tests_dir.join(format!("{key}_test.js"));
    candidate.is_file().then_some(candidate)
}
