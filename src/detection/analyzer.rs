use super::patterns::{
    port_from_dockerfile, port_from_script, python_version_from_pyproject,
    python_version_from_runtime_txt, DEFAULT_PYTHON_VERSION,
};
use super::types::RepositoryAnalysis;
use crate::fs::FileSystem;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

const NPM_BUILD: &str = "npm run build";
const NPM_INSTALL: &str = "npm install";
const NPM_START: &str = "npm start";
const NPM_DEV: &str = "npm run dev";

/// The part of package.json the analyzer cares about
#[derive(Debug, Default, Deserialize)]
struct PackageManifest {
    #[serde(default)]
    scripts: Option<Value>,
}

impl PackageManifest {
    fn scripts(&self) -> Option<PackageScripts<'_>> {
        self.scripts.as_ref()?.as_object().map(PackageScripts)
    }
}

/// npm scripts, looked up by name. A script counts as defined when its value
/// is truthy, so `""`, `0`, `false` and `null` are all undefined and a value
/// of any other type never breaks the rest of the manifest.
struct PackageScripts<'a>(&'a Map<String, Value>);

impl PackageScripts<'_> {
    fn defined(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|v| is_truthy(v))
    }

    /// `npm run build` when a build script exists, `npm install` otherwise
    fn build_command(&self) -> &'static str {
        if self.defined("build").is_some() {
            NPM_BUILD
        } else {
            NPM_INSTALL
        }
    }

    fn start_command(&self) -> Option<&'static str> {
        if self.defined("start").is_some() {
            Some(NPM_START)
        } else if self.defined("dev").is_some() {
            Some(NPM_DEV)
        } else {
            None
        }
    }

    /// The script a port is scanned from: start, falling back to dev.
    /// Only string scripts can carry a port.
    fn serve_script(&self) -> Option<&str> {
        self.defined("start")
            .or_else(|| self.defined("dev"))
            .and_then(Value::as_str)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Best-effort extraction of deployment settings from a checkout.
///
/// Every source file is handled on its own: a file that cannot be read or
/// parsed contributes nothing and the remaining checks
/// still run. [`RepositoryAnalyzer::analyze`] therefore cannot fail.
pub struct RepositoryAnalyzer<'a> {
    fs: &'a dyn FileSystem,
}

impl<'a> RepositoryAnalyzer<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self { fs }
    }

    pub fn analyze(&self, repo_path: &Path) -> RepositoryAnalysis {
        let mut analysis = RepositoryAnalysis::default();

        if let Some(manifest) = self.read_package_manifest(repo_path) {
            if let Some(scripts) = manifest.scripts() {
                analysis.build_cmd = Some(scripts.build_command().to_string());
                analysis.start_cmd = scripts.start_command().map(str::to_string);
                analysis.port = scripts.serve_script().and_then(port_from_script);
            }
        }

        if self.fs.exists(&repo_path.join("requirements.txt")) {
            analysis.python_version = Some(self.detect_python_version(repo_path));
        }

        // Dockerfile EXPOSE is authoritative over script-derived ports.
        if let Some(port) = self
            .read_optional(repo_path, "Dockerfile")
            .as_deref()
            .and_then(port_from_dockerfile)
        {
            analysis.port = Some(port);
        }

        debug!(
            repo = %repo_path.display(),
            port = ?analysis.port,
            build_cmd = ?analysis.build_cmd,
            start_cmd = ?analysis.start_cmd,
            python_version = ?analysis.python_version,
            "Repository analysis complete"
        );

        analysis
    }

    /// pyproject.toml, then runtime.txt, then the default
    pub fn detect_python_version(&self, repo_path: &Path) -> String {
        self.read_optional(repo_path, "pyproject.toml")
            .as_deref()
            .and_then(python_version_from_pyproject)
            .or_else(|| {
                self.read_optional(repo_path, "runtime.txt")
                    .as_deref()
                    .and_then(python_version_from_runtime_txt)
            })
            .unwrap_or_else(|| DEFAULT_PYTHON_VERSION.to_string())
    }

    fn read_package_manifest(&self, repo_path: &Path) -> Option<PackageManifest> {
        let content = self.read_optional(repo_path, "package.json")?;

        match serde_json::from_str(&content) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                debug!(error = %e, "Skipping malformed package.json");
                None
            }
        }
    }

    /// Contents of `file` if it exists and can be read
    fn read_optional(&self, repo_path: &Path, file: &str) -> Option<String> {
        let path = repo_path.join(file);

        match self.fs.try_exists(&path) {
            Ok(true) => {}
            Ok(false) => return None,
            Err(e) => {
                debug!(file, error = %e, "Skipping file that could not be checked");
                return None;
            }
        }

        match self.fs.read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) => {
                debug!(file, error = %e, "Skipping unreadable file");
                None
            }
        }
    }
}
