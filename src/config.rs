//! Configuration for patchdemo.
//!
//! A project may carry a `.patchdemo.toml` at its root. Every field is
//! optional; a missing file means the built-in task-board registry.
//!
//! ```toml
//! patch_dir = "scripts/patches"
//! full_test_command = "npm test"
//! ignore_paths = [".planning/", ".claude/"]
//!
//! [[patches]]
//! id = "bug-01"
//! name = "Priority Filter Null Reference"
//! file = "demo-01-priority-filter-bug.patch"
//! test_command = "npm test -- tests/integration/api/tasks-filtering.test.js"
//! layer = "integration"
//! ```

use crate::error::{DemoError, Result};
use crate::registry::{
    builtin_patches, PatchDescriptor, PatchKind, PatchRegistry, TestLayer, DEFAULT_FEATURE_ID,
    DEFAULT_FULL_TEST_COMMAND, DEFAULT_PATCH_DIR,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name looked up in the project root.
pub const CONFIG_FILE_NAME: &str = ".patchdemo.toml";

/// Path prefixes whose changes never block patching.
pub fn default_ignore_paths() -> Vec<String> {
    vec![".planning/".to_string(), ".claude/".to_string()]
}

fn default_patch_dir() -> PathBuf {
    PathBuf::from(DEFAULT_PATCH_DIR)
}

fn default_full_test_command() -> String {
    DEFAULT_FULL_TEST_COMMAND.to_string()
}

fn default_feature() -> String {
    DEFAULT_FEATURE_ID.to_string()
}

/// One `[[patches]]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatchEntry {
    pub id: String,
    pub name: String,
    /// File name, relative to `patch_dir`.
    pub file: PathBuf,
    #[serde(default)]
    pub description: String,
    pub test_command: String,
    pub layer: TestLayer,
    #[serde(default)]
    pub kind: PatchKind,
    #[serde(default)]
    pub takeaway: Option<String>,
}

impl PatchEntry {
    fn into_descriptor(self, patch_dir: &Path) -> PatchDescriptor {
        PatchDescriptor {
            id: self.id,
            display_name: self.name,
            file_path: patch_dir.join(self.file),
            description: self.description,
            test_command: self.test_command,
            test_layer: self.layer,
            kind: self.kind,
            takeaway: self.takeaway,
        }
    }
}

/// Settings loaded from `.patchdemo.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DemoConfig {
    /// Directory holding patch files, relative to the project root.
    #[serde(default = "default_patch_dir")]
    pub patch_dir: PathBuf,

    /// Command that runs the whole test suite after a restore.
    #[serde(default = "default_full_test_command")]
    pub full_test_command: String,

    /// Path prefixes ignored by the clean-tree check.
    #[serde(default = "default_ignore_paths")]
    pub ignore_paths: Vec<String>,

    /// Feature patch used by `setup-no-filter`.
    #[serde(default = "default_feature")]
    pub default_feature: String,

    /// Registry override; empty means the built-in patches.
    #[serde(default)]
    pub patches: Vec<PatchEntry>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            patch_dir: default_patch_dir(),
            full_test_command: default_full_test_command(),
            ignore_paths: default_ignore_paths(),
            default_feature: default_feature(),
            patches: Vec::new(),
        }
    }
}

impl DemoConfig {
    /// Load configuration from a project directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let path = Self::config_path(project_dir);
        if path.exists() {
            Self::load_file(&path)
        } else {
            debug!("no {} found, using defaults", CONFIG_FILE_NAME);
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DemoError::config_with_path(format!("cannot read {}: {}", path.display(), e), path.to_path_buf())
        })?;
        let config = Self::parse(&content).map_err(|e| match e {
            DemoError::Toml(inner) => DemoError::config_with_path(
                format!("cannot parse {}: {}", path.display(), inner),
                path.to_path_buf(),
            ),
            other => other,
        })?;
        debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed TOML or invalid values.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Path of the configuration file for a project.
    pub fn config_path(project_dir: &Path) -> PathBuf {
        project_dir.join(CONFIG_FILE_NAME)
    }

    fn validate(&self) -> Result<()> {
        if self.full_test_command.trim().is_empty() {
            return Err(DemoError::invalid_config(
                "full_test_command",
                "must not be empty",
            ));
        }
        if self.ignore_paths.iter().any(|p| p.is_empty()) {
            return Err(DemoError::invalid_config(
                "ignore_paths",
                "empty prefix would ignore every change",
            ));
        }
        Ok(())
    }

    /// Build the patch registry these settings describe.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured patches fail registry validation.
    pub fn registry(&self) -> Result<PatchRegistry> {
        if self.patches.is_empty() {
            return PatchRegistry::new(builtin_patches(&self.patch_dir));
        }

        let patches = self
            .patches
            .iter()
            .cloned()
            .map(|entry| entry.into_descriptor(&self.patch_dir))
            .collect();
        PatchRegistry::new(patches)
    }

    /// Runtime settings consumed by the orchestrator.
    pub fn settings(&self) -> DemoSettings {
        DemoSettings {
            full_test_command: self.full_test_command.clone(),
            ignore_paths: self.ignore_paths.clone(),
            default_feature: self.default_feature.clone(),
        }
    }
}

/// The subset of configuration the orchestrator needs at run time.
#[derive(Debug, Clone)]
pub struct DemoSettings {
    pub full_test_command: String,
    pub ignore_paths: Vec<String>,
    pub default_feature: String,
}

impl Default for DemoSettings {
    fn default() -> Self {
        DemoConfig::default().settings()
    }
}

impl DemoSettings {
    #[must_use]
    pub fn with_full_test_command(mut self, command: impl Into<String>) -> Self {
        self.full_test_command = command.into();
        self
    }

    #[must_use]
    pub fn with_ignore_paths(mut self, paths: Vec<String>) -> Self {
        self.ignore_paths = paths;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = DemoConfig::default();
        assert_eq!(config.patch_dir, PathBuf::from("scripts/patches"));
        assert_eq!(config.full_test_command, "npm test");
        assert_eq!(config.ignore_paths, vec![".planning/", ".claude/"]);
        assert_eq!(config.registry().unwrap().len(), 5);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = DemoConfig::load(temp.path()).unwrap();
        assert!(config.patches.is_empty());
        assert_eq!(config.default_feature, "feature-search");
    }

    #[test]
    fn test_parse_custom_registry() {
        let config = DemoConfig::parse(
            r#"
patch_dir = "patches"
full_test_command = "cargo test"

[[patches]]
id = "bug-01"
name = "Off by one"
file = "off-by-one.patch"
test_command = "cargo test ranges"
layer = "unit"
takeaway = "Unit test caught the boundary"

[[patches]]
id = "feature-x"
name = "Feature X removed"
file = "no-x.patch"
test_command = "cargo test"
layer = "e2e"
kind = "feature"
"#,
        )
        .unwrap();

        let registry = config.registry().unwrap();
        assert_eq!(registry.ids(), vec!["bug-01", "feature-x"]);
        let bug = registry.require("bug-01").unwrap();
        assert_eq!(bug.file_path, PathBuf::from("patches/off-by-one.patch"));
        assert_eq!(bug.test_layer, TestLayer::Unit);
        assert!(bug.is_bug());
        assert!(!registry.require("feature-x").unwrap().is_bug());
        assert_eq!(registry.bugs().count(), 1);
    }

    #[test]
    fn test_patch_dir_applies_to_builtin_registry() {
        let config = DemoConfig::parse(r#"patch_dir = "demo/patches""#).unwrap();
        let registry = config.registry().unwrap();
        assert!(registry
            .all()
            .iter()
            .all(|p| p.file_path.starts_with("demo/patches")));
    }

    #[test]
    fn test_rejects_unknown_field() {
        let err = DemoConfig::parse("patch_directory = \"x\"").unwrap_err();
        assert!(matches!(err, DemoError::Toml(_)));
    }

    #[test]
    fn test_rejects_empty_ignore_prefix() {
        let err = DemoConfig::parse(r#"ignore_paths = [""]"#).unwrap_err();
        assert!(matches!(err, DemoError::InvalidConfig { .. }));
    }

    #[test]
    fn test_rejects_blank_full_test_command() {
        assert!(DemoConfig::parse(r#"full_test_command = " ""#).is_err());
    }

    #[test]
    fn test_duplicate_ids_fail_at_registry() {
        let config = DemoConfig::parse(
            r#"
[[patches]]
id = "bug-01"
name = "a"
file = "a.patch"
test_command = "true"
layer = "unit"

[[patches]]
id = "bug-01"
name = "b"
file = "b.patch"
test_command = "true"
layer = "unit"
"#,
        )
        .unwrap();
        assert!(config.registry().is_err());
    }

    #[test]
    fn test_load_file_reports_path_on_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "patch_dir = [").unwrap();

        let err = DemoConfig::load(temp.path()).unwrap_err();
        match err {
            DemoError::Config { path: Some(p), .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_settings_builders() {
        let settings = DemoSettings::default()
            .with_full_test_command("make test")
            .with_ignore_paths(vec!["tmp/".into()]);
        assert_eq!(settings.full_test_command, "make test");
        assert_eq!(settings.ignore_paths, vec!["tmp/"]);
    }
}
