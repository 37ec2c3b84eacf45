//! Patch registry.
//!
//! The registry is the fixed, ordered list of demo patches. Order matters:
//! reversal walks it back to front so that later patches, which may touch
//! lines introduced by earlier ones, are removed first.

use crate::error::{DemoError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Default location of patch files, relative to the project root.
pub const DEFAULT_PATCH_DIR: &str = "scripts/patches";

/// Command that runs the whole test suite.
pub const DEFAULT_FULL_TEST_COMMAND: &str = "npm test";

/// Feature patch used by `setup-no-filter` when no id is given.
pub const DEFAULT_FEATURE_ID: &str = "feature-search";

// ============================================================================
// Descriptor types
// ============================================================================

/// The test layer expected to catch a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestLayer {
    Unit,
    Integration,
    E2e,
}

impl fmt::Display for TestLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unit => "Unit",
            Self::Integration => "Integration",
            Self::E2e => "E2E",
        };
        f.write_str(label)
    }
}

/// Whether a patch injects a bug or removes a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchKind {
    #[default]
    Bug,
    Feature,
}

/// One registered patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchDescriptor {
    /// Unique identifier, e.g. `bug-01`.
    pub id: String,
    /// Human-readable name.
    pub display_name: String,
    /// Path of the patch file, relative to the project root.
    pub file_path: PathBuf,
    pub description: String,
    /// Shell command that exercises the code the patch touches.
    pub test_command: String,
    pub test_layer: TestLayer,
    #[serde(default)]
    pub kind: PatchKind,
    /// Lesson printed by the guided demo once the bug is caught.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub takeaway: Option<String>,
}

impl PatchDescriptor {
    /// Create a bug patch descriptor.
    pub fn bug(
        id: impl Into<String>,
        display_name: impl Into<String>,
        file_path: impl Into<PathBuf>,
        test_command: impl Into<String>,
        test_layer: TestLayer,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            file_path: file_path.into(),
            description: String::new(),
            test_command: test_command.into(),
            test_layer,
            kind: PatchKind::Bug,
            takeaway: None,
        }
    }

    /// Turn this descriptor into a feature-removal patch.
    #[must_use]
    pub fn as_feature(mut self) -> Self {
        self.kind = PatchKind::Feature;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_takeaway(mut self, takeaway: impl Into<String>) -> Self {
        self.takeaway = Some(takeaway.into());
        self
    }

    /// Absolute location of the patch file under `project_dir`.
    pub fn resolve(&self, project_dir: &Path) -> PathBuf {
        if self.file_path.is_absolute() {
            self.file_path.clone()
        } else {
            project_dir.join(&self.file_path)
        }
    }

    pub fn is_bug(&self) -> bool {
        self.kind == PatchKind::Bug
    }
}

// ============================================================================
// Registry
// ============================================================================

static ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9-]*$").expect("patch id regex must compile"));

/// Ordered, validated, read-only collection of patches.
#[derive(Debug, Clone)]
pub struct PatchRegistry {
    patches: Vec<PatchDescriptor>,
}

impl PatchRegistry {
    /// Build a registry, validating ids and commands.
    ///
    /// # Errors
    ///
    /// Returns [`DemoError::InvalidConfig`] when the list is empty, an id is
    /// malformed or duplicated, or a test command is blank.
    pub fn new(patches: Vec<PatchDescriptor>) -> Result<Self> {
        if patches.is_empty() {
            return Err(DemoError::invalid_config(
                "patches",
                "registry must contain at least one patch",
            ));
        }

        let mut seen = HashSet::new();
        for patch in &patches {
            if !ID_PATTERN.is_match(&patch.id) {
                return Err(DemoError::invalid_config(
                    "patches.id",
                    format!("'{}' must be lowercase letters, digits and dashes", patch.id),
                ));
            }
            if !seen.insert(patch.id.as_str()) {
                return Err(DemoError::invalid_config(
                    "patches.id",
                    format!("duplicate id '{}'", patch.id),
                ));
            }
            if patch.test_command.trim().is_empty() {
                return Err(DemoError::invalid_config(
                    "patches.test_command",
                    format!("'{}' has an empty test command", patch.id),
                ));
            }
            if patch.file_path.as_os_str().is_empty() {
                return Err(DemoError::invalid_config(
                    "patches.file",
                    format!("'{}' has no patch file", patch.id),
                ));
            }
        }

        Ok(Self { patches })
    }

    /// The registry shipped with the task-board demo.
    pub fn builtin() -> Self {
        Self {
            patches: builtin_patches(Path::new(DEFAULT_PATCH_DIR)),
        }
    }

    /// All patches in registration order.
    pub fn all(&self) -> &[PatchDescriptor] {
        &self.patches
    }

    /// Bug patches in registration order.
    pub fn bugs(&self) -> impl DoubleEndedIterator<Item = &PatchDescriptor> {
        self.patches.iter().filter(|p| p.is_bug())
    }

    pub fn get(&self, id: &str) -> Option<&PatchDescriptor> {
        self.patches.iter().find(|p| p.id == id)
    }

    /// Look up a patch, producing a descriptive error for unknown ids.
    ///
    /// # Errors
    ///
    /// Returns [`DemoError::UnknownPatch`] listing the known ids.
    pub fn require(&self, id: &str) -> Result<&PatchDescriptor> {
        self.get(id).ok_or_else(|| DemoError::UnknownPatch {
            id: id.to_string(),
            known: self.ids().join(", "),
        })
    }

    pub fn ids(&self) -> Vec<&str> {
        self.patches.iter().map(|p| p.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }
}

/// The five patches of the task-board demo: four bugs, one feature removal.
pub fn builtin_patches(patch_dir: &Path) -> Vec<PatchDescriptor> {
    vec![
        PatchDescriptor::bug(
            "bug-01",
            "Priority Filter Null Reference",
            patch_dir.join("demo-01-priority-filter-bug.patch"),
            "npm test -- tests/integration/api/tasks-filtering.test.js",
            TestLayer::Integration,
        )
        .with_description("Calling .toLowerCase() on undefined in priority filter")
        .with_takeaway(
            "Integration test caught null reference that would cause 500 errors when filtering tasks without priority",
        ),
        PatchDescriptor::bug(
            "bug-02",
            "Array Access on Empty Store",
            patch_dir.join("demo-02-null-ref-bug.patch"),
            "npm test -- tests/unit/server/store.test.js",
            TestLayer::Unit,
        )
        .with_description("Accessing tasks[0].id when array is empty causes TypeError")
        .with_takeaway(
            "Unit test caught TypeError from array access before checking length - crashes on empty store",
        ),
        PatchDescriptor::bug(
            "bug-03",
            "Missing Status Validation",
            patch_dir.join("demo-03-validation-bug.patch"),
            "npm test -- tests/unit/server/validators.test.js",
            TestLayer::Unit,
        )
        .with_description("Removed status validation allows invalid values into database")
        .with_takeaway(
            "Unit test caught missing validation - invalid status values would corrupt data integrity",
        ),
        PatchDescriptor::bug(
            "bug-04",
            "Widget Layout Not Persisted",
            patch_dir.join("demo-04-dragdrop-bug.patch"),
            "npm run test:e2e:headless -- e2e/flows/widget-drag-drop.spec.js",
            TestLayer::E2e,
        )
        .with_description("layoutStore.save() is commented out - drag-drop changes lost on reload")
        .with_takeaway(
            "E2E test caught broken persistence - layout changes lost on page refresh",
        ),
        PatchDescriptor::bug(
            DEFAULT_FEATURE_ID,
            "Search Filter Removed",
            patch_dir.join("feature-remove-search-filter.patch"),
            DEFAULT_FULL_TEST_COMMAND,
            TestLayer::E2e,
        )
        .as_feature()
        .with_description("Removes search filter functionality for TDD demonstration"),
    ]
}
