//! patchdemo - Break-Then-Fix Demo Orchestration
//!
//! Drives a project between a known-good and a deliberately broken state by
//! applying and reversing registered patches, then checks that the right
//! tests fail or pass in response.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`registry`] - Ordered, validated patch descriptors
//! - [`tree`] - Patch tool seam, working-tree inspection and patch application
//! - [`oracle`] - Test command execution and expectation checks
//! - [`orchestrator`] - Setup, toggle, reset, fix and guided-demo sequences
//! - [`config`] - `.patchdemo.toml` loading and validation
//! - [`report`] - Operator-facing output
//! - [`error`] - Custom error types and handling
//! - [`taskboard`] - Task store, validator and filters of the demo application
//! - [`testing`] - Testing infrastructure (mocks, fixtures, assertions)
//!
//! # Example
//!
//! ```rust,ignore
//! use patchdemo::{DemoConfig, GitRepo, Orchestrator, Reporter, ShellTestRunner};
//!
//! let config = DemoConfig::load(".".as_ref())?;
//! let registry = config.registry()?;
//! let settings = config.settings();
//! let repo = GitRepo::new(".");
//! let runner = ShellTestRunner::new(".");
//!
//! let mut orchestrator = Orchestrator::new(&registry, &settings, &repo, &runner, Reporter::stdout());
//! let summary = orchestrator.reset()?;
//! println!("clean: {}", summary.success);
//! ```

pub mod config;
pub mod error;
pub mod oracle;
pub mod orchestrator;
pub mod registry;
pub mod report;
pub mod taskboard;
pub mod testing;
pub mod tree;

// Re-export commonly used types
pub use error::{DemoError, Result};

// Re-export config types
pub use config::{DemoConfig, DemoSettings, PatchEntry, CONFIG_FILE_NAME};

// Re-export registry types
pub use registry::{PatchDescriptor, PatchKind, PatchRegistry, TestLayer};

// Re-export working tree types
pub use tree::{
    ApplyOutcome, GitRepo, PatchApplier, PatchOutcome, PatchState, PatchTool, ReverseOutcome,
    TreeInspector, TreeStatus, Workspace,
};

// Re-export oracle types
pub use oracle::{ShellTestRunner, TestOutcome, TestRunner, Verdict};

// Re-export orchestration types
pub use orchestrator::{
    Action, Operation, Orchestrator, Outcome, RunSummary, ScenarioResult, StatusReport,
};
pub use report::Reporter;

// Re-export task board types
pub use taskboard::{Task, TaskFilter, TaskStatus, TaskStore, ValidationResult};

// Re-export testing types for convenience
pub use testing::InMemoryTree;
