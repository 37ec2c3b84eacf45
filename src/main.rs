//! patchdemo - Break-Then-Fix Demo Orchestration
//!
//! Applies and reverses demo patches in a project and verifies the test
//! suite's reaction.

use clap::{Parser, Subcommand};
use colored::Colorize;
use patchdemo::{
    DemoConfig, DemoError, DemoSettings, GitRepo, Orchestrator, PatchRegistry, Reporter,
    ShellTestRunner,
};
use serde_json::json;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "patchdemo")]
#[command(version)]
#[command(about = "Break-then-fix demos driven by git patches", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Project directory (defaults to current directory)
    #[arg(short, long, global = true, default_value = ".")]
    project: PathBuf,

    /// Configuration file (defaults to <project>/.patchdemo.toml)
    #[arg(short, long, global = true, env = "PATCHDEMO_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print a JSON summary on stdout and send human output to stderr
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply every bug patch so the demo starts broken
    SetupBroken,

    /// Toggle a single bug on or off and check its test
    Bug {
        /// Patch id, e.g. bug-01
        id: String,
    },

    /// Reverse every applied demo patch and re-run the full suite
    Reset,

    /// Reverse the bug patches and re-run the full suite
    Fix,

    /// Guided demo: introduce each bug and watch its test catch it
    Break,

    /// Remove a feature for a TDD walkthrough
    SetupNoFilter {
        /// Feature patch id (defaults to the configured feature)
        #[arg(long)]
        id: Option<String>,
    },

    /// Show which patches are currently applied
    Status,
}

/// What a command produced, for the optional JSON summary.
enum CommandOutput {
    Summary(patchdemo::RunSummary),
    Status(patchdemo::StatusReport),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for operator output and JSON
    let filter = if cli.verbose {
        "patchdemo=debug"
    } else {
        "patchdemo=warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Resolve project path
    let project_path = cli.project.canonicalize().unwrap_or(cli.project.clone());

    if !project_path.is_dir() {
        eprintln!(
            "{} Project directory does not exist: {}",
            "Error:".red().bold(),
            project_path.display()
        );
        std::process::exit(1);
    }

    let code = run(&cli, &project_path)?;
    std::process::exit(code);
}

/// Load configuration and build the registry the command will use.
fn prepare(cli: &Cli, project_path: &Path) -> patchdemo::Result<(PatchRegistry, DemoSettings)> {
    GitRepo::ensure_available()?;

    let config = match &cli.config {
        Some(path) => DemoConfig::load_file(path)?,
        None => DemoConfig::load(project_path)?,
    };
    let registry = config.registry()?;
    Ok((registry, config.settings()))
}

fn print_setup_error(err: &DemoError) {
    eprintln!("{} {}", "Error:".red().bold(), err);
    if let Some(hint) = err.hint() {
        eprintln!("  {}", hint);
    }
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: &Cli, project_path: &Path) -> anyhow::Result<i32> {
    let (registry, settings) = match prepare(cli, project_path) {
        Ok(prepared) => prepared,
        Err(e) => {
            print_setup_error(&e);
            if cli.json {
                print_json(&json!({ "success": false, "error": e.to_string() }))?;
            }
            return Ok(e.exit_code());
        }
    };

    let repo = GitRepo::new(project_path);
    let (runner, reporter) = if cli.json {
        (
            ShellTestRunner::new(project_path).to_stderr(),
            Reporter::stderr(),
        )
    } else {
        (ShellTestRunner::new(project_path), Reporter::stdout())
    };
    let mut orchestrator = Orchestrator::new(&registry, &settings, &repo, &runner, reporter);

    let result = match &cli.command {
        Commands::SetupBroken => orchestrator.setup_broken().map(CommandOutput::Summary),
        Commands::Bug { id } => orchestrator.toggle(id).map(CommandOutput::Summary),
        Commands::Reset => orchestrator.reset().map(CommandOutput::Summary),
        Commands::Fix => orchestrator.fix().map(CommandOutput::Summary),
        Commands::Break => orchestrator.guided_demo().map(CommandOutput::Summary),
        Commands::SetupNoFilter { id } => orchestrator
            .remove_feature(id.as_deref())
            .map(CommandOutput::Summary),
        Commands::Status => Ok(CommandOutput::Status(orchestrator.status())),
    };

    match result {
        Ok(CommandOutput::Summary(summary)) => {
            if cli.json {
                print_json(&summary)?;
            }
            Ok(summary.exit_code())
        }
        Ok(CommandOutput::Status(report)) => {
            if cli.json {
                print_json(&report)?;
            }
            Ok(0)
        }
        Err(e) => {
            // Already reported by the orchestrator
            if cli.json {
                print_json(&json!({ "success": false, "error": e.to_string() }))?;
            }
            Ok(e.exit_code())
        }
    }
}
