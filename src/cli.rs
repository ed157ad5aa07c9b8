//! Command-line interface for the harness binary.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use miette::IntoDiagnostic;

use crate::discovery::discover_cases;
use crate::harness::{run_all, HarnessConfig};
use crate::pipeline::{Category, Toolchain};

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "gauntlet",
    version,
    about = "End-to-end test harness for source-to-C compiler toolchains."
)]
pub struct HarnessArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Discover and run every test case under the tests root.
    Run {
        /// Directory holding the success/ and compiler_failure/ categories.
        #[arg(long, default_value = "tests/e2e")]
        tests_root: PathBuf,
        /// Path to the compiler under test.
        #[arg(long, default_value = "build/compiler")]
        compiler: PathBuf,
        /// Native C compiler used on the generated code.
        #[arg(long, default_value = "cc")]
        cc: PathBuf,
        /// Extension of fixture source files (main.<ext>).
        #[arg(long, default_value = "src")]
        source_ext: String,
        /// Only run cases whose name contains this substring.
        #[arg(long)]
        filter: Option<String>,
        /// Print a per-case JSON report after the human-readable one.
        #[arg(long)]
        json: bool,
        /// Disable colored output.
        #[arg(long)]
        no_color: bool,
    },
    /// List discovered test cases per category without running anything.
    List {
        /// Directory holding the success/ and compiler_failure/ categories.
        #[arg(long, default_value = "tests/e2e")]
        tests_root: PathBuf,
    },
}

/// The main entry point for the CLI.
pub fn run() -> miette::Result<()> {
    let args = HarnessArgs::parse();

    match args.command {
        Command::Run {
            tests_root,
            compiler,
            cc,
            source_ext,
            filter,
            json,
            no_color,
        } => {
            let config = HarnessConfig {
                tests_root,
                toolchain: Toolchain::new(compiler, cc),
                source_ext,
                filter,
                use_colors: !no_color && atty::is(atty::Stream::Stdout),
            };
            let report = run_all(&config)?;
            if json {
                println!("{}", serde_json::to_string(&report).into_diagnostic()?);
            }
            if report.summary.failed > 0 {
                process::exit(1);
            }
        }

        Command::List { tests_root } => {
            for category in Category::ALL {
                println!("{category}:");
                for name in discover_cases(&tests_root.join(category.dir_name()))? {
                    println!("  {name}");
                }
            }
        }
    }

    Ok(())
}
