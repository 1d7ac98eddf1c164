use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use quill_tracing::TracingSubscriberOptions;

/// Compile every example contract at each optimization level.
#[derive(Debug, Parser)]
#[clap(name = "quill-batch", version)]
pub struct Command {
    /// Rewrite the size report after compiling. This is the default.
    #[clap(long = "update-sizes", overrides_with = "no_update_sizes")]
    pub update_sizes: bool,

    /// Leave the size report untouched.
    #[clap(long = "no-update-sizes", overrides_with = "update_sizes")]
    pub no_update_sizes: bool,

    /// The compiler command. Arguments separated by whitespace are passed before the flags.
    #[clap(long, default_value = "quill")]
    pub compiler: String,

    /// Directory the compiler runs in. Paths in the stabilised logs are made relative to it.
    #[clap(long, default_value = ".")]
    pub repo_root: PathBuf,

    /// Directories whose subdirectories are contracts. Relative to the repository root.
    #[clap(long = "root", default_values = ["examples", "test_cases"])]
    pub roots: Vec<PathBuf>,

    /// The size report. Relative to the repository root.
    #[clap(long, default_value = "examples/sizes.txt")]
    pub sizes_path: PathBuf,

    /// Only count `.approval.teal` programs toward the size report.
    #[clap(long)]
    pub approval_only: bool,

    /// Number of compilations to run at once. Defaults to the number of CPUs.
    #[clap(long, short = 'j')]
    pub jobs: Option<usize>,

    /// Use verbose output.
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Silence all output except for errors.
    #[clap(short, long)]
    pub silent: bool,

    /// Only compile these contract directories.
    #[clap(value_name = "LIMIT_TO")]
    pub limit_to: Vec<PathBuf>,
}

/// The resolved settings of a batch run.
#[derive(Debug, Clone)]
pub struct Config {
    pub compiler: Vec<String>,
    pub repo_root: PathBuf,
    pub roots: Vec<PathBuf>,
    pub sizes_path: PathBuf,
    pub update_sizes: bool,
    pub approval_only: bool,
    pub jobs: Option<usize>,
    pub limit_to: Vec<PathBuf>,
}

impl Command {
    pub fn tracing_options(&self) -> TracingSubscriberOptions {
        TracingSubscriberOptions {
            verbosity: Some(self.verbose),
            silent: Some(self.silent),
            ..Default::default()
        }
    }

    pub fn into_config(self) -> Result<Config> {
        let compiler = self
            .compiler
            .split_whitespace()
            .map(str::to_string)
            .collect::<Vec<_>>();
        if compiler.is_empty() {
            bail!("the compiler command is empty");
        }
        let repo_root = self
            .repo_root
            .canonicalize()
            .with_context(|| format!("failed to resolve {}", self.repo_root.display()))?;
        let roots = self
            .roots
            .iter()
            .map(|root| repo_root.join(root))
            .collect();
        let limit_to = self
            .limit_to
            .iter()
            .map(|path| {
                path.canonicalize()
                    .with_context(|| format!("failed to resolve {}", path.display()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Config {
            compiler,
            sizes_path: repo_root.join(&self.sizes_path),
            repo_root,
            roots,
            update_sizes: !self.no_update_sizes,
            approval_only: self.approval_only,
            jobs: self.jobs,
            limit_to,
        })
    }
}
