mod cli;
mod compile;
mod names;
mod sizes;

use cli::{Command, Config};
use compile::{compile_all, contract_dirs, CompilationResult};
use sizes::ProgramSizes;

use std::{fs, path::Path, process};

use anyhow::{Context, Result};
use clap::Parser;
use quill_tracing::{init_tracing_subscriber, println_green, println_red_err};

fn main() {
    let command = Command::parse();
    init_tracing_subscriber(command.tracing_options());
    match run(command) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(err) => {
            println_red_err(&format!("{err:?}"));
            process::exit(1);
        }
    }
}

/// Returns whether every compilation succeeded.
fn run(command: Command) -> Result<bool> {
    let config = command.into_config()?;
    let cases = contract_dirs(&config)?;
    let results = compile_all(&config, &cases)?;

    let mut failures = Vec::new();
    for result in &results {
        let case_name = result.case_name();
        if result.ok {
            println_green(&format!("✅  {case_name}"));
        } else {
            println_red_err(&format!("💥 {case_name}"));
            failures.push(case_name);
        }
    }
    if !failures.is_empty() {
        failures.sort();
        tracing::info!("Compilation failures:");
        for name in &failures {
            tracing::info!(" - {name}");
        }
    }

    if config.update_sizes {
        update_sizes(&config, &results)?;
    }
    Ok(failures.is_empty())
}

fn update_sizes(config: &Config, results: &[CompilationResult]) -> Result<()> {
    let file_name = config
        .sizes_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    tracing::info!("Updating {file_name}");
    let mut program_sizes = ProgramSizes::default();
    for result in results.iter().filter(|result| result.ok) {
        program_sizes.add(&config.roots, result.level, &result.programs, program_size)?;
    }
    if !config.limit_to.is_empty() {
        let existing = ProgramSizes::read_file(&config.sizes_path)?;
        program_sizes = existing.update(program_sizes);
    }
    program_sizes.write_file(&config.sizes_path)
}

/// The size of a program is the size of the bytecode the compiler wrote alongside it.
fn program_size(program: &Path) -> Result<u64> {
    let bytecode = program.with_extension("bin");
    let metadata = fs::metadata(&bytecode)
        .with_context(|| format!("no bytecode found for {}", program.display()))?;
    Ok(metadata.len())
}
