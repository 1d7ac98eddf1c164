//! Running the compiler over contract directories.

use crate::{cli::Config, names::root_and_relative_path};

use std::{
    fs, io,
    path::{Path, PathBuf},
    process,
};

use anyhow::{bail, Context, Result};
use quill_core::{CompileOptions, OptimizationLevel};
use rayon::prelude::*;
use regex::Regex;

/// Output lines mentioning these are dropped from the stabilised log.
const UNSTABLE_LOG_PREFIXES: [&str; 5] = [
    "debug: Skipping algopy stub ",
    "debug: Skipping typeshed stub ",
    "warning: Skipping stub: ",
    "debug: Skipping stdlib stub ",
    "debug: Building AWST for ",
];

const LOG_FILE_NAME: &str = "quill.log";

/// How a contract is compiled at one optimization level.
#[derive(Debug, Clone)]
pub struct LevelPlan {
    pub level: OptimizationLevel,
    pub options: CompileOptions,
    /// Appended to `out` to name the output directory.
    pub out_suffix: &'static str,
    /// Whether the compiler output is kept as a log next to the contract.
    pub write_logs: bool,
}

impl LevelPlan {
    pub fn new(level: OptimizationLevel) -> Self {
        let options = CompileOptions::default().optimization_level(level);
        match level {
            OptimizationLevel::O0 => LevelPlan {
                level,
                options: options.output_destructured_ir(true).output_arc32(false),
                out_suffix: "_unoptimized",
                write_logs: false,
            },
            OptimizationLevel::O1 => LevelPlan {
                level,
                options: options
                    .output_awst(true)
                    .output_ssa_ir(true)
                    .output_optimization_ir(true)
                    .output_destructured_ir(true)
                    .output_memory_ir(true),
                out_suffix: "",
                write_logs: true,
            },
            OptimizationLevel::O2 => LevelPlan {
                level,
                options: options
                    .output_destructured_ir(true)
                    .output_arc32(false)
                    .debug_level(0),
                out_suffix: "_O2",
                write_logs: false,
            },
        }
    }

    pub fn all() -> [LevelPlan; 3] {
        [
            OptimizationLevel::O0,
            OptimizationLevel::O1,
            OptimizationLevel::O2,
        ]
        .map(LevelPlan::new)
    }
}

/// The outcome of compiling one contract at one level.
#[derive(Debug)]
pub struct CompilationResult {
    pub rel_path: String,
    pub level: OptimizationLevel,
    pub ok: bool,
    /// Programs the compiler reported writing.
    pub programs: Vec<PathBuf>,
}

impl CompilationResult {
    pub fn case_name(&self) -> String {
        format!("{} {}", self.rel_path, self.level.flag())
    }
}

/// Matches the compiler's log line for every program it writes.
pub fn written_program_regex(approval_only: bool) -> Result<Regex, regex::Error> {
    let pattern = if approval_only {
        r"info: Writing (.+\.approval\.teal)"
    } else {
        r"info: Writing (.+\.teal)"
    };
    Regex::new(pattern)
}

pub fn written_programs(regex: &Regex, output: &str) -> Vec<PathBuf> {
    regex
        .captures_iter(output)
        .filter_map(|captures| captures.get(1))
        .map(|path| PathBuf::from(path.as_str()))
        .collect()
}

/// Drops the lines that vary between runs and replaces the repository path with a placeholder.
pub fn stabilise_logs(output: &str, repo_root: &Path) -> Vec<String> {
    let repo_root = repo_root.to_string_lossy().replace('\\', "/");
    output
        .lines()
        .filter(|line| {
            !UNSTABLE_LOG_PREFIXES
                .iter()
                .any(|prefix| line.starts_with(prefix))
        })
        .map(|line| line.replace('\\', "/").replace(&repo_root, "<git root>"))
        .collect()
}

/// Removes the previous output of a compilation, keeping its logs.
pub fn clear_out_dir(out_dir: &Path) -> io::Result<()> {
    if !out_dir.exists() {
        return Ok(());
    }
    for entry in fs::read_dir(out_dir)? {
        let path = entry?.path();
        if path.is_dir() {
            fs::remove_dir_all(&path)?;
        } else if path.extension().and_then(|ext| ext.to_str()) != Some("log") {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

/// Contract directories to compile: `limit_to` if given, otherwise every visible directory
/// below the contract roots.
pub fn contract_dirs(config: &Config) -> Result<Vec<PathBuf>> {
    if !config.limit_to.is_empty() {
        return Ok(config.limit_to.clone());
    }
    let mut dirs = Vec::new();
    for root in &config.roots {
        let entries =
            fs::read_dir(root).with_context(|| format!("failed to read {}", root.display()))?;
        for entry in entries {
            let path = entry?.path();
            let hidden = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with('.'));
            if path.is_dir() && !hidden {
                dirs.push(path);
            }
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Compiles `case` as described by `plan`.
///
/// A compiler that runs and fails is a failed result, not an error. Errors are reserved for
/// problems with the batch run itself.
pub fn checked_compile(
    config: &Config,
    case: &Path,
    plan: &LevelPlan,
) -> Result<CompilationResult> {
    if !case.is_dir() {
        bail!("{} is not a directory", case.display());
    }
    let (root, rel_path) = root_and_relative_path(&config.roots, case)?;
    let out_dir = case.join(format!("out{}", plan.out_suffix));
    clear_out_dir(&out_dir)
        .with_context(|| format!("failed to clear {}", out_dir.display()))?;

    let [program, compiler_args @ ..] = config.compiler.as_slice() else {
        bail!("the compiler command is empty");
    };
    tracing::debug!("{} {}", case.display(), plan.level.flag());
    let output = process::Command::new(program)
        .args(compiler_args)
        .args(plan.options.to_flags())
        .arg(format!("--out-dir={}", out_dir.display()))
        .arg("--log-level=debug")
        .arg(&rel_path)
        .current_dir(root)
        .env("NO_COLOR", "1")
        .output()
        .with_context(|| format!("failed to run {program}"))?;
    let mut log = String::from_utf8_lossy(&output.stdout).into_owned();
    log.push_str(&String::from_utf8_lossy(&output.stderr));

    let regex = written_program_regex(config.approval_only)?;
    let programs = written_programs(&regex, &log)
        .into_iter()
        .map(|program| root.join(program))
        .collect();

    if plan.write_logs {
        let log_path = case.join(LOG_FILE_NAME);
        let stable = stabilise_logs(&log, &config.repo_root).join("\n");
        fs::write(&log_path, stable)
            .with_context(|| format!("failed to write {}", log_path.display()))?;
    }

    Ok(CompilationResult {
        rel_path: rel_path.display().to_string(),
        level: plan.level,
        ok: output.status.success(),
        programs,
    })
}

/// Compiles every case at every level, `config.jobs` at a time. Results keep the order of
/// `cases`, levels ascending.
pub fn compile_all(config: &Config, cases: &[PathBuf]) -> Result<Vec<CompilationResult>> {
    let mut pool = rayon::ThreadPoolBuilder::new();
    if let Some(jobs) = config.jobs {
        pool = pool.num_threads(jobs);
    }
    let pool = pool.build()?;
    let plans = LevelPlan::all();
    let work = cases
        .iter()
        .flat_map(|case| plans.iter().map(move |plan| (case, plan)))
        .collect::<Vec<_>>();
    pool.install(|| {
        work.par_iter()
            .map(|(case, plan)| checked_compile(config, case, plan))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn level_flags() {
        let flags = LevelPlan::all().map(|plan| plan.options.to_flags().join(" "));
        assert_eq!(
            flags,
            [
                "-O0 --output-destructured-ir --no-output-arc32",
                "-O1 --output-awst --output-ssa-ir --output-optimization-ir \
                 --output-destructured-ir --output-memory-ir",
                "-O2 --output-destructured-ir --no-output-arc32 -g0",
            ]
        );
    }

    #[test]
    fn written_programs_are_found_in_the_log() {
        let log = "\
debug: Building AWST for voting/contract.py
info: Writing voting/out/Voting.approval.teal
info: Writing voting/out/Voting.clear.teal
info: Writing voting/out/Voting.arc32.json";
        let all = written_programs(&written_program_regex(false).unwrap(), log);
        assert_eq!(
            all,
            vec![
                PathBuf::from("voting/out/Voting.approval.teal"),
                PathBuf::from("voting/out/Voting.clear.teal"),
            ]
        );
        let approval = written_programs(&written_program_regex(true).unwrap(), log);
        assert_eq!(approval, vec![PathBuf::from("voting/out/Voting.approval.teal")]);
    }

    #[test]
    fn logs_are_stabilised() {
        let log = "\
debug: Skipping stdlib stub /usr/lib/typing.pyi
info: Writing /home/dev/quill/examples/voting/out/Voting.approval.teal
debug: Building AWST for voting
warning: voting\\contract.py:3 unused value";
        assert_eq!(
            stabilise_logs(log, Path::new("/home/dev/quill")),
            vec![
                "info: Writing <git root>/examples/voting/out/Voting.approval.teal",
                "warning: voting/contract.py:3 unused value",
            ]
        );
    }

    #[test]
    fn clearing_output_keeps_logs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Voting.approval.teal"), "#pragma version 10").unwrap();
        fs::write(dir.path().join("quill.log"), "info: done").unwrap();
        fs::create_dir(dir.path().join("ir")).unwrap();
        fs::write(dir.path().join("ir").join("main.ir"), "").unwrap();
        clear_out_dir(dir.path()).unwrap();
        let remaining = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect::<Vec<_>>();
        assert_eq!(remaining, vec![std::ffi::OsString::from("quill.log")]);
        assert!(clear_out_dir(&dir.path().join("missing")).is_ok());
    }

    #[test]
    fn hidden_directories_are_skipped() {
        let root = tempfile::tempdir().unwrap();
        for dir in ["voting", ".venv", "amm"] {
            fs::create_dir(root.path().join(dir)).unwrap();
        }
        fs::write(root.path().join("sizes.txt"), "").unwrap();
        let config = Config {
            compiler: vec!["quill".into()],
            repo_root: root.path().to_path_buf(),
            roots: vec![root.path().to_path_buf()],
            sizes_path: root.path().join("sizes.txt"),
            update_sizes: false,
            approval_only: false,
            jobs: Some(1),
            limit_to: vec![],
        };
        let dirs = contract_dirs(&config).unwrap();
        assert_eq!(
            dirs,
            vec![root.path().join("amm"), root.path().join("voting")]
        );
    }
}
