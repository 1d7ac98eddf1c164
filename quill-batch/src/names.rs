//! Stable names for compiled programs, independent of where the output was written.

use crate::compile::LevelPlan;

use std::path::{Component, Path, PathBuf};

use anyhow::{anyhow, Result};

/// Splits `path` into the contract root containing it and the path below that root.
pub fn root_and_relative_path<'a>(
    roots: &'a [PathBuf],
    path: &Path,
) -> Result<(&'a Path, PathBuf)> {
    roots
        .iter()
        .find_map(|root| {
            path.strip_prefix(root)
                .ok()
                .map(|relative| (root.as_path(), relative.to_path_buf()))
        })
        .ok_or_else(|| anyhow!("{} is not below any contract root", path.display()))
}

/// The name a program is reported under in the size report.
///
/// Extensions, output directories and `Contract` fragments are dropped, so that the same
/// program compiled at different levels shares a name.
pub fn unique_name(roots: &[PathBuf], path: &Path) -> Result<String> {
    let (_, mut relative) = root_and_relative_path(roots, path)?;
    while relative.extension().is_some() {
        relative.set_extension("");
    }
    let out_dirs = LevelPlan::all().map(|plan| format!("out{}", plan.out_suffix));
    let parts = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .filter_map(|part| {
            if part.contains("MyContract") {
                Some(part.replace("MyContract", ""))
            } else if part.contains("Contract") {
                Some(part.replace("Contract", ""))
            } else if out_dirs.iter().any(|out_dir| part.ends_with(out_dir.as_str())) {
                None
            } else {
                Some(part.to_string())
            }
        })
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>();
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roots() -> Vec<PathBuf> {
        vec![PathBuf::from("/repo/examples"), PathBuf::from("/repo/test_cases")]
    }

    fn name(path: &str) -> String {
        unique_name(&roots(), Path::new(path)).unwrap()
    }

    #[test]
    fn output_directories_and_suffixes_are_dropped() {
        assert_eq!(name("/repo/examples/voting/out/Voting.approval.teal"), "voting/Voting");
        assert_eq!(
            name("/repo/examples/voting/out_unoptimized/Voting.approval.teal"),
            "voting/Voting"
        );
        assert_eq!(name("/repo/test_cases/voting/out_O2/Voting.clear.teal"), "voting/Voting");
    }

    #[test]
    fn contract_fragments_are_dropped() {
        assert_eq!(
            name("/repo/examples/hello/out/MyContract.approval.teal"),
            "hello"
        );
        assert_eq!(
            name("/repo/examples/hello/out/HelloContract.approval.teal"),
            "hello/Hello"
        );
    }

    #[test]
    fn paths_outside_the_roots_are_rejected() {
        assert!(unique_name(&roots(), Path::new("/elsewhere/a.teal")).is_err());
    }
}
