//! The program size report.

use crate::names::unique_name;

use std::{
    collections::BTreeMap,
    fmt, fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use quill_core::OptimizationLevel;
use term_table::{row::Row, table_cell::TableCell};

const HEADER: [&str; 4] = ["Name", "O0 size", "O1 size", "O2 size"];
const LEVELS: [OptimizationLevel; 3] = [
    OptimizationLevel::O0,
    OptimizationLevel::O1,
    OptimizationLevel::O2,
];
const MISSING: &str = "-";
/// Program names are never wrapped, so every row stays on one line.
const MAX_NAME_WIDTH: usize = 256;

/// Program sizes in bytes, by program name and optimization level.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProgramSizes {
    sizes: BTreeMap<String, BTreeMap<OptimizationLevel, u64>>,
}

impl ProgramSizes {
    pub fn get(&self, name: &str, level: OptimizationLevel) -> Option<u64> {
        self.sizes.get(name)?.get(&level).copied()
    }

    pub fn insert(&mut self, name: String, level: OptimizationLevel, size: u64) {
        self.sizes.entry(name).or_default().insert(level, size);
    }

    /// Adds the programs written at `level`. Programs that share a name are summed.
    pub fn add<'a>(
        &mut self,
        roots: &[PathBuf],
        level: OptimizationLevel,
        programs: impl IntoIterator<Item = &'a PathBuf>,
        measure: impl Fn(&Path) -> Result<u64>,
    ) -> Result<()> {
        for program in programs {
            let name = unique_name(roots, program)?;
            let size = measure(program)?;
            *self
                .sizes
                .entry(name)
                .or_default()
                .entry(level)
                .or_default() += size;
        }
        Ok(())
    }

    /// Merges `other` into this report. Programs present in both take the sizes from `other`.
    pub fn update(mut self, other: ProgramSizes) -> ProgramSizes {
        self.sizes.extend(other.sizes);
        self
    }

    pub fn parse(text: &str) -> Result<ProgramSizes> {
        let mut program_sizes = ProgramSizes::default();
        let mut rows = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());
        match rows.next() {
            Some((_, header)) if header.split_whitespace().next() == Some(HEADER[0]) => {}
            Some((number, _)) => bail!("line {}: expected the report header", number + 1),
            None => return Ok(program_sizes),
        }
        for (number, line) in rows {
            let columns = line.split_whitespace().collect::<Vec<_>>();
            if columns.len() < 4 {
                bail!("line {}: expected four columns", number + 1);
            }
            let (name, sizes) = columns.split_at(columns.len() - LEVELS.len());
            let name = name.join(" ");
            let sizes = sizes
                .iter()
                .map(|column| match *column {
                    MISSING => Ok(None),
                    column => column.parse::<u64>().map(Some).with_context(|| {
                        format!("line {}: invalid size {column:?}", number + 1)
                    }),
                })
                .collect::<Result<Vec<_>>>()?;
            for (level, size) in LEVELS.into_iter().zip(sizes) {
                if let Some(size) = size {
                    program_sizes.insert(name.clone(), level, size);
                }
            }
        }
        Ok(program_sizes)
    }

    pub fn read_file(path: &Path) -> Result<ProgramSizes> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn write_file(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_string())
            .with_context(|| format!("failed to write {}", path.display()))
    }
}

impl fmt::Display for ProgramSizes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut table = term_table::Table::new();
        table.separate_rows = false;
        table.max_column_width = MAX_NAME_WIDTH;
        table.style = term_table::TableStyle::empty();
        table.add_row(Row::new(
            HEADER.iter().map(TableCell::new).collect::<Vec<_>>(),
        ));
        for (name, sizes) in &self.sizes {
            let mut cells = vec![TableCell::new(name)];
            cells.extend(LEVELS.iter().map(|level| match sizes.get(level) {
                Some(size) => TableCell::new(size),
                None => TableCell::new(MISSING),
            }));
            table.add_row(Row::new(cells));
        }
        // The empty style draws its borders with spaces.
        let rendered = table.render();
        let lines = rendered
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>();
        write!(f, "{}", lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn report() -> ProgramSizes {
        let mut sizes = ProgramSizes::default();
        sizes.insert("voting/Voting".into(), OptimizationLevel::O0, 1520);
        sizes.insert("voting/Voting".into(), OptimizationLevel::O1, 1204);
        sizes.insert("voting/Voting".into(), OptimizationLevel::O2, 1198);
        sizes.insert("amm".into(), OptimizationLevel::O0, 98);
        sizes.insert("amm".into(), OptimizationLevel::O1, 87);
        sizes.insert("amm".into(), OptimizationLevel::O2, 87);
        sizes
    }

    fn rendered_rows(sizes: &ProgramSizes) -> Vec<Vec<String>> {
        sizes
            .to_string()
            .lines()
            .map(|line| line.split_whitespace().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn rows_are_sorted_under_the_header() {
        assert_eq!(
            rendered_rows(&report()),
            vec![
                vec!["Name", "O0", "size", "O1", "size", "O2", "size"],
                vec!["amm", "98", "87", "87"],
                vec!["voting/Voting", "1520", "1204", "1198"],
            ]
        );
    }

    #[test]
    fn report_reads_back() {
        let text = report().to_string();
        assert_eq!(ProgramSizes::parse(&text).unwrap(), report());
    }

    #[test]
    fn names_may_contain_spaces() {
        let text = "Name O0 size O1 size O2 size\nsome name 1 2 3\n";
        let sizes = ProgramSizes::parse(text).unwrap();
        assert_eq!(sizes.get("some name", OptimizationLevel::O2), Some(3));
    }

    #[test]
    fn missing_levels_are_kept_missing() {
        let mut sizes = ProgramSizes::default();
        sizes.insert("only_o1".into(), OptimizationLevel::O1, 5);
        assert_eq!(rendered_rows(&sizes)[1], vec!["only_o1", "-", "5", "-"]);
        assert_eq!(ProgramSizes::parse(&sizes.to_string()).unwrap(), sizes);
    }

    #[test]
    fn malformed_rows_are_rejected() {
        assert!(ProgramSizes::parse("Name O0 size O1 size O2 size\namm 1 two 3").is_err());
        assert!(ProgramSizes::parse("Name O0 size O1 size O2 size\n1 2 3").is_err());
        assert!(ProgramSizes::parse("amm 1 2 3").is_err());
        assert_eq!(ProgramSizes::parse("\n  \n").unwrap(), ProgramSizes::default());
    }

    #[test]
    fn update_prefers_the_newer_report() {
        let mut newer = ProgramSizes::default();
        newer.insert("amm".into(), OptimizationLevel::O1, 80);
        let merged = report().update(newer);
        assert_eq!(merged.get("amm", OptimizationLevel::O1), Some(80));
        assert_eq!(merged.get("amm", OptimizationLevel::O0), None);
        assert_eq!(
            merged.get("voting/Voting", OptimizationLevel::O0),
            Some(1520)
        );
    }

    #[test]
    fn programs_sharing_a_name_are_summed() {
        let roots = vec![PathBuf::from("/repo/examples")];
        let programs = vec![
            PathBuf::from("/repo/examples/amm/out/ConstantProduct.approval.teal"),
            PathBuf::from("/repo/examples/amm/out/ConstantProduct.approval.teal"),
        ];
        let mut sizes = ProgramSizes::default();
        sizes
            .add(&roots, OptimizationLevel::O1, &programs, |_| Ok(10))
            .unwrap();
        assert_eq!(
            sizes.get("amm/ConstantProduct", OptimizationLevel::O1),
            Some(20)
        );
    }
}
