use std::{path::PathBuf, sync::Arc};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    EnumString,
    Display,
)]
pub enum OptimizationLevel {
    #[serde(rename = "0")]
    #[clap(name = "0")]
    #[strum(serialize = "0")]
    O0,
    #[default]
    #[serde(rename = "1")]
    #[clap(name = "1")]
    #[strum(serialize = "1")]
    O1,
    #[serde(rename = "2")]
    #[clap(name = "2")]
    #[strum(serialize = "2")]
    O2,
}

impl OptimizationLevel {
    pub fn as_u8(self) -> u8 {
        match self {
            OptimizationLevel::O0 => 0,
            OptimizationLevel::O1 => 1,
            OptimizationLevel::O2 => 2,
        }
    }

    /// The command line flag selecting this level, e.g. `-O2`.
    pub fn flag(self) -> String {
        format!("-O{self}")
    }
}

/// Configuration for a single compilation run.
#[derive(Clone, Debug)]
pub struct CompileOptions {
    pub(crate) optimization_level: OptimizationLevel,
    pub(crate) debug_level: u8,
    pub(crate) out_dir: Option<Arc<PathBuf>>,
    pub(crate) output_awst: bool,
    pub(crate) output_ssa_ir: bool,
    pub(crate) output_optimization_ir: bool,
    pub(crate) output_destructured_ir: bool,
    pub(crate) output_memory_ir: bool,
    pub(crate) output_arc32: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            optimization_level: OptimizationLevel::default(),
            debug_level: 1,
            out_dir: None,
            output_awst: false,
            output_ssa_ir: false,
            output_optimization_ir: false,
            output_destructured_ir: false,
            output_memory_ir: false,
            output_arc32: true,
        }
    }
}

impl CompileOptions {
    pub fn optimization_level(self, a: OptimizationLevel) -> Self {
        Self {
            optimization_level: a,
            ..self
        }
    }

    pub fn debug_level(self, a: u8) -> Self {
        Self {
            debug_level: a,
            ..self
        }
    }

    /// Directory that artifacts are written to. Without one, nothing is written.
    pub fn out_dir(self, a: Option<PathBuf>) -> Self {
        Self {
            out_dir: a.map(Arc::new),
            ..self
        }
    }

    pub fn output_awst(self, a: bool) -> Self {
        Self {
            output_awst: a,
            ..self
        }
    }

    pub fn output_ssa_ir(self, a: bool) -> Self {
        Self {
            output_ssa_ir: a,
            ..self
        }
    }

    pub fn output_optimization_ir(self, a: bool) -> Self {
        Self {
            output_optimization_ir: a,
            ..self
        }
    }

    pub fn output_destructured_ir(self, a: bool) -> Self {
        Self {
            output_destructured_ir: a,
            ..self
        }
    }

    pub fn output_memory_ir(self, a: bool) -> Self {
        Self {
            output_memory_ir: a,
            ..self
        }
    }

    pub fn output_arc32(self, a: bool) -> Self {
        Self {
            output_arc32: a,
            ..self
        }
    }

    pub fn get_optimization_level(&self) -> OptimizationLevel {
        self.optimization_level
    }

    pub fn get_debug_level(&self) -> u8 {
        self.debug_level
    }

    pub fn get_out_dir(&self) -> Option<Arc<PathBuf>> {
        self.out_dir.clone()
    }

    pub fn get_output_awst(&self) -> bool {
        self.output_awst
    }

    /// The command line flags that reproduce these options.
    pub fn to_flags(&self) -> Vec<String> {
        let mut flags = vec![self.optimization_level.flag()];
        let toggles = [
            (self.output_awst, "--output-awst"),
            (self.output_ssa_ir, "--output-ssa-ir"),
            (self.output_optimization_ir, "--output-optimization-ir"),
            (self.output_destructured_ir, "--output-destructured-ir"),
            (self.output_memory_ir, "--output-memory-ir"),
        ];
        flags.extend(
            toggles
                .into_iter()
                .filter(|(enabled, _)| *enabled)
                .map(|(_, flag)| flag.to_string()),
        );
        if !self.output_arc32 {
            flags.push("--no-output-arc32".to_string());
        }
        if self.debug_level != 1 {
            flags.push(format!("-g{}", self.debug_level));
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn level_round_trips_through_strings() {
        for level in [
            OptimizationLevel::O0,
            OptimizationLevel::O1,
            OptimizationLevel::O2,
        ] {
            assert_eq!(OptimizationLevel::from_str(&level.to_string()), Ok(level));
        }
        assert_eq!(OptimizationLevel::O2.flag(), "-O2");
    }

    #[test]
    fn flags_for_fully_optimized_build() {
        let options = CompileOptions::default()
            .optimization_level(OptimizationLevel::O2)
            .output_destructured_ir(true)
            .output_arc32(false)
            .debug_level(0);
        assert_eq!(
            options.to_flags(),
            vec![
                "-O2",
                "--output-destructured-ir",
                "--no-output-arc32",
                "-g0"
            ]
        );
    }
}
