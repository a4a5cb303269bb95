//! Run configuration.

use std::path::{Path, PathBuf};

/// Input file used when none is given.
pub const DEFAULT_INPUT: &str = "jugglefest.txt";

/// Circuit whose roster is reported after a run when none is given.
pub const DEFAULT_REPORT_CIRCUIT: &str = "C1970";

/// Resolved settings for one load, assign, save run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    pub input: PathBuf,
    /// Roster output; derived from `input` when `None`
    pub output: Option<PathBuf>,
    /// Optional flat CSV export
    pub csv: Option<PathBuf>,
    /// Circuit to summarise on stdout
    pub report: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: None,
            csv: None,
            report: Some(DEFAULT_REPORT_CIRCUIT.to_string()),
        }
    }
}

impl RunConfig {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    /// Where the rosters are written.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(&self.input))
    }
}

/// `<dir>/<name up to the first '.'>_solution.txt`, next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = file_name.split('.').next().unwrap_or_default();
    input.with_file_name(format!("{stem}_solution.txt"))
}
