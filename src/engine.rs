//! Engine - load, assign, save.
//!
//! Wraps the matching engine with record I/O for whole-file runs.

use std::io::{Read, Write};
use std::path::Path;

use tracing::info;

use crate::config::RunConfig;
use crate::error::Result;
use crate::matching::{MatchStats, MatchingEngine};
use crate::records;
use crate::registry::Registry;

/// A loaded matching problem and, once [`Engine::assign`] has run, its
/// solution.
pub struct Engine {
    /// The underlying matcher
    pub matcher: MatchingEngine,
}

impl Engine {
    pub fn new(registry: Registry) -> Self {
        Self {
            matcher: MatchingEngine::new(registry),
        }
    }

    /// Load records from a file.
    pub fn from_path(path: &Path) -> Result<Self> {
        Ok(Self::new(records::load(path)?))
    }

    /// Load records from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(Self::new(records::read_records(reader)?))
    }

    /// Assign every juggler to a circuit.
    pub fn assign(&mut self) -> Result<MatchStats> {
        Ok(self.matcher.run()?)
    }

    /// Write rosters in the record output format.
    pub fn write_rosters<W: Write>(&self, out: W) -> Result<()> {
        records::write_rosters(&self.matcher, out).map_err(crate::error::RecordError::from)?;
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        Ok(records::save(&self.matcher, path)?)
    }

    pub fn save_csv(&self, path: &Path) -> Result<()> {
        Ok(records::save_csv(&self.matcher, path)?)
    }

    /// Names of the jugglers on `circuit`, best-first. Empty if the
    /// circuit is unknown.
    pub fn team_members(&self, circuit: &str) -> Vec<&str> {
        let registry = self.matcher.registry();
        let Some(id) = registry.circuit_id(circuit) else {
            return Vec::new();
        };
        self.matcher
            .team(id)
            .members()
            .iter()
            .map(|seat| registry.juggler(seat.juggler).name.as_str())
            .collect()
    }

    /// Load, assign and save according to `config`.
    pub fn run(config: &RunConfig) -> Result<Self> {
        let mut engine = Self::from_path(&config.input)?;
        let stats = engine.assign()?;
        info!(
            operations = stats.operations(),
            rejections = stats.rejections,
            "matching finished"
        );

        engine.save(&config.output_path())?;
        if let Some(csv) = &config.csv {
            engine.save_csv(csv)?;
        }
        Ok(engine)
    }
}

/// Sum of the numbers in juggler names such as `J12`: everything after
/// the first character, up to the first non-digit. Names without a
/// number count as zero.
pub fn name_number_sum<'a>(names: impl IntoIterator<Item = &'a str>) -> u64 {
    names
        .into_iter()
        .map(|name| {
            let digits: String = name
                .chars()
                .skip(1)
                .take_while(char::is_ascii_digit)
                .collect();
            digits.parse::<u64>().unwrap_or(0)
        })
        .sum()
}
