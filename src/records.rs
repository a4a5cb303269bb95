//! Record I/O - input parsing and roster output.
//!
//! Input is line oriented, fields separated by spaces:
//!
//! ```text
//! C C0 H:7 E:7 P:10
//! J J0 H:3 E:9 P:2 C2,C0,C1
//! ```
//!
//! Circuits must be declared before any juggler that lists them.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use tracing::info;

use crate::error::RecordError;
use crate::matching::MatchingEngine;
use crate::model::{Aspect, Circuit, Juggler};
use crate::registry::Registry;

/// Fields in a circuit record: tag, name, H, E, P
const CIRCUIT_FIELDS: usize = 5;
/// Fields in a juggler record: tag, name, H, E, P, preferences
const JUGGLER_FIELDS: usize = 6;
/// Largest accepted attribute magnitude. Three products of two such
/// values still sum to a finite score.
const MAX_ATTRIBUTE: f64 = 1e100;
/// Scores at or above this magnitude are written in exponent form.
const EXPONENT_THRESHOLD: f64 = 1e16;

// ============================================================================
// Reading
// ============================================================================

/// Open and parse an input file.
pub fn load(path: &Path) -> Result<Registry, RecordError> {
    let file = File::open(path).map_err(|source| RecordError::InputUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    let registry = read_records(file)?;
    info!(
        path = %path.display(),
        circuits = registry.circuit_count(),
        jugglers = registry.juggler_count(),
        "loaded records"
    );
    Ok(registry)
}

/// Parse records from any reader.
///
/// Blank lines are skipped and runs of spaces count as one separator.
/// The whole input is rejected on the first bad record.
pub fn read_records<R: Read>(reader: R) -> Result<Registry, RecordError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b' ')
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let mut registry = Registry::new();
    let mut record = StringRecord::new();

    while reader.read_record(&mut record)? {
        let line = record.position().map_or(0, |p| p.line());
        let fields: Vec<&str> = record.iter().filter(|f| !f.is_empty()).collect();

        match fields.first().copied() {
            None => continue,
            Some("C") => parse_circuit(&fields, line, &mut registry)?,
            Some("J") => parse_juggler(&fields, line, &mut registry)?,
            Some(tag) => {
                return Err(RecordError::Malformed {
                    line,
                    reason: format!("unrecognized record type {tag:?}"),
                })
            }
        }
    }

    if registry.circuit_count() == 0 {
        return Err(RecordError::NoCircuits);
    }
    Ok(registry)
}

fn parse_circuit(fields: &[&str], line: u64, registry: &mut Registry) -> Result<(), RecordError> {
    if fields.len() != CIRCUIT_FIELDS {
        return Err(RecordError::Malformed {
            line,
            reason: format!(
                "circuit record needs {CIRCUIT_FIELDS} fields, found {}",
                fields.len()
            ),
        });
    }
    let name = fields[1];
    let aspect = parse_aspect(&fields[2..5], line)?;

    registry
        .add_circuit(Circuit::new(name, aspect))
        .ok_or_else(|| RecordError::DuplicateName {
            line,
            kind: "circuit",
            name: name.to_string(),
        })?;
    Ok(())
}

fn parse_juggler(fields: &[&str], line: u64, registry: &mut Registry) -> Result<(), RecordError> {
    if fields.len() != JUGGLER_FIELDS {
        return Err(RecordError::Malformed {
            line,
            reason: format!(
                "juggler record needs {JUGGLER_FIELDS} fields, found {}",
                fields.len()
            ),
        });
    }
    let name = fields[1];
    let aspect = parse_aspect(&fields[2..5], line)?;

    // A single trailing comma closes the list
    let list = fields[5].strip_suffix(',').unwrap_or(fields[5]);
    let mut preferences = Vec::new();
    for circuit in list.split(',') {
        if circuit.is_empty() {
            return Err(RecordError::Malformed {
                line,
                reason: format!("empty entry in preference list {:?}", fields[5]),
            });
        }
        let id = registry
            .circuit_id(circuit)
            .ok_or_else(|| RecordError::UnknownCircuit {
                line,
                juggler: name.to_string(),
                circuit: circuit.to_string(),
            })?;
        preferences.push(id);
    }

    registry
        .add_juggler(Juggler::new(name, aspect, preferences))
        .ok_or_else(|| RecordError::DuplicateName {
            line,
            kind: "juggler",
            name: name.to_string(),
        })?;
    Ok(())
}

fn parse_aspect(fields: &[&str], line: u64) -> Result<Aspect, RecordError> {
    Ok(Aspect::new(
        parse_attribute(fields[0], "H", line)?,
        parse_attribute(fields[1], "E", line)?,
        parse_attribute(fields[2], "P", line)?,
    ))
}

/// Parse a `<label>:<real>` field.
fn parse_attribute(field: &str, label: &str, line: u64) -> Result<f64, RecordError> {
    let malformed = |reason: String| RecordError::Malformed { line, reason };

    let raw = field
        .strip_prefix(label)
        .and_then(|rest| rest.strip_prefix(':'))
        .ok_or_else(|| malformed(format!("expected {label}:<number>, found {field:?}")))?;

    match raw.parse::<f64>() {
        Ok(value) if value.abs() <= MAX_ATTRIBUTE => Ok(value),
        Ok(value) if value.is_finite() => Err(malformed(format!(
            "attribute {label} is out of range: {raw:?} exceeds {MAX_ATTRIBUTE:e} in magnitude"
        ))),
        _ => Err(malformed(format!("attribute {label} is not a number: {raw:?}"))),
    }
}

// ============================================================================
// Writing
// ============================================================================

/// Write one line per circuit: the circuit name followed by each member
/// and that member's score against every circuit it listed, in
/// preference order.
///
/// ```text
/// C2 J6 C2:128 C1:31 C0:188, J3 C2:120 C0:171 C1:31
/// ```
pub fn write_rosters<W: Write>(engine: &MatchingEngine, mut out: W) -> io::Result<()> {
    let registry = engine.registry();
    for team in engine.teams() {
        write!(out, "{}", registry.circuit(team.circuit()).name)?;
        for (i, seat) in team.members().iter().enumerate() {
            if i > 0 {
                write!(out, ",")?;
            }
            let juggler = registry.juggler(seat.juggler);
            write!(out, " {}", juggler.name)?;
            for &circuit in juggler.preferences() {
                write!(
                    out,
                    " {}:{}",
                    registry.circuit(circuit).name,
                    ScoreDisplay(registry.score(circuit, seat.juggler))
                )?;
            }
        }
        writeln!(out)?;
    }
    out.flush()
}

/// Shortest round-trip decimal, switching to exponent form for
/// very large magnitudes.
struct ScoreDisplay(f64);

impl fmt::Display for ScoreDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.abs() >= EXPONENT_THRESHOLD {
            write!(f, "{:e}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Write rosters to `path`.
pub fn save(engine: &MatchingEngine, path: &Path) -> Result<(), RecordError> {
    let file = create(path)?;
    write_rosters(engine, BufWriter::new(file))?;
    info!(path = %path.display(), circuits = engine.teams().len(), "saved rosters");
    Ok(())
}

/// One row of the flat CSV export.
#[derive(Debug, Serialize, PartialEq)]
pub struct AssignmentRow<'a> {
    pub circuit: &'a str,
    pub juggler: &'a str,
    /// Score against the assigned circuit
    pub score: f64,
    /// 1-based position of the assigned circuit in the juggler's
    /// preferences; empty for fallback placements
    pub preference_rank: Option<usize>,
}

/// Flat view of the assignment, teams in declaration order, members best-first.
pub fn assignment_rows(engine: &MatchingEngine) -> Vec<AssignmentRow<'_>> {
    let registry = engine.registry();
    engine
        .teams()
        .iter()
        .flat_map(|team| {
            let circuit = team.circuit();
            team.members().into_iter().map(move |seat| {
                let juggler = registry.juggler(seat.juggler);
                AssignmentRow {
                    circuit: &registry.circuit(circuit).name,
                    juggler: &juggler.name,
                    score: seat.score,
                    preference_rank: juggler.rank_of(circuit).map(|r| r + 1),
                }
            })
        })
        .collect()
}

/// Write the flat CSV export.
pub fn write_assignment_csv<W: Write>(engine: &MatchingEngine, out: W) -> Result<(), RecordError> {
    let mut writer = csv::Writer::from_writer(out);
    for row in assignment_rows(engine) {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the flat CSV export to `path`.
pub fn save_csv(engine: &MatchingEngine, path: &Path) -> Result<(), RecordError> {
    let file = create(path)?;
    write_assignment_csv(engine, file)?;
    info!(path = %path.display(), "saved assignment table");
    Ok(())
}

fn create(path: &Path) -> Result<File, RecordError> {
    File::create(path).map_err(|source| RecordError::OutputUnavailable {
        path: path.to_path_buf(),
        source,
    })
}
