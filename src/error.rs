//! Error taxonomy.
//!
//! Record and I/O problems are reported to the caller through
//! [`RecordError`]. [`MatchError`] means the matcher's own bookkeeping
//! broke down and the assignment must be discarded.

use std::io;
use std::path::PathBuf;

/// Failures while reading or writing record files.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("could not open input file {path}: {source}")]
    InputUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not open output file {path}: {source}")]
    OutputUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: {reason}")]
    Malformed { line: u64, reason: String },

    #[error("line {line}: juggler {juggler} prefers unknown circuit {circuit}")]
    UnknownCircuit {
        line: u64,
        juggler: String,
        circuit: String,
    },

    #[error("line {line}: duplicate {kind} name {name}")]
    DuplicateName {
        line: u64,
        kind: &'static str,
        name: String,
    },

    #[error("input does not declare any circuits")]
    NoCircuits,

    #[error("read error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// The matcher could not finish a complete assignment.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MatchError {
    #[error("unassigned juggler {juggler}: every circuit is full ({jugglers} jugglers, {circuits} circuits of capacity {capacity})")]
    Unplaceable {
        juggler: String,
        jugglers: usize,
        circuits: usize,
        capacity: usize,
    },

    #[error("{jugglers} jugglers but no circuits to seat them on")]
    NoCircuits { jugglers: usize },
}

/// Top-level error for a full load, assign, save run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("invariant violation: {0}")]
    Match(#[from] MatchError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
