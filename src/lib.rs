//! # JuggleFest
//!
//! A deterministic, capacity-bounded stable matching engine.
//!
//! Jugglers rank circuits; circuits rank jugglers by score (the dot product
//! of their attribute vectors). Every circuit takes the same number of
//! jugglers, and the final assignment is stable: no juggler prefers a
//! circuit whose weakest member it outscores.
//!
//! ## Design Principles
//!
//! - **Single-Writer**: one matcher owns every team and the work queue
//! - **O(log capacity) Decisions**: each team is a bounded heap, worst at the root
//! - **Index Handles**: jugglers refer to circuits by `u32` id, never by copy
//! - **Monotonic Cursors**: each juggler tries each listed circuit at most once
//!
//! ## Architecture
//!
//! ```text
//! [records::load] --> [Registry] --> [MatchingEngine] --> [records::save]
//!                                          |
//!                                 [Team per circuit]
//! ```

pub mod model;
pub mod registry;
pub mod team;
pub mod matching;
pub mod records;
pub mod config;
pub mod error;
pub mod engine;

// Re-exports for convenience
pub use model::{score, Aspect, Circuit, CircuitId, Juggler, JugglerId};
pub use registry::Registry;
pub use team::{Seat, Team};
pub use matching::{BlockingPair, MatchStats, MatchingEngine};
pub use config::RunConfig;
pub use error::{Error, MatchError, RecordError};
pub use engine::{name_number_sum, Engine};
