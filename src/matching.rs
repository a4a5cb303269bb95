//! Matching Engine - capacitated deferred acceptance.
//!
//! Drains a work queue of unassigned jugglers:
//! 1. PROPOSE: try the next circuit on the juggler's preference list
//! 2. INSERT or OFFER: take a free seat, or challenge the team's worst member
//! 3. REQUEUE: whoever loses the challenge goes back on the queue
//!
//! A juggler that has run out of preferences is placed on the first team
//! with room (the fallback pool).

use tracing::{debug, info, trace};

use crate::error::MatchError;
use crate::model::{CircuitId, JugglerId};
use crate::registry::Registry;
use crate::team::Team;

/// Counters collected over one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatchStats {
    /// Preference cursor advances
    pub proposals: u64,
    /// `Team::insert` calls (including fallback placements)
    pub insertions: u64,
    /// `Team::offer` calls
    pub offers: u64,
    /// Offers that displaced an incumbent
    pub evictions: u64,
    /// Offers that handed the candidate back
    pub rejections: u64,
    /// Jugglers placed after exhausting their preferences
    pub fallbacks: u64,
}

impl MatchStats {
    /// Total insert + offer operations.
    #[inline]
    pub fn operations(&self) -> u64 {
        self.insertions + self.offers
    }
}

/// A (juggler, circuit) pair violating stability: the juggler ranks the
/// circuit above its own team and outscores (or finds room in) it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockingPair {
    pub juggler: JugglerId,
    pub preferred: CircuitId,
    pub assigned: CircuitId,
}

/// The matcher core. Owns all state for a single run.
pub struct MatchingEngine {
    registry: Registry,
    /// One team per circuit, indexed by `CircuitId`
    teams: Vec<Team>,
    /// Unassigned jugglers, popped from the back (LIFO)
    queue: Vec<JugglerId>,
    /// Fallback pool position: every team before it is full
    fallback_cursor: usize,
    capacity: usize,
    stats: MatchStats,
}

impl MatchingEngine {
    /// Build a fresh engine with one empty team per circuit and every
    /// juggler queued, first-declared on top.
    pub fn new(registry: Registry) -> Self {
        let capacity = registry.capacity().unwrap_or(0);
        let teams = registry
            .circuit_ids()
            .map(|c| Team::new(c, capacity))
            .collect();
        let queue = registry.juggler_ids().rev().collect();

        Self {
            registry,
            teams,
            queue,
            fallback_cursor: 0,
            capacity,
            stats: MatchStats::default(),
        }
    }

    /// Run until every juggler holds a seat.
    ///
    /// # Errors
    /// [`MatchError::Unplaceable`] if a juggler with no preferences left
    /// finds every team full, [`MatchError::NoCircuits`] if there are
    /// jugglers but no teams at all. The partial assignment must not be used.
    pub fn run(&mut self) -> Result<MatchStats, MatchError> {
        while self.step()? {}

        info!(
            jugglers = self.registry.juggler_count(),
            circuits = self.registry.circuit_count(),
            proposals = self.stats.proposals,
            evictions = self.stats.evictions,
            fallbacks = self.stats.fallbacks,
            "assignment complete"
        );
        Ok(self.stats)
    }

    /// Process one queued juggler. Returns `false` once the queue is empty.
    pub fn step(&mut self) -> Result<bool, MatchError> {
        let Some(juggler) = self.queue.pop() else {
            return Ok(false);
        };
        match self.registry.juggler_mut(juggler).next_preference() {
            Some(circuit) => self.propose(juggler, circuit),
            None => self.place_fallback(juggler)?,
        }
        Ok(true)
    }

    /// Try `juggler` on `circuit`; requeue whoever ends up without a seat.
    fn propose(&mut self, juggler: JugglerId, circuit: CircuitId) {
        self.stats.proposals += 1;
        let score = self.registry.score(circuit, juggler);
        let team = &mut self.teams[circuit.index()];

        trace!(juggler = juggler.0, circuit = circuit.0, score, "proposal");

        if !team.is_full() {
            team.insert(juggler, score);
            self.stats.insertions += 1;
            return;
        }

        self.stats.offers += 1;
        let loser = team.offer(juggler, score);
        if loser == juggler {
            self.stats.rejections += 1;
        } else {
            self.stats.evictions += 1;
            debug!(
                circuit = %self.registry.circuit(circuit).name,
                evicted = %self.registry.juggler(loser).name,
                by = %self.registry.juggler(juggler).name,
                "eviction"
            );
        }
        self.queue.push(loser);
    }

    /// Seat an exhausted juggler on the first team with room.
    fn place_fallback(&mut self, juggler: JugglerId) -> Result<(), MatchError> {
        if self.teams.is_empty() {
            return Err(MatchError::NoCircuits {
                jugglers: self.registry.juggler_count(),
            });
        }
        while self
            .teams
            .get(self.fallback_cursor)
            .is_some_and(Team::is_full)
        {
            self.fallback_cursor += 1;
        }

        let Some(team) = self.teams.get_mut(self.fallback_cursor) else {
            return Err(MatchError::Unplaceable {
                juggler: self.registry.juggler(juggler).name.clone(),
                jugglers: self.registry.juggler_count(),
                circuits: self.registry.circuit_count(),
                capacity: self.capacity,
            });
        };

        let circuit = team.circuit();
        let score = self.registry.score(circuit, juggler);
        team.insert(juggler, score);
        self.stats.insertions += 1;
        self.stats.fallbacks += 1;

        debug!(
            juggler = %self.registry.juggler(juggler).name,
            circuit = %self.registry.circuit(circuit).name,
            "fallback placement"
        );
        Ok(())
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    #[inline]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Teams in circuit declaration order.
    #[inline]
    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    #[inline]
    pub fn team(&self, circuit: CircuitId) -> &Team {
        &self.teams[circuit.index()]
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn stats(&self) -> MatchStats {
        self.stats
    }

    /// Jugglers still waiting for a seat.
    #[inline]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Circuit each juggler is seated on, indexed by `JugglerId`.
    pub fn assignment(&self) -> Vec<Option<CircuitId>> {
        let mut seats = vec![None; self.registry.juggler_count()];
        for team in &self.teams {
            for seat in team.iter() {
                seats[seat.juggler.index()] = Some(team.circuit());
            }
        }
        seats
    }

    /// Every pair that would make the current assignment unstable.
    ///
    /// A juggler blocks with a circuit it ranks strictly above its own when
    /// that circuit has room or its worst member scores strictly lower.
    /// Jugglers seated by fallback rank every listed circuit above their own.
    pub fn blocking_pairs(&self) -> Vec<BlockingPair> {
        let mut pairs = Vec::new();
        for team in &self.teams {
            let assigned = team.circuit();
            for seat in team.iter() {
                let juggler = self.registry.juggler(seat.juggler);
                let cutoff = juggler
                    .rank_of(assigned)
                    .unwrap_or(juggler.preferences().len());

                for &preferred in &juggler.preferences()[..cutoff] {
                    let rival = &self.teams[preferred.index()];
                    let score = self.registry.score(preferred, seat.juggler);
                    let blocks = match rival.worst() {
                        _ if !rival.is_full() => true,
                        Some(worst) => score > worst.score,
                        None => false,
                    };
                    if blocks {
                        pairs.push(BlockingPair {
                            juggler: seat.juggler,
                            preferred,
                            assigned,
                        });
                    }
                }
            }
        }
        pairs
    }
}
