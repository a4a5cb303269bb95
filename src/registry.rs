//! Registry - index-addressed storage for circuits and jugglers.
//!
//! Entities live in two contiguous vectors and are referred to by `u32`
//! ids. Circuit names are resolved once, at load time, through an
//! FxHashMap; the matching loop only ever touches ids.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::model::{Circuit, CircuitId, Juggler, JugglerId};

/// Owner of every circuit and juggler in a run.
#[derive(Default)]
pub struct Registry {
    circuits: Vec<Circuit>,
    jugglers: Vec<Juggler>,
    circuit_names: FxHashMap<String, CircuitId>,
    juggler_names: FxHashMap<String, JugglerId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a circuit. Returns `None` if the name is already taken.
    pub fn add_circuit(&mut self, circuit: Circuit) -> Option<CircuitId> {
        if self.circuit_names.contains_key(&circuit.name) {
            return None;
        }
        let id = CircuitId(self.circuits.len() as u32);
        self.circuit_names.insert(circuit.name.clone(), id);
        self.circuits.push(circuit);
        Some(id)
    }

    /// Add a juggler. Returns `None` if the name is already taken or a
    /// preference refers to a circuit not in this registry.
    pub fn add_juggler(&mut self, juggler: Juggler) -> Option<JugglerId> {
        if self.juggler_names.contains_key(&juggler.name) {
            return None;
        }
        if juggler
            .preferences()
            .iter()
            .any(|c| c.index() >= self.circuits.len())
        {
            return None;
        }
        let id = JugglerId(self.jugglers.len() as u32);
        self.juggler_names.insert(juggler.name.clone(), id);
        self.jugglers.push(juggler);
        Some(id)
    }

    #[inline]
    pub fn circuit_id(&self, name: &str) -> Option<CircuitId> {
        self.circuit_names.get(name).copied()
    }

    #[inline]
    pub fn juggler_id(&self, name: &str) -> Option<JugglerId> {
        self.juggler_names.get(name).copied()
    }

    #[inline]
    pub fn circuit(&self, id: CircuitId) -> &Circuit {
        &self.circuits[id.index()]
    }

    #[inline]
    pub fn juggler(&self, id: JugglerId) -> &Juggler {
        &self.jugglers[id.index()]
    }

    #[inline]
    pub fn juggler_mut(&mut self, id: JugglerId) -> &mut Juggler {
        &mut self.jugglers[id.index()]
    }

    /// Score of `juggler` against `circuit`.
    #[inline]
    pub fn score(&self, circuit: CircuitId, juggler: JugglerId) -> f64 {
        crate::model::score(self.circuit(circuit), self.juggler(juggler))
    }

    #[inline]
    pub fn circuit_count(&self) -> usize {
        self.circuits.len()
    }

    #[inline]
    pub fn juggler_count(&self) -> usize {
        self.jugglers.len()
    }

    /// Uniform team size: jugglers divided by circuits, truncated.
    ///
    /// `None` when no circuits are declared.
    pub fn capacity(&self) -> Option<usize> {
        self.jugglers.len().checked_div(self.circuits.len())
    }

    /// Circuit ids in declaration order.
    pub fn circuit_ids(&self) -> impl DoubleEndedIterator<Item = CircuitId> + ExactSizeIterator {
        (0..self.circuits.len() as u32).map(CircuitId)
    }

    /// Juggler ids in declaration order.
    pub fn juggler_ids(&self) -> impl DoubleEndedIterator<Item = JugglerId> + ExactSizeIterator {
        (0..self.jugglers.len() as u32).map(JugglerId)
    }

    /// Sum of all preference-list lengths.
    pub fn total_preferences(&self) -> usize {
        self.jugglers.iter().map(|j| j.preferences().len()).sum()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("circuits", &self.circuits.len())
            .field("jugglers", &self.jugglers.len())
            .finish()
    }
}
