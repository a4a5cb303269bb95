//! Team - a bounded top-K roster for a single circuit.
//!
//! Members are kept in a binary heap ordered worst-first, so the member a
//! newcomer has to beat is always at the root. Insert and evict are
//! O(log capacity); the full ranking is only produced on enumeration.

use std::cmp::Ordering;

use crate::model::{CircuitId, JugglerId};

/// One occupied place on a team.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Seat {
    pub juggler: JugglerId,
    /// Score against the team's circuit
    pub score: f64,
    /// Admission sequence number, unique within the team
    seq: u64,
}

impl Seat {
    /// Ordering where `Greater` means "worse": lower score, or equal score
    /// and admitted later.
    #[inline]
    fn worseness(&self, other: &Seat) -> Ordering {
        other
            .score
            .partial_cmp(&self.score)
            .unwrap_or(Ordering::Equal)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Capacity-bounded roster of one circuit.
///
/// Scores are supplied by the caller and must be the juggler's score
/// against `circuit`; the team never looks at attribute vectors itself.
#[derive(Clone, Debug)]
pub struct Team {
    circuit: CircuitId,
    capacity: usize,
    /// Binary heap, worst seat at index 0
    heap: Vec<Seat>,
    next_seq: u64,
}

impl Team {
    pub fn new(circuit: CircuitId, capacity: usize) -> Self {
        Self {
            circuit,
            capacity,
            heap: Vec::with_capacity(capacity),
            next_seq: 0,
        }
    }

    #[inline]
    pub fn circuit(&self) -> CircuitId {
        self.circuit
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.capacity
    }

    /// The member a candidate has to outscore.
    #[inline]
    pub fn worst(&self) -> Option<&Seat> {
        self.heap.first()
    }

    /// Add a juggler to a team with room to spare.
    ///
    /// # Complexity
    /// O(log capacity)
    pub fn insert(&mut self, juggler: JugglerId, score: f64) {
        debug_assert!(!self.is_full(), "insert into a full team");
        let seat = self.seat(juggler, score);
        self.heap.push(seat);
        self.sift_up(self.heap.len() - 1);
    }

    /// Offer a place on a full team.
    ///
    /// If `score` is strictly greater than the worst member's score, that
    /// member is evicted and returned. Otherwise the team is unchanged and
    /// the candidate is handed back. Either way the returned juggler is the
    /// one left without a place.
    ///
    /// # Complexity
    /// O(log capacity)
    pub fn offer(&mut self, candidate: JugglerId, score: f64) -> JugglerId {
        debug_assert!(self.is_full(), "offer to a team with room");
        let Some(worst) = self.heap.first().copied() else {
            // Zero-capacity team: nobody gets in
            return candidate;
        };
        if score > worst.score {
            let seat = self.seat(candidate, score);
            self.heap[0] = seat;
            self.sift_down(0);
            worst.juggler
        } else {
            candidate
        }
    }

    /// Members best-first. Equal scores are listed by admission order.
    pub fn members(&self) -> Vec<Seat> {
        let mut seats = self.heap.clone();
        seats.sort_by(|a, b| a.worseness(b));
        seats
    }

    /// Iterate members in heap order (no particular ranking).
    pub fn iter(&self) -> impl Iterator<Item = &Seat> {
        self.heap.iter()
    }

    pub fn contains(&self, juggler: JugglerId) -> bool {
        self.heap.iter().any(|s| s.juggler == juggler)
    }

    #[inline]
    fn seat(&mut self, juggler: JugglerId, score: f64) -> Seat {
        let seq = self.next_seq;
        self.next_seq += 1;
        Seat { juggler, score, seq }
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if self.heap[pos].worseness(&self.heap[parent]) != Ordering::Greater {
                break;
            }
            self.heap.swap(pos, parent);
            pos = parent;
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * pos + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let mut child = left;
            if right < len && self.heap[right].worseness(&self.heap[left]) == Ordering::Greater {
                child = right;
            }
            if self.heap[child].worseness(&self.heap[pos]) != Ordering::Greater {
                break;
            }
            self.heap.swap(pos, child);
            pos = child;
        }
    }

    /// Check the heap property (debug/test helper).
    pub fn is_heap(&self) -> bool {
        (1..self.heap.len()).all(|i| {
            self.heap[i].worseness(&self.heap[(i - 1) / 2]) != Ordering::Greater
        })
    }
}
