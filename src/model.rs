//! Domain types for the matcher.
//!
//! Circuits and jugglers are created once from input records and never
//! change afterwards, except for the juggler's preference cursor.

/// Index of a circuit inside the [`Registry`](crate::registry::Registry).
///
/// A `u32` handle rather than a shared pointer: jugglers refer to circuits
/// by index, the registry is the single owner of circuit data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CircuitId(pub u32);

/// Index of a juggler inside the [`Registry`](crate::registry::Registry).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JugglerId(pub u32);

impl CircuitId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl JugglerId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

// ============================================================================
// Attribute Vector
// ============================================================================

/// Three-dimensional attribute vector (hand-eye coordination, endurance,
/// pizzazz). Used identically for circuits and jugglers.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Aspect {
    pub h: f64,
    pub e: f64,
    pub p: f64,
}

impl Aspect {
    #[inline]
    pub const fn new(h: f64, e: f64, p: f64) -> Self {
        Self { h, e, p }
    }

    /// Dot product of two attribute vectors.
    ///
    /// Terms are always summed in H, E, P order so the result is
    /// bit-identical regardless of which side is `self`.
    #[inline]
    pub fn dot(&self, other: &Aspect) -> f64 {
        self.h * other.h + self.e * other.e + self.p * other.p
    }
}

// ============================================================================
// Entities
// ============================================================================

/// A capacity-bounded group that jugglers are matched into.
#[derive(Clone, Debug, PartialEq)]
pub struct Circuit {
    pub name: String,
    pub aspect: Aspect,
}

impl Circuit {
    pub fn new(name: impl Into<String>, aspect: Aspect) -> Self {
        Self {
            name: name.into(),
            aspect,
        }
    }
}

/// A participant with a ranked list of preferred circuits.
///
/// Everything but `next_pref` is fixed at construction. The cursor only
/// moves forward, through [`Juggler::next_preference`].
#[derive(Clone, Debug)]
pub struct Juggler {
    pub name: String,
    pub aspect: Aspect,
    preferences: Vec<CircuitId>,
    /// Index of the next preference not yet attempted
    next_pref: usize,
}

impl Juggler {
    pub fn new(name: impl Into<String>, aspect: Aspect, preferences: Vec<CircuitId>) -> Self {
        Self {
            name: name.into(),
            aspect,
            preferences,
            next_pref: 0,
        }
    }

    /// Preferences in original order, most preferred first.
    #[inline]
    pub fn preferences(&self) -> &[CircuitId] {
        &self.preferences
    }

    /// Current cursor position.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.next_pref
    }

    /// True once every listed circuit has been attempted.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.next_pref >= self.preferences.len()
    }

    /// Take the next circuit to try and advance the cursor past it.
    ///
    /// Returns `None` once the list is exhausted; the cursor never moves
    /// beyond the list length.
    #[inline]
    pub fn next_preference(&mut self) -> Option<CircuitId> {
        let circuit = self.preferences.get(self.next_pref).copied()?;
        self.next_pref += 1;
        Some(circuit)
    }

    /// Position of `circuit` in this juggler's preference list.
    pub fn rank_of(&self, circuit: CircuitId) -> Option<usize> {
        self.preferences.iter().position(|&c| c == circuit)
    }
}

/// Compatibility between a circuit and a juggler: the dot product of
/// their attribute vectors. Higher is a better fit.
#[inline]
pub fn score(circuit: &Circuit, juggler: &Juggler) -> f64 {
    circuit.aspect.dot(&juggler.aspect)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_dot_product() {
        let circuit = Circuit::new("C0", Aspect::new(7.0, 7.0, 10.0));
        let juggler = Juggler::new("J0", Aspect::new(3.0, 9.0, 2.0), vec![]);
        // 7*3 + 7*9 + 10*2
        assert_eq!(score(&circuit, &juggler), 104.0);
    }

    #[test]
    fn test_score_symmetric() {
        let a = Aspect::new(1.5, -2.0, 0.25);
        let b = Aspect::new(4.0, 3.0, 8.0);
        assert_eq!(a.dot(&b), b.dot(&a));
    }

    #[test]
    fn test_cursor_advances_and_stops() {
        let mut juggler = Juggler::new(
            "J1",
            Aspect::default(),
            vec![CircuitId(2), CircuitId(0)],
        );
        assert_eq!(juggler.cursor(), 0);
        assert!(!juggler.is_exhausted());

        assert_eq!(juggler.next_preference(), Some(CircuitId(2)));
        assert_eq!(juggler.next_preference(), Some(CircuitId(0)));
        assert!(juggler.is_exhausted());

        assert_eq!(juggler.next_preference(), None);
        assert_eq!(juggler.cursor(), 2, "Cursor must not pass the list length");
    }

    #[test]
    fn test_empty_preferences_exhausted() {
        let juggler = Juggler::new("J2", Aspect::default(), Vec::new());
        assert!(juggler.is_exhausted());
    }

    #[test]
    fn test_rank_of() {
        let juggler = Juggler::new(
            "J3",
            Aspect::default(),
            vec![CircuitId(4), CircuitId(1), CircuitId(7)],
        );
        assert_eq!(juggler.rank_of(CircuitId(1)), Some(1));
        assert_eq!(juggler.rank_of(CircuitId(3)), None);
    }
}
