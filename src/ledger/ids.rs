/// Hands out record ids.
pub(crate) trait IdSource {
    fn next_id(&mut self) -> u64;
}

/// Monotonic counter. Seeded past the highest id already stored so that
/// ids never depend on the wall clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IdSequence {
    next: u64,
}

impl IdSequence {
    pub(crate) fn starting_after(max_used: u64) -> Self {
        Self {
            next: max_used.saturating_add(1),
        }
    }

    /// Make sure future ids stay above `id`.
    pub(crate) fn observe(&mut self, id: u64) {
        if id >= self.next {
            self.next = id.saturating_add(1);
        }
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::starting_after(0)
    }
}

impl IdSource for IdSequence {
    fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next = self.next.saturating_add(1);
        id
    }
}
