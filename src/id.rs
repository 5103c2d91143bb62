use crate::model::{CompetitorId, ExhibitId, ModifierId, VisitorId};

/// Monotonic id source owned by a single subsystem.
///
/// Each subsystem keeps its own generator; ids are unique per kind, and the
/// typed helpers keep kinds from being mixed up.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn starting_from(start: u64) -> Self {
        Self { next: start.max(1) }
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    pub fn next_competitor(&mut self) -> CompetitorId {
        CompetitorId(self.next_id())
    }

    pub fn next_modifier(&mut self) -> ModifierId {
        ModifierId(self.next_id())
    }

    pub fn next_exhibit(&mut self) -> ExhibitId {
        ExhibitId(self.next_id())
    }

    pub fn next_visitor(&mut self) -> VisitorId {
        VisitorId(self.next_id())
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u64 {
        self.next - 1
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_typed_ids() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.next_competitor(), CompetitorId(1));
        assert_eq!(ids.next_competitor(), CompetitorId(2));
        assert_eq!(ids.next_modifier(), ModifierId(3));
        assert_eq!(ids.issued(), 3);
    }

    #[test]
    fn starting_from_zero_is_bumped() {
        let mut ids = IdGenerator::starting_from(0);
        assert_eq!(ids.next_id(), 1);
        let mut ids = IdGenerator::starting_from(100);
        assert_eq!(ids.next_exhibit(), ExhibitId(100));
    }
}
