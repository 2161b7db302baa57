//! Bounded undo history of engine snapshots.

use std::collections::VecDeque;

use super::Character;

/// Engine snapshots, oldest first. Snapshots are plain clones, so recording
/// one never affects the instance being edited.
#[derive(Debug, Clone)]
pub struct BuildHistory {
    limit: usize,
    entries: VecDeque<Character>,
}

impl BuildHistory {
    /// A history holding `initial`, capped at the session's undo limit.
    pub fn new(initial: Character) -> Self {
        let limit = initial.session().config().undo_limit.max(1);
        let mut entries = VecDeque::with_capacity(limit);
        entries.push_back(initial);
        Self { limit, entries }
    }

    /// Push a new snapshot, dropping the oldest past the limit.
    pub fn record(&mut self, character: Character) {
        self.entries.push_back(character);
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
    }

    /// Step back one snapshot. The oldest snapshot is never dropped.
    pub fn undo(&mut self) -> Option<&Character> {
        if self.entries.len() < 2 {
            return None;
        }
        self.entries.pop_back();
        self.entries.back()
    }

    pub fn current(&self) -> &Character {
        // `new` seeds one entry and `undo` never removes the last
        &self.entries[self.entries.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures;

    #[test]
    fn undo_restores_the_previous_snapshot() {
        let start = Character::new(test_fixtures::session());
        let mut history = BuildHistory::new(start.clone());

        let leveled = test_fixtures::answer(&start.level_up(), &["Fighter"]);
        history.record(leveled);
        assert_eq!(history.current().total_level(), 1);

        let restored = history.undo().unwrap();
        assert_eq!(restored.total_level(), 0);
        assert!(history.undo().is_none());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn oldest_snapshots_fall_off() {
        let start = Character::new(test_fixtures::session());
        let limit = start.session().config().undo_limit;
        let mut history = BuildHistory::new(start.clone());

        for _ in 0..limit + 5 {
            history.record(start.manage_levels());
        }

        assert_eq!(history.len(), limit);
        assert!(!history.is_empty());
        assert_eq!(history.current().pending_decisions().len(), 1);
    }
}
