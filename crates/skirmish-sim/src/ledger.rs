//! Kill tally and event buffer for one battle.

use skirmish_core::enums::Team;
use skirmish_core::events::BattleEvent;

/// Per-team kill counters plus every event emitted since the last drain.
#[derive(Debug, Clone, Default)]
pub struct BattleLedger {
    pub blue_kills: u32,
    pub red_kills: u32,
    events: Vec<BattleEvent>,
    /// Events before this index have already gone to observers.
    notified: usize,
}

impl BattleLedger {
    pub fn kills(&self, team: Team) -> u32 {
        match team {
            Team::Blue => self.blue_kills,
            Team::Red => self.red_kills,
        }
    }

    /// Credit one kill to `team`.
    pub fn record_kill(&mut self, team: Team) {
        match team {
            Team::Blue => self.blue_kills += 1,
            Team::Red => self.red_kills += 1,
        }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    /// Events not yet handed to observers. Marks them as handed over.
    pub fn pending(&mut self) -> &[BattleEvent] {
        let from = self.notified;
        self.notified = self.events.len();
        &self.events[from..]
    }

    /// Take the whole buffer.
    pub fn drain(&mut self) -> Vec<BattleEvent> {
        self.notified = 0;
        std::mem::take(&mut self.events)
    }
}
