//! Victory check.

use skirmish_core::constants::VICTORY_GRACE_SECS;
use skirmish_core::enums::{BattleOutcome, Team};

/// Outcome once a side has been wiped out, `None` while both still fight or
/// inside the opening grace period.
pub fn check(blue_alive: u32, red_alive: u32, battle_time: f64) -> Option<BattleOutcome> {
    if battle_time <= VICTORY_GRACE_SECS {
        return None;
    }
    match (blue_alive, red_alive) {
        (0, 0) => Some(BattleOutcome::Draw),
        (0, _) => Some(BattleOutcome::Victory(Team::Red)),
        (_, 0) => Some(BattleOutcome::Victory(Team::Blue)),
        _ => None,
    }
}
