//! Per-tick systems, run by [`crate::engine::BattleEngine`] in a fixed order.
//!
//! Each is a free `run` function over the hecs world plus whatever engine
//! state it needs (unit index, ledger, RNG) passed in explicitly.

pub mod ai;
pub mod carriers;
pub mod cleanup;
pub mod effects;
pub mod interceptors;
pub mod movement;
pub mod projectiles;
pub mod snapshot;
pub mod victory;
