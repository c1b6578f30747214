//! Battle engine for SKIRMISH.
//!
//! Owns the hecs ECS world, runs the per-tick systems, resolves combat and
//! exposes stats, views and events to the host.

pub mod aiming;
pub mod combat;
pub mod engine;
pub mod formation;
pub mod ledger;
pub mod manager;
pub mod systems;

pub use skirmish_core as core;
pub use engine::BattleEngine;
pub use manager::GameManager;

#[cfg(test)]
mod tests;
