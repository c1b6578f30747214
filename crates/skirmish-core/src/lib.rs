//! Core types and definitions for the SKIRMISH battle simulator.
//!
//! This crate defines the vocabulary shared across all other crates:
//! vector math, components, configuration, events, stat views, the render
//! boundary and constants. It has no dependency on the ECS or any host.

pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod events;
pub mod render;
pub mod state;
pub mod types;
pub mod vector;
