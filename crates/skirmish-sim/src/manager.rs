//! Host-facing façade: pause, time scale and fixed-step accumulation on top
//! of [`BattleEngine`].

use tracing::{debug, info};

use skirmish_core::config::{BattleConfig, ConfigError};
use skirmish_core::constants::*;

use crate::engine::BattleEngine;

/// Drives a [`BattleEngine`] from variable host frame times.
///
/// Each `update(real_dt)` scales the frame time, adds it to an accumulator
/// and runs whole `FIXED_STEP` ticks, at most `MAX_STEPS_PER_FRAME` per
/// frame. Time beyond the cap is dropped so a stalled host never triggers a
/// catch-up spiral.
pub struct GameManager {
    engine: BattleEngine,
    time_scale: f64,
    paused: bool,
    accumulator: f64,
}

impl GameManager {
    pub fn new(config: BattleConfig) -> Result<Self, ConfigError> {
        Ok(Self::from_engine(BattleEngine::new(config)?))
    }

    pub fn from_engine(engine: BattleEngine) -> Self {
        Self {
            engine,
            time_scale: 1.0,
            paused: false,
            accumulator: 0.0,
        }
    }

    pub fn engine(&self) -> &BattleEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut BattleEngine {
        &mut self.engine
    }

    /// Begin the battle. Returns false unless the engine was in Setup.
    pub fn start(&mut self) -> bool {
        self.accumulator = 0.0;
        self.engine.start_battle()
    }

    /// Feed one host frame. Returns the number of fixed steps run.
    pub fn update(&mut self, real_dt: f64) -> u32 {
        if self.paused || !real_dt.is_finite() || real_dt <= 0.0 {
            return 0;
        }
        self.accumulator += real_dt * self.time_scale;

        let mut steps = 0;
        while self.accumulator >= FIXED_STEP && steps < MAX_STEPS_PER_FRAME {
            self.engine.update(FIXED_STEP);
            self.accumulator -= FIXED_STEP;
            steps += 1;
        }
        if self.accumulator >= FIXED_STEP {
            debug!(
                dropped_secs = self.accumulator,
                "frame exceeded step budget, dropping time"
            );
            self.accumulator = 0.0;
        }
        steps
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Flip pause and return the new state.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Set the time multiplier, clamped to 0x - 5x. NaN is ignored.
    pub fn set_time_scale(&mut self, scale: f64) {
        if scale.is_nan() {
            return;
        }
        self.time_scale = scale.clamp(MIN_TIME_SCALE, MAX_TIME_SCALE);
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Reset the battle and discard any accumulated time.
    pub fn reset(&mut self) {
        self.engine.reset();
        self.accumulator = 0.0;
        info!("game reset");
    }
}
