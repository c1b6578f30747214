//! Battle engine, the core of the simulator.
//!
//! `BattleEngine` owns the hecs ECS world, runs all systems once per
//! `update(dt)`, and answers every query hosts make about the battle.
//! Completely headless, enabling deterministic testing.

use std::collections::BTreeMap;

use glam::DVec2;
use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, trace, warn};

use skirmish_ai::Combatant;
use skirmish_core::components::{Projectile, UnitInfo, Weapon};
use skirmish_core::config::{BattleConfig, ConfigError};
use skirmish_core::constants::PROJECTILE_LIFETIME_SECS;
use skirmish_core::enums::{BattleOutcome, BattlePhase, DamageType, Team};
use skirmish_core::events::{BattleEvent, BattleObserver};
use skirmish_core::render::{Render, RenderSurface};
use skirmish_core::state::*;
use skirmish_core::types::{BattleTime, Position, ProjectileId, UnitId, Velocity};
use skirmish_core::vector;

use crate::aiming;
use crate::combat::{self, Strike};
use crate::formation::{self, Slot};
use crate::ledger::BattleLedger;
use crate::systems;
use crate::systems::ai::AttackIntent;
use crate::systems::carriers::CarrierSchedule;

/// The battle engine. Owns the ECS world and all battle state.
pub struct BattleEngine {
    config: BattleConfig,
    world: World,
    /// Unit index; ascending id is spawn order.
    units: BTreeMap<UnitId, Entity>,
    rng: ChaCha8Rng,
    time: BattleTime,
    phase: BattlePhase,
    outcome: Option<BattleOutcome>,
    ledger: BattleLedger,
    carriers: CarrierSchedule,
    observers: Vec<Box<dyn BattleObserver>>,
    next_unit_id: u32,
    next_projectile_id: u32,
    next_interceptor_id: u32,
    despawn_buffer: Vec<Entity>,
}

impl BattleEngine {
    /// Validate `config` and deploy both forces. The battle starts in Setup.
    pub fn new(config: BattleConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut engine = Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            world: World::new(),
            units: BTreeMap::new(),
            time: BattleTime::default(),
            phase: BattlePhase::Setup,
            outcome: None,
            ledger: BattleLedger::default(),
            carriers: CarrierSchedule::default(),
            observers: Vec::new(),
            next_unit_id: 1,
            next_projectile_id: 1,
            next_interceptor_id: 1,
            despawn_buffer: Vec::new(),
        };
        engine.deploy();
        Ok(engine)
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// Setup → Battle. Returns false in any other phase.
    pub fn start_battle(&mut self) -> bool {
        if self.phase != BattlePhase::Setup {
            return false;
        }
        self.phase = BattlePhase::Battle;
        self.ledger.push(BattleEvent::BattleStarted);
        info!(
            blue = self.alive_count(Team::Blue),
            red = self.alive_count(Team::Red),
            "battle started"
        );
        self.notify_observers();
        true
    }

    /// Advance the battle by `dt` seconds. No-op outside the Battle phase or
    /// for a non-finite or non-positive `dt`.
    pub fn update(&mut self, dt: f64) {
        if self.phase != BattlePhase::Battle || !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.time.advance(dt);
        self.run_systems(dt);
        self.check_victory();
        self.notify_observers();
    }

    /// Clear everything and redeploy from the config, with the RNG reseeded.
    /// Back to Setup.
    pub fn reset(&mut self) {
        self.world.clear();
        self.units.clear();
        self.carriers.clear();
        self.despawn_buffer.clear();
        self.rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.time = BattleTime::default();
        self.phase = BattlePhase::Setup;
        self.outcome = None;
        self.ledger = BattleLedger::default();
        self.next_unit_id = 1;
        self.next_projectile_id = 1;
        self.next_interceptor_id = 1;
        self.deploy();
        info!(units = self.units.len(), "battle reset");
    }

    /// Fire a projectile from `source` at `target`. Kind and speed follow the
    /// source's traits; the aim leads the target.
    pub fn spawn_projectile(
        &mut self,
        source: UnitId,
        target: UnitId,
        damage: f64,
    ) -> Option<ProjectileId> {
        if self.phase != BattlePhase::Battle {
            warn!(source = %source, "projectile requested outside battle, ignored");
            return None;
        }
        let (Some((shooter_entity, shooter)), Some((_, victim))) =
            (self.live_unit(source), self.live_unit(target))
        else {
            warn!(source = %source, target = %target, "projectile for a missing or fallen unit, ignored");
            return None;
        };
        if !damage.is_finite() || damage < 0.0 {
            warn!(source = %source, damage, "projectile with invalid damage, ignored");
            return None;
        }

        let traits = self
            .world
            .get::<&UnitInfo>(shooter_entity)
            .map(|info| info.traits)
            .unwrap_or_default();
        let armor_piercing = self
            .world
            .get::<&Weapon>(shooter_entity)
            .map(|w| w.armor_piercing)
            .unwrap_or(0.0);
        let kind = aiming::projectile_kind(traits);
        let velocity =
            aiming::launch_velocity(shooter.position, victim.position, victim.velocity, kind);

        let id = ProjectileId(self.next_projectile_id);
        self.next_projectile_id += 1;
        self.world.spawn((
            Position(shooter.position),
            Velocity(velocity),
            Projectile {
                id,
                source,
                source_team: shooter.team,
                target: Some(target),
                damage,
                armor_piercing,
                kind,
                lifetime_secs: PROJECTILE_LIFETIME_SECS,
                consumed: false,
            },
        ));
        Some(id)
    }

    /// Resolve a melee blow from `source` on `target` right now. Returns the
    /// health removed.
    pub fn spawn_melee_effect(&mut self, source: UnitId, target: UnitId, damage: f64) -> Option<f64> {
        if self.phase != BattlePhase::Battle {
            warn!(source = %source, "melee requested outside battle, ignored");
            return None;
        }
        let (Some((attacker_entity, attacker)), Some((_, victim))) =
            (self.live_unit(source), self.live_unit(target))
        else {
            warn!(source = %source, target = %target, "melee on a missing or fallen unit, ignored");
            return None;
        };
        if attacker.team == victim.team || !damage.is_finite() || damage < 0.0 {
            warn!(source = %source, target = %target, damage, "invalid melee request, ignored");
            return None;
        }

        let armor_piercing = self
            .world
            .get::<&Weapon>(attacker_entity)
            .map(|w| w.armor_piercing)
            .unwrap_or(0.0);
        let contact =
            victim.position + vector::direction(victim.position, attacker.position) * victim.radius;

        let result = combat::take_damage(
            &mut self.world,
            &self.units,
            &mut self.ledger,
            &mut self.rng,
            &self.config.mitigation,
            self.time.elapsed_secs,
            Strike {
                target,
                source,
                source_team: attacker.team,
                raw_damage: damage,
                armor_piercing,
                damage_type: DamageType::Melee,
                contact: Some(contact),
            },
        );
        self.notify_observers();
        result.map(|r| r.damage)
    }

    /// Add a unit of `class` at `position` with base stats. Not allowed once
    /// the battle is over.
    pub fn spawn_unit(&mut self, team: Team, class: &str, position: DVec2) -> Option<UnitId> {
        if self.phase == BattlePhase::Finished {
            warn!(class, "unit requested after the battle ended, ignored");
            return None;
        }
        let Some(class) = self.config.class(class).cloned() else {
            warn!(class, "unknown unit class, ignored");
            return None;
        };
        let slot = Slot {
            team,
            class,
            position: self.config.bounds.clamp(position),
            range_scale: 1.0,
        };
        Some(self.add_unit(&slot))
    }

    // --- Queries ---

    pub fn stats(&self) -> BattleStats {
        systems::snapshot::build_stats(
            &self.world,
            &self.ledger,
            self.time.elapsed_secs,
            self.phase,
            self.outcome,
        )
    }

    pub fn team_stats(&self, team: Team) -> TeamStats {
        systems::snapshot::build_team_stats(&self.world, &self.ledger, team)
    }

    pub fn unit(&self, id: UnitId) -> Option<UnitView> {
        let entity = *self.units.get(&id)?;
        systems::snapshot::build_unit(&self.world, entity)
    }

    /// Living units opposing `team`.
    pub fn enemies(&self, team: Team) -> Vec<UnitView> {
        self.allies(team.opponent())
    }

    /// Living units of `team`.
    pub fn allies(&self, team: Team) -> Vec<UnitView> {
        self.units()
            .into_iter()
            .filter(|u| u.team == team && u.active)
            .collect()
    }

    pub fn alive_count(&self, team: Team) -> u32 {
        systems::snapshot::alive_count(&self.world, team)
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn time(&self) -> BattleTime {
        self.time
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        self.outcome
    }

    /// Every unit, fallen ones included, in ascending id order.
    pub fn units(&self) -> Vec<UnitView> {
        systems::snapshot::build_units(&self.world)
    }

    pub fn projectiles(&self) -> Vec<ProjectileView> {
        systems::snapshot::build_projectiles(&self.world)
    }

    pub fn interceptors(&self) -> Vec<InterceptorView> {
        systems::snapshot::build_interceptors(&self.world)
    }

    pub fn effects(&self) -> Vec<EffectView> {
        systems::snapshot::build_effects(&self.world)
    }

    pub fn snapshot(&self) -> BattleSnapshot {
        BattleSnapshot {
            time: self.time,
            phase: self.phase,
            outcome: self.outcome,
            units: self.units(),
            projectiles: self.projectiles(),
            interceptors: self.interceptors(),
            effects: self.effects(),
        }
    }

    /// Draw the current state onto a host surface.
    pub fn render(&self, surface: &mut dyn RenderSurface) {
        self.snapshot().render(surface);
    }

    /// Whether `id` is on the interceptor launch schedule.
    pub fn is_carrier(&self, id: UnitId) -> bool {
        self.carriers.is_registered(id)
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    // --- Events ---

    pub fn add_observer(&mut self, observer: Box<dyn BattleObserver>) {
        self.observers.push(observer);
    }

    /// Events emitted since the last drain, oldest first.
    pub fn events(&self) -> &[BattleEvent] {
        self.ledger.events()
    }

    pub fn drain_events(&mut self) -> Vec<BattleEvent> {
        self.notify_observers();
        self.ledger.drain()
    }

    // --- Internals ---

    fn deploy(&mut self) {
        let slots = formation::plan(&self.config, &mut self.rng);
        for slot in &slots {
            self.add_unit(slot);
        }
    }

    fn add_unit(&mut self, slot: &Slot) -> UnitId {
        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;
        let number = self
            .world
            .query::<&UnitInfo>()
            .iter()
            .filter(|(_, info)| info.team == slot.team)
            .count() as u32
            + 1;
        let entity = formation::spawn_unit(&mut self.world, id, number, slot);
        self.units.insert(id, entity);
        if slot.class.is_carrier() {
            self.carriers.register(id);
        }
        id
    }

    /// Entity and AI view of an active unit.
    fn live_unit(&self, id: UnitId) -> Option<(Entity, Combatant)> {
        let entity = *self.units.get(&id)?;
        systems::ai::combatant(&self.world, id, entity)
            .filter(|c| c.active)
            .map(|c| (entity, c))
    }

    /// Run all systems in order.
    fn run_systems(&mut self, dt: f64) {
        let battle_time = self.time.elapsed_secs;

        // 1. Targeting, steering and attacks
        let attacks = systems::ai::run(&mut self.world, &self.units, &self.config.ai);
        for attack in attacks {
            self.execute_attack(attack);
        }
        // 2. Cooldowns, morale recovery, movement
        systems::movement::run(&mut self.world, &self.config.bounds, dt, &mut self.ledger);
        // 3. Interceptor drones
        systems::interceptors::run(
            &mut self.world,
            &self.units,
            &mut self.ledger,
            &mut self.rng,
            &self.config.mitigation,
            &self.config.bounds,
            battle_time,
            dt,
        );
        // 4. Carrier launches
        systems::carriers::run(
            &mut self.world,
            &self.units,
            &mut self.carriers,
            &mut self.rng,
            &mut self.next_interceptor_id,
            &mut self.ledger,
            &self.config.bounds,
            dt,
        );
        // 5. Projectiles in flight
        systems::projectiles::run(
            &mut self.world,
            &self.units,
            &mut self.ledger,
            &mut self.rng,
            &self.config.mitigation,
            &self.config.bounds,
            battle_time,
            dt,
        );
        // 6. Hit effects
        systems::effects::run(&mut self.world, dt);
        // 7. Cleanup (spent projectiles, lost drones, faded effects)
        systems::cleanup::run(&mut self.world, &mut self.despawn_buffer, &mut self.ledger);
    }

    /// Re-validate both sides, then strike through the public entry points.
    fn execute_attack(&mut self, attack: AttackIntent) {
        if self.live_unit(attack.target).is_none() {
            return;
        }
        let Some((entity, _)) = self.live_unit(attack.attacker) else {
            return;
        };
        let weapon = {
            let Ok(mut weapon) = self.world.get::<&mut Weapon>(entity) else {
                return;
            };
            if weapon.timer_secs > 0.0 {
                return;
            }
            weapon.timer_secs = weapon.cooldown_secs;
            *weapon
        };

        if weapon.ranged {
            self.spawn_projectile(attack.attacker, attack.target, weapon.damage);
        } else {
            self.spawn_melee_effect(attack.attacker, attack.target, weapon.damage);
        }
    }

    fn check_victory(&mut self) {
        let blue = self.alive_count(Team::Blue);
        let red = self.alive_count(Team::Red);
        trace!(tick = self.time.tick, blue, red, "tick");

        if let Some(outcome) = systems::victory::check(blue, red, self.time.elapsed_secs) {
            self.phase = BattlePhase::Finished;
            self.outcome = Some(outcome);
            self.ledger.push(BattleEvent::BattleFinished { outcome });
            info!(
                ?outcome,
                t = self.time.elapsed_secs,
                blue_kills = self.ledger.blue_kills,
                red_kills = self.ledger.red_kills,
                "battle finished"
            );
        }
    }

    /// Hand new events to observers.
    fn notify_observers(&mut self) {
        let events = self.ledger.pending();
        for event in events {
            for observer in self.observers.iter_mut() {
                match event {
                    BattleEvent::Hit(hit) => observer.on_hit(hit),
                    BattleEvent::Kill(kill) => observer.on_kill(kill),
                    BattleEvent::BattleFinished { outcome } => observer.on_finished(*outcome),
                    _ => {}
                }
            }
        }
    }
}

#[cfg(test)]
impl BattleEngine {
    /// Mutable world access for tests that stage specific situations.
    pub(crate) fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub(crate) fn entity(&self, id: UnitId) -> Option<Entity> {
        self.units.get(&id).copied()
    }
}
