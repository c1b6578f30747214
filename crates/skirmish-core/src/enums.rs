//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

use crate::types::Rgba;

/// One of the two opposing sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Team {
    Blue,
    Red,
}

impl Team {
    pub const ALL: [Team; 2] = [Team::Blue, Team::Red];

    /// The opposing side.
    pub fn opponent(self) -> Team {
        match self {
            Team::Blue => Team::Red,
            Team::Red => Team::Blue,
        }
    }

    /// Base color used when drawing this team's entities.
    pub fn color(self) -> Rgba {
        match self {
            Team::Blue => Rgba::new(0.25, 0.55, 1.0, 1.0),
            Team::Red => Rgba::new(1.0, 0.3, 0.25, 1.0),
        }
    }
}

/// Coarse battle lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattlePhase {
    /// Formations deployed, clock stopped.
    #[default]
    Setup,
    /// Simulation running.
    Battle,
    /// A side has been eliminated. Only `reset()` leaves this phase.
    Finished,
}

/// Result of a finished battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleOutcome {
    Victory(Team),
    /// Both sides eliminated on the same tick.
    Draw,
}

impl BattleOutcome {
    /// The winning team, if the battle did not end in a draw.
    pub fn winner(self) -> Option<Team> {
        match self {
            BattleOutcome::Victory(team) => Some(team),
            BattleOutcome::Draw => None,
        }
    }
}

/// Cosmetic projectile subtype, derived from the firing unit's traits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    Bullet,
    Laser,
    Missile,
    Plasma,
}

impl ProjectileKind {
    pub fn damage_type(self) -> DamageType {
        match self {
            ProjectileKind::Bullet => DamageType::Kinetic,
            ProjectileKind::Laser => DamageType::Energy,
            ProjectileKind::Missile => DamageType::Explosive,
            ProjectileKind::Plasma => DamageType::Plasma,
        }
    }
}

/// Attack subtype carried through damage application. Drives hit-effect color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageType {
    Kinetic,
    Energy,
    Explosive,
    Plasma,
    Melee,
    /// Strafing run from an interceptor drone.
    Drone,
}

impl DamageType {
    pub fn color(self) -> Rgba {
        match self {
            DamageType::Kinetic => Rgba::new(1.0, 0.85, 0.4, 1.0),
            DamageType::Energy => Rgba::new(0.4, 1.0, 1.0, 1.0),
            DamageType::Explosive => Rgba::new(1.0, 0.5, 0.1, 1.0),
            DamageType::Plasma => Rgba::new(0.8, 0.35, 1.0, 1.0),
            DamageType::Melee => Rgba::new(1.0, 1.0, 1.0, 1.0),
            DamageType::Drone => Rgba::new(0.6, 1.0, 0.4, 1.0),
        }
    }
}

/// Interceptor behavior state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterceptorState {
    /// Circling the parent carrier.
    #[default]
    Orbiting,
    /// Closing on or circling an enemy unit.
    Attacking,
    /// Target lost, flying back to the parent.
    Returning,
}

/// Morale bands with hysteresis between them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoraleState {
    #[default]
    Steady,
    Shaken,
    /// Fleeing; will not attack until rallied.
    Routing,
}

/// Capability flag carried by a unit class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitTrait {
    /// Heavy platform; fires missiles or plasma.
    Massive,
    /// High-tech platform; fires lasers or plasma.
    Advanced,
    /// Launches interceptor drones.
    Carrier,
}

impl UnitTrait {
    fn bit(self) -> u8 {
        match self {
            UnitTrait::Massive => 1 << 0,
            UnitTrait::Advanced => 1 << 1,
            UnitTrait::Carrier => 1 << 2,
        }
    }
}

/// Small bitset of [`UnitTrait`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<UnitTrait>", into = "Vec<UnitTrait>")]
pub struct TraitSet(u8);

impl TraitSet {
    pub const EMPTY: TraitSet = TraitSet(0);
    const ALL: [UnitTrait; 3] = [UnitTrait::Massive, UnitTrait::Advanced, UnitTrait::Carrier];

    pub fn with(mut self, t: UnitTrait) -> Self {
        self.insert(t);
        self
    }

    pub fn insert(&mut self, t: UnitTrait) {
        self.0 |= t.bit();
    }

    pub fn contains(self, t: UnitTrait) -> bool {
        self.0 & t.bit() != 0
    }

    pub fn iter(self) -> impl Iterator<Item = UnitTrait> {
        Self::ALL.into_iter().filter(move |t| self.contains(*t))
    }
}

impl FromIterator<UnitTrait> for TraitSet {
    fn from_iter<I: IntoIterator<Item = UnitTrait>>(iter: I) -> Self {
        let mut set = TraitSet::EMPTY;
        for t in iter {
            set.insert(t);
        }
        set
    }
}

impl From<Vec<UnitTrait>> for TraitSet {
    fn from(traits: Vec<UnitTrait>) -> Self {
        traits.into_iter().collect()
    }
}

impl From<TraitSet> for Vec<UnitTrait> {
    fn from(set: TraitSet) -> Self {
        set.iter().collect()
    }
}
