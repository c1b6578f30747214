//! Hit effect countdown. Purely visual.

use hecs::World;

use skirmish_core::components::HitEffect;

pub fn run(world: &mut World, dt: f64) {
    for (_entity, effect) in world.query_mut::<&mut HitEffect>() {
        effect.remaining_secs -= dt;
        for particle in &mut effect.particles {
            particle.offset += particle.velocity * dt;
        }
    }
}
