//! Custom behavior — gravity-affected sparks.
//!
//! Replaces [`StandardBehavior`] with a caller-supplied [`BulletBehavior`]
//! that accelerates bullets downward each tick. Run with `RUST_LOG=info`.

use hagl::prelude::*;

/// Sparks fall under gravity and die when they leave the arena.
struct DriftBehavior {
    gravity: Vec2,
}

impl BulletBehavior for DriftBehavior {
    type Bullet = Bullet;

    fn activate(&mut self, bullet: &mut Bullet) {
        bullet.lifetime = 0.0;
    }

    fn step(&mut self, bullet: &mut Bullet, dt: f32, active_rect: Rect) -> bool {
        bullet.velocity += self.gravity * dt;
        bullet.transform.position += bullet.velocity * dt;

        if !active_rect.contains(bullet.transform.position) {
            return true;
        }

        bullet.lifetime += dt;
        false
    }
}

fn main() {
    env_logger::init();

    let arena = Rect::from_center_size(Vec2::ZERO, Vec2::new(800.0, 600.0));
    let mut pool = BulletPool::new(
        PoolConfig::new(256),
        BulletKit::new().with_fixed_bounds(arena),
        DriftBehavior {
            gravity: Vec2::new(0.0, -400.0),
        },
        Box::new(NullCanvas::default()),
        Box::new(NullCollision),
        Box::new(FixedView(arena)),
    )
    .expect("pool construction");

    // Launch a fan of sparks from the centre of the arena.
    for k in 0..24 {
        let angle = std::f32::consts::PI * (0.25 + 0.5 * k as f32 / 23.0);
        let id = pool.obtain();
        let velocity = Vec2::from_angle(angle) * 260.0;
        pool.set_property(id, "velocity", &serde_json::to_value(velocity).unwrap());
    }
    log::info!("launched {} sparks", pool.active_count());

    let mut frames = 0u32;
    while pool.active_count() > 0 {
        pool.tick(1.0 / 60.0);
        frames += 1;
    }
    log::info!("arena cleared after {frames} frames");
}
