//! Bullet storm — a headless pool simulation.
//!
//! Emits a rotating ring of bullets every few frames and ticks the pool at a
//! fixed 60 Hz, logging occupancy once a second. Run with `RUST_LOG=info`.

use hagl::prelude::*;
use serde_json::json;

const DT: f32 = 1.0 / 60.0;

fn main() {
    env_logger::init();

    let arena = Rect::from_center_size(Vec2::ZERO, Vec2::splat(720.0));
    let mut pool = BulletPool::standard(
        PoolConfig::new(512),
        BulletKit::new().with_fixed_bounds(arena),
        Box::new(NullCanvas::default()),
        Box::new(NullCollision),
        Box::new(FixedView(arena)),
    )
    .expect("pool construction");

    let mut spawned = 0u32;
    for frame in 0..600u32 {
        // ── Emit: a ring of 12 bullets every 5 frames ──────────────────

        if frame % 5 == 0 {
            for k in 0..12 {
                let angle = std::f32::consts::TAU * k as f32 / 12.0 + frame as f32 * 0.02;
                let dir = Vec2::from_angle(angle);
                let mut props = PropertyMap::new();
                props.insert("position".into(), json!([0.0, 0.0]));
                props.insert("rotation".into(), json!(angle));
                props.insert(
                    "velocity".into(),
                    serde_json::to_value(dir * 180.0).unwrap(),
                );
                pool.spawn(&props);
                spawned += 1;
            }
        }

        // ── Tick: integrate, expire whatever left the arena ────────────

        let delta = pool.tick(DT);
        if frame % 60 == 0 {
            log::info!(
                "frame {frame}: active={} available={} tick_delta={delta}",
                pool.active_count(),
                pool.available(),
            );
        }
    }

    log::info!(
        "emitted {spawned} bullets, {} still in flight",
        pool.active_count()
    );
}
