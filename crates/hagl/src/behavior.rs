//! Per-bullet behavior hooks.
//!
//! [`BulletBehavior`] is the pool's strategy seam: one behavior instance per
//! pool (not per bullet) decides what a bullet does each tick and how its
//! transient state is reset around activation. The pool calls the hooks at
//! fixed lifecycle points and never interprets bullet state itself.
//!
//! [`StandardBehavior`] is the default: integrate position by velocity,
//! expire on leaving the active rectangle, otherwise accumulate lifetime.

use crate::bullet::{Bullet, BulletState};
use crate::math::Rect;

/// Lifecycle hooks invoked by the pool, one implementor per pool instance.
pub trait BulletBehavior {
    /// The state stored in each slot.
    type Bullet: BulletState;

    /// One-time setup when the pool constructs a slot. Runs exactly once per
    /// slot, before any activation.
    fn init(&mut self, bullet: &mut Self::Bullet) {
        let _ = bullet;
    }

    /// Reset transient state when a slot is activated by obtain/spawn.
    fn activate(&mut self, bullet: &mut Self::Bullet);

    /// Teardown when a slot returns to the free partition.
    fn deactivate(&mut self, bullet: &mut Self::Bullet) {
        let _ = bullet;
    }

    /// Advance one bullet by `dt` seconds.
    ///
    /// Returns `true` when the bullet has expired and should be released.
    fn step(&mut self, bullet: &mut Self::Bullet, dt: f32, active_rect: Rect) -> bool;
}

/// Straight-line motion with rectangle expiry.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardBehavior;

impl BulletBehavior for StandardBehavior {
    type Bullet = Bullet;

    fn activate(&mut self, bullet: &mut Bullet) {
        bullet.lifetime = 0.0;
    }

    fn step(&mut self, bullet: &mut Bullet, dt: f32, active_rect: Rect) -> bool {
        bullet.transform.position += bullet.velocity * dt;

        if !active_rect.contains(bullet.transform.position) {
            return true;
        }

        bullet.lifetime += dt;
        false
    }
}
