//! # hagl — Fixed-Capacity Bullet Pool
//!
//! A pool for the short-lived, high-frequency projectiles of 2D bullet-storm
//! games. All slots are allocated once at construction; afterwards obtain and
//! release are O(1) swaps with zero heap traffic, and a per-tick pass touches
//! only the live partition of the array.
//!
//! Handles are generational: releasing a bullet bumps its slot's cycle
//! counter, so any handle observed before the release fails validation
//! instead of silently pointing at a recycled bullet.
//!
//! The pool draws nothing and collides nothing by itself — it drives three
//! narrow host interfaces ([`host::BulletCanvas`], [`host::CollisionSpace`],
//! [`host::ViewportSource`]) at documented lifecycle points.
//!
//! Start with `use hagl::prelude::*` and build a [`BulletPool`](pool::BulletPool).

pub mod behavior;
pub mod bullet;
pub mod handle;
pub mod host;
pub mod kit;
pub mod math;
pub mod pool;
pub mod prelude;
