//! Convenience re-exports — `use hagl::prelude::*` for the common items.

pub use crate::behavior::{BulletBehavior, StandardBehavior};
pub use crate::bullet::{Bullet, BulletState, PropertyMap};
pub use crate::handle::BulletId;
pub use crate::host::{
    BulletCanvas, CollisionSpace, FixedView, HostError, ItemId, NullCanvas, NullCollision,
    ViewportSource,
};
pub use crate::kit::{ActiveBounds, Appearance, BulletKit, Color, UniqueModulate};
pub use crate::math::{Rect, Transform2d, Vec2};
#[cfg(feature = "diagnostics")]
pub use crate::pool::PoolStats;
pub use crate::pool::{BulletPool, PoolConfig, PoolError};
