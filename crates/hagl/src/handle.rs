//! Bullet handles — stable identity across slot reuse.
//!
//! A [`BulletId`] pairs a bullet's externally stable shape index with the
//! cycle counter its slot carried when the handle was issued. Slots are
//! recycled constantly, so an index alone would go stale the moment its
//! bullet expires and a new one takes the slot:
//!
//! ```text
//! BulletId { index: 5, cycle: 0 }  ← issued by obtain()
//! BulletId { index: 5, cycle: 1 }  ← issued after the slot was recycled
//! ```
//!
//! The stale handle still says `cycle: 0`, so validation fails safely instead
//! of touching the wrong bullet. Only the pool that issued a handle can judge
//! it — see [`BulletPool::is_valid`](crate::pool::BulletPool::is_valid).

use std::fmt;

/// A lightweight handle to a bullet in a [`BulletPool`](crate::pool::BulletPool).
///
/// Issued by `obtain` and `handle_from_shape`. Copyable, hashable, and safe
/// to hold across frames: once the bullet is released the handle validates
/// as stale rather than aliasing its successor.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BulletId {
    pub(crate) index: i32,
    pub(crate) cycle: u32,
}

impl BulletId {
    /// The sentinel returned when a pool is exhausted or a lookup fails.
    pub const INVALID: Self = Self {
        index: -1,
        cycle: u32::MAX,
    };

    pub(crate) const fn new(index: i32, cycle: u32) -> Self {
        Self { index, cycle }
    }

    /// The shape index this handle refers to, `-1` for the sentinel.
    pub const fn shape_index(self) -> i32 {
        self.index
    }

    /// The cycle the slot carried when this handle was issued.
    pub const fn cycle(self) -> u32 {
        self.cycle
    }

    /// Whether this is the invalid sentinel.
    ///
    /// A non-sentinel handle may still be stale — ask the pool's `is_valid`.
    pub const fn is_sentinel(self) -> bool {
        self.index < 0
    }
}

impl fmt::Debug for BulletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sentinel() {
            write!(f, "BulletId(invalid)")
        } else {
            write!(f, "BulletId({}c{})", self.index, self.cycle)
        }
    }
}

impl fmt::Display for BulletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sentinel() {
            write!(f, "invalid")
        } else {
            write!(f, "{}c{}", self.index, self.cycle)
        }
    }
}
