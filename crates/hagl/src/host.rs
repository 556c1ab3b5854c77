//! Host-engine collaborators.
//!
//! The pool draws nothing and collides nothing by itself. At construction it
//! receives three narrow interfaces from the host engine and drives them at
//! fixed lifecycle points:
//!
//! - [`BulletCanvas`] — per-bullet draw items: created at pool construction,
//!   shown on activate, hidden on release, repositioned every tick.
//! - [`CollisionSpace`] — one shared collidable area: shapes appended at pool
//!   construction, enabled/disabled and repositioned symmetrically to the
//!   canvas calls.
//! - [`ViewportSource`] — the visible region used for expiry when the kit
//!   says [`ActiveBounds::Viewport`](crate::kit::ActiveBounds).
//!
//! `NullCanvas`, `NullCollision`, and `FixedView` are provided for headless
//! pools and tests.

use std::fmt;

use glam::Vec2;

use crate::kit::{Appearance, Color};
use crate::math::{Rect, Transform2d};

// ── Errors ──────────────────────────────────────────────────────────────

/// Errors reported by collaborators while the pool acquires its resources.
#[derive(Debug)]
pub enum HostError {
    /// The canvas could not allocate a draw item.
    Canvas(String),
    /// The collision space could not register a shape.
    Collision(String),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::Canvas(e) => write!(f, "canvas item allocation failed: {e}"),
            HostError::Collision(e) => write!(f, "collision shape registration failed: {e}"),
        }
    }
}

impl std::error::Error for HostError {}

// ── Canvas ──────────────────────────────────────────────────────────────

/// Identifier of one draw item owned by the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(pub u64);

/// Draw-side collaborator.
///
/// The pool creates one item per slot up front and keeps it for its whole
/// lifetime; visibility toggles with activation, never item churn.
pub trait BulletCanvas {
    /// Allocate one draw item, initially hidden. Called `capacity` times at
    /// pool construction and never again.
    fn create_item(&mut self, appearance: &Appearance) -> Result<ItemId, HostError>;

    /// Set the item's tint. Called once per item at construction.
    fn set_modulate(&mut self, item: ItemId, color: Color);

    /// Make the item visible with the pool's appearance.
    fn show(&mut self, item: ItemId, appearance: &Appearance);

    /// Hide the item.
    fn hide(&mut self, item: ItemId);

    /// Reposition the item. Called for every live bullet, every tick.
    fn set_transform(&mut self, item: ItemId, transform: Transform2d);

    /// Debug overlay text at a world position. Default: ignored.
    fn draw_label(&mut self, position: Vec2, text: &str) {
        let _ = (position, text);
    }

    /// Debug overlay marker at a world position. Default: ignored.
    fn draw_marker(&mut self, position: Vec2) {
        let _ = position;
    }

    /// Return an item to the canvas at pool teardown. Default: ignored.
    fn free_item(&mut self, item: ItemId) {
        let _ = item;
    }
}

/// A canvas that draws nothing. For headless pools and tests.
#[derive(Debug, Default)]
pub struct NullCanvas {
    next_item: u64,
}

impl BulletCanvas for NullCanvas {
    fn create_item(&mut self, _appearance: &Appearance) -> Result<ItemId, HostError> {
        let item = ItemId(self.next_item);
        self.next_item += 1;
        Ok(item)
    }

    fn set_modulate(&mut self, _item: ItemId, _color: Color) {}
    fn show(&mut self, _item: ItemId, _appearance: &Appearance) {}
    fn hide(&mut self, _item: ItemId) {}
    fn set_transform(&mut self, _item: ItemId, _transform: Transform2d) {}
}

// ── Collision ───────────────────────────────────────────────────────────

/// Collision-side collaborator wrapping one shared collidable area.
///
/// The pool appends exactly `capacity` shapes at construction and addresses
/// them by shape index afterwards. When several pools share one area, each
/// must own a disjoint index range (the `first_shape_index` contract); the
/// pool never touches a shape outside its own range.
pub trait CollisionSpace {
    /// Append one shape, initially disabled, to the shared area.
    fn add_shape(&mut self) -> Result<(), HostError>;

    /// Enable or disable a shape.
    fn set_shape_enabled(&mut self, shape_index: i32, enabled: bool);

    /// Reposition a shape. Called for every live bullet, every tick.
    fn set_shape_transform(&mut self, shape_index: i32, transform: Transform2d);
}

/// A collision space that registers nothing. For pools with collisions off.
#[derive(Debug, Default)]
pub struct NullCollision;

impl CollisionSpace for NullCollision {
    fn add_shape(&mut self) -> Result<(), HostError> {
        Ok(())
    }

    fn set_shape_enabled(&mut self, _shape_index: i32, _enabled: bool) {}
    fn set_shape_transform(&mut self, _shape_index: i32, _transform: Transform2d) {}
}

// ── Viewport ────────────────────────────────────────────────────────────

/// Supplies the visible region used for expiry testing.
///
/// Queried once per tick, before any bullet is stepped.
pub trait ViewportSource {
    /// The currently visible world-space rectangle.
    fn visible_rect(&self) -> Rect;
}

/// A viewport fixed to one rectangle. For headless pools and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedView(pub Rect);

impl ViewportSource for FixedView {
    fn visible_rect(&self) -> Rect {
        self.0
    }
}
