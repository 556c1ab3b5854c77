//! Per-pool bullet parameters.
//!
//! A [`BulletKit`] describes one family of bullets: how they look, whether
//! they collide, and which rectangle keeps them alive. The pool forwards the
//! visual parameters to the canvas collaborator without interpreting them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::math::Rect;

/// An RGBA color with floating-point components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };
    pub const BLACK: Self = Self { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };

    /// Create a color from RGB (alpha = 1).
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color from RGBA.
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Which channel of the modulate color varies per bullet.
///
/// With anything but `None`, neighbouring bullets of one pool get visibly
/// different tints, which makes dense patterns readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UniqueModulate {
    #[default]
    None,
    Red,
    Green,
    Blue,
    Alpha,
}

/// Visual parameters forwarded to the canvas collaborator.
///
/// Opaque to the pool's slot management — only `modulate_for` is computed
/// here, everything else is pass-through.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
    /// On-screen size of one bullet, in world units.
    pub size: Vec2,
    pub modulate: Color,
    pub unique_modulate: UniqueModulate,
    /// Draw-order bias for the whole pool.
    pub z_index: i32,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            size: Vec2::splat(8.0),
            modulate: Color::WHITE,
            unique_modulate: UniqueModulate::None,
            z_index: 0,
        }
    }
}

impl Appearance {
    /// Modulate color for one bullet.
    ///
    /// The configured channel is replaced with a value derived from the shape
    /// index, spread over [0, 1) by a fixed irrational-ish stride.
    pub fn modulate_for(&self, shape_index: i32) -> Color {
        let mut color = self.modulate;
        let unique = (shape_index as f32 * 0.7213).fract();
        match self.unique_modulate {
            UniqueModulate::None => {}
            UniqueModulate::Red => color.r = unique,
            UniqueModulate::Green => color.g = unique,
            UniqueModulate::Blue => color.b = unique,
            UniqueModulate::Alpha => color.a = unique,
        }
        color
    }
}

/// Where the expiry rectangle comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActiveBounds {
    /// A caller-fixed rectangle.
    Fixed(Rect),
    /// The viewport collaborator's visible rect, refreshed every tick.
    Viewport,
}

/// Per-pool parameters: appearance, collision toggle, and expiry bounds.
#[derive(Debug, Clone, Copy)]
pub struct BulletKit {
    pub appearance: Appearance,
    /// Toggles every call into the collision collaborator.
    pub collisions_enabled: bool,
    pub bounds: ActiveBounds,
}

impl BulletKit {
    /// A kit with default appearance, collisions off, viewport bounds.
    pub fn new() -> Self {
        Self {
            appearance: Appearance::default(),
            collisions_enabled: false,
            bounds: ActiveBounds::Viewport,
        }
    }

    pub fn with_appearance(mut self, appearance: Appearance) -> Self {
        self.appearance = appearance;
        self
    }

    pub fn with_collisions(mut self, enabled: bool) -> Self {
        self.collisions_enabled = enabled;
        self
    }

    /// Expire bullets against a fixed rectangle instead of the viewport.
    pub fn with_fixed_bounds(mut self, rect: Rect) -> Self {
        self.bounds = ActiveBounds::Fixed(rect);
        self
    }

    /// Expire bullets against the viewport's visible rect (the default).
    pub fn with_viewport_bounds(mut self) -> Self {
        self.bounds = ActiveBounds::Viewport;
        self
    }
}

impl Default for BulletKit {
    fn default() -> Self {
        Self::new()
    }
}
