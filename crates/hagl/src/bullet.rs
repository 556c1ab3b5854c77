//! Bullet state and named-property dispatch.
//!
//! The pool stores one [`BulletState`] value per slot and never inspects it
//! beyond asking for its transform. Everything else — what fields a bullet
//! has, how they respond to spawn properties — belongs to the bullet type.
//!
//! Property dispatch is by name with [`serde_json::Value`] payloads, so
//! gameplay code (or data files) can say `{"velocity": [0, 240]}` without
//! knowing the concrete bullet type. Unknown names and wrong-shaped values
//! are rejected with `false`/`None`, never a panic.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::math::Transform2d;

/// Named properties applied by [`BulletPool::spawn`](crate::pool::BulletPool::spawn).
pub type PropertyMap = serde_json::Map<String, Value>;

/// State carried by each pool slot.
///
/// `Default` supplies the value every slot is constructed with, once, at pool
/// construction; activation resets are the behavior's job, not `Default`'s.
pub trait BulletState: Default {
    /// Current placement, pushed to the canvas and collision space each tick.
    fn transform(&self) -> Transform2d;

    /// Set a named field from a JSON value.
    ///
    /// Returns `false` for unknown names or values of the wrong shape, in
    /// which case the field is left untouched.
    fn set_named(&mut self, name: &str, value: &Value) -> bool;

    /// Read a named field as a JSON value, `None` for unknown names.
    fn get_named(&self, name: &str) -> Option<Value>;
}

/// The standard bullet: a transform, a velocity, and a lifetime clock.
///
/// Paired with [`StandardBehavior`](crate::behavior::StandardBehavior) this
/// gives straight-line motion with rectangle expiry. Custom bullet types
/// implement [`BulletState`] themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub transform: Transform2d,
    /// World units per second.
    pub velocity: Vec2,
    /// Seconds since activation.
    pub lifetime: f32,
}

impl Default for Bullet {
    fn default() -> Self {
        Self {
            transform: Transform2d::IDENTITY,
            velocity: Vec2::ZERO,
            lifetime: 0.0,
        }
    }
}

impl BulletState for Bullet {
    fn transform(&self) -> Transform2d {
        self.transform
    }

    fn set_named(&mut self, name: &str, value: &Value) -> bool {
        match name {
            "position" => set_vec2(&mut self.transform.position, value),
            "rotation" => set_f32(&mut self.transform.rotation, value),
            "scale" => set_vec2(&mut self.transform.scale, value),
            "velocity" => set_vec2(&mut self.velocity, value),
            "lifetime" => set_f32(&mut self.lifetime, value),
            _ => false,
        }
    }

    fn get_named(&self, name: &str) -> Option<Value> {
        match name {
            "position" => to_value(self.transform.position),
            "rotation" => to_value(self.transform.rotation),
            "scale" => to_value(self.transform.scale),
            "velocity" => to_value(self.velocity),
            "lifetime" => to_value(self.lifetime),
            _ => None,
        }
    }
}

fn set_vec2(field: &mut Vec2, value: &Value) -> bool {
    match serde_json::from_value::<Vec2>(value.clone()) {
        Ok(v) => {
            *field = v;
            true
        }
        Err(_) => false,
    }
}

fn set_f32(field: &mut f32, value: &Value) -> bool {
    match value.as_f64() {
        Some(v) => {
            *field = v as f32;
            true
        }
        None => false,
    }
}

fn to_value<T: Serialize>(value: T) -> Option<Value> {
    serde_json::to_value(value).ok()
}
