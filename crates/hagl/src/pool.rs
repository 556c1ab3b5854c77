//! The bullet pool — partitioned slots, an indirection table, and
//! generational handles.
//!
//! ## Memory layout
//!
//! ```text
//! slots:        [ f  f  f | a  a  a  a  a ]     f = free, a = active
//!                         ^ available
//! indirection:  [ 4, 0, 7, ... ]                shape index − first → position
//! ```
//!
//! Every slot is constructed once, up front. Obtain takes the slot at
//! `available − 1` — the most recently freed one, still warm in cache — and
//! release swaps the departing slot with the first active one, so both
//! partitions stay contiguous. Each swap updates the indirection table, which
//! is the only valid route from a shape index to a slot.
//!
//! A slot's cycle counter bumps on every release. Handles carry the cycle
//! they were issued with, so anything observed before a release — a handle
//! kept across frames, a shape index reported by the collision system —
//! validates as stale instead of touching the recycled slot.
//!
//! ## Example
//!
//! ```ignore
//! use hagl::prelude::*;
//!
//! let arena = Rect::from_center_size(Vec2::ZERO, Vec2::splat(720.0));
//! let mut pool = BulletPool::standard(
//!     PoolConfig::new(2048),
//!     BulletKit::new().with_fixed_bounds(arena),
//!     Box::new(NullCanvas::default()),
//!     Box::new(NullCollision),
//!     Box::new(FixedView(arena)),
//! )?;
//!
//! let id = pool.obtain();
//! pool.set_property(id, "velocity", &serde_json::json!([0.0, 240.0]));
//! let delta = pool.tick(1.0 / 60.0);
//! ```

use std::fmt;

use glam::Vec2;
use serde_json::Value;

use crate::behavior::{BulletBehavior, StandardBehavior};
use crate::bullet::{BulletState, PropertyMap};
use crate::handle::BulletId;
use crate::host::{BulletCanvas, CollisionSpace, HostError, ItemId, ViewportSource};
use crate::kit::{ActiveBounds, BulletKit};
use crate::math::Rect;

// ── Errors ──────────────────────────────────────────────────────────────

/// Errors that abort pool construction. There is no partial pool: `new`
/// either returns a fully resourced pool or one of these.
#[derive(Debug)]
pub enum PoolError {
    /// Capacity must be at least 1.
    ZeroCapacity,
    /// The shape index range `[first, first + capacity)` must lie in `0..i32::MAX`.
    ShapeRange { first: i32, capacity: usize },
    /// A collaborator failed to acquire a resource.
    Host(HostError),
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::ZeroCapacity => write!(f, "bullet pool capacity must be at least 1"),
            PoolError::ShapeRange { first, capacity } => write!(
                f,
                "shape index range starting at {first} with capacity {capacity} does not fit in 0..i32::MAX"
            ),
            PoolError::Host(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for PoolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PoolError::Host(e) => Some(e),
            _ => None,
        }
    }
}

impl From<HostError> for PoolError {
    fn from(e: HostError) -> Self {
        PoolError::Host(e)
    }
}

// ── Config ──────────────────────────────────────────────────────────────

/// Parameters fixed for the pool's whole lifetime.
#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    /// Number of slots, allocated once at construction.
    pub capacity: usize,
    /// First shape index this pool owns. The pool addresses collision shapes
    /// `[first_shape_index, first_shape_index + capacity)` of the shared
    /// area; pools sharing an area must use disjoint ranges.
    pub first_shape_index: i32,
}

impl PoolConfig {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            first_shape_index: 0,
        }
    }

    pub fn with_first_shape_index(mut self, index: i32) -> Self {
        self.first_shape_index = index;
        self
    }
}

// ── Slots ───────────────────────────────────────────────────────────────

struct Slot<T> {
    /// Externally stable index, assigned at construction; follows the slot
    /// as it moves through the array.
    shape_index: i32,
    /// Bumped on every release; outstanding handles carry the old value.
    cycle: u32,
    /// Draw item owned by the canvas, held for the pool's whole lifetime.
    item: ItemId,
    bullet: T,
}

impl<T> Slot<T> {
    /// Invalidate every outstanding handle to this slot.
    ///
    /// Wrapping is accepted: a stale handle is falsely revalidated only if
    /// its slot is recycled exactly 2^32 times while the handle is retained.
    fn retire(&mut self) {
        self.cycle = self.cycle.wrapping_add(1);
    }
}

// ── Pool ────────────────────────────────────────────────────────────────

/// A fixed-capacity bullet pool.
///
/// Generic over a [`BulletBehavior`] supplied per pool instance;
/// [`StandardBehavior`] (straight-line motion, rectangle expiry) is the
/// default. See the module docs for the slot layout and handle contract.
///
/// Not thread-safe: one pool belongs to one logical thread.
pub struct BulletPool<B: BulletBehavior = StandardBehavior> {
    config: PoolConfig,
    kit: BulletKit,
    behavior: B,
    canvas: Box<dyn BulletCanvas>,
    collision: Box<dyn CollisionSpace>,
    viewport: Box<dyn ViewportSource>,
    /// `[0, available)` is free, `[available, capacity)` is active.
    slots: Box<[Slot<B::Bullet>]>,
    /// shape index − first → current position in `slots`.
    indirection: Box<[usize]>,
    available: usize,
    /// Always `capacity - available`, kept for cheap reads.
    active: usize,
    /// Expiry rectangle, refreshed at the start of each tick.
    active_rect: Rect,
}

impl BulletPool<StandardBehavior> {
    /// Construct a pool with the standard straight-line behavior.
    pub fn standard(
        config: PoolConfig,
        kit: BulletKit,
        canvas: Box<dyn BulletCanvas>,
        collision: Box<dyn CollisionSpace>,
        viewport: Box<dyn ViewportSource>,
    ) -> Result<Self, PoolError> {
        Self::new(config, kit, StandardBehavior, canvas, collision, viewport)
    }
}

impl<B: BulletBehavior> BulletPool<B> {
    /// Construct a pool, acquiring every per-slot resource up front.
    ///
    /// One draw item per slot (and one collision shape, when the kit enables
    /// collisions) is acquired here and never again. On collaborator failure
    /// the already-created items are returned and the error is propagated —
    /// there is no partially resourced pool.
    pub fn new(
        config: PoolConfig,
        kit: BulletKit,
        mut behavior: B,
        mut canvas: Box<dyn BulletCanvas>,
        mut collision: Box<dyn CollisionSpace>,
        viewport: Box<dyn ViewportSource>,
    ) -> Result<Self, PoolError> {
        if config.capacity == 0 {
            return Err(PoolError::ZeroCapacity);
        }
        let range_end = i32::try_from(config.capacity)
            .ok()
            .and_then(|c| config.first_shape_index.checked_add(c));
        if config.first_shape_index < 0 || range_end.is_none() {
            return Err(PoolError::ShapeRange {
                first: config.first_shape_index,
                capacity: config.capacity,
            });
        }

        let mut slots: Vec<Slot<B::Bullet>> = Vec::with_capacity(config.capacity);
        for i in 0..config.capacity {
            let shape_index = config.first_shape_index + i as i32;

            let item = match canvas.create_item(&kit.appearance) {
                Ok(item) => item,
                Err(e) => {
                    free_items(canvas.as_mut(), &slots);
                    return Err(e.into());
                }
            };
            canvas.set_modulate(item, kit.appearance.modulate_for(shape_index));

            if kit.collisions_enabled {
                if let Err(e) = collision.add_shape() {
                    canvas.free_item(item);
                    free_items(canvas.as_mut(), &slots);
                    return Err(e.into());
                }
            }

            let mut bullet = B::Bullet::default();
            behavior.init(&mut bullet);
            slots.push(Slot {
                shape_index,
                cycle: 0,
                item,
                bullet,
            });
        }
        let indirection: Box<[usize]> = (0..config.capacity).collect();

        log::info!(
            "bullet pool ready: capacity={}, shapes {}..{}",
            config.capacity,
            config.first_shape_index,
            config.first_shape_index + config.capacity as i32
        );

        Ok(Self {
            config,
            kit,
            behavior,
            canvas,
            collision,
            viewport,
            available: config.capacity,
            active: 0,
            active_rect: Rect::EVERYTHING,
            slots: slots.into_boxed_slice(),
            indirection,
        })
    }

    // ── Obtain / spawn ──────────────────────────────────────────────

    /// Activate one bullet and return its handle.
    ///
    /// Returns [`BulletId::INVALID`] when every slot is active. O(1), no
    /// allocation.
    pub fn obtain(&mut self) -> BulletId {
        self.activate_next(None)
    }

    /// Activate one bullet and apply a map of named properties to it before
    /// the activation hook runs.
    ///
    /// Fire-and-forget: an exhausted pool spawns nothing. Callers that need
    /// the handle use [`obtain`](Self::obtain) plus
    /// [`set_property`](Self::set_property).
    pub fn spawn(&mut self, properties: &PropertyMap) {
        self.activate_next(Some(properties));
    }

    fn activate_next(&mut self, properties: Option<&PropertyMap>) -> BulletId {
        if self.available == 0 {
            return BulletId::INVALID;
        }
        self.available -= 1;
        self.active += 1;

        let slot = &mut self.slots[self.available];
        if self.kit.collisions_enabled {
            self.collision.set_shape_enabled(slot.shape_index, true);
        }
        if let Some(properties) = properties {
            for (name, value) in properties {
                if !slot.bullet.set_named(name, value) {
                    log::debug!("spawn: unknown bullet property {name:?}");
                }
            }
        }
        self.behavior.activate(&mut slot.bullet);
        self.canvas.show(slot.item, &self.kit.appearance);

        BulletId::new(slot.shape_index, slot.cycle)
    }

    // ── Release ─────────────────────────────────────────────────────

    /// Release a bullet by handle.
    ///
    /// Returns `false` — with no observable effect — for the sentinel, an
    /// out-of-range index, a freed slot, or a cycle mismatch. Releasing a
    /// handle twice is routine, not a fault.
    pub fn release(&mut self, id: BulletId) -> bool {
        match self.position_of(id) {
            Some(position) => {
                self.release_at(position);
                true
            }
            None => false,
        }
    }

    /// Release the slot at an already-resolved position. Caller guarantees
    /// the position lies in the active partition.
    fn release_at(&mut self, position: usize) {
        let slot = &mut self.slots[position];
        if self.kit.collisions_enabled {
            self.collision.set_shape_enabled(slot.shape_index, false);
        }
        self.canvas.hide(slot.item);
        self.behavior.deactivate(&mut slot.bullet);
        slot.retire();

        // Swap the departing slot with the first active one so the free
        // partition stays contiguous; the indirection entries of the two
        // shape indices trade places with them.
        let first = self.config.first_shape_index;
        let boundary = self.available;
        let a = (self.slots[position].shape_index - first) as usize;
        let b = (self.slots[boundary].shape_index - first) as usize;
        self.indirection.swap(a, b);
        self.slots.swap(position, boundary);

        self.available += 1;
        self.active -= 1;
    }

    // ── Lookup / validation ─────────────────────────────────────────

    /// Whether a handle still refers to the live bullet it was issued for.
    pub fn is_valid(&self, id: BulletId) -> bool {
        self.position_of(id).is_some()
    }

    /// Handle for whatever bullet currently occupies `shape_index`.
    ///
    /// Translates an externally observed index — typically reported by the
    /// collision system — back into a checkable handle. Returns
    /// [`BulletId::INVALID`] when the index is outside this pool's range or
    /// its slot is currently free.
    pub fn handle_from_shape(&self, shape_index: i32) -> BulletId {
        let first = self.config.first_shape_index;
        if shape_index < first || shape_index >= first + self.slots.len() as i32 {
            return BulletId::INVALID;
        }
        let position = self.indirection[(shape_index - first) as usize];
        if position < self.available {
            return BulletId::INVALID;
        }
        BulletId::new(shape_index, self.slots[position].cycle)
    }

    /// Resolve a handle to its array position, applying the full validity
    /// contract: in-range index, active slot, matching cycle.
    fn position_of(&self, id: BulletId) -> Option<usize> {
        let first = self.config.first_shape_index;
        if id.index < first || id.index >= first + self.slots.len() as i32 {
            return None;
        }
        let position = self.indirection[(id.index - first) as usize];
        if position >= self.available && self.slots[position].cycle == id.cycle {
            Some(position)
        } else {
            None
        }
    }

    // ── Tick ────────────────────────────────────────────────────────

    /// Advance every active bullet by `dt` seconds.
    ///
    /// Refreshes the expiry rectangle, steps each live bullet through the
    /// behavior exactly once, releases the expired ones in place, and pushes
    /// surviving transforms to the canvas and collision space. Free slots are
    /// never touched.
    ///
    /// Returns the net change in active count caused by this tick — zero or
    /// negative. The pool reports expirations; obtains between ticks are the
    /// caller's to count.
    pub fn tick(&mut self, dt: f32) -> i32 {
        self.active_rect = match self.kit.bounds {
            ActiveBounds::Fixed(rect) => rect,
            ActiveBounds::Viewport => self.viewport.visible_rect(),
        };

        let mut delta = 0;
        // Walk the active partition from the top, stepping down only when a
        // bullet survives. Releasing swaps the first active slot into the
        // current position, and that bullet has not been stepped yet — so the
        // same position is re-tested after every release.
        let mut i = self.slots.len();
        while i > self.available {
            let position = i - 1;
            let slot = &mut self.slots[position];
            if self.behavior.step(&mut slot.bullet, dt, self.active_rect) {
                self.release_at(position);
                delta -= 1;
                continue;
            }

            let transform = slot.bullet.transform();
            self.canvas.set_transform(slot.item, transform);
            if self.kit.collisions_enabled {
                self.collision.set_shape_transform(slot.shape_index, transform);
            }
            i -= 1;
        }
        delta
    }

    // ── Properties ──────────────────────────────────────────────────

    /// Read a named property of a live bullet. Stale handles and unknown
    /// names yield `None`.
    pub fn get_property(&self, id: BulletId, name: &str) -> Option<Value> {
        let position = self.position_of(id)?;
        self.slots[position].bullet.get_named(name)
    }

    /// Write a named property of a live bullet. Stale handles and unknown
    /// names are ignored.
    pub fn set_property(&mut self, id: BulletId, name: &str, value: &Value) {
        if let Some(position) = self.position_of(id) {
            self.slots[position].bullet.set_named(name, value);
        }
    }

    // ── Debug overlay ───────────────────────────────────────────────

    /// Draw each active bullet's shape index next to it, plus a marker on its
    /// collision shape when collisions are enabled. Uses the canvas overlay
    /// hooks, which default to no-ops.
    pub fn debug_draw(&mut self) {
        for position in self.available..self.slots.len() {
            let slot = &self.slots[position];
            let origin = slot.bullet.transform().position;
            self.canvas
                .draw_label(origin + Vec2::new(4.0, 2.0), &slot.shape_index.to_string());
            if self.kit.collisions_enabled {
                self.canvas.draw_marker(origin);
            }
        }
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Slots currently free.
    pub fn available(&self) -> usize {
        self.available
    }

    /// Bullets currently live.
    pub fn active_count(&self) -> usize {
        self.active
    }

    pub fn first_shape_index(&self) -> i32 {
        self.config.first_shape_index
    }

    pub fn kit(&self) -> &BulletKit {
        &self.kit
    }

    /// The pool's behavior instance, for callers that keep state there.
    pub fn behavior(&self) -> &B {
        &self.behavior
    }

    pub fn behavior_mut(&mut self) -> &mut B {
        &mut self.behavior
    }
}

impl<B: BulletBehavior> fmt::Debug for BulletPool<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BulletPool")
            .field("capacity", &self.slots.len())
            .field("available", &self.available)
            .field("active", &self.active)
            .field("first_shape_index", &self.config.first_shape_index)
            .finish()
    }
}

impl<B: BulletBehavior> Drop for BulletPool<B> {
    /// Slots are never destroyed individually; teardown returns every draw
    /// item to the canvas in one pass.
    fn drop(&mut self) {
        for position in 0..self.slots.len() {
            let item = self.slots[position].item;
            self.canvas.free_item(item);
        }
    }
}

fn free_items<T>(canvas: &mut dyn BulletCanvas, slots: &[Slot<T>]) {
    for slot in slots {
        canvas.free_item(slot.item);
    }
}

// ── Diagnostics ─────────────────────────────────────────────────────────

/// A point-in-time snapshot of pool occupancy, serializable for telemetry.
#[cfg(feature = "diagnostics")]
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct PoolStats {
    pub capacity: usize,
    pub available: usize,
    pub active: usize,
    pub first_shape_index: i32,
}

#[cfg(feature = "diagnostics")]
impl<B: BulletBehavior> BulletPool<B> {
    /// Snapshot occupancy counters for telemetry.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            capacity: self.slots.len(),
            available: self.available,
            active: self.active,
            first_shape_index: self.config.first_shape_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde_json::{Value, json};

    use super::*;
    use crate::host::{FixedView, NullCanvas, NullCollision};
    use crate::kit::{Appearance, Color};
    use crate::math::Transform2d;

    fn arena() -> Rect {
        Rect::from_center_size(Vec2::ZERO, Vec2::splat(400.0))
    }

    fn standard_pool(capacity: usize) -> BulletPool {
        BulletPool::standard(
            PoolConfig::new(capacity),
            BulletKit::new().with_fixed_bounds(arena()),
            Box::new(NullCanvas::default()),
            Box::new(NullCollision),
            Box::new(FixedView(arena())),
        )
        .unwrap()
    }

    // ── Recording collaborators ─────────────────────────────────────

    #[derive(Debug, Clone, PartialEq)]
    enum HostEvent {
        ItemCreated(u64),
        Modulated(u64),
        Shown(u64),
        Hidden(u64),
        ItemMoved(u64),
        ItemFreed(u64),
        Labeled(String),
        ShapeAdded,
        ShapeEnabled(i32, bool),
        ShapeMoved(i32),
    }

    type EventLog = Rc<RefCell<Vec<HostEvent>>>;

    #[derive(Default)]
    struct RecordingCanvas {
        log: EventLog,
        next_item: u64,
        fail_after: Option<u64>,
    }

    impl BulletCanvas for RecordingCanvas {
        fn create_item(&mut self, _appearance: &Appearance) -> Result<ItemId, HostError> {
            if self.fail_after.is_some_and(|n| self.next_item >= n) {
                return Err(HostError::Canvas("out of items".into()));
            }
            let item = ItemId(self.next_item);
            self.next_item += 1;
            self.log.borrow_mut().push(HostEvent::ItemCreated(item.0));
            Ok(item)
        }

        fn set_modulate(&mut self, item: ItemId, _color: Color) {
            self.log.borrow_mut().push(HostEvent::Modulated(item.0));
        }

        fn show(&mut self, item: ItemId, _appearance: &Appearance) {
            self.log.borrow_mut().push(HostEvent::Shown(item.0));
        }

        fn hide(&mut self, item: ItemId) {
            self.log.borrow_mut().push(HostEvent::Hidden(item.0));
        }

        fn set_transform(&mut self, item: ItemId, _transform: Transform2d) {
            self.log.borrow_mut().push(HostEvent::ItemMoved(item.0));
        }

        fn draw_label(&mut self, _position: Vec2, text: &str) {
            self.log.borrow_mut().push(HostEvent::Labeled(text.to_string()));
        }

        fn free_item(&mut self, item: ItemId) {
            self.log.borrow_mut().push(HostEvent::ItemFreed(item.0));
        }
    }

    struct RecordingCollision {
        log: EventLog,
    }

    impl CollisionSpace for RecordingCollision {
        fn add_shape(&mut self) -> Result<(), HostError> {
            self.log.borrow_mut().push(HostEvent::ShapeAdded);
            Ok(())
        }

        fn set_shape_enabled(&mut self, shape_index: i32, enabled: bool) {
            self.log
                .borrow_mut()
                .push(HostEvent::ShapeEnabled(shape_index, enabled));
        }

        fn set_shape_transform(&mut self, shape_index: i32, _transform: Transform2d) {
            self.log.borrow_mut().push(HostEvent::ShapeMoved(shape_index));
        }
    }

    struct SharedView(Rc<RefCell<Rect>>);

    impl ViewportSource for SharedView {
        fn visible_rect(&self) -> Rect {
            *self.0.borrow()
        }
    }

    // ── A behavior that counts its own steps ────────────────────────

    #[derive(Default)]
    struct Probe {
        steps: u32,
        expire_on: Option<u32>,
    }

    impl BulletState for Probe {
        fn transform(&self) -> Transform2d {
            Transform2d::IDENTITY
        }

        fn set_named(&mut self, name: &str, value: &Value) -> bool {
            if name == "expire_on" {
                self.expire_on = value.as_u64().map(|n| n as u32);
                true
            } else {
                false
            }
        }

        fn get_named(&self, name: &str) -> Option<Value> {
            (name == "steps").then(|| Value::from(self.steps))
        }
    }

    struct ProbeBehavior;

    impl BulletBehavior for ProbeBehavior {
        type Bullet = Probe;

        fn activate(&mut self, bullet: &mut Probe) {
            bullet.steps = 0;
            bullet.expire_on = None;
        }

        fn step(&mut self, bullet: &mut Probe, _dt: f32, _active_rect: Rect) -> bool {
            bullet.steps += 1;
            bullet.expire_on.is_some_and(|n| bullet.steps >= n)
        }
    }

    // ── Obtain / release ────────────────────────────────────────────

    #[test]
    fn capacity_four_walkthrough() {
        let mut pool = standard_pool(4);
        let ids: Vec<BulletId> = (0..4).map(|_| pool.obtain()).collect();
        assert!(ids.iter().all(|id| pool.is_valid(*id)));
        assert_eq!(pool.available(), 0);

        let fifth = pool.obtain();
        assert_eq!(fifth, BulletId::INVALID);
        assert_eq!(fifth.shape_index(), -1);

        assert!(pool.release(ids[2]));
        assert_eq!(pool.available(), 1);
        assert_eq!(pool.active_count(), 3);

        let again = pool.obtain();
        assert_eq!(again.shape_index(), ids[2].shape_index()); // same slot back
        assert_eq!(again.cycle(), ids[2].cycle() + 1); // one recycle later
        assert!(!pool.is_valid(ids[2]));
        assert!(pool.is_valid(again));
    }

    #[test]
    fn obtain_reuses_the_most_recently_freed_slot() {
        let mut pool = standard_pool(4);
        let a = pool.obtain();
        let _b = pool.obtain();
        assert!(pool.release(a));

        let c = pool.obtain();
        assert_eq!(c.shape_index(), a.shape_index());
    }

    #[test]
    fn release_rejects_stale_and_foreign_handles() {
        let mut pool = standard_pool(3);
        let id = pool.obtain();
        assert!(pool.release(id));

        let live = pool.obtain();
        let available = pool.available();
        let active = pool.active_count();

        assert!(!pool.release(id)); // double release
        assert!(!pool.release(BulletId::new(live.shape_index(), live.cycle() + 1))); // cycle mismatch
        assert!(!pool.release(BulletId::new(99, 0))); // out of range
        assert!(!pool.release(BulletId::new(-3, 0)));
        assert!(!pool.release(BulletId::INVALID));

        assert_eq!(pool.available(), available);
        assert_eq!(pool.active_count(), active);
        assert!(pool.is_valid(live));
    }

    #[test]
    fn full_recycle_bumps_every_cycle() {
        let mut pool = standard_pool(4);
        let first: Vec<BulletId> = (0..4).map(|_| pool.obtain()).collect();
        for id in &first {
            assert!(pool.release(*id));
        }

        let second: Vec<BulletId> = (0..4).map(|_| pool.obtain()).collect();
        assert_eq!(pool.active_count(), 4);
        for id in &first {
            assert!(!pool.is_valid(*id));
        }
        for new in &second {
            let old = first
                .iter()
                .find(|o| o.shape_index() == new.shape_index())
                .unwrap();
            assert_eq!(new.cycle(), old.cycle() + 1);
        }
    }

    #[test]
    fn partition_and_indirection_stay_consistent_under_churn() {
        let mut pool = standard_pool(8);
        let mut live: Vec<BulletId> = Vec::new();

        for round in 0..50usize {
            if round % 3 != 0 || live.is_empty() {
                let id = pool.obtain();
                if !id.is_sentinel() {
                    live.push(id);
                }
            } else {
                let id = live.remove(round % live.len());
                assert!(pool.release(id));
            }

            assert_eq!(pool.available() + pool.active_count(), pool.capacity());
            // every shape index resolves to the slot that carries it
            for offset in 0..pool.capacity() {
                let position = pool.indirection[offset];
                assert_eq!(pool.slots[position].shape_index, offset as i32);
            }
            for id in &live {
                assert!(pool.is_valid(*id));
            }
        }
    }

    // ── Lookup ──────────────────────────────────────────────────────

    #[test]
    fn handle_from_shape_reflects_occupancy() {
        let mut pool = standard_pool(3);
        assert_eq!(pool.handle_from_shape(0), BulletId::INVALID); // free slot
        assert_eq!(pool.handle_from_shape(7), BulletId::INVALID); // out of range
        assert_eq!(pool.handle_from_shape(-2), BulletId::INVALID);

        let id = pool.obtain();
        let looked_up = pool.handle_from_shape(id.shape_index());
        assert_eq!(looked_up, id);
        assert!(pool.is_valid(looked_up));

        assert!(pool.release(id));
        assert_eq!(pool.handle_from_shape(id.shape_index()), BulletId::INVALID);
    }

    // ── Tick ────────────────────────────────────────────────────────

    #[test]
    fn tick_reports_expiries_as_negative_delta() {
        let mut pool = standard_pool(6);
        for _ in 0..6 {
            let id = pool.obtain();
            pool.set_property(id, "velocity", &json!([5000.0, 0.0]));
        }

        assert_eq!(pool.tick(1.0), -6);
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.available(), 6);
    }

    #[test]
    fn tick_moves_survivors_and_keeps_them_valid() {
        let mut pool = standard_pool(2);
        let id = pool.obtain();
        pool.set_property(id, "velocity", &json!([10.0, 0.0]));

        assert_eq!(pool.tick(0.5), 0);
        assert!(pool.is_valid(id));
        assert_eq!(pool.get_property(id, "position"), Some(json!([5.0, 0.0])));
        assert_eq!(pool.get_property(id, "lifetime"), Some(json!(0.5)));
    }

    #[test]
    fn tick_steps_every_bullet_exactly_once_despite_swaps() {
        let mut pool = BulletPool::new(
            PoolConfig::new(6),
            BulletKit::new().with_fixed_bounds(arena()),
            ProbeBehavior,
            Box::new(NullCanvas::default()),
            Box::new(NullCollision),
            Box::new(FixedView(arena())),
        )
        .unwrap();

        let ids: Vec<BulletId> = (0..6).map(|_| pool.obtain()).collect();
        // Expire the two bullets the walk visits first; the swaps move
        // not-yet-stepped bullets into their positions, which must be
        // re-tested rather than skipped.
        pool.set_property(ids[0], "expire_on", &json!(1));
        pool.set_property(ids[1], "expire_on", &json!(1));

        assert_eq!(pool.tick(0.016), -2);
        assert_eq!(pool.active_count(), 4);
        assert!(!pool.is_valid(ids[0]));
        assert!(!pool.is_valid(ids[1]));
        for id in &ids[2..] {
            assert!(pool.is_valid(*id));
            assert_eq!(pool.get_property(*id, "steps"), Some(json!(1)));
        }
    }

    #[test]
    fn viewport_bounds_refresh_every_tick() {
        let view = Rc::new(RefCell::new(Rect::from_center_size(
            Vec2::ZERO,
            Vec2::splat(1000.0),
        )));
        let mut pool = BulletPool::standard(
            PoolConfig::new(2),
            BulletKit::new().with_viewport_bounds(),
            Box::new(NullCanvas::default()),
            Box::new(NullCollision),
            Box::new(SharedView(Rc::clone(&view))),
        )
        .unwrap();

        let id = pool.obtain();
        assert_eq!(pool.tick(0.016), 0); // wide view: survives

        // the view scrolls away; the bullet at the origin is now outside
        *view.borrow_mut() = Rect::from_center_size(Vec2::new(500.0, 500.0), Vec2::splat(1.0));
        assert_eq!(pool.tick(0.016), -1);
        assert!(!pool.is_valid(id));
    }

    // ── Spawn / properties ──────────────────────────────────────────

    #[test]
    fn spawn_applies_properties_before_activation() {
        let mut pool = standard_pool(2);
        let mut props = PropertyMap::new();
        props.insert("position".into(), json!([40.0, -8.0]));
        props.insert("velocity".into(), json!([1.0, 0.0]));
        props.insert("lifetime".into(), json!(12.0));
        pool.spawn(&props);

        assert_eq!(pool.active_count(), 1);
        let id = pool.handle_from_shape(1);
        assert!(pool.is_valid(id));
        assert_eq!(pool.get_property(id, "position"), Some(json!([40.0, -8.0])));
        // activation runs after the property map and owns the lifetime clock
        assert_eq!(pool.get_property(id, "lifetime"), Some(json!(0.0)));

        pool.spawn(&props);
        pool.spawn(&props); // exhausted: quietly spawns nothing
        assert_eq!(pool.active_count(), 2);
    }

    #[test]
    fn property_access_requires_a_live_handle() {
        let mut pool = standard_pool(2);
        let id = pool.obtain();
        pool.set_property(id, "rotation", &json!(1.25));
        assert_eq!(pool.get_property(id, "rotation"), Some(json!(1.25)));
        assert_eq!(pool.get_property(id, "no_such_field"), None);

        assert!(pool.release(id));
        assert_eq!(pool.get_property(id, "rotation"), None);
        pool.set_property(id, "rotation", &json!(9.9)); // stale: ignored
        assert_eq!(pool.get_property(BulletId::INVALID, "rotation"), None);
    }

    // ── Host lifecycle ──────────────────────────────────────────────

    #[test]
    fn host_calls_follow_the_bullet_lifecycle() {
        let log = EventLog::default();
        let canvas = RecordingCanvas {
            log: Rc::clone(&log),
            ..Default::default()
        };
        let collision = RecordingCollision {
            log: Rc::clone(&log),
        };
        let mut pool = BulletPool::standard(
            PoolConfig::new(2).with_first_shape_index(10),
            BulletKit::new()
                .with_collisions(true)
                .with_fixed_bounds(arena()),
            Box::new(canvas),
            Box::new(collision),
            Box::new(FixedView(arena())),
        )
        .unwrap();

        {
            let events = log.borrow();
            assert_eq!(
                events
                    .iter()
                    .filter(|e| matches!(e, HostEvent::ItemCreated(_)))
                    .count(),
                2
            );
            assert_eq!(
                events
                    .iter()
                    .filter(|e| matches!(e, HostEvent::Modulated(_)))
                    .count(),
                2
            );
            assert_eq!(
                events
                    .iter()
                    .filter(|e| matches!(e, HostEvent::ShapeAdded))
                    .count(),
                2
            );
        }
        log.borrow_mut().clear();

        let id = pool.obtain();
        assert_eq!(id.shape_index(), 11); // top of the free partition, offset by the base
        assert!(log.borrow().contains(&HostEvent::ShapeEnabled(11, true)));
        assert!(log.borrow().iter().any(|e| matches!(e, HostEvent::Shown(_))));

        log.borrow_mut().clear();
        pool.tick(0.016);
        assert!(log.borrow().iter().any(|e| matches!(e, HostEvent::ItemMoved(_))));
        assert!(log.borrow().contains(&HostEvent::ShapeMoved(11)));

        log.borrow_mut().clear();
        assert!(pool.release(id));
        assert!(log.borrow().contains(&HostEvent::ShapeEnabled(11, false)));
        assert!(log.borrow().iter().any(|e| matches!(e, HostEvent::Hidden(_))));

        log.borrow_mut().clear();
        drop(pool);
        let events = log.borrow();
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, HostEvent::ItemFreed(_)))
                .count(),
            2
        );
    }

    #[test]
    fn debug_draw_labels_active_bullets_only() {
        let log = EventLog::default();
        let canvas = RecordingCanvas {
            log: Rc::clone(&log),
            ..Default::default()
        };
        let mut pool = BulletPool::standard(
            PoolConfig::new(4).with_first_shape_index(20),
            BulletKit::new().with_fixed_bounds(arena()),
            Box::new(canvas),
            Box::new(NullCollision),
            Box::new(FixedView(arena())),
        )
        .unwrap();

        let a = pool.obtain();
        let _b = pool.obtain();
        log.borrow_mut().clear();

        pool.debug_draw();
        {
            let events = log.borrow();
            let labels: Vec<&HostEvent> = events
                .iter()
                .filter(|e| matches!(e, HostEvent::Labeled(_)))
                .collect();
            assert_eq!(labels.len(), 2);
            assert!(events.contains(&HostEvent::Labeled(a.shape_index().to_string())));
        }
    }

    // ── Construction ────────────────────────────────────────────────

    #[test]
    fn construction_rejects_bad_config() {
        let err = BulletPool::standard(
            PoolConfig::new(0),
            BulletKit::new(),
            Box::new(NullCanvas::default()),
            Box::new(NullCollision),
            Box::new(FixedView(arena())),
        )
        .unwrap_err();
        assert!(matches!(err, PoolError::ZeroCapacity));

        let err = BulletPool::standard(
            PoolConfig::new(4).with_first_shape_index(-1),
            BulletKit::new(),
            Box::new(NullCanvas::default()),
            Box::new(NullCollision),
            Box::new(FixedView(arena())),
        )
        .unwrap_err();
        assert!(matches!(err, PoolError::ShapeRange { .. }));
    }

    #[test]
    fn failed_construction_frees_partial_items() {
        let log = EventLog::default();
        let canvas = RecordingCanvas {
            log: Rc::clone(&log),
            fail_after: Some(3),
            ..Default::default()
        };
        let result = BulletPool::standard(
            PoolConfig::new(8),
            BulletKit::new().with_fixed_bounds(arena()),
            Box::new(canvas),
            Box::new(NullCollision),
            Box::new(FixedView(arena())),
        );
        assert!(matches!(result, Err(PoolError::Host(HostError::Canvas(_)))));

        let events = log.borrow();
        let created = events
            .iter()
            .filter(|e| matches!(e, HostEvent::ItemCreated(_)))
            .count();
        let freed = events
            .iter()
            .filter(|e| matches!(e, HostEvent::ItemFreed(_)))
            .count();
        assert_eq!(created, 3);
        assert_eq!(freed, 3); // the aborted construction leaks nothing
    }

    #[cfg(feature = "diagnostics")]
    #[test]
    fn stats_snapshot_counts() {
        let mut pool = standard_pool(3);
        let _ = pool.obtain();
        let stats = pool.stats();
        assert_eq!(stats.capacity, 3);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.available, 2);
    }
}
