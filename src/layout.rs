//! Layout classifier: where shapes go and which particles draw them.
//!
//! The layout has exactly three slots around the surface center:
//!
//! ```text
//!          +---------+   safe zone   +---------+
//!          | image 1 |<------------->| image 2 |
//!          +---------+       .       +---------+
//!                          center
//!                       +---------+
//!                       |  text 1 |
//!                       +---------+
//! ```
//!
//! Shapes beyond the first two images and the first text are ignored.

use glam::Vec2;

use crate::config::LayoutConfig;
use crate::pool::ParticlePool;
use crate::shape::{Shape, ShapeKind};
use crate::spawn::SpawnContext;

/// One of the three layout positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// First image, left of the safe zone.
    Left,
    /// Second image, right of the safe zone.
    Right,
    /// First text, centered below the middle.
    Bottom,
}

/// A shape with its screen-space anchor (top-left of its bounding box).
#[derive(Debug, Clone)]
pub struct Placement {
    pub slot: Slot,
    pub shape: Shape,
    pub anchor: Vec2,
}

impl Placement {
    /// Translation from buffer coordinates to screen coordinates.
    pub fn offset(&self) -> Vec2 {
        self.anchor - self.shape.bounds.min()
    }
}

/// Split shapes into image-like and text-like groups, keeping caller order.
pub fn classify(shapes: Vec<Shape>) -> (Vec<Shape>, Vec<Shape>) {
    shapes.into_iter().partition(|s| s.kind == ShapeKind::Image)
}

/// Place classified shapes into the three slots around `surface`'s center.
pub fn place(shapes: Vec<Shape>, surface: Vec2, config: &LayoutConfig) -> Vec<Placement> {
    let center = surface / 2.0;
    let (images, texts) = classify(shapes);
    let dropped = images.len().saturating_sub(2) + texts.len().saturating_sub(1);
    if dropped > 0 {
        log::debug!("layout has three slots; ignoring {dropped} extra shape(s)");
    }

    let image_y = |shape: &Shape| center.y - shape.height() / 2.0 + config.image_vertical_offset;

    let mut placements = Vec::with_capacity(3);
    let mut images = images.into_iter();
    if let Some(shape) = images.next() {
        let anchor = Vec2::new(
            center.x - config.safe_zone / 2.0 - shape.width(),
            image_y(&shape),
        );
        placements.push(Placement {
            slot: Slot::Left,
            shape,
            anchor,
        });
    }
    if let Some(shape) = images.next() {
        let anchor = Vec2::new(center.x + config.safe_zone / 2.0, image_y(&shape));
        placements.push(Placement {
            slot: Slot::Right,
            shape,
            anchor,
        });
    }
    if let Some(shape) = texts.into_iter().next() {
        let anchor = Vec2::new(
            center.x - shape.width() / 2.0,
            center.y + config.text_bottom_offset,
        );
        placements.push(Placement {
            slot: Slot::Bottom,
            shape,
            anchor,
        });
    }
    placements
}

/// Hand every placed point to a particle, in pool order.
///
/// Each shape's points are shuffled first so a shape that runs the pool dry
/// is thinned evenly instead of losing its bottom rows. Particles left over
/// are hidden. Returns the number of particles assigned.
pub fn assign_targets(
    pool: &mut ParticlePool,
    placements: &mut [Placement],
    ctx: &mut SpawnContext,
    config: &LayoutConfig,
) -> usize {
    let mut next = 0;
    for placement in placements.iter_mut() {
        let offset = placement.offset();
        let kind = placement.shape.kind;
        ctx.shuffle(&mut placement.shape.points);

        for point in &placement.shape.points {
            let Some(particle) = pool.get_mut(next) else {
                break;
            };
            particle.move_to(point.position() + offset);
            particle.set_target_color(match kind {
                ShapeKind::Image => point.color,
                ShapeKind::Text => config.text_color,
            });
            next += 1;
        }
    }
    pool.hide_from(next);
    next
}
