//! Property-based invariant tests for the particle field.
//!
//! 1. Color easing never overshoots and always reaches its target.
//! 2. The growth curve stays in [0, 1] and never decreases.
//! 3. Ambient alpha stays in [0, 1] for any surface and pointer.
//! 4. Morph alpha and fade-in stay in [0, 1]; fade-in never decreases.
//! 5. Image slots always leave the safe zone clear.
//! 6. Scanned points sit on the stride grid inside the buffer.

use image::{Rgba, RgbaImage};
use morphfield::config::{AmbientConfig, LayoutConfig, MorphConfig, ScanConfig};
use morphfield::layout::{place, Slot};
use morphfield::mode::{ease_out_cubic, AmbientClock};
use morphfield::particle::Particle;
use morphfield::pool::ParticlePool;
use morphfield::shape::{SamplePoint, Shape, ShapeKind};
use morphfield::spawn::SpawnContext;
use morphfield::{RasterScanner, Rgb, Vec2};
use proptest::prelude::*;
use std::time::Duration;

// ── Helpers ─────────────────────────────────────────────────────────────

fn rgb_strategy() -> impl Strategy<Value = Rgb> {
    (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| Rgb::new(r, g, b))
}

fn surface_strategy() -> impl Strategy<Value = Vec2> {
    (100.0f32..2000.0, 100.0f32..1200.0).prop_map(|(w, h)| Vec2::new(w, h))
}

fn cursor_strategy() -> impl Strategy<Value = Option<Vec2>> {
    prop::option::of((-200.0f32..2200.0, -200.0f32..1400.0).prop_map(|(x, y)| Vec2::new(x, y)))
}

fn rect_shape(kind: ShapeKind, w: u32, h: u32) -> Shape {
    let points = vec![
        SamplePoint { x: 0, y: 0, color: Rgb::WHITE },
        SamplePoint { x: w, y: h, color: Rgb::WHITE },
    ];
    Shape::from_points(points, kind).unwrap()
}

fn channel_distance(a: Rgb, b: Rgb) -> [u8; 3] {
    [a.r().abs_diff(b.r()), a.g().abs_diff(b.g()), a.b().abs_diff(b.b())]
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Color easing
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn approach_never_moves_away(from in rgb_strategy(), to in rgb_strategy(), t in 0.01f32..=1.0) {
        let next = from.approach(to, t);
        let before = channel_distance(from, to);
        let after = channel_distance(next, to);
        for i in 0..3 {
            prop_assert!(after[i] <= before[i], "{} -> {} overshot via {}", from, to, next);
        }
    }

    #[test]
    fn approach_reaches_target(from in rgb_strategy(), to in rgb_strategy(), t in 0.01f32..=1.0) {
        let mut color = from;
        for _ in 0..256 {
            color = color.approach(to, t);
        }
        prop_assert_eq!(color, to);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Growth curve
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn ease_out_cubic_bounded_and_monotone(a in -1.0f32..2.0, b in -1.0f32..2.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let (ea, eb) = (ease_out_cubic(lo), ease_out_cubic(hi));
        prop_assert!((0.0..=1.0).contains(&ea));
        prop_assert!((0.0..=1.0).contains(&eb));
        prop_assert!(ea <= eb);
    }

    #[test]
    fn active_count_capped_and_growing(steps in prop::collection::vec(0u64..2000, 1..20)) {
        let params = AmbientConfig::default();
        let mut clock = AmbientClock::new();
        let mut last = clock.active_count(&params);
        for ms in steps {
            clock.advance(Duration::from_millis(ms));
            let count = clock.active_count(&params);
            prop_assert!(count >= last);
            prop_assert!(count <= params.visible_count);
            prop_assert!(clock.connection_distance(&params) <= params.max_connection_distance);
            last = count;
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Ambient alpha
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn ambient_alpha_in_unit_range(
        seed in any::<u64>(),
        surface in surface_strategy(),
        cursor in cursor_strategy(),
        active in 0usize..64,
    ) {
        let params = AmbientConfig::default();
        let mut ctx = SpawnContext::from_seed(seed);
        let mut pool = ParticlePool::new(64, &mut ctx, surface);

        for _ in 0..120 {
            pool.update_ambient(&params, active, surface, cursor, &mut ctx);
            for p in pool.iter() {
                prop_assert!((0.0..=1.0).contains(&p.alpha()), "alpha {}", p.alpha());
                prop_assert!((0.0..=1.0).contains(&p.fade_in()));
            }
            prop_assert_eq!(pool.len(), 64);
            prop_assert_eq!(pool.visible_count(), active);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Morph alpha and fade-in
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn morph_fade_monotone(
        seed in any::<u64>(),
        target in (0.0f32..1600.0, 0.0f32..900.0),
        cursor in cursor_strategy(),
        color in rgb_strategy(),
    ) {
        let params = MorphConfig::default();
        let mut ctx = SpawnContext::from_seed(seed);
        let mut particle = Particle::spawn(&mut ctx, Vec2::new(1600.0, 900.0));
        particle.move_to(Vec2::new(target.0, target.1));
        particle.set_target_color(color);

        let mut last_fade = particle.fade_in();
        for _ in 0..200 {
            particle.update_morph(&params, cursor);
            prop_assert!(particle.fade_in() >= last_fade);
            prop_assert!((0.0..=1.0).contains(&particle.fade_in()));
            prop_assert!((0.0..=1.0).contains(&particle.alpha()));
            prop_assert!(particle.position().is_finite());
            last_fade = particle.fade_in();
        }
    }

    #[test]
    fn morph_without_pointer_locks_on(seed in any::<u64>(), target in (0.0f32..1600.0, 0.0f32..900.0)) {
        let params = MorphConfig::default();
        let mut ctx = SpawnContext::from_seed(seed);
        let mut particle = Particle::spawn(&mut ctx, Vec2::new(1600.0, 900.0));
        let target = Vec2::new(target.0, target.1);
        particle.move_to(target);

        for _ in 0..800 {
            particle.update_morph(&params, None);
        }
        prop_assert_eq!(particle.position(), target);
        prop_assert_eq!(particle.velocity(), Vec2::ZERO);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Layout safe zone
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn image_slots_leave_safe_zone_clear(
        surface in surface_strategy(),
        w1 in 1u32..600,
        h1 in 1u32..600,
        w2 in 1u32..600,
        h2 in 1u32..600,
        safe_zone in 0.0f32..800.0,
    ) {
        let config = LayoutConfig { safe_zone, ..LayoutConfig::default() };
        let shapes = vec![
            rect_shape(ShapeKind::Image, w1, h1),
            rect_shape(ShapeKind::Image, w2, h2),
        ];
        let placements = place(shapes, surface, &config);
        let cx = surface.x / 2.0;

        prop_assert_eq!(placements.len(), 2);
        let left = &placements[0];
        let right = &placements[1];
        prop_assert_eq!(left.slot, Slot::Left);
        prop_assert_eq!(right.slot, Slot::Right);

        let left_edge = left.anchor.x + left.shape.width();
        prop_assert!((left_edge - (cx - safe_zone / 2.0)).abs() < 1e-2);
        prop_assert!((right.anchor.x - (cx + safe_zone / 2.0)).abs() < 1e-2);
        prop_assert!(left_edge <= right.anchor.x + 1e-2);
    }

    #[test]
    fn text_slot_is_horizontally_centered(surface in surface_strategy(), w in 1u32..1000, h in 1u32..200) {
        let config = LayoutConfig::default();
        let placements = place(vec![rect_shape(ShapeKind::Text, w, h)], surface, &config);
        prop_assert_eq!(placements.len(), 1);
        let p = &placements[0];
        let mid = p.anchor.x + p.shape.width() / 2.0;
        prop_assert!((mid - surface.x / 2.0).abs() < 1e-2);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Scanner grid
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn scanned_points_on_stride_grid(
        w in 1u32..48,
        h in 1u32..48,
        stride in 1u32..6,
        seed in any::<u32>(),
    ) {
        let mut buffer = RgbaImage::new(w, h);
        for (x, y, pixel) in buffer.enumerate_pixels_mut() {
            let v = (x.wrapping_mul(2654435761) ^ y.wrapping_mul(40503) ^ seed) as u8;
            *pixel = Rgba([v, v / 2, v / 3, v.rotate_left(3)]);
        }

        let scanner = RasterScanner::new(&ScanConfig { stride, brightness_floor: 20 });
        let extraction = scanner.scan(&buffer);
        let max_points = w.div_ceil(stride) * h.div_ceil(stride);

        prop_assert!(extraction.points.len() as u32 <= max_points);
        for p in &extraction.points {
            prop_assert!(p.x < w && p.y < h);
            prop_assert_eq!(p.x % stride, 0);
            prop_assert_eq!(p.y % stride, 0);
            let [r, g, b, a] = buffer.get_pixel(p.x, p.y).0;
            prop_assert!(a > 0);
            prop_assert!(r > 20 || g > 20 || b > 20);
        }
    }
}
