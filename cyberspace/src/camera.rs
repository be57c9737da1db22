//! Side-scrolling camera: maps y-up world positions to y-down screen pixels.

use crate::math::{Rect, Vec2};

/// How the camera offset is derived each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CameraBehavior {
    /// Track the target with a constant offset.
    FollowTarget,
    /// Track the target, keeping the view inside `horizontal` and `vertical`
    /// (each `(lo, hi)` in offset space, `hi` being the far edge of the level).
    BoundedFollowTarget {
        horizontal: (f32, f32),
        vertical: (f32, f32),
    },
    /// Ignore the target and slide right by `speed` pixels per scroll.
    AutoScroll { speed: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub offset: Vec2,
    /// Added to the target position before it becomes the offset.
    pub constant: Vec2,
    pub viewport: Vec2,
    pub behavior: CameraBehavior,
}

impl Camera {
    pub fn new(viewport: Vec2, behavior: CameraBehavior) -> Self {
        Self {
            offset: Vec2::ZERO,
            constant: Vec2::ZERO,
            viewport,
            behavior,
        }
    }

    pub fn with_constant(mut self, constant: Vec2) -> Self {
        self.constant = constant;
        self
    }

    /// Recomputes the offset from `target` (world space). Auto-scrolling
    /// cameras ignore the target.
    pub fn follow(&mut self, target: Vec2) {
        match self.behavior {
            CameraBehavior::FollowTarget => {
                self.offset = self.tracking_offset(target);
            }
            CameraBehavior::BoundedFollowTarget {
                horizontal,
                vertical,
            } => {
                let raw = self.tracking_offset(target);
                self.offset = Vec2::new(
                    bound(raw.x, horizontal, self.viewport.x),
                    bound(raw.y, vertical, self.viewport.y),
                );
            }
            CameraBehavior::AutoScroll { .. } => {}
        }
    }

    /// Advances an auto-scrolling camera by one step.
    pub fn scroll(&mut self) {
        if let CameraBehavior::AutoScroll { speed } = self.behavior {
            self.offset.x += speed;
        }
    }

    pub fn world_to_screen(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x - self.offset.x, self.viewport.y - p.y - self.offset.y)
    }

    /// Screen rectangle (top-left anchored) covering a world rectangle.
    pub fn rect_to_screen(&self, rect: &Rect) -> Rect {
        let top_left = self.world_to_screen(Vec2::new(rect.left(), rect.top()));
        Rect::new(top_left.x, top_left.y, rect.w, rect.h)
    }

    fn tracking_offset(&self, target: Vec2) -> Vec2 {
        Vec2::new(target.x + self.constant.x, -target.y + self.constant.y)
    }
}

/// Clamps `value` into `lo..=hi - extent`; the upper bound wins if the range is inverted.
fn bound(value: f32, (lo, hi): (f32, f32), extent: f32) -> f32 {
    value.max(lo).min(hi - extent)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: Vec2 = Vec2::new(1280.0, 720.0);

    #[test]
    fn follow_target_tracks_with_constant() {
        let mut cam =
            Camera::new(VIEW, CameraBehavior::FollowTarget).with_constant(Vec2::new(-640.0, 360.0));
        cam.follow(Vec2::new(1000.0, 200.0));
        assert_eq!(cam.offset, Vec2::new(360.0, 160.0));
        // Target itself lands at screen centre minus its height above the constant line.
        assert_eq!(cam.world_to_screen(Vec2::new(1000.0, 200.0)), Vec2::new(640.0, 360.0));
    }

    #[test]
    fn bounded_follow_stops_at_level_edges() {
        let behavior = CameraBehavior::BoundedFollowTarget {
            horizontal: (0.0, 4000.0),
            vertical: (0.0, 720.0),
        };
        let mut cam = Camera::new(VIEW, behavior).with_constant(Vec2::new(-640.0, 360.0));

        cam.follow(Vec2::new(100.0, 100.0));
        assert_eq!(cam.offset.x, 0.0);

        cam.follow(Vec2::new(3900.0, 100.0));
        assert_eq!(cam.offset.x, 4000.0 - 1280.0);

        cam.follow(Vec2::new(2000.0, 100.0));
        assert_eq!(cam.offset.x, 2000.0 - 640.0);
        assert_eq!(cam.offset.y, 0.0);
    }

    #[test]
    fn inverted_bounds_do_not_panic() {
        let behavior = CameraBehavior::BoundedFollowTarget {
            horizontal: (0.0, 500.0),
            vertical: (0.0, 720.0),
        };
        let mut cam = Camera::new(VIEW, behavior);
        cam.follow(Vec2::new(300.0, 0.0));
        assert_eq!(cam.offset.x, 500.0 - 1280.0);
    }

    #[test]
    fn auto_scroll_ignores_target() {
        let mut cam = Camera::new(VIEW, CameraBehavior::AutoScroll { speed: 2.0 });
        cam.follow(Vec2::new(999.0, 999.0));
        assert_eq!(cam.offset, Vec2::ZERO);
        cam.scroll();
        cam.scroll();
        assert_eq!(cam.offset.x, 4.0);
    }

    #[test]
    fn world_rect_maps_to_top_left_screen_rect() {
        let cam = Camera::new(VIEW, CameraBehavior::FollowTarget);
        let screen = cam.rect_to_screen(&Rect::new(10.0, 0.0, 100.0, 20.0));
        assert_eq!(screen, Rect::new(10.0, 700.0, 100.0, 20.0));
    }
}
