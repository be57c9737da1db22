use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 2D vector type used throughout the game. World space is y-up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
    pub const UP: Self = Self { x: 0.0, y: 1.0 };
    pub const RIGHT: Self = Self { x: 1.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Returns the squared length of the vector (faster than `length()`).
    pub fn length_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn normalized(&self) -> Self {
        let len = self.length();
        if len == 0.0 {
            Self::ZERO
        } else {
            Self::new(self.x / len, self.y / len)
        }
    }

    /// Computes the dot product of two vectors.
    pub fn dot(self, rhs: Self) -> f32 {
        self.x * rhs.x + self.y * rhs.y
    }

    /// Computes the squared distance between two points.
    pub fn distance_squared(self, rhs: Self) -> f32 {
        (self - rhs).length_squared()
    }
}

impl From<(f32, f32)> for Vec2 {
    fn from(value: (f32, f32)) -> Self {
        Self {
            x: value.0,
            y: value.1,
        }
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl std::ops::Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y)
    }
}

/// Side reported by [`Rect::collision_side`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("rectangles must be overlapping to resolve a collision side")]
    NotColliding,
}

/// Axis-aligned rectangle in y-up coordinates, anchored at its bottom-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self::new(
            center.x - size.x / 2.0,
            center.y - size.y / 2.0,
            size.x,
            size.y,
        )
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y
    }

    pub fn top(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.w, self.h)
    }

    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.w / 2.0, self.h / 2.0)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.bottom() && p.y <= self.top()
    }

    /// Returns a copy shrunk by `amount` on every side.
    pub fn inset(&self, amount: f32) -> Self {
        Self::new(
            self.x + amount,
            self.y + amount,
            (self.w - amount * 2.0).max(0.0),
            (self.h - amount * 2.0).max(0.0),
        )
    }

    /// Determines which side dominates the overlap between `r1` and `r2`.
    ///
    /// The classification compares the centre offset against the diagonals of
    /// the combined extents. Vertical sides are named in screen orientation:
    /// `r1` resting on top of `r2` yields [`Side::Bottom`], `r1` hanging below
    /// yields [`Side::Top`]; horizontal sides follow `r1`'s position
    /// (`r1` to the right of `r2` yields [`Side::Right`]).
    pub fn collision_side(r1: &Rect, r2: &Rect) -> Result<Side, GeometryError> {
        let c1 = r1.center();
        let c2 = r2.center();
        let dx = c1.x - c2.x;
        let dy = c1.y - c2.y;
        let width = (r1.w + r2.w) / 2.0;
        let height = (r1.h + r2.h) / 2.0;

        if dx.abs() > width || dy.abs() > height {
            return Err(GeometryError::NotColliding);
        }

        let cross_width = width * dy;
        let cross_height = height * dx;

        let side = if cross_width > cross_height {
            if cross_width > -cross_height {
                Side::Bottom
            } else {
                Side::Left
            }
        } else if cross_width > -cross_height {
            Side::Right
        } else {
            Side::Top
        };
        Ok(side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_zero_vector_stays_zero() {
        assert_eq!(Vec2::ZERO.normalized(), Vec2::ZERO);
        let n = Vec2::new(3.0, 4.0).normalized();
        assert!((n.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn rect_edges_follow_y_up_convention() {
        let r = Rect::new(10.0, 20.0, 100.0, 10.0);
        assert_eq!(r.left(), 10.0);
        assert_eq!(r.right(), 110.0);
        assert_eq!(r.bottom(), 20.0);
        assert_eq!(r.top(), 30.0);
        assert_eq!(r.center(), Vec2::new(60.0, 25.0));
        assert_eq!(Rect::from_center(r.center(), r.size()), r);
    }

    #[test]
    fn collision_side_follows_relative_centres() {
        let base = Rect::new(0.0, 0.0, 100.0, 20.0);

        let above = Rect::new(10.0, 15.0, 80.0, 20.0);
        assert_eq!(Rect::collision_side(&above, &base), Ok(Side::Bottom));

        let below = Rect::new(10.0, -15.0, 80.0, 20.0);
        assert_eq!(Rect::collision_side(&below, &base), Ok(Side::Top));

        let right = Rect::new(95.0, 0.0, 20.0, 20.0);
        assert_eq!(Rect::collision_side(&right, &base), Ok(Side::Right));

        let left = Rect::new(-15.0, 0.0, 20.0, 20.0);
        assert_eq!(Rect::collision_side(&left, &base), Ok(Side::Left));
    }

    #[test]
    fn collision_side_rejects_separated_rects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(50.0, 50.0, 10.0, 10.0);
        assert_eq!(
            Rect::collision_side(&a, &b),
            Err(GeometryError::NotColliding)
        );
    }
}
