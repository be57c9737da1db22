mod wgpu_backend;

pub use wgpu_backend::{Frame, Renderer};

use crate::math::{Rect, Vec2};

/// Straight-alpha RGBA colour, components in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Builds a colour from 8-bit sRGB components.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Converts the colour channels to linear space for sRGB render targets.
    pub fn to_linear(self) -> [f32; 4] {
        fn channel(c: f32) -> f32 {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        [channel(self.r), channel(self.g), channel(self.b), self.a]
    }
}

/// Drawing surface in screen pixels: origin top-left, `y` grows downwards.
///
/// Rectangles passed here are screen rectangles; their `y` is the top edge.
pub trait Canvas {
    /// Size of the drawable area in pixels.
    fn size(&self) -> Vec2;

    /// Fills the whole canvas.
    fn clear(&mut self, color: Color);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Draws the border of `rect`, `thickness` pixels wide, inside the rectangle.
    fn outline_rect(&mut self, rect: Rect, color: Color, thickness: f32) {
        let t = thickness.min(rect.w / 2.0).min(rect.h / 2.0).max(0.0);
        if t == 0.0 {
            return;
        }
        self.fill_rect(Rect::new(rect.x, rect.y, rect.w, t), color);
        self.fill_rect(Rect::new(rect.x, rect.y + rect.h - t, rect.w, t), color);
        self.fill_rect(Rect::new(rect.x, rect.y + t, t, rect.h - 2.0 * t), color);
        self.fill_rect(
            Rect::new(rect.x + rect.w - t, rect.y + t, t, rect.h - 2.0 * t),
            color,
        );
    }
}

/// One recorded draw call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Rect(Rect, Color),
}

/// Canvas that records draw calls instead of rasterising them.
///
/// Lets scenes run without a window.
#[derive(Clone, Debug)]
pub struct DrawList {
    size: Vec2,
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Filled rectangles in draw order.
    pub fn rects(&self) -> impl Iterator<Item = (Rect, Color)> + '_ {
        self.commands.iter().filter_map(|c| match *c {
            DrawCommand::Rect(r, color) => Some((r, color)),
            DrawCommand::Clear(_) => None,
        })
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }
}

impl Canvas for DrawList {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        if rect.w > 0.0 && rect.h > 0.0 {
            self.commands.push(DrawCommand::Rect(rect, color));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outline_is_four_strips_inside_the_rect() {
        let mut list = DrawList::new(100.0, 100.0);
        let rect = Rect::new(10.0, 10.0, 40.0, 20.0);
        list.outline_rect(rect, Color::WHITE, 2.0);

        let strips: Vec<_> = list.rects().map(|(r, _)| r).collect();
        assert_eq!(strips.len(), 4);
        for strip in &strips {
            assert!(strip.left() >= rect.left() && strip.right() <= rect.right());
            assert!(strip.bottom() >= rect.bottom() && strip.top() <= rect.top());
        }
    }

    #[test]
    fn linear_conversion_keeps_endpoints() {
        assert_eq!(Color::BLACK.to_linear(), [0.0, 0.0, 0.0, 1.0]);
        let white = Color::WHITE.to_linear();
        assert!((white[0] - 1.0).abs() < 1e-6);
        let mid = Color::rgb(0.5, 0.5, 0.5).to_linear()[0];
        assert!(mid > 0.2 && mid < 0.25);
    }
}
