use thiserror::Error;

use crate::math::Rect;
use crate::render::{Canvas, Color};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HealthError {
    #[error("health range is empty: min {min} must be below max {max}")]
    EmptyRange { min: i32, max: i32 },
    #[error("initial health {value} outside {min}..={max}")]
    InitialOutOfRange { value: i32, min: i32, max: i32 },
}

/// Bounded hit points with a simple bar rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Healthbar {
    min: i32,
    max: i32,
    health: i32,
}

impl Healthbar {
    /// Starts at `max` unless `initial` says otherwise.
    pub fn new(min: i32, max: i32, initial: Option<i32>) -> Result<Self, HealthError> {
        if max <= min {
            return Err(HealthError::EmptyRange { min, max });
        }
        let health = initial.unwrap_or(max);
        if !(min..=max).contains(&health) {
            return Err(HealthError::InitialOutOfRange {
                value: health,
                min,
                max,
            });
        }
        Ok(Self { min, max, health })
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    /// Clamps `value` into range and stores it. Returns false if nothing changed.
    pub fn set_health(&mut self, value: i32) -> bool {
        let value = value.clamp(self.min, self.max);
        if value == self.health {
            return false;
        }
        self.health = value;
        true
    }

    /// Subtracts `amount`, clamped at the floor.
    pub fn damage(&mut self, amount: i32) -> bool {
        self.set_health(self.health.saturating_sub(amount))
    }

    pub fn is_depleted(&self) -> bool {
        self.health <= self.min
    }

    /// Share of the range still filled, `0.0..=1.0`.
    pub fn fraction(&self) -> f32 {
        let filled = i64::from(self.health) - i64::from(self.min);
        let range = i64::from(self.max) - i64::from(self.min);
        (filled as f64 / range as f64) as f32
    }

    /// Red background, green remaining share and an optional outline, in screen space.
    pub fn draw(&self, canvas: &mut dyn Canvas, rect: Rect, outline: Option<Color>) {
        canvas.fill_rect(rect, Color::RED);
        let filled = Rect::new(rect.x, rect.y, rect.w * self.fraction(), rect.h);
        canvas.fill_rect(filled, Color::GREEN);
        if let Some(color) = outline {
            canvas.outline_rect(rect, color, 2.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::DrawList;

    #[test]
    fn rejects_bad_configuration() {
        assert_eq!(
            Healthbar::new(10, 10, None),
            Err(HealthError::EmptyRange { min: 10, max: 10 })
        );
        assert_eq!(
            Healthbar::new(0, 100, Some(101)),
            Err(HealthError::InitialOutOfRange {
                value: 101,
                min: 0,
                max: 100
            })
        );
        assert_eq!(Healthbar::new(0, 100, None).unwrap().health(), 100);
    }

    #[test]
    fn set_health_clamps_and_skips_no_ops() {
        let mut bar = Healthbar::new(0, 100, Some(50)).unwrap();
        assert!(bar.set_health(150));
        assert_eq!(bar.health(), 100);
        assert!(!bar.set_health(100));
        assert!(!bar.set_health(1000));

        assert!(bar.set_health(-20));
        assert_eq!(bar.health(), 0);
        assert!(bar.is_depleted());
        assert!(!bar.damage(10));
    }

    #[test]
    fn fraction_spans_the_full_i32_range() {
        let mut bar = Healthbar::new(i32::MIN, i32::MAX, Some(i32::MAX)).unwrap();
        assert_eq!(bar.fraction(), 1.0);
        bar.set_health(0);
        assert!((bar.fraction() - 0.5).abs() < 1e-6);
        bar.set_health(i32::MIN);
        assert_eq!(bar.fraction(), 0.0);
    }

    #[test]
    fn draw_fills_the_remaining_share() {
        let bar = Healthbar::new(0, 100, Some(25)).unwrap();
        let mut list = DrawList::new(200.0, 100.0);
        bar.draw(&mut list, Rect::new(0.0, 0.0, 100.0, 10.0), Some(Color::BLACK));

        let rects: Vec<_> = list.rects().collect();
        assert_eq!(rects[0], (Rect::new(0.0, 0.0, 100.0, 10.0), Color::RED));
        assert_eq!(rects[1], (Rect::new(0.0, 0.0, 25.0, 10.0), Color::GREEN));
        assert_eq!(rects.len(), 2 + 4);
    }
}
