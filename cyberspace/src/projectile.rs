use anyhow::Result;

use crate::camera::Camera;
use crate::entity::EntityId;
use crate::math::{Rect, Vec2};
use crate::physics::{BodyKind, Category, PhysicsWorld, ShapeMaterial};
use crate::render::{Canvas, Color};

/// Pixels per second.
pub const BULLET_SPEED: f32 = 600.0;
pub const BULLET_DAMAGE: i32 = 50;
pub const BULLET_SIZE: Vec2 = Vec2::new(24.0, 8.0);

/// A kinematic bullet flying at constant velocity.
#[derive(Debug)]
pub struct Projectile {
    entity: EntityId,
    velocity: Vec2,
    damage: i32,
    enabled: bool,
}

impl Projectile {
    /// Spawns a bullet just outside the shooter, `shooter_half_width` along `direction`.
    pub fn spawn(
        world: &mut PhysicsWorld,
        entity: EntityId,
        origin: Vec2,
        direction: Vec2,
        shooter_half_width: f32,
        damage: i32,
    ) -> Result<Self> {
        let direction = direction.normalized();
        let velocity = direction * BULLET_SPEED;

        world.create_body(
            entity,
            BodyKind::Kinematic,
            origin + direction * shooter_half_width,
        );
        world.add_box(entity, BULLET_SIZE * 0.5, ShapeMaterial::new(Category::Bullet))?;
        world.set_linear_velocity(entity, velocity);

        Ok(Self {
            entity,
            velocity,
            damage,
            enabled: true,
        })
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn damage(&self) -> i32 {
        self.damage
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Removes the bullet from the world. Only the first call has any effect.
    pub fn despawn(&mut self, world: &mut PhysicsWorld) -> bool {
        if !self.enabled {
            return false;
        }
        self.enabled = false;
        world.remove_body(self.entity);
        true
    }

    /// True once the bullet has left the horizontal range `left..=right` entirely.
    pub fn out_of_bounds(&self, world: &PhysicsWorld, left: f32, right: f32) -> bool {
        match world.shape_rect(self.entity) {
            Some(rect) => rect.right() < left || rect.left() > right,
            None => true,
        }
    }

    pub fn draw(
        &self,
        canvas: &mut dyn Canvas,
        camera: &Camera,
        world: &PhysicsWorld,
        show_bounding_box: bool,
    ) {
        let Some(rect) = world.shape_rect(self.entity) else {
            return;
        };
        let screen = camera.rect_to_screen(&rect);
        canvas.fill_rect(screen, Color::rgb(0.2, 1.0, 0.9));
        // Bright core.
        canvas.fill_rect(
            Rect::new(screen.x + 4.0, screen.y + 2.0, screen.w - 8.0, screen.h - 4.0),
            Color::WHITE,
        );
        if show_bounding_box {
            canvas.outline_rect(screen, Color::rgb(1.0, 0.0, 1.0), 1.0);
        }
    }
}
