use anyhow::Result;

use super::{draw_actor, Actor, ActorEvent, Animation};
use crate::assets::AnimationSet;
use crate::camera::Camera;
use crate::clock::{Clock, ScheduleOptions};
use crate::entity::EntityId;
use crate::health::Healthbar;
use crate::math::Vec2;
use crate::physics::{BodyKind, Category, PhysicsWorld, ShapeMaterial};
use crate::render::{Canvas, Color};

pub const ENEMY_SIZE: Vec2 = Vec2::new(50.0, 50.0);
/// Patrol speed in pixels per second.
pub const ENEMY_SPEED: f32 = 60.0;
/// Seconds after turning around before the enemy may turn again.
pub const TURN_DELAY: f64 = 0.5;

const ENEMY_COLOR: Color = Color::rgb(0.85, 0.25, 0.3);

/// Patrolling enemy that walks back and forth on its platform.
#[derive(Debug)]
pub struct Enemy {
    entity: EntityId,
    healthbar: Healthbar,
    animation: Animation,
    direction: f32,
    can_turn: bool,
    enabled: bool,
}

impl Enemy {
    /// Creates the enemy's body centred on `position`, walking towards `direction` (sign of x).
    pub fn spawn(
        world: &mut PhysicsWorld,
        entity: EntityId,
        position: Vec2,
        direction: f32,
        frames: &AnimationSet,
    ) -> Result<Self> {
        world.create_body(entity, BodyKind::Dynamic, position);
        world.lock_rotations(entity, true);
        world.add_box(entity, ENEMY_SIZE * 0.5, ShapeMaterial::new(Category::Enemy))?;

        Ok(Self {
            entity,
            healthbar: Healthbar::new(0, 100, None)?,
            animation: Animation::new(frames),
            direction: if direction < 0.0 { -1.0 } else { 1.0 },
            can_turn: true,
            enabled: true,
        })
    }

    pub fn direction(&self) -> f32 {
        self.direction
    }

    pub fn can_turn(&self) -> bool {
        self.can_turn
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Walks in the current direction while standing on something.
    pub fn patrol(&self, world: &mut PhysicsWorld) {
        if !self.enabled {
            return;
        }
        let walk = if world.is_grounded(self.entity) {
            Vec2::new(self.direction * ENEMY_SPEED, 0.0)
        } else {
            Vec2::ZERO
        };
        world.set_surface_velocity(self.entity, walk);
    }

    /// Turns around at the edge of whatever the enemy stands on, then waits
    /// [`TURN_DELAY`] before it may turn again. Returns whether it turned.
    ///
    /// The edge counts as reached when the next `dt` of walking would carry
    /// the leading side past the support, or a bottom corner already hangs
    /// free. Either way the enemy is stopped and pulled back onto the
    /// support, so its box never ends a step overhanging.
    pub fn check_edge(
        &mut self,
        world: &mut PhysicsWorld,
        clock: &mut Clock<ActorEvent>,
        dt: f32,
    ) -> Result<bool> {
        if !self.enabled {
            return Ok(false);
        }
        let id = self.entity;
        let (Some(rect), Some((left, right))) = (world.shape_rect(id), world.support_span(id))
        else {
            return Ok(false);
        };

        let velocity = world.linear_velocity(id).unwrap_or_default();
        let reach = velocity.x.abs().max(ENEMY_SPEED) * dt;
        let ahead = if self.direction > 0.0 {
            rect.right() + reach > right
        } else {
            rect.left() - reach < left
        };
        if !ahead && !world.at_unsupported_edge(id) {
            return Ok(false);
        }

        let half = rect.w / 2.0;
        let center = rect.center();
        let x = if right - left < rect.w {
            (left + right) / 2.0
        } else {
            center.x.clamp(left + half, right - half)
        };
        world.set_position(id, Vec2::new(x, center.y));
        world.set_linear_velocity(id, Vec2::new(0.0, velocity.y));

        if !self.can_turn {
            return Ok(false);
        }
        self.direction = -self.direction;
        self.can_turn = false;
        clock.schedule(
            ActorEvent::TurnReady(id),
            TURN_DELAY,
            ScheduleOptions::unique(),
        )?;
        log::debug!("enemy {} turned at an edge", id.to_u32());
        Ok(true)
    }

    /// Handles [`ActorEvent::TurnReady`].
    pub fn turn_ready(&mut self) {
        self.can_turn = true;
    }

    /// Takes the enemy out of the world. Only the first call has any effect.
    pub fn remove(&mut self, world: &mut PhysicsWorld) -> bool {
        if !self.enabled {
            return false;
        }
        self.enabled = false;
        world.remove_body(self.entity);
        log::debug!("enemy {} removed", self.entity.to_u32());
        true
    }
}

impl Actor for Enemy {
    fn entity(&self) -> EntityId {
        self.entity
    }

    fn healthbar(&self) -> &Healthbar {
        &self.healthbar
    }

    fn animation(&self) -> &Animation {
        &self.animation
    }

    fn animation_mut(&mut self) -> &mut Animation {
        &mut self.animation
    }

    fn facing(&self) -> f32 {
        self.direction
    }

    fn take_damage(&mut self, amount: i32) -> bool {
        self.enabled && self.healthbar.damage(amount)
    }

    fn update_state(&mut self, world: &PhysicsWorld) {
        if self.enabled {
            self.update_animation(world);
        }
    }

    fn draw(
        &self,
        canvas: &mut dyn Canvas,
        camera: &Camera,
        world: &PhysicsWorld,
        show_bounding_box: bool,
    ) {
        if self.enabled {
            draw_actor(self, ENEMY_COLOR, true, canvas, camera, world, show_bounding_box);
        }
    }
}
