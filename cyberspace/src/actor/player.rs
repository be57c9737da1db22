use anyhow::Result;

use super::{draw_actor, Actor, ActorEvent, Animation};
use crate::assets::AnimationSet;
use crate::audio::SoundPlayer;
use crate::camera::Camera;
use crate::clock::{Clock, ScheduleOptions};
use crate::entity::{Entities, EntityId};
use crate::health::Healthbar;
use crate::input::{actions, InputMap, InputState};
use crate::math::Vec2;
use crate::physics::{BodyKind, Category, PhysicsWorld, ShapeMaterial};
use crate::projectile::{Projectile, BULLET_DAMAGE};
use crate::render::{Canvas, Color};

/// Hitbox of the player.
pub const PLAYER_SIZE: Vec2 = Vec2::new(50.0, 100.0);

pub const WALK_SPEED: f32 = 300.0;
pub const SPRINT_SPEED: f32 = 480.0;
/// Horizontal acceleration while steering in the air.
pub const AIR_ACCEL: f32 = 1200.0;
/// Per-step horizontal damping in the air without input.
pub const AIR_DRAG: f32 = 0.97;
pub const JUMP_SPEED: f32 = 600.0;
pub const SUPER_JUMP_SPEED: f32 = 1100.0;

/// Seconds between shots.
pub const SHOOT_COOLDOWN: f64 = 0.5;
/// Damage taken from touching an enemy.
pub const CONTACT_DAMAGE: i32 = 10;

/// Frames of invulnerability after taking damage.
pub const INVULNERABILITY_FRAMES: u32 = 100;
/// Frames each flash phase lasts while recovering.
pub const FLASH_FRAMES: u32 = 2;

const PLAYER_COLOR: Color = Color::rgb(0.3, 0.55, 0.95);

/// Recovery window after a hit, counted in frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Invulnerability {
    recovering: bool,
    flash_on: bool,
    frames: u32,
    flash_frames: u32,
}

impl Invulnerability {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts recovering. Returns false (and changes nothing) if already recovering.
    pub fn hit(&mut self) -> bool {
        if self.recovering {
            return false;
        }
        self.recovering = true;
        self.flash_on = true;
        self.frames = 0;
        self.flash_frames = 0;
        true
    }

    /// Advances the counters by one frame.
    pub fn update(&mut self) {
        if !self.recovering {
            return;
        }
        self.frames += 1;
        self.flash_frames += 1;

        if self.flash_frames >= FLASH_FRAMES {
            self.flash_on = !self.flash_on;
            self.flash_frames = 0;
        }
        if self.frames >= INVULNERABILITY_FRAMES {
            *self = Self::default();
        }
    }

    pub fn is_vulnerable(&self) -> bool {
        !self.recovering
    }

    /// True while the body should be hidden.
    pub fn flash_on(&self) -> bool {
        self.flash_on
    }

    /// Frames spent recovering so far.
    pub fn frames(&self) -> u32 {
        self.frames
    }
}

/// What the player asked for this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerIntent {
    /// -1 left, +1 right, 0 none.
    pub direction: f32,
    pub jump: bool,
    pub super_jump: bool,
    pub sprint: bool,
    pub shoot: bool,
}

impl PlayerIntent {
    pub fn from_input(map: &InputMap, input: &InputState) -> Self {
        Self {
            direction: map.axis(input, actions::MOVE),
            jump: map.action_pressed(input, actions::JUMP),
            super_jump: map.action_pressed(input, actions::SUPER_JUMP),
            sprint: map.action_pressed(input, actions::SPRINT),
            shoot: map.action_pressed(input, actions::SHOOT),
        }
    }

    pub fn moving(direction: f32) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }
}

#[derive(Debug)]
pub struct Player {
    entity: EntityId,
    healthbar: Healthbar,
    animation: Animation,
    facing: f32,
    sprinting: bool,
    can_shoot: bool,
    invulnerability: Invulnerability,
}

impl Player {
    /// Creates the player's body centred on `position`.
    pub fn spawn(
        world: &mut PhysicsWorld,
        entity: EntityId,
        position: Vec2,
        frames: &AnimationSet,
    ) -> Result<Self> {
        world.create_body(entity, BodyKind::Dynamic, position);
        world.lock_rotations(entity, true);
        world.add_box(entity, PLAYER_SIZE * 0.5, ShapeMaterial::new(Category::Player))?;

        Ok(Self {
            entity,
            healthbar: Healthbar::new(0, 100, None)?,
            animation: Animation::new(frames),
            facing: 1.0,
            sprinting: false,
            can_shoot: true,
            invulnerability: Invulnerability::new(),
        })
    }

    pub fn is_sprinting(&self) -> bool {
        self.sprinting
    }

    pub fn can_shoot(&self) -> bool {
        self.can_shoot
    }

    pub fn invulnerability(&self) -> &Invulnerability {
        &self.invulnerability
    }

    /// Applies movement and jumping for one `dt` step. Runs before the world steps.
    pub fn control(
        &mut self,
        intent: &PlayerIntent,
        world: &mut PhysicsWorld,
        sounds: &mut dyn SoundPlayer,
        dt: f32,
    ) {
        let id = self.entity;
        let grounded = world.is_grounded(id);
        let mut velocity = world.linear_velocity(id).unwrap_or_default();
        let direction = if intent.direction > 0.0 {
            1.0
        } else if intent.direction < 0.0 {
            -1.0
        } else {
            0.0
        };

        if intent.sprint {
            self.sprinting = true;
        }
        if direction != 0.0 {
            self.facing = direction;
        }
        let speed = if self.sprinting { SPRINT_SPEED } else { WALK_SPEED };

        if grounded {
            world.set_surface_velocity(id, Vec2::new(direction * speed, 0.0));
        } else {
            world.set_surface_velocity(id, Vec2::ZERO);
            if direction != 0.0 {
                // Accelerate up to walk speed, never past it within one step.
                let headroom = (WALK_SPEED - velocity.x * direction).max(0.0);
                let accel = AIR_ACCEL.min(headroom / dt.max(f32::EPSILON));
                if accel > 0.0 {
                    let mass = world.mass(id);
                    world.apply_force(id, Vec2::new(direction * accel * mass, 0.0));
                }
            } else {
                velocity.x *= AIR_DRAG;
                world.set_linear_velocity(id, velocity);
            }
        }

        if direction == 0.0 && self.sprinting && velocity.x.abs() < WALK_SPEED {
            self.sprinting = false;
        }

        if grounded && (intent.jump || intent.super_jump) {
            let launch = if intent.super_jump {
                SUPER_JUMP_SPEED
            } else {
                JUMP_SPEED
            };
            let mass = world.mass(id);
            world.apply_impulse(id, Vec2::UP * (launch * mass));
            sounds.play_sound("jump");
        }
    }

    /// Fires a bullet in the facing direction unless the weapon is cooling down.
    pub fn try_shoot(
        &mut self,
        world: &mut PhysicsWorld,
        entities: &mut Entities,
        clock: &mut Clock<ActorEvent>,
        sounds: &mut dyn SoundPlayer,
    ) -> Result<Option<Projectile>> {
        if !self.can_shoot {
            return Ok(None);
        }
        let Some(origin) = world.position(self.entity) else {
            return Ok(None);
        };

        let bullet_id = entities.spawn();
        let bullet = Projectile::spawn(
            world,
            bullet_id,
            origin,
            Vec2::new(self.facing, 0.0),
            PLAYER_SIZE.x * 0.5,
            BULLET_DAMAGE,
        )?;
        clock.schedule(ActorEvent::ShootReady, SHOOT_COOLDOWN, ScheduleOptions::unique())?;
        self.can_shoot = false;
        sounds.play_sound("laser");
        log::debug!("player fired bullet {}", bullet_id.to_u32());
        Ok(Some(bullet))
    }

    /// Handles [`ActorEvent::ShootReady`].
    pub fn shoot_ready(&mut self) {
        self.can_shoot = true;
    }
}

impl Actor for Player {
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
        self.facing
    }

    fn take_damage(&mut self, amount: i32) -> bool {
        if !self.invulnerability.is_vulnerable() {
            return false;
        }
        self.healthbar.damage(amount);
        self.invulnerability.hit();
        log::debug!("player hit for {}, health {}", amount, self.healthbar.health());
        true
    }

    fn update_state(&mut self, world: &PhysicsWorld) {
        self.update_animation(world);
        self.invulnerability.update();
    }

    fn draw(
        &self,
        canvas: &mut dyn Canvas,
        camera: &Camera,
        world: &PhysicsWorld,
        show_bounding_box: bool,
    ) {
        draw_actor(
            self,
            PLAYER_COLOR,
            !self.invulnerability.flash_on(),
            canvas,
            camera,
            world,
            show_bounding_box,
        );
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::actor::AnimationState;
    use crate::audio::SoundLog;
    use crate::math::Rect;

    const DT: f32 = 1.0 / 60.0;

    struct Rig {
        world: PhysicsWorld,
        entities: Entities,
        player: Player,
        sounds: SoundLog,
    }

    fn rig() -> Rig {
        let mut world = PhysicsWorld::new();
        let mut entities = Entities::new();

        let floor = Rect::new(-1000.0, 0.0, 4000.0, 20.0);
        let ground = entities.spawn();
        world.create_body(ground, BodyKind::Fixed, floor.center());
        world
            .add_box(ground, floor.half_extents(), ShapeMaterial::new(Category::Terrain))
            .unwrap();

        let id = entities.spawn();
        let frames = AnimationSet::placeholder(&AnimationState::labels());
        let player = Player::spawn(&mut world, id, Vec2::new(0.0, 71.0), &frames).unwrap();
        Rig {
            world,
            entities,
            player,
            sounds: SoundLog::new(),
        }
    }

    fn settle(rig: &mut Rig, frames: usize) {
        for _ in 0..frames {
            rig.player
                .control(&PlayerIntent::default(), &mut rig.world, &mut rig.sounds, DT);
            rig.world.step(DT);
            rig.player.update_state(&rig.world);
        }
    }

    #[test]
    fn invulnerability_ignores_second_hit_and_resets_on_time() {
        let mut inv = Invulnerability::new();
        assert!(inv.hit());
        assert!(inv.flash_on());
        assert!(!inv.hit());

        inv.update();
        assert!(inv.flash_on());
        inv.update();
        assert!(!inv.flash_on());

        for _ in 2..INVULNERABILITY_FRAMES - 1 {
            inv.update();
        }
        assert!(!inv.is_vulnerable());
        assert_eq!(inv.frames(), INVULNERABILITY_FRAMES - 1);

        inv.update();
        assert!(inv.is_vulnerable());
        assert!(!inv.flash_on());
        assert_eq!(inv.frames(), 0);
    }

    #[test]
    fn damage_is_gated_by_recovery() {
        let mut rig = rig();
        assert!(rig.player.take_damage(CONTACT_DAMAGE));
        assert!(!rig.player.take_damage(CONTACT_DAMAGE));
        assert_eq!(rig.player.healthbar().health(), 100 - CONTACT_DAMAGE);
    }

    #[test]
    fn jump_only_from_the_ground() {
        let mut rig = rig();
        settle(&mut rig, 30);
        assert!(rig.world.is_grounded(rig.player.entity()));

        let jump = PlayerIntent {
            jump: true,
            ..PlayerIntent::default()
        };
        rig.player.control(&jump, &mut rig.world, &mut rig.sounds, DT);
        rig.world.step(DT);
        let vy = rig.world.linear_velocity(rig.player.entity()).unwrap().y;
        assert!(vy > JUMP_SPEED * 0.9, "vy = {vy}");
        assert_eq!(rig.sounds.count("jump"), 1);

        for _ in 0..5 {
            rig.player.control(&jump, &mut rig.world, &mut rig.sounds, DT);
            rig.world.step(DT);
        }
        assert_eq!(rig.sounds.count("jump"), 1);
        rig.player.update_state(&rig.world);
        assert_eq!(rig.player.animation().state(), AnimationState::Jump);
    }

    #[test]
    fn air_control_stops_at_walk_speed() {
        let mut rig = rig();
        let id = rig.player.entity();
        rig.world.set_position(id, Vec2::new(0.0, 2000.0));
        rig.world.set_linear_velocity(id, Vec2::new(WALK_SPEED - 10.0, 0.0));

        let right = PlayerIntent::moving(1.0);
        for _ in 0..10 {
            rig.player.control(&right, &mut rig.world, &mut rig.sounds, DT);
            rig.world.step(DT);
            let vx = rig.world.linear_velocity(id).unwrap().x;
            assert!(vx <= WALK_SPEED + 0.01, "vx = {vx}");
        }
        let vx = rig.world.linear_velocity(id).unwrap().x;
        assert!(vx > WALK_SPEED - 1.0, "vx = {vx}");
        assert!(!rig.world.is_grounded(id));
    }

    #[test]
    fn sprint_ends_when_slowing_below_walk_speed() {
        let mut rig = rig();
        settle(&mut rig, 30);

        let sprint = PlayerIntent {
            direction: 1.0,
            sprint: true,
            ..PlayerIntent::default()
        };
        rig.player.control(&sprint, &mut rig.world, &mut rig.sounds, DT);
        assert!(rig.player.is_sprinting());
        assert_eq!(
            rig.world.surface_velocity(rig.player.entity()),
            Some(Vec2::new(SPRINT_SPEED, 0.0))
        );

        settle(&mut rig, 30);
        assert!(!rig.player.is_sprinting());
    }

    #[test]
    fn shooting_waits_for_the_cooldown() {
        let mut rig = rig();
        let mut clock = Clock::new();

        let first = rig
            .player
            .try_shoot(&mut rig.world, &mut rig.entities, &mut clock, &mut rig.sounds)
            .unwrap();
        assert!(first.is_some());
        let second = rig
            .player
            .try_shoot(&mut rig.world, &mut rig.entities, &mut clock, &mut rig.sounds)
            .unwrap();
        assert!(second.is_none());
        assert_eq!(rig.sounds.count("laser"), 1);

        assert!(clock.advance(Duration::from_secs_f64(0.49)).is_empty());
        let due = clock.advance(Duration::from_secs_f64(0.02));
        assert_eq!(due, vec![ActorEvent::ShootReady]);
        rig.player.shoot_ready();
        assert!(rig.player.can_shoot());
    }
}
