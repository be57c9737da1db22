//! Player and enemy characters.

mod enemy;
mod player;

pub use enemy::{Enemy, ENEMY_SIZE, ENEMY_SPEED, TURN_DELAY};
pub use player::{
    Invulnerability, Player, PlayerIntent, AIR_ACCEL, AIR_DRAG, CONTACT_DAMAGE, FLASH_FRAMES,
    INVULNERABILITY_FRAMES, JUMP_SPEED, PLAYER_SIZE, SHOOT_COOLDOWN, SPRINT_SPEED,
    SUPER_JUMP_SPEED, WALK_SPEED,
};

use crate::assets::AnimationSet;
use crate::camera::Camera;
use crate::entity::EntityId;
use crate::health::Healthbar;
use crate::math::{Rect, Vec2};
use crate::physics::PhysicsWorld;
use crate::render::{Canvas, Color};

/// Horizontal speed below which a grounded actor counts as standing still.
pub const RUN_THRESHOLD: f32 = 5.0;

/// Seconds between animation frames.
pub const ANIMATION_FRAME_SECS: f64 = 0.1;

/// Timed actor notifications delivered by the level clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActorEvent {
    /// The player's weapon has cooled down.
    ShootReady,
    /// The enemy may turn around at an edge again.
    TurnReady(EntityId),
    /// Advance every animation by one frame.
    AnimationTick,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationState {
    Idle,
    Run,
    Jump,
    Fall,
}

impl AnimationState {
    pub const ALL: [AnimationState; 4] = [Self::Idle, Self::Run, Self::Jump, Self::Fall];

    /// Directory name of the animation frames.
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Run => "run",
            Self::Jump => "jump",
            Self::Fall => "fall",
        }
    }

    /// State an actor should show after a physics step.
    pub fn from_motion(grounded: bool, velocity: Vec2) -> Self {
        if !grounded {
            if velocity.y >= 0.0 {
                Self::Jump
            } else {
                Self::Fall
            }
        } else if velocity.x.abs() > RUN_THRESHOLD {
            Self::Run
        } else {
            Self::Idle
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Idle => 0,
            Self::Run => 1,
            Self::Jump => 2,
            Self::Fall => 3,
        }
    }

    pub fn labels() -> [&'static str; 4] {
        Self::ALL.map(Self::label)
    }
}

/// Current animation state and frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Animation {
    state: AnimationState,
    frame: usize,
    frame_counts: [usize; 4],
}

impl Animation {
    pub fn new(frames: &AnimationSet) -> Self {
        Self {
            state: AnimationState::Idle,
            frame: 0,
            frame_counts: AnimationState::ALL.map(|s| frames.frame_count(s.label()).max(1)),
        }
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Switches state, restarting at frame 0. Returns false if already in `state`.
    pub fn set_state(&mut self, state: AnimationState) -> bool {
        if self.state == state {
            return false;
        }
        self.state = state;
        self.frame = 0;
        true
    }

    /// Steps to the next frame, wrapping at the end of the current animation.
    pub fn advance(&mut self) {
        self.frame = (self.frame + 1) % self.frame_counts[self.state.index()];
    }
}

/// Behaviour shared by the player and enemies.
pub trait Actor {
    fn entity(&self) -> EntityId;

    fn healthbar(&self) -> &Healthbar;

    fn animation(&self) -> &Animation;

    fn animation_mut(&mut self) -> &mut Animation;

    /// +1 facing right, -1 facing left.
    fn facing(&self) -> f32;

    /// Applies damage. Returns false if it had no effect.
    fn take_damage(&mut self, amount: i32) -> bool;

    /// Post-step bookkeeping: animation state and timers.
    fn update_state(&mut self, world: &PhysicsWorld);

    fn draw(
        &self,
        canvas: &mut dyn Canvas,
        camera: &Camera,
        world: &PhysicsWorld,
        show_bounding_box: bool,
    );

    fn is_dead(&self) -> bool {
        self.healthbar().is_depleted()
    }

    /// Re-evaluates the animation state from the body's motion.
    fn update_animation(&mut self, world: &PhysicsWorld) {
        let id = self.entity();
        let velocity = world.linear_velocity(id).unwrap_or(Vec2::ZERO);
        let state = AnimationState::from_motion(world.is_grounded(id), velocity);
        self.animation_mut().set_state(state);
    }
}

/// Flat-colour stand-in for an animation frame: shade varies with state and frame.
pub(crate) fn body_color(base: Color, animation: &Animation) -> Color {
    let state_shift = match animation.state() {
        AnimationState::Idle => 0.0,
        AnimationState::Run => 0.08,
        AnimationState::Jump => 0.16,
        AnimationState::Fall => -0.08,
    };
    let frame_shift = if animation.frame() % 2 == 0 { 0.0 } else { 0.04 };
    let shift = state_shift + frame_shift;
    Color::rgba(
        (base.r + shift).clamp(0.0, 1.0),
        (base.g + shift).clamp(0.0, 1.0),
        (base.b + shift).clamp(0.0, 1.0),
        base.a,
    )
}

/// Draws the actor's box, a facing marker, its healthbar and optionally its hitbox.
pub(crate) fn draw_actor(
    actor: &dyn Actor,
    base: Color,
    visible: bool,
    canvas: &mut dyn Canvas,
    camera: &Camera,
    world: &PhysicsWorld,
    show_bounding_box: bool,
) {
    let Some(rect) = world.shape_rect(actor.entity()) else {
        return;
    };
    let screen = camera.rect_to_screen(&rect);

    if visible {
        canvas.fill_rect(screen, body_color(base, actor.animation()));
        // Eye on the facing side.
        let eye_x = if actor.facing() > 0.0 {
            screen.x + screen.w * 0.65
        } else {
            screen.x + screen.w * 0.15
        };
        canvas.fill_rect(
            Rect::new(eye_x, screen.y + screen.h * 0.15, screen.w * 0.2, 6.0),
            Color::WHITE,
        );
    }

    let bar = Rect::new(screen.x, screen.y - 12.0, screen.w, 8.0);
    actor.healthbar().draw(canvas, bar, Some(Color::BLACK));

    if show_bounding_box {
        canvas.outline_rect(screen, Color::rgb(1.0, 0.0, 1.0), 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_follows_motion() {
        assert_eq!(
            AnimationState::from_motion(false, Vec2::new(0.0, 10.0)),
            AnimationState::Jump
        );
        assert_eq!(
            AnimationState::from_motion(false, Vec2::new(0.0, 0.0)),
            AnimationState::Jump
        );
        assert_eq!(
            AnimationState::from_motion(false, Vec2::new(100.0, -1.0)),
            AnimationState::Fall
        );
        assert_eq!(
            AnimationState::from_motion(true, Vec2::new(-100.0, 0.0)),
            AnimationState::Run
        );
        assert_eq!(
            AnimationState::from_motion(true, Vec2::new(RUN_THRESHOLD, 0.0)),
            AnimationState::Idle
        );
    }

    #[test]
    fn state_change_resets_frame_and_same_state_is_noop() {
        let frames = AnimationSet::placeholder(&AnimationState::labels()).with_frames("run", 4);
        let mut anim = Animation::new(&frames);

        assert!(anim.set_state(AnimationState::Run));
        anim.advance();
        anim.advance();
        assert_eq!(anim.frame(), 2);

        assert!(!anim.set_state(AnimationState::Run));
        assert_eq!(anim.frame(), 2);

        anim.advance();
        anim.advance();
        assert_eq!(anim.frame(), 0);

        anim.advance();
        assert!(anim.set_state(AnimationState::Idle));
        assert_eq!(anim.frame(), 0);
        anim.advance();
        assert_eq!(anim.frame(), 0);
    }
}
