use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use anyhow::Result;

use super::{draw_scenery, GameOverScene, Outcome, Scene, SceneContext, SceneSwitcher};
use crate::actor::{
    Actor, ActorEvent, AnimationState, Enemy, Player, PlayerIntent, ANIMATION_FRAME_SECS,
    CONTACT_DAMAGE,
};
use crate::assets::AnimationSet;
use crate::audio::SoundPlayer;
use crate::camera::{Camera, CameraBehavior};
use crate::clock::{Clock, ScheduleOptions};
use crate::collision::{CollisionPolicy, Phase};
use crate::entity::{Entities, EntityId};
use crate::input::{actions, InputMap, InputState};
use crate::level::LevelData;
use crate::math::{Rect, Vec2};
use crate::physics::{BodyKind, Category, Contact, PhysicsWorld, ShapeMaterial};
use crate::projectile::Projectile;
use crate::render::{Canvas, Color};

const PLAYER_ANIMATIONS: &str = "assets/player/animations";
const ENEMY_ANIMATIONS: &str = "assets/enemy/animations";

const SKY: Color = Color::rgb(0.05, 0.02, 0.12);
const PLATFORM_COLOR: Color = Color::rgb(0.15, 0.8, 0.55);
const EXIT_COLOR: Color = Color::rgb(0.7, 0.3, 1.0);

/// How far outside the view a bullet may fly before it is dropped.
const BULLET_MARGIN: f32 = 200.0;

/// Result of one level step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelStatus {
    Playing,
    Paused,
    Lost,
    Won,
}

/// Everything the collision handlers may change.
pub struct LevelState {
    pub player: Player,
    pub enemies: BTreeMap<EntityId, Enemy>,
    pub projectiles: BTreeMap<EntityId, Projectile>,
    /// Set once the player touches the exit.
    pub completed: bool,
    spent_bullets: BTreeSet<EntityId>,
}

impl LevelState {
    /// Applies removals queued by collision handlers.
    fn flush(&mut self, world: &mut PhysicsWorld, entities: &mut Entities) {
        for id in std::mem::take(&mut self.spent_bullets) {
            if let Some(mut bullet) = self.projectiles.remove(&id) {
                bullet.despawn(world);
                entities.despawn(id);
            }
        }

        let dead: Vec<EntityId> = self
            .enemies
            .iter()
            .filter(|(_, enemy)| enemy.is_dead())
            .map(|(&id, _)| id)
            .collect();
        for id in dead {
            if let Some(mut enemy) = self.enemies.remove(&id) {
                enemy.remove(world);
                entities.despawn(id);
            }
        }
    }
}

fn ignore_own_bullet(_: &mut LevelState, _: &Contact) -> bool {
    false
}

fn enemy_hit_by_bullet(state: &mut LevelState, contact: &Contact) -> bool {
    let Some(bullet) = state.projectiles.get(&contact.b) else {
        return false;
    };
    // A bullet hits at most one thing.
    if !state.spent_bullets.insert(contact.b) {
        return false;
    }
    let damage = bullet.damage();
    if let Some(enemy) = state.enemies.get_mut(&contact.a) {
        enemy.take_damage(damage);
    }
    false
}

fn bullet_hit_terrain(state: &mut LevelState, contact: &Contact) -> bool {
    if state.projectiles.contains_key(&contact.b) {
        state.spent_bullets.insert(contact.b);
    }
    false
}

fn player_touches_enemy(state: &mut LevelState, _: &Contact) -> bool {
    state.player.take_damage(CONTACT_DAMAGE);
    false
}

fn player_reaches_exit(state: &mut LevelState, _: &Contact) -> bool {
    if !state.completed {
        log::info!("exit reached");
    }
    state.completed = true;
    false
}

/// Collision rules of a level.
pub fn level_policy() -> CollisionPolicy<LevelState> {
    let mut policy = CollisionPolicy::new();
    policy
        .on(Category::Player, Category::Bullet, Phase::Begin, ignore_own_bullet)
        .on(Category::Enemy, Category::Bullet, Phase::Begin, enemy_hit_by_bullet)
        .on(Category::Terrain, Category::Bullet, Phase::Begin, bullet_hit_terrain)
        .on(Category::Player, Category::Enemy, Phase::PreSolve, player_touches_enemy)
        .on(Category::Player, Category::Exit, Phase::PreSolve, player_reaches_exit);
    policy
}

/// A playable level: physics world, actors, clock and camera.
pub struct LevelScene {
    level: LevelData,
    world: PhysicsWorld,
    entities: Entities,
    clock: Clock<ActorEvent>,
    policy: CollisionPolicy<LevelState>,
    state: LevelState,
    terrain: Vec<Rect>,
    exit: Rect,
    camera: Camera,
    bindings: InputMap,
    show_hitboxes: bool,
    paused: bool,
}

impl LevelScene {
    /// The first level with animations from the asset directory.
    pub fn new(screen: Vec2) -> Result<Self> {
        let labels = AnimationState::labels();
        Self::from_level(
            LevelData::level_one()?,
            screen,
            &AnimationSet::load(PLAYER_ANIMATIONS, &labels),
            &AnimationSet::load(ENEMY_ANIMATIONS, &labels),
        )
    }

    pub fn from_level(
        level: LevelData,
        screen: Vec2,
        player_frames: &AnimationSet,
        enemy_frames: &AnimationSet,
    ) -> Result<Self> {
        level.validate()?;
        let mut world = PhysicsWorld::new();
        let mut entities = Entities::new();
        let policy = level_policy();
        policy.install(&mut world);

        for rect in &level.platforms {
            let id = entities.spawn();
            world.create_body(id, BodyKind::Fixed, rect.center());
            world.add_box(id, rect.half_extents(), ShapeMaterial::new(Category::Terrain))?;
        }

        let exit_id = entities.spawn();
        world.create_body(exit_id, BodyKind::Fixed, level.exit.center());
        world.add_box(
            exit_id,
            level.exit.half_extents(),
            ShapeMaterial::new(Category::Exit).with_friction(0.0),
        )?;

        let player_id = entities.spawn();
        let player = Player::spawn(&mut world, player_id, level.player_spawn, player_frames)?;

        let mut enemies = BTreeMap::new();
        for placement in &level.enemies {
            let Some(position) = level.enemy_position(placement) else {
                continue;
            };
            let id = entities.spawn();
            let enemy = Enemy::spawn(&mut world, id, position, placement.direction, enemy_frames)?;
            enemies.insert(id, enemy);
        }

        let mut clock = Clock::new();
        clock.schedule(
            ActorEvent::AnimationTick,
            ANIMATION_FRAME_SECS,
            ScheduleOptions::repeating(),
        )?;

        let mut camera = Camera::new(
            screen,
            CameraBehavior::BoundedFollowTarget {
                horizontal: level.camera.horizontal,
                vertical: level.camera.vertical,
            },
        )
        .with_constant(level.camera.constant);
        camera.follow(level.player_spawn);

        log::info!(
            "built level '{}': {} platforms, {} enemies",
            level.name,
            level.platforms.len(),
            enemies.len()
        );

        Ok(Self {
            terrain: level.platforms.clone(),
            exit: level.exit,
            level,
            world,
            entities,
            clock,
            policy,
            state: LevelState {
                player,
                enemies,
                projectiles: BTreeMap::new(),
                completed: false,
                spent_bullets: BTreeSet::new(),
            },
            camera,
            bindings: InputMap::platformer(),
            show_hitboxes: false,
            paused: false,
        })
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.world
    }

    pub fn state(&self) -> &LevelState {
        &self.state
    }

    pub fn player(&self) -> &Player {
        &self.state.player
    }

    pub fn clock(&self) -> &Clock<ActorEvent> {
        &self.clock
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn level(&self) -> &LevelData {
        &self.level
    }

    pub fn show_hitboxes(&self) -> bool {
        self.show_hitboxes
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Runs one fixed step of the level.
    pub fn step(
        &mut self,
        input: &InputState,
        sounds: &mut dyn SoundPlayer,
        dt: f32,
    ) -> Result<LevelStatus> {
        if self.bindings.action_pressed(input, actions::TOGGLE_HITBOXES) {
            self.show_hitboxes = !self.show_hitboxes;
        }
        if self.bindings.action_pressed(input, actions::TOGGLE_SOUND) {
            sounds.toggle_muted();
        }
        if self.bindings.action_pressed(input, actions::PAUSE) {
            self.paused = !self.paused;
            self.clock.set_paused(self.paused);
            log::info!("level {}", if self.paused { "paused" } else { "resumed" });
        }
        if self.paused {
            return Ok(LevelStatus::Paused);
        }

        // Control.
        let intent = PlayerIntent::from_input(&self.bindings, input);
        self.state.player.control(&intent, &mut self.world, sounds, dt);
        if intent.shoot {
            let shot = self.state.player.try_shoot(
                &mut self.world,
                &mut self.entities,
                &mut self.clock,
                sounds,
            )?;
            if let Some(bullet) = shot {
                self.state.projectiles.insert(bullet.entity(), bullet);
            }
        }
        for enemy in self.state.enemies.values() {
            enemy.patrol(&mut self.world);
        }

        // Simulate and resolve contacts.
        let report = self.world.step(dt);
        self.policy.dispatch(&report, &mut self.state, &mut self.world);
        self.state.flush(&mut self.world, &mut self.entities);

        // Post-step state.
        self.state.player.update_state(&self.world);
        for enemy in self.state.enemies.values_mut() {
            enemy.update_state(&self.world);
            enemy.check_edge(&mut self.world, &mut self.clock, dt)?;
        }
        self.drop_stray_bullets();

        for event in self.clock.advance(Duration::from_secs_f32(dt)) {
            self.handle_event(event);
        }

        let player_rect = self.world.shape_rect(self.state.player.entity());
        if let Some(rect) = player_rect {
            self.camera.follow(rect.center());
        }

        if self.state.player.is_dead() {
            log::info!("player died");
            return Ok(LevelStatus::Lost);
        }
        if player_rect.map_or(true, |r| r.top() < self.level.kill_plane) {
            log::info!("player fell out of the level");
            return Ok(LevelStatus::Lost);
        }
        if self.state.completed {
            return Ok(LevelStatus::Won);
        }
        Ok(LevelStatus::Playing)
    }

    fn handle_event(&mut self, event: ActorEvent) {
        match event {
            ActorEvent::ShootReady => self.state.player.shoot_ready(),
            ActorEvent::TurnReady(id) => {
                if let Some(enemy) = self.state.enemies.get_mut(&id) {
                    enemy.turn_ready();
                }
            }
            ActorEvent::AnimationTick => {
                self.state.player.animation_mut().advance();
                for enemy in self.state.enemies.values_mut() {
                    enemy.animation_mut().advance();
                }
            }
        }
    }

    fn drop_stray_bullets(&mut self) {
        let left = self.camera.offset.x - BULLET_MARGIN;
        let right = self.camera.offset.x + self.camera.viewport.x + BULLET_MARGIN;
        let stray: Vec<EntityId> = self
            .state
            .projectiles
            .values()
            .filter(|p| p.out_of_bounds(&self.world, left, right))
            .map(Projectile::entity)
            .collect();
        for id in stray {
            if let Some(mut bullet) = self.state.projectiles.remove(&id) {
                bullet.despawn(&mut self.world);
                self.entities.despawn(id);
            }
        }
    }

    fn draw_hud(&self, canvas: &mut dyn Canvas) {
        self.state.player.healthbar().draw(
            canvas,
            Rect::new(20.0, 20.0, 240.0, 20.0),
            Some(Color::WHITE),
        );
    }
}

impl Scene for LevelScene {
    fn update(&mut self, ctx: &mut SceneContext, switcher: &mut dyn SceneSwitcher) -> Result<()> {
        match self.step(ctx.input, ctx.sounds, ctx.dt)? {
            LevelStatus::Playing | LevelStatus::Paused => {}
            LevelStatus::Lost => switcher.go_to(Box::new(GameOverScene::new(Outcome::Defeat, ctx.screen))),
            LevelStatus::Won => switcher.go_to(Box::new(GameOverScene::new(Outcome::Victory, ctx.screen))),
        }
        Ok(())
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        canvas.clear(SKY);
        draw_scenery(canvas, self.camera.offset);

        for rect in &self.terrain {
            let screen = self.camera.rect_to_screen(rect);
            canvas.fill_rect(screen, PLATFORM_COLOR);
            if self.show_hitboxes {
                canvas.outline_rect(screen, Color::RED, 1.0);
            }
        }
        let exit = self.camera.rect_to_screen(&self.exit);
        canvas.fill_rect(exit, EXIT_COLOR);
        canvas.outline_rect(exit, Color::WHITE, 2.0);

        for enemy in self.state.enemies.values() {
            enemy.draw(canvas, &self.camera, &self.world, self.show_hitboxes);
        }
        self.state
            .player
            .draw(canvas, &self.camera, &self.world, self.show_hitboxes);
        for bullet in self.state.projectiles.values() {
            bullet.draw(canvas, &self.camera, &self.world, self.show_hitboxes);
        }

        self.draw_hud(canvas);
        if self.paused {
            let size = canvas.size();
            canvas.fill_rect(
                Rect::new(0.0, 0.0, size.x, size.y),
                Color::rgba(0.0, 0.0, 0.0, 0.5),
            );
        }
    }

    fn name(&self) -> &'static str {
        "level"
    }
}
