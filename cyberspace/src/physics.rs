// cyberspace/src/physics.rs
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};

use crate::entity::EntityId;
use crate::math::{Rect, Vec2};

// Rapier is private implementation detail: do NOT re-export it.
use rapier2d::prelude::*;

/// Downward acceleration in pixels per second squared.
pub const GRAVITY: f32 = 1500.0;

/// A support contact must have a normal this close to straight up.
pub const GROUND_NORMAL_THRESHOLD: f32 = 0.99;

/// Squared distance within which a bottom corner counts as supported.
pub const EDGE_SUPPORT_DISTANCE_SQ: f32 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyKind {
    Dynamic,
    /// Moved only by its velocity; ignores gravity and impulses.
    Kinematic,
    Fixed,
}

/// Collision category of a shape, used to select collision handlers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Player,
    Enemy,
    Bullet,
    Terrain,
    Exit,
}

/// Surface properties of a box shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeMaterial {
    pub category: Category,
    pub friction: f32,
    pub elasticity: f32,
    pub density: f32,
}

impl ShapeMaterial {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            friction: 1.0,
            elasticity: 0.0,
            density: 1.0,
        }
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }
}

/// Opaque identity of a touching shape pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShapePair(ColliderHandle, ColliderHandle);

/// A touching pair of shapes, as seen by collision handlers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    pub a: EntityId,
    pub b: EntityId,
    pub category_a: Category,
    pub category_b: Category,
    /// Unit normal pointing from `a` towards `b`. Zero if unknown.
    pub normal: Vec2,
    /// First solver contact point in world space.
    pub point: Option<Vec2>,
    pair: ShapePair,
}

impl Contact {
    /// Same contact seen from `b`'s side.
    pub fn swapped(&self) -> Self {
        Self {
            a: self.b,
            b: self.a,
            category_a: self.category_b,
            category_b: self.category_a,
            normal: -self.normal,
            point: self.point,
            pair: ShapePair(self.pair.1, self.pair.0),
        }
    }

    pub fn pair(&self) -> ShapePair {
        self.pair
    }
}

/// Contacts produced by one [`PhysicsWorld::step`].
#[derive(Clone, Debug, Default)]
pub struct ContactReport {
    /// Pairs that started touching during this step.
    pub begin: Vec<Contact>,
    /// Every pair currently touching, including the new ones.
    pub touching: Vec<Contact>,
}

/// What holds a shape up: world contact points and the shapes touched.
#[derive(Default)]
struct Support {
    points: Vec<Vec2>,
    colliders: Vec<ColliderHandle>,
}

#[derive(Clone, Copy, Debug)]
struct ShapeInfo {
    entity: EntityId,
    category: Category,
    half_extents: Vec2,
    surface_velocity: Vec2,
}

/// Decides, before the solver runs, which touching pairs get a physical response
/// and feeds walking speeds to the solver as contact tangent velocity.
struct ResponseHooks<'a> {
    shapes: &'a HashMap<ColliderHandle, ShapeInfo>,
    disabled: &'a HashSet<(Category, Category)>,
    kept: &'a HashSet<(ColliderHandle, ColliderHandle)>,
}

impl ResponseHooks<'_> {
    fn is_solid(&self, c1: ColliderHandle, c2: ColliderHandle) -> bool {
        let (Some(s1), Some(s2)) = (self.shapes.get(&c1), self.shapes.get(&c2)) else {
            return true;
        };
        let disabled = self.disabled.contains(&(s1.category, s2.category))
            || self.disabled.contains(&(s2.category, s1.category));
        !disabled || self.kept.contains(&(c1, c2)) || self.kept.contains(&(c2, c1))
    }

    fn walk(&self, collider: ColliderHandle) -> Vector<Real> {
        self.shapes
            .get(&collider)
            .map(|s| vector![s.surface_velocity.x, s.surface_velocity.y])
            .unwrap_or_else(Vector::zeros)
    }
}

impl PhysicsHooks for ResponseHooks<'_> {
    fn filter_contact_pair(&self, context: &PairFilterContext) -> Option<SolverFlags> {
        if self.is_solid(context.collider1, context.collider2) {
            Some(SolverFlags::COMPUTE_IMPULSES)
        } else {
            // Keep the contact so handlers and events still see it.
            Some(SolverFlags::empty())
        }
    }

    fn modify_solver_contacts(&self, context: &mut ContactModificationContext) {
        let tangent_velocity = self.walk(context.collider2) - self.walk(context.collider1);
        for contact in context.solver_contacts.iter_mut() {
            contact.tangent_velocity = tangent_velocity;
        }
    }
}

/// Rigid body world: one box shape per body, y-up gravity.
pub struct PhysicsWorld {
    // --- rapier internals ---
    pipeline: PhysicsPipeline,
    integration_parameters: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    rigid_bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,

    // Event channels
    event_recv_collision: crossbeam_channel::Receiver<CollisionEvent>,
    event_recv_contact_force: crossbeam_channel::Receiver<ContactForceEvent>,
    event_handler: ChannelEventCollector,

    // --- mappings (engine <-> rapier) ---
    entity_to_body: HashMap<EntityId, RigidBodyHandle>,
    body_to_entity: HashMap<RigidBodyHandle, EntityId>,
    entity_to_collider: HashMap<EntityId, ColliderHandle>,
    shapes: HashMap<ColliderHandle, ShapeInfo>,

    // --- response table ---
    disabled: HashSet<(Category, Category)>,
    kept: HashSet<(ColliderHandle, ColliderHandle)>,

    gravity: Vec2,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    pub fn new() -> Self {
        let (send_col, recv_col) = crossbeam_channel::unbounded();
        let (send_force, recv_force) = crossbeam_channel::unbounded();
        let event_handler = ChannelEventCollector::new(send_col, send_force);

        Self {
            pipeline: PhysicsPipeline::new(),
            integration_parameters: IntegrationParameters::default(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),

            event_recv_collision: recv_col,
            event_recv_contact_force: recv_force,
            event_handler,

            entity_to_body: HashMap::new(),
            body_to_entity: HashMap::new(),
            entity_to_collider: HashMap::new(),
            shapes: HashMap::new(),

            disabled: HashSet::new(),
            kept: HashSet::new(),

            gravity: Vec2::new(0.0, -GRAVITY),
        }
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    /// Create/replace the body for an entity. The body is centred on `position`.
    pub fn create_body(&mut self, entity: EntityId, kind: BodyKind, position: Vec2) {
        // Remove existing body if any (keeps invariant 1 body per entity).
        self.remove_body(entity);

        let rb_type = match kind {
            BodyKind::Dynamic => RigidBodyType::Dynamic,
            BodyKind::Kinematic => RigidBodyType::KinematicVelocityBased,
            BodyKind::Fixed => RigidBodyType::Fixed,
        };

        let body = RigidBodyBuilder::new(rb_type)
            .translation(vector![position.x, position.y])
            .can_sleep(false)
            .build();

        let handle = self.rigid_bodies.insert(body);
        self.entity_to_body.insert(entity, handle);
        self.body_to_entity.insert(handle, entity);
        log::debug!("created {:?} body for entity {}", kind, entity.to_u32());
    }

    /// Attach the entity's single box shape.
    pub fn add_box(
        &mut self,
        entity: EntityId,
        half_extents: Vec2,
        material: ShapeMaterial,
    ) -> Result<()> {
        let body = self.body_handle(entity)?;
        if self.entity_to_collider.contains_key(&entity) {
            return Err(anyhow!("Entity {:?} already has a shape", entity));
        }

        let mut builder = ColliderBuilder::cuboid(half_extents.x, half_extents.y)
            .density(material.density)
            .friction(material.friction)
            .restitution(material.elasticity)
            .active_hooks(ActiveHooks::FILTER_CONTACT_PAIRS | ActiveHooks::MODIFY_SOLVER_CONTACTS)
            .active_events(ActiveEvents::COLLISION_EVENTS);

        if material.category == Category::Bullet {
            // Kinematic projectiles must still see static terrain.
            builder = builder.active_collision_types(
                ActiveCollisionTypes::default() | ActiveCollisionTypes::KINEMATIC_FIXED,
            );
        }

        let handle =
            self.colliders
                .insert_with_parent(builder.build(), body, &mut self.rigid_bodies);
        self.entity_to_collider.insert(entity, handle);
        self.shapes.insert(
            handle,
            ShapeInfo {
                entity,
                category: material.category,
                half_extents,
                surface_velocity: Vec2::ZERO,
            },
        );
        Ok(())
    }

    /// Remove a body (and its shape) for an entity. Returns whether one existed.
    pub fn remove_body(&mut self, entity: EntityId) -> bool {
        let Some(handle) = self.entity_to_body.remove(&entity) else {
            return false;
        };
        self.rigid_bodies.remove(
            handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        self.body_to_entity.remove(&handle);
        if let Some(collider) = self.entity_to_collider.remove(&entity) {
            self.shapes.remove(&collider);
            self.kept.retain(|&(c1, c2)| c1 != collider && c2 != collider);
        }
        log::debug!("removed body for entity {}", entity.to_u32());
        true
    }

    pub fn has_body(&self, entity: EntityId) -> bool {
        self.entity_to_body.contains_key(&entity)
    }

    pub fn body_count(&self) -> usize {
        self.entity_to_body.len()
    }

    /// Contacts between these categories are reported but not resolved.
    pub fn disable_response(&mut self, a: Category, b: Category) {
        self.disabled.insert((a, b));
    }

    /// Restores the physical response for one touching pair until it separates.
    pub fn keep_response(&mut self, pair: ShapePair) {
        self.kept.insert((pair.0, pair.1));
    }

    /// Step simulation by `dt` seconds and report contacts.
    pub fn step(&mut self, dt: f32) -> ContactReport {
        self.integration_parameters.dt = dt;

        let gravity = vector![self.gravity.x, self.gravity.y];
        let hooks = ResponseHooks {
            shapes: &self.shapes,
            disabled: &self.disabled,
            kept: &self.kept,
        };

        self.pipeline.step(
            &gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &hooks,
            &self.event_handler,
        );

        // Forces only last for the step they were applied in.
        for (_, body) in self.rigid_bodies.iter_mut() {
            body.reset_forces(false);
        }

        self.collect_contacts()
    }

    // ------------------------------
    // Per-entity body queries/actions
    // ------------------------------

    pub fn position(&self, entity: EntityId) -> Option<Vec2> {
        let b = self.body(entity)?;
        let t = b.translation();
        Some(Vec2::new(t.x, t.y))
    }

    pub fn set_position(&mut self, entity: EntityId, pos: Vec2) {
        if let Some(b) = self.body_mut(entity) {
            b.set_translation(vector![pos.x, pos.y], true);
        }
    }

    pub fn linear_velocity(&self, entity: EntityId) -> Option<Vec2> {
        let v = self.body(entity)?.linvel();
        Some(Vec2::new(v.x, v.y))
    }

    pub fn set_linear_velocity(&mut self, entity: EntityId, vel: Vec2) {
        if let Some(b) = self.body_mut(entity) {
            b.set_linvel(vector![vel.x, vel.y], true);
        }
    }

    pub fn apply_impulse(&mut self, entity: EntityId, impulse: Vec2) {
        if let Some(b) = self.body_mut(entity) {
            b.apply_impulse(vector![impulse.x, impulse.y], true);
        }
    }

    /// Adds a force for the next step only.
    pub fn apply_force(&mut self, entity: EntityId, force: Vec2) {
        if let Some(b) = self.body_mut(entity) {
            b.add_force(vector![force.x, force.y], true);
        }
    }

    /// Lock rotations for a body (platformer characters).
    pub fn lock_rotations(&mut self, entity: EntityId, locked: bool) {
        if let Some(b) = self.body_mut(entity) {
            b.lock_rotations(locked, true);
        }
    }

    /// Mass of a dynamic body; 0 for bodies with no shape.
    pub fn mass(&self, entity: EntityId) -> f32 {
        self.body(entity).map(|b| b.mass()).unwrap_or(0.0)
    }

    /// Velocity the shape tries to keep relative to whatever it touches.
    pub fn set_surface_velocity(&mut self, entity: EntityId, velocity: Vec2) {
        if let Some(info) = self.shape_info_mut(entity) {
            info.surface_velocity = velocity;
        }
    }

    pub fn surface_velocity(&self, entity: EntityId) -> Option<Vec2> {
        self.shape_info(entity).map(|s| s.surface_velocity)
    }

    pub fn category(&self, entity: EntityId) -> Option<Category> {
        self.shape_info(entity).map(|s| s.category)
    }

    /// World-space bounding box of the entity's shape.
    pub fn shape_rect(&self, entity: EntityId) -> Option<Rect> {
        let center = self.position(entity)?;
        let half = self.shape_info(entity)?.half_extents;
        Some(Rect::from_center(center, half * 2.0))
    }

    // ------------------------------
    // Contact queries
    // ------------------------------

    /// True while a solid contact pushes the entity up from below.
    pub fn is_grounded(&self, entity: EntityId) -> bool {
        self.support(entity).is_some()
    }

    /// Horizontal extent `(left, right)` covered by the shapes the entity
    /// stands on, or `None` if nothing supports it.
    pub fn support_span(&self, entity: EntityId) -> Option<(f32, f32)> {
        let support = self.support(entity)?;
        support
            .colliders
            .iter()
            .filter_map(|&handle| {
                let collider = self.colliders.get(handle)?;
                let half = self.shapes.get(&handle)?.half_extents;
                let x = collider.translation().x;
                Some((x - half.x, x + half.x))
            })
            .reduce(|(lo, hi), (l, r)| (lo.min(l), hi.max(r)))
    }

    /// True when the shape rests on something but one of its bottom corners
    /// has no support contact nearby.
    pub fn at_unsupported_edge(&self, entity: EntityId) -> bool {
        let Some(Support { points, .. }) = self.support(entity) else {
            return false;
        };
        let Some(rect) = self.shape_rect(entity) else {
            return false;
        };

        let corners = [
            Vec2::new(rect.left(), rect.bottom()),
            Vec2::new(rect.right(), rect.bottom()),
        ];
        corners.iter().any(|&corner| {
            points
                .iter()
                .all(|&p| corner.distance_squared(p) > EDGE_SUPPORT_DISTANCE_SQ)
        })
    }

    /// Solid contacts supporting `entity` from below, or `None` if nothing
    /// supports it.
    fn support(&self, entity: EntityId) -> Option<Support> {
        let collider = *self.entity_to_collider.get(&entity)?;
        let up = vector![0.0, 1.0];
        let mut supported = false;
        let mut support = Support::default();

        for pair in self.narrow_phase.contact_pairs() {
            if !pair.has_any_active_contact {
                continue;
            }
            let (sign, other) = if pair.collider2 == collider {
                (1.0, pair.collider1)
            } else if pair.collider1 == collider {
                (-1.0, pair.collider2)
            } else {
                continue;
            };

            for manifold in &pair.manifolds {
                if manifold.data.solver_contacts.is_empty()
                    || !manifold
                        .data
                        .solver_flags
                        .contains(SolverFlags::COMPUTE_IMPULSES)
                {
                    continue;
                }
                let support_normal = manifold.data.normal * sign;
                if support_normal.dot(&up) >= GROUND_NORMAL_THRESHOLD {
                    supported = true;
                    if !support.colliders.contains(&other) {
                        support.colliders.push(other);
                    }
                    support.points.extend(
                        manifold
                            .data
                            .solver_contacts
                            .iter()
                            .map(|c| Vec2::new(c.point.x, c.point.y)),
                    );
                }
            }
        }

        supported.then_some(support)
    }

    // ------------------------------
    // Private helpers
    // ------------------------------

    fn body_handle(&self, entity: EntityId) -> Result<RigidBodyHandle> {
        self.entity_to_body
            .get(&entity)
            .copied()
            .ok_or_else(|| anyhow!("Entity {:?} has no physics body", entity))
    }

    fn body(&self, entity: EntityId) -> Option<&RigidBody> {
        let h = *self.entity_to_body.get(&entity)?;
        self.rigid_bodies.get(h)
    }

    fn body_mut(&mut self, entity: EntityId) -> Option<&mut RigidBody> {
        let h = *self.entity_to_body.get(&entity)?;
        self.rigid_bodies.get_mut(h)
    }

    fn shape_info(&self, entity: EntityId) -> Option<&ShapeInfo> {
        let c = self.entity_to_collider.get(&entity)?;
        self.shapes.get(c)
    }

    fn shape_info_mut(&mut self, entity: EntityId) -> Option<&mut ShapeInfo> {
        let c = self.entity_to_collider.get(&entity)?;
        self.shapes.get_mut(c)
    }

    fn collect_contacts(&mut self) -> ContactReport {
        let mut report = ContactReport::default();

        while let Ok(ev) = self.event_recv_collision.try_recv() {
            match ev {
                CollisionEvent::Started(c1, c2, _) => {
                    if let Some(contact) = self.make_contact(c1, c2) {
                        report.begin.push(contact);
                    }
                }
                CollisionEvent::Stopped(c1, c2, _) => {
                    self.kept.remove(&(c1, c2));
                    self.kept.remove(&(c2, c1));
                }
            }
        }
        // Contact forces are not used; keep the channel from growing.
        while self.event_recv_contact_force.try_recv().is_ok() {}

        report.touching = self
            .narrow_phase
            .contact_pairs()
            .filter(|pair| pair.has_any_active_contact)
            .filter_map(|pair| self.make_contact(pair.collider1, pair.collider2))
            .collect();

        report
    }

    fn make_contact(&self, c1: ColliderHandle, c2: ColliderHandle) -> Option<Contact> {
        let s1 = self.shapes.get(&c1)?;
        let s2 = self.shapes.get(&c2)?;

        let manifold = self
            .narrow_phase
            .contact_pair(c1, c2)
            .and_then(|pair| {
                // The stored pair may be ordered either way round.
                let flip = if pair.collider1 == c1 { 1.0 } else { -1.0 };
                pair.manifolds
                    .iter()
                    .find(|m| !m.data.solver_contacts.is_empty())
                    .map(|m| (m.data.normal * flip, m.data.solver_contacts.first().map(|c| c.point)))
            });

        let (normal, point) = match manifold {
            Some((n, p)) => (
                Vec2::new(n.x, n.y),
                p.map(|p| Vec2::new(p.x, p.y)),
            ),
            None => (Vec2::ZERO, None),
        };

        Some(Contact {
            a: s1.entity,
            b: s2.entity,
            category_a: s1.category,
            category_b: s2.category,
            normal,
            point,
            pair: ShapePair(c1, c2),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entities;

    const DT: f32 = 1.0 / 60.0;

    fn ground(world: &mut PhysicsWorld, entities: &mut Entities, rect: Rect) -> EntityId {
        let id = entities.spawn();
        world.create_body(id, BodyKind::Fixed, rect.center());
        world
            .add_box(id, rect.half_extents(), ShapeMaterial::new(Category::Terrain))
            .unwrap();
        id
    }

    fn crate_box(world: &mut PhysicsWorld, entities: &mut Entities, center: Vec2) -> EntityId {
        let id = entities.spawn();
        world.create_body(id, BodyKind::Dynamic, center);
        world.lock_rotations(id, true);
        world
            .add_box(id, Vec2::new(25.0, 25.0), ShapeMaterial::new(Category::Player))
            .unwrap();
        id
    }

    #[test]
    fn shape_requires_body() {
        let mut world = PhysicsWorld::new();
        let mut entities = Entities::new();
        let id = entities.spawn();
        assert!(world
            .add_box(id, Vec2::new(1.0, 1.0), ShapeMaterial::new(Category::Terrain))
            .is_err());
    }

    #[test]
    fn falling_box_is_not_grounded_until_it_lands() {
        let mut world = PhysicsWorld::new();
        let mut entities = Entities::new();
        ground(&mut world, &mut entities, Rect::new(0.0, 0.0, 400.0, 20.0));
        let b = crate_box(&mut world, &mut entities, Vec2::new(200.0, 200.0));

        world.step(DT);
        assert!(!world.is_grounded(b));

        let mut landed_at = None;
        for frame in 0..120 {
            let report = world.step(DT);
            if !report.begin.is_empty() && landed_at.is_none() {
                landed_at = Some(frame);
            }
        }
        assert!(landed_at.is_some());
        assert!(world.is_grounded(b));
        assert!(!world.at_unsupported_edge(b));
        let rect = world.shape_rect(b).unwrap();
        assert!((rect.bottom() - 20.0).abs() < 1.0);
    }

    #[test]
    fn support_span_covers_the_platforms_underneath() {
        let mut world = PhysicsWorld::new();
        let mut entities = Entities::new();
        ground(&mut world, &mut entities, Rect::new(0.0, 0.0, 100.0, 20.0));
        ground(&mut world, &mut entities, Rect::new(100.0, 0.0, 60.0, 20.0));
        let b = crate_box(&mut world, &mut entities, Vec2::new(100.0, 46.0));
        assert_eq!(world.support_span(b), None);

        for _ in 0..30 {
            world.step(DT);
        }
        assert_eq!(world.support_span(b), Some((0.0, 160.0)));
    }

    #[test]
    fn disabled_pairs_pass_through_but_still_report() {
        let mut world = PhysicsWorld::new();
        let mut entities = Entities::new();
        world.disable_response(Category::Player, Category::Terrain);
        ground(&mut world, &mut entities, Rect::new(0.0, 0.0, 400.0, 20.0));
        let b = crate_box(&mut world, &mut entities, Vec2::new(200.0, 60.0));

        let mut saw_contact = false;
        for _ in 0..60 {
            let report = world.step(DT);
            saw_contact |= !report.begin.is_empty();
        }
        assert!(saw_contact);
        assert!(world.position(b).unwrap().y < 0.0);
        assert!(!world.is_grounded(b));
    }

    #[test]
    fn forces_last_one_step() {
        let mut world = PhysicsWorld::new();
        world.set_gravity(Vec2::ZERO);
        let mut entities = Entities::new();
        let b = crate_box(&mut world, &mut entities, Vec2::new(0.0, 0.0));

        let mass = world.mass(b);
        assert!(mass > 0.0);
        world.apply_force(b, Vec2::new(60.0 * mass, 0.0));
        world.step(DT);
        let v1 = world.linear_velocity(b).unwrap().x;
        world.step(DT);
        let v2 = world.linear_velocity(b).unwrap().x;
        assert!((v1 - 1.0).abs() < 1e-3);
        assert!((v2 - v1).abs() < 1e-4);
    }

    #[test]
    fn removing_twice_reports_once() {
        let mut world = PhysicsWorld::new();
        let mut entities = Entities::new();
        let b = crate_box(&mut world, &mut entities, Vec2::ZERO);
        assert!(world.remove_body(b));
        assert!(!world.remove_body(b));
        assert!(world.shape_rect(b).is_none());
        world.step(DT);
    }
}
