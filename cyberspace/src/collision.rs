//! Category-pair collision handlers layered over the physics world.

use std::collections::BTreeMap;

use crate::physics::{Category, Contact, ContactReport, PhysicsWorld};

/// When a handler runs relative to the solver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Once, on the step two shapes start touching.
    Begin,
    /// Every step while the shapes touch.
    PreSolve,
}

/// Handler for a category pair. `contact.a` always carries the first
/// category of the registered pair. Returning `true` restores the physical
/// response for this touching pair until it separates.
pub type Handler<C> = fn(&mut C, &Contact) -> bool;

/// Table of collision handlers keyed by ordered category pair.
pub struct CollisionPolicy<C> {
    handlers: BTreeMap<(Category, Category), (Phase, Handler<C>)>,
}

impl<C> CollisionPolicy<C> {
    pub fn new() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    /// Registers (or replaces) the handler for `(a, b)`.
    pub fn on(&mut self, a: Category, b: Category, phase: Phase, handler: Handler<C>) -> &mut Self {
        self.handlers.insert((a, b), (phase, handler));
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Turns off the default response for every registered pair.
    pub fn install(&self, world: &mut PhysicsWorld) {
        for &(a, b) in self.handlers.keys() {
            world.disable_response(a, b);
        }
    }

    /// Runs begin handlers for new contacts, then pre-solve handlers for
    /// everything still touching.
    pub fn dispatch(&self, report: &ContactReport, ctx: &mut C, world: &mut PhysicsWorld) {
        self.run(Phase::Begin, &report.begin, ctx, world);
        self.run(Phase::PreSolve, &report.touching, ctx, world);
    }

    fn run(&self, phase: Phase, contacts: &[Contact], ctx: &mut C, world: &mut PhysicsWorld) {
        for contact in contacts {
            let Some((oriented, handler)) = self.lookup(phase, contact) else {
                continue;
            };
            if handler(ctx, &oriented) {
                world.keep_response(oriented.pair());
            }
        }
    }

    fn lookup(&self, phase: Phase, contact: &Contact) -> Option<(Contact, Handler<C>)> {
        let direct = (contact.category_a, contact.category_b);
        if let Some(&(p, handler)) = self.handlers.get(&direct) {
            return (p == phase).then_some((*contact, handler));
        }
        let reversed = (contact.category_b, contact.category_a);
        let &(p, handler) = self.handlers.get(&reversed)?;
        (p == phase).then(|| (contact.swapped(), handler))
    }
}

impl<C> Default for CollisionPolicy<C> {
    fn default() -> Self {
        Self::new()
    }
}
