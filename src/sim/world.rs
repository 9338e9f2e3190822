//! Entity catalogue and frame driver
//!
//! Entities live in one arena keyed by stable [`EntityId`]s. Three
//! capability views (updateable, collidable, visible) index into it. Views
//! are only patched at phase boundaries, never while a phase iterates them.
//!
//! Phase order per frame: update → (spawn / detach dead) → collide →
//! render → reap. Render consumes the incident-pulse sets produced by the
//! collision pass of the same frame.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;

use super::entity::{Collidable, Contact, EntityId, GameEvent, Updateable, Visible};
use super::hidden::HiddenObject;
use super::player::Player;
use super::pulse::Pulse;
use crate::platform::FrameInput;
use crate::renderer::{Canvas, RenderTally, Stat};
use crate::settings::Settings;

/// Every concrete entity kind
#[derive(Debug, Clone)]
pub enum Entity {
    Player(Player),
    Pulse(Pulse),
    Hidden(HiddenObject),
}

/// Which capability views an entity belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub update: bool,
    pub collide: bool,
    pub visible: bool,
}

impl Entity {
    pub fn capabilities(&self) -> Capabilities {
        match self {
            Entity::Player(_) | Entity::Pulse(_) => Capabilities {
                update: true,
                collide: true,
                visible: true,
            },
            Entity::Hidden(_) => Capabilities {
                update: false,
                collide: true,
                visible: true,
            },
        }
    }

    /// False once the entity's lifecycle has ended
    pub fn is_alive(&self) -> bool {
        match self {
            Entity::Pulse(p) => !p.is_dead(),
            Entity::Player(_) | Entity::Hidden(_) => true,
        }
    }

    pub fn as_updateable(&mut self) -> Option<&mut dyn Updateable> {
        match self {
            Entity::Player(p) => Some(p),
            Entity::Pulse(p) => Some(p),
            Entity::Hidden(_) => None,
        }
    }

    pub fn as_collidable(&mut self) -> Option<&mut dyn Collidable> {
        match self {
            Entity::Player(p) => Some(p),
            Entity::Pulse(p) => Some(p),
            Entity::Hidden(h) => Some(h),
        }
    }

    pub fn as_visible(&mut self) -> Option<&mut dyn Visible> {
        match self {
            Entity::Player(p) => Some(p),
            Entity::Pulse(p) => Some(p),
            Entity::Hidden(h) => Some(h),
        }
    }
}

/// Capability-filtered index sets over the arena
#[derive(Debug, Clone, Default)]
struct Views {
    updateable: BTreeSet<EntityId>,
    collidable: BTreeSet<EntityId>,
    visible: BTreeSet<EntityId>,
}

impl Views {
    fn insert(&mut self, id: EntityId, caps: Capabilities) {
        if caps.update {
            self.updateable.insert(id);
        }
        if caps.collide {
            self.collidable.insert(id);
        }
        if caps.visible {
            self.visible.insert(id);
        }
    }

    fn remove(&mut self, id: EntityId) {
        self.updateable.remove(&id);
        self.collidable.remove(&id);
        self.visible.remove(&id);
    }

    fn contains(&self, id: EntityId) -> bool {
        self.updateable.contains(&id)
            || self.collidable.contains(&id)
            || self.visible.contains(&id)
    }
}

/// Visit every unordered pair once, notifying both sides
///
/// `notify(receiver, other)` is called exactly twice per pair: a→b then b→a.
fn for_each_pair(contacts: &[Contact], mut notify: impl FnMut(EntityId, &Contact)) {
    for (i, a) in contacts.iter().enumerate() {
        for b in &contacts[i + 1..] {
            notify(a.id, b);
            notify(b.id, a);
        }
    }
}

/// What happened during one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Entities inserted at the update boundary
    pub spawned: u32,
    /// Entities detached from every view after dying this frame
    pub died: u32,
    /// Incident pulses recorded by the collision pass
    pub incidents: u32,
    /// Entities removed from the catalogue
    pub reaped: u32,
    pub render: RenderTally,
}

#[derive(Debug, Clone, Default)]
pub struct World {
    entities: BTreeMap<EntityId, Entity>,
    views: Views,
    next_id: u32,
    player: Option<EntityId>,
}

impl World {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    /// The startup object set: player plus every configured hidden object
    pub fn from_settings(settings: &Settings) -> Self {
        let mut world = Self::new();
        let player = world.spawn(Entity::Player(Player::new(&settings.player, &settings.pulse)));
        world.player = Some(player);

        for spec in settings.object_specs() {
            let object = HiddenObject::new(Vec2::new(spec.x, spec.y), spec.radius, spec.colour)
                .with_style(settings.echo);
            world.spawn(Entity::Hidden(object));
        }
        log::info!("world created with {} entities", world.len());
        world
    }

    /// Allocate a new entity ID
    fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id.max(1));
        self.next_id = id.0 + 1;
        id
    }

    /// Insert an entity into the catalogue and all of its views
    ///
    /// Only call between phases.
    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        let id = self.next_entity_id();
        self.views.insert(id, entity.capabilities());
        self.entities.insert(id, entity);
        id
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn player(&self) -> Option<&Player> {
        match self.player.and_then(|id| self.entities.get(&id)) {
            Some(Entity::Player(p)) => Some(p),
            _ => None,
        }
    }

    pub fn pulses(&self) -> impl Iterator<Item = (EntityId, &Pulse)> {
        self.entities.iter().filter_map(|(&id, e)| match e {
            Entity::Pulse(p) => Some((id, p)),
            _ => None,
        })
    }

    pub fn hidden_objects(&self) -> impl Iterator<Item = (EntityId, &HiddenObject)> {
        self.entities.iter().filter_map(|(&id, e)| match e {
            Entity::Hidden(h) => Some((id, h)),
            _ => None,
        })
    }

    pub fn is_updateable(&self, id: EntityId) -> bool {
        self.views.updateable.contains(&id)
    }

    pub fn is_collidable(&self, id: EntityId) -> bool {
        self.views.collidable.contains(&id)
    }

    pub fn is_visible(&self, id: EntityId) -> bool {
        self.views.visible.contains(&id)
    }

    /// Total echo dots drawn by every hidden object so far
    pub fn echo_points(&self) -> u64 {
        self.hidden_objects().map(|(_, h)| h.echo_points()).sum()
    }

    /// Update phase: advance every updateable entity
    fn update(&mut self, dt: f32, input: &FrameInput) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let updateable = &self.views.updateable;
        for (_, entity) in self.entities.iter_mut().filter(|(id, _)| updateable.contains(*id)) {
            if let Some(u) = entity.as_updateable() {
                u.update(dt, input, &mut events);
            }
        }
        events
    }

    /// Boundary after update: insert requested entities, detach dead ones
    fn settle(&mut self, events: Vec<GameEvent>, report: &mut FrameReport) {
        for event in events {
            match event {
                GameEvent::PulseRequested(pulse) => {
                    let id = self.spawn(Entity::Pulse(pulse));
                    log::debug!("spawned pulse {id:?}");
                    report.spawned += 1;
                }
            }
        }

        let dead: Vec<EntityId> = self
            .entities
            .iter()
            .filter(|(id, e)| !e.is_alive() && self.views.contains(**id))
            .map(|(&id, _)| id)
            .collect();
        for id in dead {
            self.views.remove(id);
            report.died += 1;
        }
    }

    /// Collision phase: every unordered pair once, both directions notified
    fn collide(&mut self) -> u32 {
        let contacts: Vec<Contact> = self
            .views
            .collidable
            .iter()
            .filter_map(|&id| {
                let entity = self.entities.get_mut(&id)?;
                let shape = entity.as_collidable()?.shape();
                Some(Contact { id, shape })
            })
            .collect();

        for_each_pair(&contacts, |id, other| self.notify(id, other));

        self.hidden_objects()
            .map(|(_, h)| h.incident_count() as u32)
            .sum()
    }

    fn notify(&mut self, id: EntityId, other: &Contact) {
        if let Some(c) = self.entities.get_mut(&id).and_then(Entity::as_collidable) {
            c.collide(other);
        }
    }

    /// Update and collision phases, including the boundary between them
    pub fn step(&mut self, dt: f32, input: &FrameInput) -> FrameReport {
        let mut report = FrameReport::default();
        let events = self.update(dt, input);
        self.settle(events, &mut report);
        report.incidents = self.collide();
        report
    }

    /// Render phase: hand every visible entity to the canvas
    pub fn render(&mut self, canvas: &mut Canvas, stats: &[Stat]) -> RenderTally {
        let visible = &self.views.visible;
        let objects = self
            .entities
            .iter_mut()
            .filter(move |(id, _)| visible.contains(*id))
            .filter_map(|(_, e)| e.as_visible());
        canvas.render(objects, stats)
    }

    /// Reap phase: drop entities no longer referenced by any view
    pub fn reap(&mut self) -> u32 {
        let before = self.entities.len();
        let views = &self.views;
        self.entities
            .retain(|id, e| e.is_alive() || views.contains(*id));
        let reaped = (before - self.entities.len()) as u32;
        if reaped > 0 {
            log::debug!("reaped {reaped} entities");
        }
        reaped
    }

    /// One full frame in phase order
    pub fn frame(
        &mut self,
        dt: f32,
        input: &FrameInput,
        canvas: &mut Canvas,
        stats: &[Stat],
    ) -> FrameReport {
        let mut report = self.step(dt, input);
        report.render = self.render(canvas, stats);
        report.reaped = self.reap();
        report
    }
}
