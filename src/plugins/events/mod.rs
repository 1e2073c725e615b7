//! Deferred publish/subscribe between gameplay systems.
//!
//! Systems never call each other directly when a rule owned by one system
//! must trigger a transition owned by another (an alien dies -> the director
//! checks for a cleared level). Instead they [`EventBus::submit`] a
//! [`GameEvent`]; the bus delivers it once, at the end of the frame, from the
//! exclusive [`flush_event_bus`] system.
//!
//! Listeners are plain function pointers registered explicitly at plugin build
//! time via [`EventBusAppExt::add_event_listener`].
//!
//! Delivery rules:
//! - submission order is delivery order;
//! - the listener table is snapshotted once per flush, so (un)registering
//!   during delivery only affects later frames;
//! - events submitted by a listener are appended to the queue and delivered
//!   later in the same flush.

use std::collections::VecDeque;

use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use crate::plugins::core::FrameSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventId {
    GameOver,
    CheckIsLevelClear,
    PlayerKilled,
    /// Player pressed fire while a cutscene was waiting.
    Continue,
    /// Aliens may attack and coins may drop.
    EnableAction,
    DisableAction,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameEvent {
    pub id: EventId,
    pub source: Option<Entity>,
}

pub type Listener = fn(&mut World, &GameEvent);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

/// Listeners for one event id.
///
/// Removal is O(1): the last entry is swapped into the freed slot and the
/// position index is patched.
#[derive(Default, Clone)]
pub struct ListenerSet {
    entries: Vec<(ListenerId, Listener)>,
    position: HashMap<ListenerId, usize>,
}

impl ListenerSet {
    pub fn insert(&mut self, id: ListenerId, listener: Listener) {
        if self.position.contains_key(&id) {
            return;
        }
        self.position.insert(id, self.entries.len());
        self.entries.push((id, listener));
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        let Some(index) = self.position.remove(&id) else {
            return false;
        };
        self.entries.swap_remove(index);
        if let Some((moved, _)) = self.entries.get(index) {
            self.position.insert(*moved, index);
        }
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn listeners(&self) -> impl Iterator<Item = Listener> + '_ {
        self.entries.iter().map(|(_, l)| *l)
    }
}

#[derive(Resource, Default)]
pub struct EventBus {
    listeners: HashMap<EventId, ListenerSet>,
    queue: VecDeque<GameEvent>,
    next_listener: u32,
}

impl EventBus {
    pub fn register(&mut self, id: EventId, listener: Listener) -> ListenerId {
        let handle = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.entry(id).or_default().insert(handle, listener);
        handle
    }

    pub fn unregister(&mut self, id: EventId, listener: ListenerId) -> bool {
        self.listeners
            .get_mut(&id)
            .is_some_and(|set| set.remove(listener))
    }

    /// Remove `listener` from every event id it was registered for.
    pub fn unregister_all(&mut self, listener: ListenerId) {
        for set in self.listeners.values_mut() {
            set.remove(listener);
        }
    }

    /// Queue an event for delivery at the end of the frame.
    pub fn submit(&mut self, id: EventId, source: Option<Entity>) {
        self.queue.push_back(GameEvent { id, source });
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Queued events, oldest first.
    pub fn queued(&self) -> impl Iterator<Item = &GameEvent> {
        self.queue.iter()
    }

    pub fn listener_count(&self, id: EventId) -> usize {
        self.listeners.get(&id).map_or(0, ListenerSet::len)
    }

    fn pop(&mut self) -> Option<GameEvent> {
        self.queue.pop_front()
    }

    fn snapshot(&self) -> HashMap<EventId, Vec<Listener>> {
        self.listeners
            .iter()
            .map(|(id, set)| (*id, set.listeners().collect()))
            .collect()
    }
}

pub trait EventBusAppExt {
    fn add_event_listener(&mut self, id: EventId, listener: Listener) -> &mut Self;
}

impl EventBusAppExt for App {
    fn add_event_listener(&mut self, id: EventId, listener: Listener) -> &mut Self {
        self.init_resource::<EventBus>();
        self.world_mut().resource_mut::<EventBus>().register(id, listener);
        self
    }
}

/// Deliver every queued event. Runs once per frame, last.
pub fn flush_event_bus(world: &mut World) {
    let Some(bus) = world.get_resource::<EventBus>() else {
        return;
    };
    if bus.pending() == 0 {
        return;
    }
    let listeners = bus.snapshot();

    loop {
        let Some(event) = world.resource_mut::<EventBus>().pop() else {
            break;
        };
        let Some(targets) = listeners.get(&event.id).filter(|l| !l.is_empty()) else {
            debug!("event {:?} has no listeners", event.id);
            continue;
        };
        for listener in targets {
            listener(world, &event);
            world.flush();
        }
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<EventBus>();
    app.add_systems(Update, flush_event_bus.in_set(FrameSet::Events));
}
