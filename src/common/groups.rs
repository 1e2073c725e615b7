//! Entity groups and tags.
//!
//! Membership is a side table owned by the world (a resource), not by the
//! entities themselves:
//! - a **group** is a many-to-many set used for bulk and collision queries
//!   (`Aliens`, `PlayerShots`, `AttackFormation(7)`, ...).
//! - a **tag** is a one-to-one lookup (`Tag::Player`).
//!
//! Member lists keep insertion order so every pass over a group is
//! deterministic. Systems that destroy entities or change membership while
//! walking a group iterate a [`Groups::snapshot`], never the live list.

use bevy::platform::collections::HashMap;
use bevy::prelude::*;

/// Formation id reserved for bosses, outside the range used by the grid layouts.
pub const BOSS_FORMATION: u32 = 999;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Group {
    Player,
    PlayerShots,
    Coins,
    Aliens,
    AlienShots,
    /// Aliens flipped into attack mode together.
    AttackFormation(u32),
}

impl Group {
    #[inline]
    pub fn is_formation(self) -> bool {
        matches!(self, Group::AttackFormation(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    Player,
}

#[derive(Resource, Debug, Default)]
pub struct Groups {
    members: HashMap<Group, Vec<Entity>>,
    memberships: HashMap<Entity, Vec<Group>>,
    tags: HashMap<Tag, Entity>,
}

impl Groups {
    /// Add `entity` to `group`. Joining twice is a no-op.
    pub fn join(&mut self, entity: Entity, group: Group) {
        let groups = self.memberships.entry(entity).or_default();
        if groups.contains(&group) {
            return;
        }
        groups.push(group);
        self.members.entry(group).or_default().push(entity);
    }

    pub fn leave(&mut self, entity: Entity, group: Group) {
        if let Some(groups) = self.memberships.get_mut(&entity) {
            groups.retain(|g| *g != group);
            if groups.is_empty() {
                self.memberships.remove(&entity);
            }
        }
        if let Some(members) = self.members.get_mut(&group) {
            members.retain(|e| *e != entity);
        }
    }

    pub fn leave_all(&mut self, entity: Entity) {
        let Some(groups) = self.memberships.remove(&entity) else {
            return;
        };
        for group in groups {
            if let Some(members) = self.members.get_mut(&group) {
                members.retain(|e| *e != entity);
            }
        }
    }

    /// Drop every trace of `entity`: groups and tags.
    pub fn forget(&mut self, entity: Entity) {
        self.leave_all(entity);
        self.tags.retain(|_, e| *e != entity);
    }

    pub fn members(&self, group: Group) -> &[Entity] {
        self.members.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Owned copy of a member list, safe to iterate while mutating membership.
    pub fn snapshot(&self, group: Group) -> Vec<Entity> {
        self.members(group).to_vec()
    }

    pub fn is_empty(&self, group: Group) -> bool {
        self.members(group).is_empty()
    }

    pub fn contains(&self, entity: Entity, group: Group) -> bool {
        self.groups_of(entity).contains(&group)
    }

    pub fn groups_of(&self, entity: Entity) -> &[Group] {
        self.memberships.get(&entity).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The attack formation an entity belongs to, if any.
    pub fn formation_of(&self, entity: Entity) -> Option<Group> {
        self.groups_of(entity).iter().copied().find(|g| g.is_formation())
    }

    pub fn tag(&mut self, tag: Tag, entity: Entity) {
        self.tags.insert(tag, entity);
    }

    pub fn tagged(&self, tag: Tag) -> Option<Entity> {
        self.tags.get(&tag).copied()
    }

    /// Keep only entities for which `alive` holds.
    pub fn retain(&mut self, mut alive: impl FnMut(Entity) -> bool) {
        let dead: Vec<Entity> = self
            .memberships
            .keys()
            .copied()
            .chain(self.tags.values().copied())
            .filter(|e| !alive(*e))
            .collect();
        for entity in dead {
            self.forget(entity);
        }
    }

    pub fn clear(&mut self) {
        self.members.clear();
        self.memberships.clear();
        self.tags.clear();
    }
}

/// Queued group edits, applied at the next command sync point.
pub trait GroupCommandsExt {
    fn join_group(&mut self, entity: Entity, group: Group);
    fn leave_groups(&mut self, entity: Entity);
    fn tag_entity(&mut self, entity: Entity, tag: Tag);
    /// Despawn `entity` and drop its memberships.
    fn destroy(&mut self, entity: Entity);
}

impl GroupCommandsExt for Commands<'_, '_> {
    fn join_group(&mut self, entity: Entity, group: Group) {
        self.queue(move |world: &mut World| {
            world.resource_mut::<Groups>().join(entity, group);
        });
    }

    fn leave_groups(&mut self, entity: Entity) {
        self.queue(move |world: &mut World| {
            world.resource_mut::<Groups>().leave_all(entity);
        });
    }

    fn tag_entity(&mut self, entity: Entity, tag: Tag) {
        self.queue(move |world: &mut World| {
            world.resource_mut::<Groups>().tag(tag, entity);
        });
    }

    fn destroy(&mut self, entity: Entity) {
        self.entity(entity).try_despawn();
        self.queue(move |world: &mut World| {
            world.resource_mut::<Groups>().forget(entity);
        });
    }
}

/// Drop registry entries whose entity no longer exists.
///
/// Covers anything despawned outside [`GroupCommandsExt::destroy`]
/// (state-scoped cleanup, external code).
pub fn prune_groups(mut groups: ResMut<Groups>, entities: &bevy::ecs::entity::Entities) {
    groups.retain(|e| entities.contains(e));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(world: &mut World, n: usize) -> Vec<Entity> {
        (0..n).map(|_| world.spawn_empty().id()).collect()
    }

    #[test]
    fn join_is_idempotent_and_ordered() {
        let mut world = World::new();
        let es = entities(&mut world, 3);
        let mut groups = Groups::default();

        for e in &es {
            groups.join(*e, Group::Aliens);
        }
        groups.join(es[0], Group::Aliens);

        assert_eq!(groups.members(Group::Aliens), es.as_slice());
    }

    #[test]
    fn formation_lookup_ignores_static_groups() {
        let mut world = World::new();
        let e = world.spawn_empty().id();
        let mut groups = Groups::default();

        groups.join(e, Group::Aliens);
        assert_eq!(groups.formation_of(e), None);

        groups.join(e, Group::AttackFormation(7));
        assert_eq!(groups.formation_of(e), Some(Group::AttackFormation(7)));
    }

    #[test]
    fn forget_drops_groups_and_tags() {
        let mut world = World::new();
        let es = entities(&mut world, 2);
        let mut groups = Groups::default();

        groups.join(es[0], Group::Player);
        groups.tag(Tag::Player, es[0]);
        groups.join(es[1], Group::Player);

        groups.forget(es[0]);

        assert_eq!(groups.members(Group::Player), &[es[1]]);
        assert_eq!(groups.tagged(Tag::Player), None);
        assert!(groups.groups_of(es[0]).is_empty());
    }

    #[test]
    fn snapshot_survives_membership_changes() {
        let mut world = World::new();
        let es = entities(&mut world, 4);
        let mut groups = Groups::default();
        for e in &es {
            groups.join(*e, Group::Coins);
        }

        let mut visited = Vec::new();
        for e in groups.snapshot(Group::Coins) {
            visited.push(e);
            groups.leave(e, Group::Coins);
        }

        assert_eq!(visited, es);
        assert!(groups.is_empty(Group::Coins));
    }

    #[test]
    fn prune_removes_despawned_entities() {
        let mut world = World::new();
        world.init_resource::<Groups>();
        let es = entities(&mut world, 2);
        {
            let mut groups = world.resource_mut::<Groups>();
            groups.join(es[0], Group::Aliens);
            groups.join(es[1], Group::Aliens);
        }
        world.despawn(es[0]);

        crate::common::test_utils::run_system_once(&mut world, prune_groups);

        assert_eq!(world.resource::<Groups>().members(Group::Aliens), &[es[1]]);
    }
}
