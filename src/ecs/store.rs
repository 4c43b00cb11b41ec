//! Component store - entity ids mapped to typed component records
//!
//! Each component kind has its own ordered map so that iteration is always
//! by ascending `EntityId`. The fields are public so systems can borrow two
//! different component maps at the same time.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::types::EntityId;
use crate::entity::{Citizen, Family, Movement, Needs, Position, Worker};

/// A record type that can be attached to an entity
pub trait Component: Sized {
    fn storage(store: &ComponentStore) -> &BTreeMap<EntityId, Self>;
    fn storage_mut(store: &mut ComponentStore) -> &mut BTreeMap<EntityId, Self>;
}

macro_rules! impl_component {
    ($ty:ty, $field:ident) => {
        impl Component for $ty {
            fn storage(store: &ComponentStore) -> &BTreeMap<EntityId, Self> {
                &store.$field
            }
            fn storage_mut(store: &mut ComponentStore) -> &mut BTreeMap<EntityId, Self> {
                &mut store.$field
            }
        }
    };
}

#[derive(Debug, Clone, Default)]
pub struct ComponentStore {
    next_id: u32,
    alive: BTreeSet<EntityId>,
    pub positions: BTreeMap<EntityId, Position>,
    pub movements: BTreeMap<EntityId, Movement>,
    pub citizens: BTreeMap<EntityId, Citizen>,
    pub workers: BTreeMap<EntityId, Worker>,
    pub needs: BTreeMap<EntityId, Needs>,
    pub families: BTreeMap<EntityId, Family>,
}

impl_component!(Position, positions);
impl_component!(Movement, movements);
impl_component!(Citizen, citizens);
impl_component!(Worker, workers);
impl_component!(Needs, needs);
impl_component!(Family, families);

impl ComponentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh entity id with no components
    pub fn spawn(&mut self) -> EntityId {
        self.next_id += 1;
        let id = EntityId(self.next_id);
        self.alive.insert(id);
        id
    }

    /// Remove an entity and every component attached to it
    pub fn despawn(&mut self, id: EntityId) -> bool {
        self.positions.remove(&id);
        self.movements.remove(&id);
        self.citizens.remove(&id);
        self.workers.remove(&id);
        self.needs.remove(&id);
        self.families.remove(&id);
        self.alive.remove(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.alive.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.alive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alive.is_empty()
    }

    /// All live entities in ascending id order
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.alive.iter().copied()
    }

    /// Attach a component, replacing any previous one. Ignored for dead ids.
    pub fn add<C: Component>(&mut self, id: EntityId, component: C) {
        if self.contains(id) {
            C::storage_mut(self).insert(id, component);
        }
    }

    pub fn get<C: Component>(&self, id: EntityId) -> Option<&C> {
        C::storage(self).get(&id)
    }

    pub fn get_mut<C: Component>(&mut self, id: EntityId) -> Option<&mut C> {
        C::storage_mut(self).get_mut(&id)
    }

    pub fn has<C: Component>(&self, id: EntityId) -> bool {
        C::storage(self).contains_key(&id)
    }

    pub fn remove<C: Component>(&mut self, id: EntityId) -> Option<C> {
        C::storage_mut(self).remove(&id)
    }

    /// Iterate one component kind in id order
    pub fn iter<'a, C: Component + 'a>(&'a self) -> impl Iterator<Item = (EntityId, &'a C)> {
        C::storage(self).iter().map(|(id, c)| (*id, c))
    }

    /// Ids whose component `C` satisfies `filter`
    pub fn query<C: Component>(&self, filter: impl Fn(&C) -> bool) -> Vec<EntityId> {
        C::storage(self)
            .iter()
            .filter(|(_, c)| filter(c))
            .map(|(id, _)| *id)
            .collect()
    }
}
