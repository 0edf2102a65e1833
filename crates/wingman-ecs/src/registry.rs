// registry.rs — the entity-component registry: dense per-type component
// storage, 32-bit signature bitmasks, and the structural operations
// (create/destroy entity, add/remove component, query by signature).
//
// This type takes `&mut self` throughout and does no internal locking of
// its own — reads from systems inside a tick run without locking because
// tick and structural mutations are serialized on the game thread, so the
// *owner* of a `Registry` (a room's game-loop thread in
// `wingman-server`) is responsible for serializing access, typically by
// holding the registry behind a single `parking_lot::Mutex` shared with
// whatever other thread needs to reach in (e.g. to apply a just-arrived
// `PlayerInput`).

use std::any::{Any, TypeId};
use std::collections::HashMap;

use crate::entity::{Entity, EntityAllocator};
use crate::error::EcsError;

/// Default registry capacity.
pub const DEFAULT_CAPACITY: u32 = 5_000;

/// Component type budget: one bit per registered type in a `u32` signature.
pub const MAX_COMPONENT_TYPES: u32 = 32;

trait ComponentStoreDyn: Send {
    fn remove_if_present(&mut self, entity: Entity);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct DenseStore<T> {
    slot_of: Vec<Option<usize>>,
    entity_of: Vec<Entity>,
    data: Vec<T>,
}

impl<T: 'static + Send> DenseStore<T> {
    fn new(capacity: usize) -> Self {
        Self { slot_of: vec![None; capacity], entity_of: Vec::new(), data: Vec::new() }
    }

    fn insert(&mut self, entity: Entity, value: T) {
        let idx = entity.index();
        if let Some(slot) = self.slot_of[idx] {
            self.data[slot] = value;
            return;
        }
        let slot = self.data.len();
        self.data.push(value);
        self.entity_of.push(entity);
        self.slot_of[idx] = Some(slot);
    }

    fn remove(&mut self, entity: Entity) -> Option<T> {
        let idx = entity.index();
        let slot = self.slot_of.get(idx).copied().flatten()?;
        self.slot_of[idx] = None;
        let last_slot = self.data.len() - 1;
        let removed = self.data.swap_remove(slot);
        self.entity_of.swap_remove(slot);
        if slot != last_slot {
            let moved_entity = self.entity_of[slot];
            self.slot_of[moved_entity.index()] = Some(slot);
        }
        Some(removed)
    }

    fn get(&self, entity: Entity) -> Option<&T> {
        let slot = *self.slot_of.get(entity.index())?;
        slot.map(|s| &self.data[s])
    }

    fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        let slot = *self.slot_of.get(entity.index())?;
        slot.map(move |s| &mut self.data[s])
    }
}

impl<T: 'static + Send> ComponentStoreDyn for DenseStore<T> {
    fn remove_if_present(&mut self, entity: Entity) {
        self.remove(entity);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub struct Registry {
    entities: EntityAllocator,
    capacity: usize,
    component_bits: HashMap<TypeId, u32>,
    next_bit: u32,
    stores: HashMap<TypeId, Box<dyn ComponentStoreDyn>>,
}

impl Registry {
    pub fn new(capacity: u32) -> Self {
        Self {
            entities: EntityAllocator::new(capacity),
            capacity: capacity as usize,
            component_bits: HashMap::new(),
            next_bit: 0,
            stores: HashMap::new(),
        }
    }

    pub fn create_entity(&mut self) -> Result<Entity, EcsError> {
        self.entities.create()
    }

    /// Clears the entity's signature, removes it from every component
    /// store it appeared in, and returns its slot to the free pool.
    pub fn destroy_entity(&mut self, entity: Entity) -> Result<(), EcsError> {
        if !self.entities.is_alive(entity) {
            return Err(EcsError::EntityNotAlive(entity));
        }
        for store in self.stores.values_mut() {
            store.remove_if_present(entity);
        }
        self.entities.destroy(entity)
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    pub fn signature(&self, entity: Entity) -> u32 {
        self.entities.signature(entity)
    }

    pub fn register_component<T: 'static + Send>(&mut self) -> Result<(), EcsError> {
        let type_id = TypeId::of::<T>();
        if self.component_bits.contains_key(&type_id) {
            return Err(EcsError::ComponentAlreadyRegistered);
        }
        if self.next_bit >= MAX_COMPONENT_TYPES {
            return Err(EcsError::ComponentBudgetExhausted);
        }
        self.component_bits.insert(type_id, self.next_bit);
        self.next_bit += 1;
        self.stores.insert(type_id, Box::new(DenseStore::<T>::new(self.capacity)));
        Ok(())
    }

    fn bit_of<T: 'static>(&self) -> Result<u32, EcsError> {
        self.component_bits
            .get(&TypeId::of::<T>())
            .copied()
            .ok_or(EcsError::ComponentNotRegistered)
    }

    pub fn add_component<T: 'static + Send>(&mut self, entity: Entity, value: T) -> Result<(), EcsError> {
        if !self.entities.is_alive(entity) {
            return Err(EcsError::EntityNotAlive(entity));
        }
        let bit = self.bit_of::<T>()?;
        let store = self
            .stores
            .get_mut(&TypeId::of::<T>())
            .ok_or(EcsError::ComponentNotRegistered)?
            .as_any_mut()
            .downcast_mut::<DenseStore<T>>()
            .expect("component store type mismatch");
        store.insert(entity, value);

        let sig = self.entities.signature(entity) | (1 << bit);
        self.entities.set_signature(entity, sig);
        Ok(())
    }

    pub fn remove_component<T: 'static + Send>(&mut self, entity: Entity) -> Result<(), EcsError> {
        if !self.entities.is_alive(entity) {
            return Err(EcsError::EntityNotAlive(entity));
        }
        let bit = self.bit_of::<T>()?;
        let store = self
            .stores
            .get_mut(&TypeId::of::<T>())
            .ok_or(EcsError::ComponentNotRegistered)?
            .as_any_mut()
            .downcast_mut::<DenseStore<T>>()
            .expect("component store type mismatch");
        if store.remove(entity).is_none() {
            return Err(EcsError::ComponentAbsent(entity));
        }

        let sig = self.entities.signature(entity) & !(1 << bit);
        self.entities.set_signature(entity, sig);
        Ok(())
    }

    pub fn get_component<T: 'static + Send>(&self, entity: Entity) -> Result<&T, EcsError> {
        let store = self
            .stores
            .get(&TypeId::of::<T>())
            .ok_or(EcsError::ComponentNotRegistered)?
            .as_any()
            .downcast_ref::<DenseStore<T>>()
            .expect("component store type mismatch");
        store.get(entity).ok_or(EcsError::ComponentAbsent(entity))
    }

    pub fn get_component_mut<T: 'static + Send>(&mut self, entity: Entity) -> Result<&mut T, EcsError> {
        let store = self
            .stores
            .get_mut(&TypeId::of::<T>())
            .ok_or(EcsError::ComponentNotRegistered)?
            .as_any_mut()
            .downcast_mut::<DenseStore<T>>()
            .expect("component store type mismatch");
        store.get_mut(entity).ok_or(EcsError::ComponentAbsent(entity))
    }

    pub fn has_component<T: 'static + Send>(&self, entity: Entity) -> bool {
        self.get_component::<T>(entity).is_ok()
    }

    /// Bitmask signature a fully-populated instance of `T` contributes —
    /// used by callers building a system's required signature out of the
    /// component types it reads.
    pub fn component_bit<T: 'static>(&self) -> Result<u32, EcsError> {
        self.bit_of::<T>()
    }

    /// All currently-alive entities whose signature is a superset of
    /// `required_sig` — the membership test a `System` uses each tick.
    pub fn entities_matching(&self, required_sig: u32) -> Vec<Entity> {
        (0..self.capacity as u32)
            .map(Entity)
            .filter(|&e| {
                self.entities.is_alive(e) && (self.entities.signature(e) & required_sig) == required_sig
            })
            .collect()
    }

    pub fn live_count(&self) -> u32 {
        self.entities.live_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Clone, Copy)]
    struct Pos {
        x: f32,
        y: f32,
    }

    #[derive(Debug, PartialEq, Clone, Copy)]
    struct Vel {
        dx: f32,
    }

    fn new_registry() -> Registry {
        let mut reg = Registry::new(16);
        reg.register_component::<Pos>().unwrap();
        reg.register_component::<Vel>().unwrap();
        reg
    }

    #[test]
    fn add_get_remove_component() {
        let mut reg = new_registry();
        let e = reg.create_entity().unwrap();
        reg.add_component(e, Pos { x: 1.0, y: 2.0 }).unwrap();
        assert_eq!(*reg.get_component::<Pos>(e).unwrap(), Pos { x: 1.0, y: 2.0 });

        reg.remove_component::<Pos>(e).unwrap();
        assert!(matches!(reg.get_component::<Pos>(e), Err(EcsError::ComponentAbsent(_))));
    }

    #[test]
    fn signature_tracks_add_remove() {
        let mut reg = new_registry();
        let e = reg.create_entity().unwrap();
        let pos_bit = reg.component_bit::<Pos>().unwrap();
        let vel_bit = reg.component_bit::<Vel>().unwrap();
        assert_ne!(pos_bit, vel_bit);

        reg.add_component(e, Pos { x: 0.0, y: 0.0 }).unwrap();
        assert_eq!(reg.signature(e), 1 << pos_bit);

        reg.add_component(e, Vel { dx: 1.0 }).unwrap();
        assert_eq!(reg.signature(e), (1 << pos_bit) | (1 << vel_bit));

        reg.remove_component::<Pos>(e).unwrap();
        assert_eq!(reg.signature(e), 1 << vel_bit);
    }

    #[test]
    fn destroy_entity_clears_all_stores() {
        let mut reg = new_registry();
        let e = reg.create_entity().unwrap();
        reg.add_component(e, Pos { x: 1.0, y: 1.0 }).unwrap();
        reg.add_component(e, Vel { dx: 1.0 }).unwrap();

        reg.destroy_entity(e).unwrap();
        assert!(!reg.is_alive(e));

        let e2 = reg.create_entity().unwrap();
        assert_eq!(e2, e);
        assert_eq!(reg.signature(e2), 0);
        assert!(matches!(reg.get_component::<Pos>(e2), Err(EcsError::ComponentAbsent(_))));
    }

    #[test]
    fn swap_removal_keeps_other_entities_valid() {
        let mut reg = new_registry();
        let e1 = reg.create_entity().unwrap();
        let e2 = reg.create_entity().unwrap();
        let e3 = reg.create_entity().unwrap();
        reg.add_component(e1, Pos { x: 1.0, y: 0.0 }).unwrap();
        reg.add_component(e2, Pos { x: 2.0, y: 0.0 }).unwrap();
        reg.add_component(e3, Pos { x: 3.0, y: 0.0 }).unwrap();

        reg.remove_component::<Pos>(e1).unwrap();

        assert_eq!(reg.get_component::<Pos>(e2).unwrap().x, 2.0);
        assert_eq!(reg.get_component::<Pos>(e3).unwrap().x, 3.0);
    }

    #[test]
    fn component_budget_is_enforced() {
        let mut reg = Registry::new(4);
        macro_rules! dummy_component {
            ($name:ident) => {
                #[derive(Clone, Copy)]
                struct $name;
            };
        }
        // Register up to the 32-bit budget, then confirm the 33rd fails.
        // Exercised indirectly via direct bit bookkeeping since declaring
        // 32 distinct types here would be unwieldy.
        for bit in 0..MAX_COMPONENT_TYPES {
            reg.component_bits.insert(TypeId::of::<u8>(), bit); // overwritten each loop
            reg.next_bit = bit + 1;
        }
        dummy_component!(Overflow);
        assert!(matches!(
            reg.register_component::<Overflow>(),
            Err(EcsError::ComponentBudgetExhausted)
        ));
    }

    #[test]
    fn registering_same_type_twice_errors() {
        let mut reg = new_registry();
        assert!(matches!(
            reg.register_component::<Pos>(),
            Err(EcsError::ComponentAlreadyRegistered)
        ));
    }

    #[test]
    fn entities_matching_respects_signature_superset() {
        let mut reg = new_registry();
        let e1 = reg.create_entity().unwrap();
        let e2 = reg.create_entity().unwrap();
        reg.add_component(e1, Pos { x: 0.0, y: 0.0 }).unwrap();
        reg.add_component(e1, Vel { dx: 0.0 }).unwrap();
        reg.add_component(e2, Pos { x: 0.0, y: 0.0 }).unwrap();

        let pos_bit = reg.component_bit::<Pos>().unwrap();
        let vel_bit = reg.component_bit::<Vel>().unwrap();
        let both = reg.entities_matching((1 << pos_bit) | (1 << vel_bit));
        assert_eq!(both, vec![e1]);

        let pos_only = reg.entities_matching(1 << pos_bit);
        assert_eq!(pos_only.len(), 2);
    }
}
