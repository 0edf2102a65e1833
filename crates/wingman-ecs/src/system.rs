// system.rs — systems are pure behavior over the subset of entities whose
// signature is a superset of the system's required signature. The
// registry owns no dispatcher of its own since
// gameplay/client systems need very different call signatures (the
// simulation tick in `wingman-game` takes room-wide context like the
// event queue; the client's interpolation system takes a render time);
// this module only fixes the membership contract both sides share.

use crate::entity::Entity;
use crate::registry::Registry;

/// A system's required signature: entities are selected with
/// `entity_sig & required_sig == required_sig`.
pub trait System {
    fn required_signature(&self, registry: &Registry) -> u32;

    /// Entities currently eligible for this system's `update`.
    fn matching_entities(&self, registry: &Registry) -> Vec<Entity> {
        registry.entities_matching(self.required_signature(registry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;

    #[derive(Clone, Copy)]
    struct A;
    #[derive(Clone, Copy)]
    struct B;

    struct NeedsAAndB;

    impl System for NeedsAAndB {
        fn required_signature(&self, registry: &Registry) -> u32 {
            (1 << registry.component_bit::<A>().unwrap()) | (1 << registry.component_bit::<B>().unwrap())
        }
    }

    #[test]
    fn system_selects_only_matching_entities() {
        let mut reg = Registry::new(8);
        reg.register_component::<A>().unwrap();
        reg.register_component::<B>().unwrap();

        let e1 = reg.create_entity().unwrap();
        let e2 = reg.create_entity().unwrap();
        reg.add_component(e1, A).unwrap();
        reg.add_component(e1, B).unwrap();
        reg.add_component(e2, A).unwrap();

        let sys = NeedsAAndB;
        assert_eq!(sys.matching_entities(&reg), vec![e1]);
    }
}
