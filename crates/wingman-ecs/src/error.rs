use thiserror::Error;

/// Registry-level errors. Structural-change failures (capacity/bit budget
/// exhaustion) are [`wingman_common::ResourceError`]-shaped and are fatal
/// to the owning room per that error's documented propagation; lookup
/// failures are local mistakes and are handled by the caller.
#[derive(Debug, Error)]
pub enum EcsError {
    #[error("entity capacity ({capacity}) exhausted")]
    CapacityExhausted { capacity: u32 },
    #[error("component type already registered")]
    ComponentAlreadyRegistered,
    #[error("component bit budget (32) exhausted")]
    ComponentBudgetExhausted,
    #[error("component type not registered")]
    ComponentNotRegistered,
    #[error("entity {0:?} has no such component")]
    ComponentAbsent(crate::entity::Entity),
    #[error("entity {0:?} is not alive")]
    EntityNotAlive(crate::entity::Entity),
}

impl EcsError {
    /// Maps the two capacity/budget-exhaustion variants onto
    /// [`wingman_common::ResourceError`], the kind the resource-error
    /// taxonomy documents as fatal to the owning room. `None` for every
    /// other variant: lookup failures are local-caller mistakes, not
    /// resource exhaustion, and spawn paths that call this don't expect
    /// to see them (the entity was just created and every component type
    /// is registered up front in `Simulation::new`).
    pub fn as_resource_error(&self) -> Option<wingman_common::ResourceError> {
        match *self {
            EcsError::CapacityExhausted { capacity } => {
                Some(wingman_common::ResourceError::EntityCapacityExhausted { capacity })
            }
            EcsError::ComponentBudgetExhausted => {
                Some(wingman_common::ResourceError::ComponentBudgetExhausted)
            }
            _ => None,
        }
    }
}
