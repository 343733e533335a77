use std::{collections::HashMap, sync::Arc};

use alloy_primitives::{Address, B256};
use waypoint_pointer::Pointer;
use waypoint_provers::HopProver;

use crate::errors::{RouteError, RouteResult};

/// A prover to run for one hop, along with the code hash it must have.
#[derive(Clone)]
pub struct ResolvedHop {
    pub prover: Arc<dyn HopProver>,
    pub expected_code_hash: B256,
}

/// Turns the pointer of a hop into a prover that's safe to run.
pub trait HopResolver {
    /// Resolves the `hop`th pointer of a route.  `pointer_id` is the route id
    /// accumulated up to and including `pointer`.
    fn resolve(&self, hop: usize, pointer: Address, pointer_id: B256) -> RouteResult<ResolvedHop>;
}

/// Resolves every pointer by reading it directly.  Only usable where all
/// pointers along the route are readable, i.e. in tests and simulations
/// spanning several chains in one process.
#[derive(Clone, Default)]
pub struct PointerResolver {
    pointers: HashMap<Address, Arc<Pointer>>,
}

impl PointerResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pointer: Arc<Pointer>) {
        self.pointers.insert(pointer.address(), pointer);
    }

    pub fn with_pointer(mut self, pointer: Arc<Pointer>) -> Self {
        self.insert(pointer);
        self
    }

    pub fn get(&self, address: Address) -> Option<&Arc<Pointer>> {
        self.pointers.get(&address)
    }
}

impl HopResolver for PointerResolver {
    fn resolve(&self, _hop: usize, pointer: Address, _pointer_id: B256) -> RouteResult<ResolvedHop> {
        let ptr = self
            .pointers
            .get(&pointer)
            .ok_or(RouteError::UnknownPointer(pointer))?;
        let prover = ptr
            .implementation()?
            .ok_or(RouteError::PointerNotSet(pointer))?;
        Ok(ResolvedHop {
            prover,
            expected_code_hash: ptr.implementation_code_hash()?,
        })
    }
}
