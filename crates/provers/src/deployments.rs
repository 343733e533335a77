//! Which prover code lives at which address on a chain.

use std::{collections::HashMap, sync::Arc};

use alloy_primitives::{Address, B256};
use parking_lot::RwLock;
use tracing::*;
use waypoint_primitives::prelude::ChainId;

use crate::{
    errors::{ProverError, ProverResult},
    prover::HopProver,
};

/// Prover deployments of one chain.  Stands in for `extcodehash` and calling
/// into prover contracts by address.
pub struct ProverDeployments {
    chain_id: ChainId,
    provers: RwLock<HashMap<Address, Arc<dyn HopProver>>>,
}

impl ProverDeployments {
    pub fn new(chain_id: ChainId) -> Self {
        Self {
            chain_id,
            provers: RwLock::new(HashMap::new()),
        }
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    pub fn deploy(&self, address: Address, prover: Arc<dyn HopProver>) -> ProverResult<()> {
        let mut tbl = self.provers.write();
        if address.is_zero() || tbl.contains_key(&address) {
            return Err(ProverError::AddressInUse(address));
        }

        debug!(
            chain = self.chain_id,
            %address,
            home = prover.home_chain_id(),
            target = prover.target_chain_id(),
            version = prover.version(),
            "deployed prover"
        );
        tbl.insert(address, prover);
        Ok(())
    }

    pub fn get(&self, address: Address) -> Option<Arc<dyn HopProver>> {
        self.provers.read().get(&address).cloned()
    }

    /// Code hash of the prover at `address`, `None` if there is none.
    pub fn code_hash(&self, address: Address) -> Option<B256> {
        self.provers.read().get(&address).map(|p| p.code_hash())
    }
}
