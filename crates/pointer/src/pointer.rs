use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use parking_lot::Mutex;
use tracing::*;
use waypoint_primitives::{constants::POINTER_CODE_HASH_SLOT, events::ImplementationUpdated};
use waypoint_provers::{HopProver, ProverDeployments};
use waypoint_state::prelude::*;

use crate::errors::{PointerError, PointerResult};

const OWNER_SLOT: B256 = B256::ZERO;
const IMPLEMENTATION_SLOT: B256 = B256::with_last_byte(1);

/// Pointer to the current version of a hop prover on this chain.
///
/// The implementation's code hash is stored at a fixed derived slot next to
/// its address, so a remote chain can prove which code a pointer refers to
/// with a single storage proof.
pub struct Pointer {
    address: Address,
    store: Arc<dyn SlotStore>,
    deployments: Arc<ProverDeployments>,
    write_lock: Mutex<()>,
}

impl Pointer {
    pub fn new(
        address: Address,
        owner: Address,
        store: Arc<dyn SlotStore>,
        deployments: Arc<ProverDeployments>,
    ) -> PointerResult<Self> {
        if owner.is_zero() {
            return Err(PointerError::InvalidOwner);
        }

        let mut batch = WriteBatch::new();
        batch.put_address(OWNER_SLOT, owner);
        store.apply_batch(batch)?;

        Ok(Self {
            address,
            store,
            deployments,
            write_lock: Mutex::new(()),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> PointerResult<Address> {
        Ok(self.store.get_address(OWNER_SLOT)?)
    }

    /// Current prover address, zero if never set.
    pub fn implementation_address(&self) -> PointerResult<Address> {
        Ok(self.store.get_address(IMPLEMENTATION_SLOT)?)
    }

    /// Code hash of the current prover, zero if never set.
    pub fn implementation_code_hash(&self) -> PointerResult<B256> {
        Ok(self.store.get_slot(*POINTER_CODE_HASH_SLOT)?)
    }

    /// Handle to the current prover.
    pub fn implementation(&self) -> PointerResult<Option<Arc<dyn HopProver>>> {
        let addr = self.implementation_address()?;
        if addr.is_zero() {
            return Ok(None);
        }
        Ok(self.deployments.get(addr))
    }

    /// Points at `new_impl`, which must be a prover for this chain with a
    /// strictly higher version than the current one.
    pub fn set_implementation_address(
        &self,
        ctx: &mut ExecCtx,
        new_impl: Address,
    ) -> PointerResult<()> {
        let _guard = self.write_lock.lock();
        if ctx.caller() != self.owner()? {
            warn!(pointer = %self.address, caller = %ctx.caller(), "rejected update from non-owner");
            return Err(PointerError::NotOwner(ctx.caller()));
        }
        if new_impl.is_zero() {
            return Err(PointerError::InvalidImplementationAddress(new_impl));
        }

        let prover = self
            .deployments
            .get(new_impl)
            .ok_or(PointerError::InvalidImplementationAddress(new_impl))?;
        if prover.home_chain_id() != ctx.chain_id() {
            return Err(PointerError::HomeChainMismatch {
                prover: prover.home_chain_id(),
                pointer: ctx.chain_id(),
            });
        }

        if let Some(current) = self.implementation()? {
            if prover.version() <= current.version() {
                return Err(PointerError::NonIncreasingVersion {
                    current: current.version(),
                    new: prover.version(),
                });
            }
        }

        let code_hash = prover.code_hash();
        let mut batch = WriteBatch::new();
        batch.put_address(IMPLEMENTATION_SLOT, new_impl);
        batch.put(*POINTER_CODE_HASH_SLOT, code_hash);
        self.store.apply_batch(batch)?;

        info!(pointer = %self.address, implementation = %new_impl, version = prover.version(), "updated pointer");
        ctx.emit(
            self.address,
            &ImplementationUpdated {
                implementation: new_impl,
                codeHash: code_hash,
                version: U256::from(prover.version()),
            },
        );
        Ok(())
    }

    pub fn transfer_ownership(&self, ctx: &mut ExecCtx, new_owner: Address) -> PointerResult<()> {
        let _guard = self.write_lock.lock();
        if ctx.caller() != self.owner()? {
            return Err(PointerError::NotOwner(ctx.caller()));
        }
        if new_owner.is_zero() {
            return Err(PointerError::InvalidOwner);
        }

        let mut batch = WriteBatch::new();
        batch.put_address(OWNER_SLOT, new_owner);
        self.store.apply_batch(batch)?;
        debug!(pointer = %self.address, %new_owner, "transferred ownership");
        Ok(())
    }
}
