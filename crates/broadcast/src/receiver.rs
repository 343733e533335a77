use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use parking_lot::Mutex;
use tracing::*;
use waypoint_primitives::{
    constants::POINTER_CODE_HASH_SLOT,
    events::ProverCopyUpdated,
    slots::{mapping_slot, message_slot, u256_from_word},
};
use waypoint_provers::{HopProver, ProverDeployments};
use waypoint_route::{
    read_remote_slot, HopResolver, PointerResolver, RemoteReadArgs, ResolvedHop, RouteError,
    RouteResult,
};
use waypoint_state::prelude::*;

use crate::errors::{BroadcastError, BroadcastResult};

const COPY_ADDRESS_BASE: U256 = U256::ZERO;
const COPY_CODE_HASH_BASE: U256 = U256::from_limbs([1, 0, 0, 0]);

/// Verifies messages broadcast on other chains.
///
/// The first hop of every route goes through one of this chain's own
/// pointers.  Pointers on other chains can't be called from here, so for
/// later hops the receiver runs a local copy of the remote pointer's prover,
/// registered after proving the remote pointer's code hash.
pub struct Receiver {
    address: Address,
    store: Arc<dyn SlotStore>,
    local: PointerResolver,
    deployments: Arc<ProverDeployments>,
    write_lock: Mutex<()>,
}

impl Receiver {
    pub fn new(
        address: Address,
        store: Arc<dyn SlotStore>,
        local: PointerResolver,
        deployments: Arc<ProverDeployments>,
    ) -> Self {
        Self {
            address,
            store,
            local,
            deployments,
            write_lock: Mutex::new(()),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn resolver(&self) -> ReceiverResolver<'_> {
        ReceiverResolver { receiver: self }
    }

    /// Proves that `publisher` broadcast `message` on the route's final chain.
    /// Returns the id of the broadcaster reached through the route and the
    /// broadcast timestamp.
    pub fn verify_broadcast_message(
        &self,
        ctx: &ExecCtx,
        args: &RemoteReadArgs,
        message: B256,
        publisher: Address,
    ) -> BroadcastResult<(B256, u64)> {
        let read = read_remote_slot(ctx, args, &self.resolver())?;

        let expected = u256_from_word(message_slot(message, publisher));
        if read.slot != expected {
            return Err(BroadcastError::WrongMessageSlot {
                expected,
                actual: read.slot,
            });
        }
        if read.value.is_zero() {
            return Err(BroadcastError::MessageNotFound { message, publisher });
        }

        let timestamp = u256_from_word(read.value)
            .try_into()
            .map_err(|_| BroadcastError::CorruptTimestamp)?;

        debug!(broadcaster_id = %read.account_id, %message, %publisher, %timestamp, "verified broadcast");
        Ok((read.account_id, timestamp))
    }

    /// Registers the prover at `copy` as the local stand-in for the remote
    /// pointer at the end of `args.route`'s proof.  The copy must have exactly
    /// the code hash the remote pointer holds, and a higher version than any
    /// copy registered before.  Returns the remote pointer's id.
    pub fn update_prover_copy(
        &self,
        ctx: &mut ExecCtx,
        args: &RemoteReadArgs,
        copy: Address,
    ) -> BroadcastResult<B256> {
        let read = read_remote_slot(ctx, args, &self.resolver())?;
        if read.slot != u256_from_word(*POINTER_CODE_HASH_SLOT) {
            return Err(BroadcastError::WrongPointerSlot(read.slot));
        }

        let prover = self
            .deployments
            .get(copy)
            .ok_or(BroadcastError::UnknownProverCopy(copy))?;
        let code_hash = prover.code_hash();
        if code_hash != read.value {
            return Err(BroadcastError::CopyCodeHashMismatch {
                expected: read.value,
                actual: code_hash,
            });
        }

        // Version check and registration must not interleave with another update.
        let _guard = self.write_lock.lock();
        let pointer_id = read.account_id;
        if let Some(current) = self.prover_copy(pointer_id)? {
            if prover.version() <= current.version() {
                return Err(BroadcastError::NonIncreasingVersion {
                    current: current.version(),
                    new: prover.version(),
                });
            }
        }

        let mut batch = WriteBatch::new();
        batch.put_address(mapping_slot(pointer_id, COPY_ADDRESS_BASE), copy);
        batch.put(mapping_slot(pointer_id, COPY_CODE_HASH_BASE), code_hash);
        self.store.apply_batch(batch)?;

        info!(receiver = %self.address, %pointer_id, %copy, version = prover.version(), "updated prover copy");
        ctx.emit(
            self.address,
            &ProverCopyUpdated {
                pointerId: pointer_id,
                copy,
                version: U256::from(prover.version()),
            },
        );
        Ok(pointer_id)
    }

    /// The copy registered for a remote pointer, if any.
    pub fn prover_copy(&self, pointer_id: B256) -> BroadcastResult<Option<Arc<dyn HopProver>>> {
        let addr = self
            .store
            .get_address(mapping_slot(pointer_id, COPY_ADDRESS_BASE))?;
        if addr.is_zero() {
            return Ok(None);
        }
        Ok(self.deployments.get(addr))
    }
}

/// Resolves the first hop through a local pointer and every later hop through
/// a registered prover copy.
pub struct ReceiverResolver<'a> {
    receiver: &'a Receiver,
}

impl HopResolver for ReceiverResolver<'_> {
    fn resolve(&self, hop: usize, pointer: Address, pointer_id: B256) -> RouteResult<ResolvedHop> {
        if hop == 0 {
            return self.receiver.local.resolve(hop, pointer, pointer_id);
        }

        let store = self.receiver.store.as_ref();
        let addr = store.get_address(mapping_slot(pointer_id, COPY_ADDRESS_BASE))?;
        let prover = self
            .receiver
            .deployments
            .get(addr)
            .ok_or(RouteError::ProverCopyNotRegistered(pointer_id))?;
        Ok(ResolvedHop {
            prover,
            expected_code_hash: store.get_slot(mapping_slot(pointer_id, COPY_CODE_HASH_BASE))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use alloy_sol_types::SolValue;
    use waypoint_blockhash::{PusherAuth, RingBuffer};
    use waypoint_pointer::Pointer;
    use waypoint_primitives::{constants::ROOT_STORE_MAPPING_SLOT, prelude::*, slots::accumulate_id};
    use waypoint_provers::{BufferProver, RootStoreProver, RootStoreProverConfig};
    use waypoint_test_utils::DevChain;

    use super::*;
    use crate::broadcaster::Broadcaster;

    const L1: ChainId = 1;
    const L2: ChainId = 10;
    const OWNER: Address = Address::new([0x01; 20]);
    const PUSHER: Address = Address::new([0x02; 20]);
    const ALICE: Address = Address::new([0x0a; 20]);
    const BROADCASTER: Address = Address::new([0xbc; 20]);
    const BUFFER: Address = Address::new([0xbb; 20]);
    const L2_PROVER: Address = Address::new([0x21; 20]);
    const L2_POINTER: Address = Address::new([0x22; 20]);
    const L1_PROVER: Address = Address::new([0x11; 20]);
    const L1_POINTER: Address = Address::new([0x12; 20]);
    const RECEIVER: Address = Address::new([0x7e; 20]);

    const MSG: B256 = B256::new([0xaa; 32]);

    struct Fixture {
        l1: DevChain,
        l2: DevChain,
        receiver: Receiver,
        l2_deployments: Arc<ProverDeployments>,
        l1_block: u64,
        l1_config: RootStoreProverConfig,
    }

    fn setup() -> Fixture {
        let mut l1 = DevChain::new(L1);
        let l2 = DevChain::new(L2);

        // L1: a broadcast, and a pointer to an L1 -> L2 prover.
        let broadcaster = Broadcaster::new(BROADCASTER, l1.store(BROADCASTER));
        broadcaster
            .broadcast_message(&mut l1.pending_ctx(ALICE), MSG)
            .unwrap();

        let l1_config = RootStoreProverConfig {
            home_chain_id: L1,
            target_chain_id: L2,
            version: 1,
            store: Address::new([0x55; 20]),
            mapping_slot: ROOT_STORE_MAPPING_SLOT,
            target_kind: CommitmentKind::BlockHash,
        };
        let l1_deployments = Arc::new(ProverDeployments::new(L1));
        l1_deployments
            .deploy(L1_PROVER, Arc::new(RootStoreProver::copy(l1_config)))
            .unwrap();
        let l1_pointer =
            Pointer::new(L1_POINTER, OWNER, l1.store(L1_POINTER), l1_deployments).unwrap();
        l1_pointer
            .set_implementation_address(&mut l1.pending_ctx(OWNER), L1_PROVER)
            .unwrap();
        let l1_block = l1.seal();

        // L2: buffer holding every L1 block hash so far.
        let buffer = Arc::new(
            RingBuffer::new(BUFFER, 256, PusherAuth::Direct, OWNER, l2.store(BUFFER)).unwrap(),
        );
        buffer
            .set_pusher_address(&mut l2.pending_ctx(OWNER), PUSHER)
            .unwrap();
        let hashes = (1..=l1_block)
            .map(|n| l1.block_hash(n).unwrap())
            .collect::<Vec<_>>();
        buffer
            .receive_hashes(&mut l2.pending_ctx(PUSHER), 1, &hashes)
            .unwrap();

        let l2_deployments = Arc::new(ProverDeployments::new(L2));
        l2_deployments
            .deploy(L2_PROVER, Arc::new(BufferProver::new(L2, L1, 1, buffer)))
            .unwrap();
        let pointer = Arc::new(
            Pointer::new(L2_POINTER, OWNER, l2.store(L2_POINTER), l2_deployments.clone())
                .unwrap(),
        );
        pointer
            .set_implementation_address(&mut l2.pending_ctx(OWNER), L2_PROVER)
            .unwrap();

        let receiver = Receiver::new(
            RECEIVER,
            l2.store(RECEIVER),
            PointerResolver::new().with_pointer(pointer),
            l2_deployments.clone(),
        );

        Fixture {
            l1,
            l2,
            receiver,
            l2_deployments,
            l1_block,
            l1_config,
        }
    }

    fn read_args(f: &Fixture, account: Address, slot: B256) -> RemoteReadArgs {
        RemoteReadArgs {
            route: vec![L2_POINTER],
            hop_inputs: vec![U256::from(f.l1_block).abi_encode().into()],
            final_proof: f
                .l1
                .storage_proof(f.l1_block, account, slot)
                .abi_encode()
                .into(),
        }
    }

    #[test]
    fn test_verify_broadcast() {
        let f = setup();
        let ctx = f.l2.pending_ctx(ALICE);

        let args = read_args(&f, BROADCASTER, message_slot(MSG, ALICE));
        let (id, ts) = f
            .receiver
            .verify_broadcast_message(&ctx, &args, MSG, ALICE)
            .unwrap();
        assert_eq!(ts, f.l1.timestamp(f.l1_block));
        assert_eq!(
            id,
            accumulate_id(accumulate_id(B256::ZERO, L2_POINTER), BROADCASTER)
        );

        // Right proof, wrong claim.
        assert!(matches!(
            f.receiver
                .verify_broadcast_message(&ctx, &args, MSG, PUSHER),
            Err(BroadcastError::WrongMessageSlot { .. })
        ));

        let other = B256::repeat_byte(0xbb);
        let args = read_args(&f, BROADCASTER, message_slot(other, ALICE));
        assert!(matches!(
            f.receiver
                .verify_broadcast_message(&ctx, &args, other, ALICE),
            Err(BroadcastError::MessageNotFound { .. })
        ));
    }

    #[test]
    fn test_prover_copy_registration() {
        let f = setup();
        let mut ctx = f.l2.pending_ctx(ALICE);
        let pointer_id = accumulate_id(accumulate_id(B256::ZERO, L2_POINTER), L1_POINTER);
        assert!(f.receiver.prover_copy(pointer_id).unwrap().is_none());

        let copy = Address::new([0xc1; 20]);
        f.l2_deployments
            .deploy(copy, Arc::new(RootStoreProver::copy(f.l1_config)))
            .unwrap();
        let stale = Address::new([0xc2; 20]);
        f.l2_deployments
            .deploy(
                stale,
                Arc::new(RootStoreProver::copy(RootStoreProverConfig {
                    version: 0,
                    ..f.l1_config
                })),
            )
            .unwrap();

        let wrong_slot = read_args(&f, L1_POINTER, B256::ZERO);
        assert!(matches!(
            f.receiver.update_prover_copy(&mut ctx, &wrong_slot, copy),
            Err(BroadcastError::WrongPointerSlot(_))
        ));

        let good = read_args(&f, L1_POINTER, *POINTER_CODE_HASH_SLOT);
        assert!(matches!(
            f.receiver.update_prover_copy(&mut ctx, &good, stale),
            Err(BroadcastError::CopyCodeHashMismatch { .. })
        ));
        assert!(matches!(
            f.receiver
                .update_prover_copy(&mut ctx, &good, Address::new([0xc3; 20])),
            Err(BroadcastError::UnknownProverCopy(_))
        ));

        let id = f.receiver.update_prover_copy(&mut ctx, &good, copy).unwrap();
        assert_eq!(id, pointer_id);
        let registered = f.receiver.prover_copy(pointer_id).unwrap().unwrap();
        assert_eq!(registered.code_hash(), RootStoreProver::copy(f.l1_config).code_hash());
        assert_eq!(ctx.events::<ProverCopyUpdated>().len(), 1);

        assert!(matches!(
            f.receiver.update_prover_copy(&mut ctx, &good, copy),
            Err(BroadcastError::NonIncreasingVersion { current: 1, new: 1 })
        ));
    }

    #[test]
    fn test_concurrent_copy_updates_register_once() {
        let f = setup();
        let copy = Address::new([0xc1; 20]);
        f.l2_deployments
            .deploy(copy, Arc::new(RootStoreProver::copy(f.l1_config)))
            .unwrap();
        let good = read_args(&f, L1_POINTER, *POINTER_CODE_HASH_SLOT);
        let ctxs = [f.l2.pending_ctx(ALICE), f.l2.pending_ctx(ALICE)];
        let barrier = std::sync::Barrier::new(2);

        let results: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = ctxs
                .into_iter()
                .map(|mut ctx| {
                    let (receiver, good, barrier) = (&f.receiver, &good, &barrier);
                    s.spawn(move || {
                        barrier.wait();
                        receiver.update_prover_copy(&mut ctx, good, copy)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results.iter().any(|r| matches!(
            r,
            Err(BroadcastError::NonIncreasingVersion { current: 1, new: 1 })
        )));
    }

    #[test]
    fn test_unregistered_copy_stops_route() {
        let f = setup();
        let ctx = f.l2.pending_ctx(ALICE);
        let args = RemoteReadArgs {
            route: vec![L2_POINTER, L1_POINTER],
            hop_inputs: vec![
                U256::from(f.l1_block).abi_encode().into(),
                alloy_primitives::Bytes::new(),
            ],
            final_proof: alloy_primitives::Bytes::new(),
        };
        assert!(matches!(
            f.receiver
                .verify_broadcast_message(&ctx, &args, MSG, ALICE),
            Err(BroadcastError::Route(RouteError::ProverCopyNotRegistered(_)))
        ));
    }
}
