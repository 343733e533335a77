//! Helpers shared by the integration tests.

#![allow(dead_code)]

use alloy_primitives::{Address, Bytes, B256};
use alloy_sol_types::SolValue;
use waypoint_config::{BufferConfig, ChainConfig, Config, LoggingConfig, MessengerKind, PusherConfig};
use waypoint_primitives::{prelude::ChainId, slots::message_slot};
use waypoint_route::RemoteReadArgs;
use waypoint_sim::network::{Network, RouteSpec};

pub(crate) const ROOT: ChainId = 1;
pub(crate) const L2: ChainId = 42161;
pub(crate) const L2_NATIVE: ChainId = 10;
pub(crate) const L3: ChainId = 660279;
pub(crate) const L4: ChainId = 7777;

pub(crate) const PUBLISHER: Address = Address::new([0x0a; 20]);
pub(crate) const MSG: B256 = B256::new([0xaa; 32]);

fn chain(id: ChainId, name: &str, parent: Option<ChainId>, messenger: MessengerKind) -> ChainConfig {
    ChainConfig {
        id,
        name: name.to_owned(),
        parent,
        messenger,
    }
}

/// Root with a retryable child, a native child and a chain of grandchildren
/// under the retryable one.
pub(crate) fn topology(max_batch_size: u64) -> Config {
    let config = Config {
        buffer: BufferConfig { size: 512 },
        pusher: PusherConfig { max_batch_size },
        chains: vec![
            chain(ROOT, "root", None, MessengerKind::Retryable),
            chain(L2, "l2", Some(ROOT), MessengerKind::Retryable),
            chain(L2_NATIVE, "l2-native", Some(ROOT), MessengerKind::Native),
            chain(L3, "l3", Some(L2), MessengerKind::Retryable),
            chain(L4, "l4", Some(L3), MessengerKind::Native),
        ],
        logging: LoggingConfig::default(),
    };
    config.validate().unwrap();
    config
}

/// Builds the network, broadcasts `MSG` from `PUBLISHER` on the root and
/// propagates the block hashes everywhere.  Returns the root block the
/// broadcast landed in.
pub(crate) fn broadcast_network(max_batch_size: u64) -> (Network, u64) {
    let mut network = Network::build(&topology(max_batch_size)).unwrap();
    network.warm_up(2).unwrap();

    let root = network.index_of(ROOT).unwrap();
    let mut ctx = network.node(root).chain.pending_ctx(PUBLISHER);
    network
        .node(root)
        .broadcaster
        .broadcast_message(&mut ctx, MSG)
        .unwrap();
    let block = network.seal(root).unwrap();
    network.propagate().unwrap();
    (network, block)
}

/// Args reading `message`'s broadcaster slot at the end of `spec`.
pub(crate) fn message_args(network: &Network, spec: &RouteSpec, message: B256) -> RemoteReadArgs {
    let target = network.node(spec.target);
    let proof = target.chain.storage_proof(
        spec.target_block,
        target.broadcaster.address(),
        message_slot(message, PUBLISHER),
    );
    RemoteReadArgs {
        route: spec.route.clone(),
        hop_inputs: spec.inputs.clone(),
        final_proof: proof.abi_encode().into(),
    }
}

/// Flips one byte in the middle of `input`.
pub(crate) fn corrupt(input: &Bytes) -> Bytes {
    let mut buf = input.to_vec();
    let mid = buf.len() / 2;
    buf[mid] ^= 0x01;
    buf.into()
}
