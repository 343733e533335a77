//! Folds a route from an externally supplied commitment and checks that every
//! kind of bad input stops the fold.

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::{SolType, SolValue};
use common::{broadcast_network, corrupt, L2, L3, L4, ROOT};
use waypoint_primitives::{abi::StoredCommitmentProof, slots::accumulate_id};
use waypoint_provers::ProverError;
use waypoint_route::{verify_route, PointerResolver, RouteError, RouteOutcome, RouteResult};
use waypoint_sim::network::Network;

mod common;

struct Fold {
    network: Network,
    initial: B256,
    route: Vec<Address>,
    inputs: Vec<Bytes>,
    resolver: PointerResolver,
    root_block: u64,
}

/// Two hops, l3 -> l2 -> root, starting from the l3 block hash l4 holds.
fn fold() -> Fold {
    let (network, _) = broadcast_network(16);
    let l4 = network.index_of(L4).unwrap();
    let spec = network.route(l4, 3).unwrap();

    let l3 = network.node(network.index_of(L3).unwrap());
    let l3_block = network
        .node(l4)
        .link()
        .unwrap()
        .buffer
        .newest_block_number()
        .unwrap();
    let initial = l3.chain.block_hash(l3_block).unwrap();

    let l2 = network.node(network.index_of(L2).unwrap());
    let resolver = PointerResolver::new()
        .with_pointer(l3.link().unwrap().pointer.clone())
        .with_pointer(l2.link().unwrap().pointer.clone());

    Fold {
        initial,
        route: spec.route[1..].to_vec(),
        inputs: spec.inputs[1..].to_vec(),
        resolver,
        root_block: spec.target_block,
        network,
    }
}

impl Fold {
    fn run(&self, inputs: &[Bytes]) -> RouteResult<RouteOutcome> {
        let ctx = self.network.node(0).chain.pending_ctx(Address::ZERO);
        verify_route(&ctx, Some(self.initial), &self.route, inputs, &self.resolver)
    }
}

fn with_proof(input: &Bytes, edit: impl FnOnce(&mut StoredCommitmentProof)) -> Bytes {
    let mut proof = <StoredCommitmentProof as SolType>::abi_decode(input, true).unwrap();
    edit(&mut proof);
    proof.abi_encode().into()
}

#[test]
fn folds_to_root_block_hash() {
    let f = fold();
    let outcome = f.run(&f.inputs).unwrap();

    let root = f.network.node(f.network.index_of(ROOT).unwrap());
    assert_eq!(outcome.commitment, root.chain.block_hash(f.root_block).unwrap());
    assert_eq!(outcome.target_chain_id, ROOT);
    assert_eq!(
        outcome.route_id,
        accumulate_id(accumulate_id(B256::ZERO, f.route[0]), f.route[1])
    );
}

#[test]
fn tampered_header_reverts() {
    let f = fold();
    let mut inputs = f.inputs.clone();
    inputs[0] = with_proof(&inputs[0], |p| p.rlpBlockHeader = corrupt(&p.rlpBlockHeader));
    assert!(matches!(
        f.run(&inputs),
        Err(RouteError::Hop {
            hop: 0,
            source: ProverError::InvalidHomeBlockHeader(_),
        })
    ));
}

#[test]
fn tampered_trie_node_reverts() {
    let f = fold();
    let mut inputs = f.inputs.clone();
    inputs[1] = with_proof(&inputs[1], |p| {
        let last = p.accountProof.len() - 1;
        p.accountProof[last] = corrupt(&p.accountProof[last]);
    });
    assert!(matches!(
        f.run(&inputs),
        Err(RouteError::Hop {
            hop: 1,
            source: ProverError::Mpt(_),
        })
    ));
}

#[test]
fn wrong_key_reverts() {
    let f = fold();
    let mut inputs = f.inputs.clone();
    inputs[1] = with_proof(&inputs[1], |p| p.key += U256::from(1));
    assert!(matches!(f.run(&inputs), Err(RouteError::Hop { hop: 1, .. })));
}

#[test]
fn garbage_input_reverts() {
    let f = fold();
    let mut inputs = f.inputs.clone();
    inputs[0] = Bytes::from_static(&[0xde, 0xad]);
    assert!(matches!(
        f.run(&inputs),
        Err(RouteError::Hop {
            hop: 0,
            source: ProverError::MalformedInput,
        })
    ));
}

#[test]
fn malformed_routes_rejected() {
    let mut f = fold();
    assert!(matches!(
        f.run(&f.inputs[..1]),
        Err(RouteError::InputLengthMismatch {
            pointers: 2,
            inputs: 1
        })
    ));

    // l3's prover again, but hop 1 has to start on l2.
    f.route[1] = f.route[0];
    assert!(matches!(
        f.run(&f.inputs),
        Err(RouteError::RouteDiscontinuity {
            hop: 1,
            expected: L2,
            actual: L3,
        })
    ));

    f.route.clear();
    assert!(matches!(f.run(&[]), Err(RouteError::EmptyRoute)));
}
