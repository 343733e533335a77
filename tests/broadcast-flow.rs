//! Reads a root chain broadcast from its descendants, one and several hops
//! away.

use alloy_primitives::B256;
use common::{broadcast_network, message_args, topology, L2, L2_NATIVE, L3, L4, MSG, PUBLISHER, ROOT};
use tracing::info;
use waypoint_broadcast::BroadcastError;
use waypoint_primitives::slots::accumulate_id;
use waypoint_route::RouteError;
use waypoint_sim::{network::Network, scenario};

mod common;

#[test]
fn child_reads_root_broadcast() {
    let (network, block) = broadcast_network(16);
    let root = network.index_of(ROOT).unwrap();

    for id in [L2, L2_NATIVE] {
        let idx = network.index_of(id).unwrap();
        let spec = network.route(idx, 1).unwrap();
        assert_eq!(spec.target, root);
        assert!(spec.target_block >= block);

        let node = network.node(idx);
        let ctx = node.chain.pending_ctx(PUBLISHER);
        let args = message_args(&network, &spec, MSG);
        let (id, ts) = node
            .receiver
            .verify_broadcast_message(&ctx, &args, MSG, PUBLISHER)
            .unwrap();

        let broadcaster = network.node(root).broadcaster.address();
        assert_eq!(id, accumulate_id(accumulate_id(B256::ZERO, spec.route[0]), broadcaster));
        assert_eq!(ts, network.node(root).chain.timestamp(block));

        let other = B256::repeat_byte(0xbb);
        let args = message_args(&network, &spec, other);
        assert!(matches!(
            node.receiver
                .verify_broadcast_message(&ctx, &args, other, PUBLISHER),
            Err(BroadcastError::MessageNotFound { .. })
        ));
    }
}

#[test]
fn grandchild_needs_registered_copy() {
    let (network, _) = broadcast_network(16);
    let idx = network.index_of(L3).unwrap();
    let spec = network.route(idx, 2).unwrap();
    let node = network.node(idx);
    let ctx = node.chain.pending_ctx(PUBLISHER);

    let args = message_args(&network, &spec, MSG);
    assert!(matches!(
        node.receiver
            .verify_broadcast_message(&ctx, &args, MSG, PUBLISHER),
        Err(BroadcastError::Route(RouteError::ProverCopyNotRegistered(_)))
    ));

    let pointer_id = scenario::register_copy(&network, idx, 1).unwrap();
    assert_eq!(pointer_id, accumulate_id(accumulate_id(B256::ZERO, spec.route[0]), spec.route[1]));
    assert!(node.receiver.prover_copy(pointer_id).unwrap().is_some());

    let (_, ts) = node
        .receiver
        .verify_broadcast_message(&ctx, &args, MSG, PUBLISHER)
        .unwrap();
    let root = network.node(spec.target);
    assert_eq!(root.config.id, ROOT);
    assert!(ts > 0);
}

#[test]
fn broadcaster_id_depends_on_route() {
    let (network, _) = broadcast_network(16);
    let l2 = network.index_of(L2).unwrap();
    let l3 = network.index_of(L3).unwrap();
    scenario::register_copy(&network, l3, 1).unwrap();

    let read = |idx: usize, depth: usize| {
        let spec = network.route(idx, depth).unwrap();
        let node = network.node(idx);
        node.receiver
            .verify_broadcast_message(
                &node.chain.pending_ctx(PUBLISHER),
                &message_args(&network, &spec, MSG),
                MSG,
                PUBLISHER,
            )
            .unwrap()
    };

    let (from_l2, ts_l2) = read(l2, 1);
    let (from_l3, ts_l3) = read(l3, 2);
    assert_ne!(from_l2, from_l3);
    assert_eq!(ts_l2, ts_l3);
}

#[test]
fn scenario_reaches_every_descendant() {
    let mut network = Network::build(&topology(4)).unwrap();
    network.warm_up(9).unwrap();

    let report = scenario::run(&mut network, MSG).unwrap();
    for line in &report {
        info!(%line, "scenario");
    }
    assert_eq!(report.len(), network.nodes().len());
    assert!(report.iter().all(|l| !l.contains("skipped")));

    // l4 sits three hops below the root, so it needed two copies.
    let l4 = network.index_of(L4).unwrap();
    assert_eq!(network.hops_to(l4, 0).unwrap(), Some(3));
}
