//! Broadcasts a message on the root chain and reads it back on every chain
//! descending from it.

use std::sync::Arc;

use alloy_primitives::{keccak256, Address, B256};
use alloy_sol_types::SolValue;
use anyhow::{bail, Context};
use tracing::*;
use waypoint_broadcast::BroadcastError;
use waypoint_primitives::{constants::POINTER_CODE_HASH_SLOT, slots::message_slot};
use waypoint_provers::BufferProver;
use waypoint_route::RemoteReadArgs;

use crate::network::{contract_address, Network, RouteSpec, OPERATOR};

/// Account publishing the message.
pub const PUBLISHER: Address = Address::new([0x0a; 20]);

pub fn run(network: &mut Network, message: B256) -> anyhow::Result<Vec<String>> {
    let root = 0;
    let root_name = network.node(root).config.name.clone();
    if network.node(root).link.is_some() {
        bail!("first configured chain must be a root chain");
    }

    let mut ctx = network.node(root).chain.pending_ctx(PUBLISHER);
    network
        .node(root)
        .broadcaster
        .broadcast_message(&mut ctx, message)?;
    let block = network.seal(root)?;
    info!(chain = %root_name, %block, %message, "broadcast message");

    network.propagate()?;

    let mut report = vec![format!("{root_name}: broadcast {message} in block {block}")];
    for idx in 1..network.nodes().len() {
        let name = network.node(idx).config.name.clone();
        let Some(depth) = network.hops_to(idx, root)? else {
            report.push(format!("{name}: not connected to {root_name}, skipped"));
            continue;
        };

        for k in 1..depth {
            register_copy(network, idx, k)?;
        }

        let spec = network.route(idx, depth)?;
        let target = network.node(spec.target);
        let proof = target.chain.storage_proof(
            spec.target_block,
            target.broadcaster.address(),
            message_slot(message, PUBLISHER),
        );
        let args = read_args(&spec, proof.abi_encode());

        let node = network.node(idx);
        let ctx = node.chain.pending_ctx(OPERATOR);
        let (broadcaster_id, timestamp) =
            node.receiver
                .verify_broadcast_message(&ctx, &args, message, PUBLISHER)?;
        info!(chain = %name, %broadcaster_id, %timestamp, %depth, "verified broadcast");
        report.push(format!(
            "{name}: verified over {depth} hop(s), broadcaster id {broadcaster_id}, timestamp {timestamp}"
        ));

        // A message nobody published must not verify through the same route.
        let bogus = keccak256(message);
        let proof = target.chain.storage_proof(
            spec.target_block,
            target.broadcaster.address(),
            message_slot(bogus, PUBLISHER),
        );
        let args = read_args(&spec, proof.abi_encode());
        match node
            .receiver
            .verify_broadcast_message(&ctx, &args, bogus, PUBLISHER)
        {
            Err(BroadcastError::MessageNotFound { .. }) => {}
            Ok(_) => bail!("{name}: unpublished message {bogus} verified"),
            Err(e) => return Err(e.into()),
        }
    }

    Ok(report)
}

/// Registers on chain `idx` a copy of the buffer prover `k` hops up its
/// ancestry, proving the remote pointer's code hash through the first `k`
/// hops.  Returns the remote pointer's id.
pub fn register_copy(network: &Network, idx: usize, k: usize) -> anyhow::Result<B256> {
    let spec = network.route(idx, k)?;
    let remote = network.node(spec.target);
    let remote_link = remote.link()?;

    let proof = remote.chain.storage_proof(
        spec.target_block,
        remote_link.pointer.address(),
        *POINTER_CODE_HASH_SLOT,
    );
    let args = read_args(&spec, proof.abi_encode());

    let node = network.node(idx);
    let copy_addr = contract_address(node.id(), "prover-copy", remote.id());
    node.deployments
        .deploy(
            copy_addr,
            Arc::new(BufferProver::copy(remote_link.prover_config)),
        )
        .context("deploying prover copy")?;

    let mut ctx = node.chain.pending_ctx(OPERATOR);
    let pointer_id = node.receiver.update_prover_copy(&mut ctx, &args, copy_addr)?;
    debug!(chain = %node.config.name, remote = %remote.config.name, %pointer_id, "registered prover copy");
    Ok(pointer_id)
}

fn read_args(spec: &RouteSpec, final_proof: Vec<u8>) -> RemoteReadArgs {
    RemoteReadArgs {
        route: spec.route.clone(),
        hop_inputs: spec.inputs.clone(),
        final_proof: final_proof.into(),
    }
}
