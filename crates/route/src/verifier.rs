use std::sync::Arc;

use alloy_primitives::{Address, Bytes, B256, U256};
use tracing::*;
use waypoint_primitives::{prelude::*, slots::accumulate_id};
use waypoint_provers::HopProver;
use waypoint_state::prelude::*;

use crate::{
    errors::{RouteError, RouteResult},
    resolver::HopResolver,
};

/// A route together with the input for each hop and the proof of the slot to
/// read at the end of it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RemoteReadArgs {
    pub route: Vec<Address>,
    pub hop_inputs: Vec<Bytes>,
    pub final_proof: Bytes,
}

/// Result of folding a route.
#[derive(Clone)]
pub struct RouteOutcome {
    /// Commitment to the last hop's target chain.
    pub commitment: Commitment,

    /// Id of the route, folding in every pointer.
    pub route_id: B256,

    pub target_chain_id: ChainId,

    /// Prover of the last hop.
    pub prover: Arc<dyn HopProver>,
}

/// A storage slot read on a remote chain.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RemoteSlot {
    /// The route id with the proven account folded in.  Identifies the account
    /// as reached through this exact route.
    pub account_id: B256,
    pub account: Address,
    pub slot: U256,
    pub value: B256,
}

/// Folds `route` left to right.
///
/// Without an `initial` commitment the first hop reads its target commitment
/// from the executing chain, so its prover must live there.  Each later hop
/// proves its target commitment from the previous one and must live on the
/// previous hop's target chain.  Every prover's code hash is checked against
/// what its pointer says before it's run.
pub fn verify_route(
    ctx: &ExecCtx,
    initial: Option<Commitment>,
    route: &[Address],
    inputs: &[Bytes],
    resolver: &dyn HopResolver,
) -> RouteResult<RouteOutcome> {
    if route.is_empty() {
        return Err(RouteError::EmptyRoute);
    }
    if route.len() != inputs.len() {
        return Err(RouteError::InputLengthMismatch {
            pointers: route.len(),
            inputs: inputs.len(),
        });
    }

    let mut route_id = B256::ZERO;
    let mut commitment = initial;
    let mut expected_home = initial.is_none().then(|| ctx.chain_id());
    let mut last = None;

    for (hop, (pointer, input)) in route.iter().zip(inputs).enumerate() {
        route_id = accumulate_id(route_id, *pointer);
        let resolved = resolver.resolve(hop, *pointer, route_id)?;
        let prover = resolved.prover;

        let actual = prover.code_hash();
        if actual != resolved.expected_code_hash {
            return Err(RouteError::CodeHashMismatch {
                hop,
                expected: resolved.expected_code_hash,
                actual,
            });
        }

        if let Some(expected) = expected_home {
            if prover.home_chain_id() != expected {
                return Err(RouteError::RouteDiscontinuity {
                    hop,
                    expected,
                    actual: prover.home_chain_id(),
                });
            }
        }

        let next = match commitment {
            None => prover.get_target_commitment(ctx, input),
            Some(prev) => prover.verify_target_commitment(prev, input),
        }
        .map_err(|source| RouteError::Hop { hop, source })?;

        debug!(
            %hop,
            %pointer,
            home = prover.home_chain_id(),
            target = prover.target_chain_id(),
            commitment = %next,
            "verified hop"
        );

        commitment = Some(next);
        expected_home = Some(prover.target_chain_id());
        last = Some(prover);
    }

    // both are set by the non-empty loop above
    let (Some(commitment), Some(prover)) = (commitment, last) else {
        return Err(RouteError::EmptyRoute);
    };

    Ok(RouteOutcome {
        commitment,
        route_id,
        target_chain_id: prover.target_chain_id(),
        prover,
    })
}

/// Folds `args.route` from the executing chain and proves one storage slot on
/// the final target chain.
pub fn read_remote_slot(
    ctx: &ExecCtx,
    args: &RemoteReadArgs,
    resolver: &dyn HopResolver,
) -> RouteResult<RemoteSlot> {
    let outcome = verify_route(ctx, None, &args.route, &args.hop_inputs, resolver)?;
    let (account, slot, value) = outcome
        .prover
        .verify_storage_slot(outcome.commitment, &args.final_proof)
        .map_err(RouteError::FinalProof)?;

    Ok(RemoteSlot {
        account_id: accumulate_id(outcome.route_id, account),
        account,
        slot,
        value,
    })
}
