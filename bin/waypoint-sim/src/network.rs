//! In-process devnet built from the chain topology in the config.
//!
//! Every chain with a parent gets a ring buffer fed by a pusher on the parent,
//! a buffer prover reading it and a pointer to that prover.  Every chain gets
//! a broadcaster and a receiver.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use alloy_primitives::{keccak256, Address, Bytes, U256};
use alloy_sol_types::SolValue;
use anyhow::{anyhow, Context};
use tracing::*;
use waypoint_blockhash::{
    CrossDomainMessenger, MessageChannel, NativeMessenger, Pusher, PusherAuth, RetryableInbox,
    RingBuffer,
};
use waypoint_broadcast::{Broadcaster, Receiver};
use waypoint_config::{ChainConfig, Config, MessengerKind};
use waypoint_pointer::Pointer;
use waypoint_primitives::{
    abi::{NativeMessageParams, RetryableTicketParams},
    constants::BLOCK_HASH_MAPPING_SLOT,
    prelude::ChainId,
};
use waypoint_provers::{BufferProver, BufferProverConfig, ProverDeployments};
use waypoint_route::PointerResolver;
use waypoint_test_utils::DevChain;

/// Owns and operates every contract in the devnet.
pub const OPERATOR: Address = Address::new([0x0e; 20]);

/// Delivers cross-domain messages.
const RELAYER: Address = Address::new([0x0f; 20]);

const PROVER_VERSION: u64 = 1;
const RETRYABLE_GAS_LIMIT: u64 = 1_000_000;
const RETRYABLE_MAX_FEE_PER_GAS: u64 = 1_000_000_000;
const RETRYABLE_SUBMISSION_COST: u64 = 1_000_000_000_000;
const NATIVE_MIN_GAS_LIMIT: u32 = 1_000_000;

/// Deterministic address of a devnet contract.
pub fn contract_address(chain: ChainId, name: &str, salt: u64) -> Address {
    Address::from_word(keccak256(format!("waypoint-sim/{chain}/{name}/{salt}")))
}

/// Contracts connecting a chain to its parent.
pub struct ParentLink {
    pub parent: ChainId,
    pub buffer: Arc<RingBuffer>,
    pub pointer: Arc<Pointer>,
    pub prover_config: BufferProverConfig,

    /// Lives on the parent chain.
    pub pusher: Pusher,
    pub channel: Arc<MessageChannel>,
    pub messenger: MessengerKind,

    /// Last parent block pushed.
    pub pushed: u64,
}

pub struct Node {
    pub config: ChainConfig,
    pub chain: DevChain,
    pub deployments: Arc<ProverDeployments>,
    pub broadcaster: Broadcaster,
    pub receiver: Receiver,
    pub link: Option<ParentLink>,

    /// Newest parent block in the buffer as of each sealed block.
    anchors: BTreeMap<u64, u64>,
}

impl Node {
    pub fn id(&self) -> ChainId {
        self.config.id
    }

    pub fn link(&self) -> anyhow::Result<&ParentLink> {
        self.link
            .as_ref()
            .ok_or_else(|| anyhow!("chain {} has no parent", self.config.name))
    }

    /// Parent block the buffer held when `block` was sealed.
    pub fn anchor(&self, block: u64) -> anyhow::Result<u64> {
        self.anchors
            .get(&block)
            .copied()
            .ok_or_else(|| anyhow!("no anchor for block {block} of {}", self.config.name))
    }
}

/// A route from some chain towards its root, and where it ends up.
pub struct RouteSpec {
    pub route: Vec<Address>,
    pub inputs: Vec<Bytes>,
    pub target: usize,
    pub target_block: u64,
}

pub struct Network {
    nodes: Vec<Node>,
    index: HashMap<ChainId, usize>,
}

impl Network {
    pub fn build(config: &Config) -> anyhow::Result<Self> {
        let mut nodes = Vec::with_capacity(config.chains.len());
        let mut index = HashMap::new();

        for cc in &config.chains {
            let id = cc.id;
            let chain = DevChain::new(id);
            let deployments = Arc::new(ProverDeployments::new(id));
            let bc_addr = contract_address(id, "broadcaster", 0);
            let broadcaster = Broadcaster::new(bc_addr, chain.store(bc_addr));

            let link = match cc.parent {
                Some(parent) => Some(build_link(config, cc, parent, &chain, &deployments)?),
                None => None,
            };

            let mut local = PointerResolver::new();
            if let Some(l) = &link {
                local.insert(l.pointer.clone());
            }
            let rcv_addr = contract_address(id, "receiver", 0);
            let receiver = Receiver::new(rcv_addr, chain.store(rcv_addr), local, deployments.clone());

            info!(chain = %cc.name, %id, parent = ?cc.parent, "built chain");
            index.insert(id, nodes.len());
            nodes.push(Node {
                config: cc.clone(),
                chain,
                deployments,
                broadcaster,
                receiver,
                link,
                anchors: BTreeMap::new(),
            });
        }

        Ok(Self { nodes, index })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, idx: usize) -> &Node {
        &self.nodes[idx]
    }

    pub fn index_of(&self, id: ChainId) -> anyhow::Result<usize> {
        self.index
            .get(&id)
            .copied()
            .ok_or_else(|| anyhow!("unknown chain {id}"))
    }

    /// Number of hops from chain `idx` up to `ancestor`, if it is one.
    pub fn hops_to(&self, idx: usize, ancestor: usize) -> anyhow::Result<Option<usize>> {
        let mut cur = idx;
        let mut hops = 0;
        while let Some(link) = &self.nodes[cur].link {
            cur = self.index_of(link.parent)?;
            hops += 1;
            if cur == ancestor {
                return Ok(Some(hops));
            }
        }
        Ok(None)
    }

    /// Seals a block on a chain, remembering what its buffer held.
    pub fn seal(&mut self, idx: usize) -> anyhow::Result<u64> {
        let node = &mut self.nodes[idx];
        let number = node.chain.seal();
        if let Some(link) = &node.link {
            node.anchors
                .insert(number, link.buffer.newest_block_number()?);
        }
        Ok(number)
    }

    pub fn warm_up(&mut self, blocks: u64) -> anyhow::Result<()> {
        for idx in 0..self.nodes.len() {
            for _ in 0..blocks {
                self.seal(idx)?;
            }
        }
        Ok(())
    }

    /// Pushes every parent's sealed block hashes down to its children, relays
    /// them and seals the children.  Parents are handled before children, so
    /// hashes reach the leaves in one pass.
    pub fn propagate(&mut self) -> anyhow::Result<()> {
        for idx in 0..self.nodes.len() {
            let Some(parent_id) = self.nodes[idx].link.as_ref().map(|l| l.parent) else {
                continue;
            };
            let parent_idx = self.index_of(parent_id)?;
            let pushed = self.push(idx, parent_idx)?;

            let node = &mut self.nodes[idx];
            let Some(link) = node.link.as_mut() else {
                continue;
            };
            link.pushed = pushed;

            let mut relay_ctx = node.chain.pending_ctx(RELAYER);
            while link.channel.relay_next(&mut relay_ctx, &link.buffer)?.is_some() {}

            let sealed = self.seal(idx)?;
            debug!(chain = %self.nodes[idx].config.name, %sealed, %pushed, "propagated block hashes");
        }
        Ok(())
    }

    /// Sends every parent block hash not yet pushed, in batches.  Returns the
    /// last block pushed.
    fn push(&self, idx: usize, parent_idx: usize) -> anyhow::Result<u64> {
        let link = self.nodes[idx].link()?;
        let parent = &self.nodes[parent_idx];
        let head = parent.chain.head();
        let max = link.pusher.max_batch_size();

        let mut first = link.pushed + 1;
        while first <= head {
            let size = max.min(head - first + 1);
            let (value, tx_data) = messenger_fee(link.messenger);
            let mut ctx = parent.chain.pending_ctx(OPERATOR).with_value(value);
            link.pusher
                .push_hashes(&mut ctx, link.buffer.address(), first, size, &tx_data)
                .with_context(|| format!("pushing {first}+{size} to {}", self.nodes[idx].config.name))?;
            first += size;
        }

        Ok(head.max(link.pushed))
    }

    /// Route from `reader` covering `depth` hops towards its root, with the
    /// inputs each hop needs right now.
    pub fn route(&self, reader: usize, depth: usize) -> anyhow::Result<RouteSpec> {
        let mut route = Vec::with_capacity(depth);
        let mut inputs = Vec::with_capacity(depth);

        let node = &self.nodes[reader];
        let link = node.link()?;
        let mut block = link.buffer.newest_block_number()?;
        route.push(link.pointer.address());
        inputs.push(U256::from(block).abi_encode().into());
        let mut cur = self.index_of(link.parent)?;

        for _ in 1..depth {
            let node = &self.nodes[cur];
            let link = node.link()?;
            let parent_block = node.anchor(block)?;
            let proof = node.chain.commitment_proof(
                block,
                link.buffer.address(),
                U256::from(parent_block),
                BLOCK_HASH_MAPPING_SLOT,
            );
            route.push(link.pointer.address());
            inputs.push(proof.abi_encode().into());
            cur = self.index_of(link.parent)?;
            block = parent_block;
        }

        Ok(RouteSpec {
            route,
            inputs,
            target: cur,
            target_block: block,
        })
    }
}

fn build_link(
    config: &Config,
    cc: &ChainConfig,
    parent: ChainId,
    chain: &DevChain,
    deployments: &Arc<ProverDeployments>,
) -> anyhow::Result<ParentLink> {
    let id = cc.id;
    let channel = Arc::new(MessageChannel::new());
    let (messenger, auth): (Arc<dyn CrossDomainMessenger>, PusherAuth) = match cc.messenger {
        MessengerKind::Retryable => (
            Arc::new(RetryableInbox::new(
                contract_address(parent, "inbox", id),
                channel.clone(),
            )),
            PusherAuth::Aliased,
        ),
        MessengerKind::Native => {
            let remote = contract_address(id, "messenger", 0);
            (
                Arc::new(NativeMessenger::new(
                    contract_address(parent, "messenger", id),
                    remote,
                    channel.clone(),
                )),
                PusherAuth::Messenger { messenger: remote },
            )
        }
    };

    let buffer_addr = contract_address(id, "buffer", 0);
    let buffer = Arc::new(RingBuffer::new(
        buffer_addr,
        config.buffer.size,
        auth,
        OPERATOR,
        chain.store(buffer_addr),
    )?);

    let pusher = Pusher::new(
        contract_address(parent, "pusher", id),
        config.pusher.max_batch_size,
        messenger,
    );
    buffer.set_pusher_address(&mut chain.pending_ctx(OPERATOR), pusher.address())?;

    let prover = BufferProver::new(id, parent, PROVER_VERSION, buffer.clone());
    let prover_config = *prover.config();
    let prover_addr = contract_address(id, "buffer-prover", PROVER_VERSION);
    deployments.deploy(prover_addr, Arc::new(prover))?;

    let ptr_addr = contract_address(id, "pointer", parent);
    let pointer = Arc::new(Pointer::new(
        ptr_addr,
        OPERATOR,
        chain.store(ptr_addr),
        deployments.clone(),
    )?);
    pointer.set_implementation_address(&mut chain.pending_ctx(OPERATOR), prover_addr)?;

    Ok(ParentLink {
        parent,
        buffer,
        pointer,
        prover_config,
        pusher,
        channel,
        messenger: cc.messenger,
        pushed: 0,
    })
}

/// Message value and tx data paying for one pushed batch.
fn messenger_fee(kind: MessengerKind) -> (U256, Vec<u8>) {
    match kind {
        MessengerKind::Retryable => {
            let params = RetryableTicketParams {
                gasLimit: U256::from(RETRYABLE_GAS_LIMIT),
                maxFeePerGas: U256::from(RETRYABLE_MAX_FEE_PER_GAS),
                maxSubmissionCost: U256::from(RETRYABLE_SUBMISSION_COST),
            };
            let value = params.gasLimit * params.maxFeePerGas + params.maxSubmissionCost;
            (value, params.abi_encode())
        }
        MessengerKind::Native => (
            U256::ZERO,
            NativeMessageParams {
                minGasLimit: NATIVE_MIN_GAS_LIMIT,
            }
            .abi_encode(),
        ),
    }
}
