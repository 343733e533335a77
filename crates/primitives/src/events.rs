//! Events emitted by our components, encoded the same way a contract would so
//! that off-chain tooling can decode them from logs.

use alloy_sol_types::sol;

sol! {
    /// A contiguous run of block hashes was pushed (pusher side) or stored
    /// (buffer side).
    #[derive(Debug, PartialEq, Eq)]
    event BlockHashesPushed(uint256 firstBlockNumber, uint256 lastBlockNumber);

    #[derive(Debug, PartialEq, Eq)]
    event MessageBroadcast(bytes32 indexed message, address indexed publisher);

    #[derive(Debug, PartialEq, Eq)]
    event PusherAddressSet(address pusherAddress);

    #[derive(Debug, PartialEq, Eq)]
    event ImplementationUpdated(address indexed implementation, bytes32 codeHash, uint256 version);

    #[derive(Debug, PartialEq, Eq)]
    event ProverCopyUpdated(bytes32 indexed pointerId, address indexed copy, uint256 version);

    #[derive(Debug, PartialEq, Eq)]
    event CommitmentPosted(uint256 indexed key, bytes32 commitment);
}
