//! ABI types for hop inputs and cross-domain calls.  Hop inputs travel as
//! opaque bytes through a route, these are the layouts the provers decode.

use alloy_sol_types::sol;

sol! {
    /// Proof of a single storage slot of `account`.  `rlpBlockHeader` is empty
    /// when the commitment being proven against is a bare state root.
    #[derive(Debug, PartialEq, Eq)]
    struct StorageSlotProof {
        bytes rlpBlockHeader;
        address account;
        uint256 slot;
        bytes[] accountProof;
        bytes[] storageProof;
    }

    /// Proof that a commitment store on the home chain holds a commitment for
    /// `key`.  The store account and mapping slot are fixed by the prover.
    #[derive(Debug, PartialEq, Eq)]
    struct StoredCommitmentProof {
        bytes rlpBlockHeader;
        uint256 key;
        bytes[] accountProof;
        bytes[] storageProof;
    }

    /// Fee parameters for a retryable ticket.
    #[derive(Debug, PartialEq, Eq)]
    struct RetryableTicketParams {
        uint256 gasLimit;
        uint256 maxFeePerGas;
        uint256 maxSubmissionCost;
    }

    /// Parameters for a native messenger message.
    #[derive(Debug, PartialEq, Eq)]
    struct NativeMessageParams {
        uint32 minGasLimit;
    }

    /// Ring buffer entrypoint invoked through a cross-domain message.
    #[derive(Debug, PartialEq, Eq)]
    function receiveHashes(uint256 firstBlockNumber, bytes32[] blockHashes) external;
}
