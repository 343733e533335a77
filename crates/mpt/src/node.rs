//! Raw RLP handling for trie nodes.  We keep items as borrowed encodings so that
//! inline children can be walked without copying.

use alloy_primitives::B256;
use alloy_rlp::{Header, EMPTY_STRING_CODE};

use crate::errors::{MptError, MptResult};

/// Reference from a parent node to a child.
#[derive(Copy, Clone, Debug)]
pub(crate) enum NodeRef<'a> {
    /// Child encoding is 32 bytes or longer and is referenced by hash.
    Hash(B256),

    /// Child encoding is shorter than 32 bytes and embedded in the parent.
    Inline(&'a [u8]),
}

/// Splits an encoded list node into the raw encodings of its items.
pub(crate) fn list_items(raw: &[u8]) -> MptResult<Vec<&[u8]>> {
    let mut buf = raw;
    let header = Header::decode(&mut buf)?;
    if !header.list {
        return Err(MptError::InvalidNode("expected list"));
    }
    if buf.len() != header.payload_length {
        return Err(MptError::TrailingBytes("trie node"));
    }

    let mut items = Vec::with_capacity(17);
    while !buf.is_empty() {
        let start = buf;
        let item = Header::decode(&mut buf)?;
        let total = (start.len() - buf.len()) + item.payload_length;
        if start.len() < total {
            return Err(MptError::InvalidNode("item overruns node"));
        }
        items.push(&start[..total]);
        buf = &start[total..];
    }

    Ok(items)
}

/// Returns the payload of an RLP string item.
pub(crate) fn string_payload(item: &[u8]) -> MptResult<&[u8]> {
    let mut buf = item;
    let header = Header::decode(&mut buf)?;
    if header.list {
        return Err(MptError::InvalidNode("expected string"));
    }
    if buf.len() != header.payload_length {
        return Err(MptError::TrailingBytes("string item"));
    }
    Ok(buf)
}

/// Interprets a child slot of a branch or extension node.  Returns `None` for
/// an empty slot.
pub(crate) fn child_ref(item: &[u8]) -> MptResult<Option<NodeRef<'_>>> {
    match item.first() {
        Some(b) if *b >= 0xc0 => Ok(Some(NodeRef::Inline(item))),
        Some(b) if *b == EMPTY_STRING_CODE && item.len() == 1 => Ok(None),
        _ => {
            let payload = string_payload(item)?;
            if payload.len() != 32 {
                return Err(MptError::InvalidNode("child reference is not a hash"));
            }
            Ok(Some(NodeRef::Hash(B256::from_slice(payload))))
        }
    }
}
