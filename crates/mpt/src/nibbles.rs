//! Nibble paths and their hex-prefix ("compact") encoding.

use crate::errors::{MptError, MptResult};

/// Expands bytes into their nibbles, high nibble first.
pub fn to_nibbles(bytes: &[u8]) -> Vec<u8> {
    let mut nibbles = Vec::with_capacity(bytes.len() * 2);
    for b in bytes {
        nibbles.push(b >> 4);
        nibbles.push(b & 0x0f);
    }
    nibbles
}

/// Hex-prefix encodes a nibble path, flagging whether it terminates in a leaf.
pub fn encode_path(path: &[u8], is_leaf: bool) -> Vec<u8> {
    let flag = if is_leaf { 2 } else { 0 };
    let mut out = Vec::with_capacity(path.len() / 2 + 1);

    let rest = if path.len() % 2 == 1 {
        out.push(((flag + 1) << 4) | path[0]);
        &path[1..]
    } else {
        out.push(flag << 4);
        path
    };

    for pair in rest.chunks(2) {
        out.push((pair[0] << 4) | pair[1]);
    }

    out
}

/// Decodes a hex-prefix path, returning the nibbles and the leaf flag.
pub fn decode_path(encoded: &[u8]) -> MptResult<(Vec<u8>, bool)> {
    let first = *encoded
        .first()
        .ok_or(MptError::InvalidNode("empty path"))?;
    let flag = first >> 4;
    if flag > 3 {
        return Err(MptError::InvalidNode("bad path flag"));
    }

    let is_leaf = flag & 2 != 0;
    let odd = flag & 1 != 0;

    let mut nibbles = Vec::with_capacity(encoded.len() * 2);
    if odd {
        nibbles.push(first & 0x0f);
    } else if first & 0x0f != 0 {
        return Err(MptError::InvalidNode("nonzero padding in even path"));
    }
    nibbles.extend(to_nibbles(&encoded[1..]));

    Ok((nibbles, is_leaf))
}
