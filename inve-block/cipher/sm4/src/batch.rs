//! Moves blocks in and out of the four-lane working register used by the
//! accelerated engine.

use crate::{Block, BLOCK_SIZE};

pub(crate) const LANES: usize = 4;

/// Four SM4 blocks laid out back to back.
pub(crate) type Lanes = [u8; LANES * BLOCK_SIZE];

/// Places `block` in lane 0 of a zeroed register.
#[inline(always)]
pub(crate) fn pack1(block: &Block) -> Lanes {
    let mut lanes = [0u8; LANES * BLOCK_SIZE];
    lanes[..BLOCK_SIZE].copy_from_slice(block);
    lanes
}

#[inline(always)]
pub(crate) fn unpack1(lanes: &Lanes) -> Block {
    Block::clone_from_slice(&lanes[..BLOCK_SIZE])
}

/// Packs up to four blocks; lanes past `blocks.len()` stay zero.
#[inline(always)]
pub(crate) fn pack(blocks: &[Block]) -> Lanes {
    assert!(blocks.len() <= LANES);
    let mut lanes = [0u8; LANES * BLOCK_SIZE];
    for (lane, block) in lanes.chunks_exact_mut(BLOCK_SIZE).zip(blocks) {
        lane.copy_from_slice(block);
    }
    lanes
}

/// Copies the first `blocks.len()` lanes out.
#[inline(always)]
pub(crate) fn unpack(lanes: &Lanes, blocks: &mut [Block]) {
    assert!(blocks.len() <= LANES);
    for (block, lane) in blocks.iter_mut().zip(lanes.chunks_exact(BLOCK_SIZE)) {
        block.copy_from_slice(lane);
    }
}
