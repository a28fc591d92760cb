//! Portable table-driven SM4.
//!
//! S-box lookups index memory by secret data and are not guaranteed to run
//! in constant time on CPUs with data caches.

use crate::{
    consts::{ROUNDS, SBOX},
    key::to_u32,
    Block,
};
use cipher::{
    consts::{U1, U16},
    inout::InOut,
    BlockBackend, BlockSizeUser, ParBlocksSizeUser,
};

/// Byte-wise S-box substitution of a word.
#[inline(always)]
pub(crate) fn tau(x: u32) -> u32 {
    let b = x.to_be_bytes();
    u32::from_be_bytes([
        SBOX[b[0] as usize],
        SBOX[b[1] as usize],
        SBOX[b[2] as usize],
        SBOX[b[3] as usize],
    ])
}

#[inline(always)]
fn round_transform(x: u32) -> u32 {
    let b = tau(x);
    b ^ b.rotate_left(2) ^ b.rotate_left(10) ^ b.rotate_left(18) ^ b.rotate_left(24)
}

/// Runs all 32 rounds over one block. Encryption and decryption differ only
/// in which round key order is passed in.
pub(crate) fn crypt_block(rk: &[u32; ROUNDS], src: &Block) -> Block {
    let mut x = [
        to_u32(&src[0..4]),
        to_u32(&src[4..8]),
        to_u32(&src[8..12]),
        to_u32(&src[12..16]),
    ];

    for chunk in rk.chunks_exact(4) {
        x[0] ^= round_transform(x[1] ^ x[2] ^ x[3] ^ chunk[0]);
        x[1] ^= round_transform(x[2] ^ x[3] ^ x[0] ^ chunk[1]);
        x[2] ^= round_transform(x[3] ^ x[0] ^ x[1] ^ chunk[2]);
        x[3] ^= round_transform(x[0] ^ x[1] ^ x[2] ^ chunk[3]);
    }

    let mut out = Block::default();
    for (dst, word) in out.chunks_exact_mut(4).zip(x.iter().rev()) {
        dst.copy_from_slice(&word.to_be_bytes());
    }
    out
}

pub(crate) struct SoftBackend<'a>(pub(crate) &'a [u32; ROUNDS]);

impl<'a> BlockSizeUser for SoftBackend<'a> {
    type BlockSize = U16;
}

impl<'a> ParBlocksSizeUser for SoftBackend<'a> {
    type ParBlocksSize = U1;
}

impl<'a> BlockBackend for SoftBackend<'a> {
    #[inline(always)]
    fn proc_block(&mut self, mut block: InOut<'_, '_, Block>) {
        let out = crypt_block(self.0, block.get_in());
        *block.get_out() = out;
    }
}
