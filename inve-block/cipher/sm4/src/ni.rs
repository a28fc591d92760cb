//! SM4 on AES-NI.
//!
//! The SM4 S-box is affine-equivalent to the AES S-box:
//! `S_sm4(x) = A2(S_aes(A1(x)))`, where `A1` and `A2` are affine maps over
//! GF(2)^8. Each affine map is evaluated as two 16-entry nibble lookups
//! with `pshufb`; `aesenclast` with a zero round key supplies `S_aes`.
//! `aesenclast` also applies ShiftRows, which is cancelled by permuting the
//! input bytes with InvShiftRows first.
//!
//! Four blocks are processed at once: the state is transposed so that
//! register `x[j]` holds word `j` of every block, one block per 32-bit lane.

#![allow(clippy::unreadable_literal)]

use crate::{
    batch::{self, Lanes, LANES},
    consts::ROUNDS,
    Block,
};
use cipher::{
    consts::{U16, U4},
    inout::{InOut, InOutBuf},
    BlockBackend, BlockSizeUser, ParBlocks, ParBlocksSizeUser,
};
use core::mem;

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

#[cfg(feature = "zeroize")]
use cipher::zeroize::Zeroize;

const fn bytes(b: [u8; 16]) -> __m128i {
    unsafe { mem::transmute(b) }
}

// A1 (input map), low and high nibble tables. The affine constant is
// folded into the low table.
const A1_LO: __m128i = bytes([
    0x0e, 0x82, 0x3e, 0xb2, 0x8b, 0x07, 0xbb, 0x37, 0x91, 0x1d, 0xa1, 0x2d, 0x14, 0x98, 0x24, 0xa8,
]);
const A1_HI: __m128i = bytes([
    0x30, 0xec, 0x1e, 0xc2, 0xf5, 0x29, 0xdb, 0x07, 0x38, 0xe4, 0x16, 0xca, 0xfd, 0x21, 0xd3, 0x0f,
]);

// A2 (output map).
const A2_LO: __m128i = bytes([
    0x0c, 0xb4, 0xc6, 0x7e, 0x32, 0x8a, 0xf8, 0x40, 0x6b, 0xd3, 0xa1, 0x19, 0x55, 0xed, 0x9f, 0x27,
]);
const A2_HI: __m128i = bytes([
    0x60, 0x80, 0x30, 0xd0, 0xfd, 0x1d, 0xad, 0x4d, 0xa0, 0x40, 0xf0, 0x10, 0x3d, 0xdd, 0x6d, 0x8d,
]);

const INV_SHIFT_ROWS: __m128i = bytes([
    0x00, 0x0d, 0x0a, 0x07, 0x04, 0x01, 0x0e, 0x0b, 0x08, 0x05, 0x02, 0x0f, 0x0c, 0x09, 0x06, 0x03,
]);

const LOW_NIBBLES: __m128i = bytes([0x0f; 16]);

// Big-endian words to native lanes and back.
const BSWAP32: __m128i = bytes([3, 2, 1, 0, 7, 6, 5, 4, 11, 10, 9, 8, 15, 14, 13, 12]);

// Per-lane left rotations by whole bytes.
const ROL8: __m128i = bytes([3, 0, 1, 2, 7, 4, 5, 6, 11, 8, 9, 10, 15, 12, 13, 14]);
const ROL16: __m128i = bytes([2, 3, 0, 1, 6, 7, 4, 5, 10, 11, 8, 9, 14, 15, 12, 13]);
const ROL24: __m128i = bytes([1, 2, 3, 0, 5, 6, 7, 4, 9, 10, 11, 8, 13, 14, 15, 12]);

#[inline]
#[target_feature(enable = "ssse3")]
unsafe fn affine(x: __m128i, lo: __m128i, hi: __m128i) -> __m128i {
    let l = _mm_shuffle_epi8(lo, _mm_and_si128(x, LOW_NIBBLES));
    let h = _mm_shuffle_epi8(hi, _mm_and_si128(_mm_srli_epi64(x, 4), LOW_NIBBLES));
    _mm_xor_si128(l, h)
}

/// SM4 S-box on all 16 bytes.
#[inline]
#[target_feature(enable = "aes,ssse3")]
unsafe fn sbox(x: __m128i) -> __m128i {
    let x = affine(x, A1_LO, A1_HI);
    let x = _mm_shuffle_epi8(x, INV_SHIFT_ROWS);
    let x = _mm_aesenclast_si128(x, _mm_setzero_si128());
    affine(x, A2_LO, A2_HI)
}

/// `L(b) = b ^ (b <<< 2) ^ (b <<< 10) ^ (b <<< 18) ^ (b <<< 24)` per lane.
#[inline]
#[target_feature(enable = "ssse3")]
unsafe fn diffuse(b: __m128i) -> __m128i {
    let t = _mm_xor_si128(
        _mm_xor_si128(b, _mm_shuffle_epi8(b, ROL8)),
        _mm_shuffle_epi8(b, ROL16),
    );
    let t = _mm_xor_si128(_mm_slli_epi32(t, 2), _mm_srli_epi32(t, 30));
    _mm_xor_si128(_mm_xor_si128(t, b), _mm_shuffle_epi8(b, ROL24))
}

#[inline]
#[target_feature(enable = "sse2")]
unsafe fn transpose(x: [__m128i; 4]) -> [__m128i; 4] {
    let t0 = _mm_unpacklo_epi32(x[0], x[1]);
    let t1 = _mm_unpacklo_epi32(x[2], x[3]);
    let t2 = _mm_unpackhi_epi32(x[0], x[1]);
    let t3 = _mm_unpackhi_epi32(x[2], x[3]);
    [
        _mm_unpacklo_epi64(t0, t1),
        _mm_unpackhi_epi64(t0, t1),
        _mm_unpacklo_epi64(t2, t3),
        _mm_unpackhi_epi64(t2, t3),
    ]
}

/// Runs all 32 rounds over the four blocks held in `lanes`, in place.
///
/// # Safety
/// The CPU must support the `aes` and `ssse3` target features.
#[target_feature(enable = "aes,ssse3")]
pub(crate) unsafe fn crypt4(rk: &[u32; ROUNDS], lanes: &mut Lanes) {
    let ptr = lanes.as_mut_ptr() as *mut __m128i;

    let mut x = [
        _mm_shuffle_epi8(_mm_loadu_si128(ptr.add(0)), BSWAP32),
        _mm_shuffle_epi8(_mm_loadu_si128(ptr.add(1)), BSWAP32),
        _mm_shuffle_epi8(_mm_loadu_si128(ptr.add(2)), BSWAP32),
        _mm_shuffle_epi8(_mm_loadu_si128(ptr.add(3)), BSWAP32),
    ];
    x = transpose(x);

    for chunk in rk.chunks_exact(4) {
        for (i, &k) in chunk.iter().enumerate() {
            let t = _mm_xor_si128(
                _mm_xor_si128(x[(i + 1) % 4], x[(i + 2) % 4]),
                _mm_xor_si128(x[(i + 3) % 4], _mm_set1_epi32(k as i32)),
            );
            x[i] = _mm_xor_si128(x[i], diffuse(sbox(t)));
        }
    }

    let out = transpose([x[3], x[2], x[1], x[0]]);
    for (i, &v) in out.iter().enumerate() {
        _mm_storeu_si128(ptr.add(i), _mm_shuffle_epi8(v, BSWAP32));
    }
}

/// Block backend over the four-lane engine.
pub(crate) struct NiBackend<'a>(&'a [u32; ROUNDS]);

impl<'a> NiBackend<'a> {
    /// # Safety
    /// The CPU must support the `aes` and `ssse3` target features.
    #[inline(always)]
    pub(crate) unsafe fn new(rk: &'a [u32; ROUNDS]) -> Self {
        Self(rk)
    }

    #[inline(always)]
    fn run(&self, lanes: &mut Lanes) {
        // `NiBackend::new` is only reached after a positive capability probe.
        unsafe { crypt4(self.0, lanes) }
    }
}

impl<'a> BlockSizeUser for NiBackend<'a> {
    type BlockSize = U16;
}

impl<'a> ParBlocksSizeUser for NiBackend<'a> {
    type ParBlocksSize = U4;
}

impl<'a> BlockBackend for NiBackend<'a> {
    #[inline(always)]
    fn proc_block(&mut self, mut block: InOut<'_, '_, Block>) {
        let mut lanes = batch::pack1(block.get_in());
        self.run(&mut lanes);
        *block.get_out() = batch::unpack1(&lanes);

        #[cfg(feature = "zeroize")]
        lanes.zeroize();
    }

    #[inline(always)]
    fn proc_par_blocks(&mut self, mut blocks: InOut<'_, '_, ParBlocks<Self>>) {
        let mut lanes = batch::pack(blocks.get_in());
        self.run(&mut lanes);
        batch::unpack(&lanes, blocks.get_out());

        #[cfg(feature = "zeroize")]
        lanes.zeroize();
    }

    #[inline(always)]
    fn proc_tail_blocks(&mut self, mut blocks: InOutBuf<'_, '_, Block>) {
        assert!(blocks.len() < LANES);
        if blocks.is_empty() {
            return;
        }
        let mut lanes = batch::pack(blocks.get_in());
        self.run(&mut lanes);
        batch::unpack(&lanes, blocks.get_out());

        #[cfg(feature = "zeroize")]
        lanes.zeroize();
    }
}
