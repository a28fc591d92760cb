//! Single-block encryption over byte slices.
//!
//! Only the first [`BLOCK_SIZE`] bytes of each buffer are read or written.
//! Short buffers and partially overlapping ranges are caller bugs and
//! panic.

use crate::{Block, Sm4, BLOCK_SIZE};
use cipher::{BlockDecrypt, BlockEncrypt};

impl Sm4 {
    /// Block size in bytes.
    #[inline]
    pub fn block_size(&self) -> usize {
        BLOCK_SIZE
    }

    /// Encrypts the first block of `src` into the first block of `dst`.
    ///
    /// # Panics
    /// If either slice is shorter than [`BLOCK_SIZE`].
    pub fn encrypt(&self, dst: &mut [u8], src: &[u8]) {
        let (out, inp) = full_blocks(dst, src);
        self.encrypt_block_b2b(inp, out);
    }

    /// Decrypts the first block of `src` into the first block of `dst`.
    ///
    /// # Panics
    /// If either slice is shorter than [`BLOCK_SIZE`].
    pub fn decrypt(&self, dst: &mut [u8], src: &[u8]) {
        let (out, inp) = full_blocks(dst, src);
        self.decrypt_block_b2b(inp, out);
    }

    /// Encrypts the first block of `buf` in place.
    pub fn encrypt_in_place(&self, buf: &mut [u8]) {
        self.encrypt_block(full_block_mut(buf));
    }

    /// Decrypts the first block of `buf` in place.
    pub fn decrypt_in_place(&self, buf: &mut [u8]) {
        self.decrypt_block(full_block_mut(buf));
    }

    /// Encrypts `buf[src..src + 16]` into `buf[dst..dst + 16]`.
    ///
    /// `src == dst` is an in-place transform.
    ///
    /// # Panics
    /// If either range runs past the end of `buf`, or if the two ranges
    /// overlap without being identical.
    pub fn encrypt_within(&self, buf: &mut [u8], src: usize, dst: usize) {
        let mut block = load_within(buf, src, dst);
        self.encrypt_block(&mut block);
        buf[dst..dst + BLOCK_SIZE].copy_from_slice(&block);
    }

    /// Decrypts `buf[src..src + 16]` into `buf[dst..dst + 16]`.
    ///
    /// # Panics
    /// Under the same conditions as [`Sm4::encrypt_within`].
    pub fn decrypt_within(&self, buf: &mut [u8], src: usize, dst: usize) {
        let mut block = load_within(buf, src, dst);
        self.decrypt_block(&mut block);
        buf[dst..dst + BLOCK_SIZE].copy_from_slice(&block);
    }
}

fn full_blocks<'a, 'b>(dst: &'a mut [u8], src: &'b [u8]) -> (&'a mut Block, &'b Block) {
    assert!(src.len() >= BLOCK_SIZE, "sm4: input not full block");
    assert!(dst.len() >= BLOCK_SIZE, "sm4: output not full block");
    (
        Block::from_mut_slice(&mut dst[..BLOCK_SIZE]),
        Block::from_slice(&src[..BLOCK_SIZE]),
    )
}

fn full_block_mut(buf: &mut [u8]) -> &mut Block {
    assert!(buf.len() >= BLOCK_SIZE, "sm4: input not full block");
    Block::from_mut_slice(&mut buf[..BLOCK_SIZE])
}

fn load_within(buf: &[u8], src: usize, dst: usize) -> Block {
    assert!(fits(buf, src), "sm4: input not full block");
    assert!(fits(buf, dst), "sm4: output not full block");
    assert!(!inexact_overlap(src, dst), "sm4: invalid buffer overlap");
    Block::clone_from_slice(&buf[src..src + BLOCK_SIZE])
}

fn fits(buf: &[u8], offset: usize) -> bool {
    match offset.checked_add(BLOCK_SIZE) {
        Some(end) => end <= buf.len(),
        None => false,
    }
}

/// Whether two block-sized ranges starting at `a` and `b` share some, but
/// not all, of their bytes.
pub(crate) fn inexact_overlap(a: usize, b: usize) -> bool {
    let distance = if a > b { a - b } else { b - a };
    distance != 0 && distance < BLOCK_SIZE
}
