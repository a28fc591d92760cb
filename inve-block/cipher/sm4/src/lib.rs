//! SM4 block cipher (GB/T 32907-2016, ISO/IEC 18033-3:2010/Amd 1:2021).
//!
//! Two round engines are available. The generic engine is portable S-box
//! table code. On x86/x86_64 CPUs with AES-NI and SSSE3 an accelerated
//! engine computes the SM4 S-box with `aesenclast` through an affine
//! isomorphism between the two S-boxes, four blocks at a time. The engine
//! is picked once when a cipher is created; see [`Engine`].
//!
//! Build with `RUSTFLAGS="--cfg sm4_force_soft"` to compile out the
//! accelerated engine.
//!
//! ```
//! use inve_sm4::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
//! use inve_sm4::{Block, Sm4};
//!
//! let cipher = Sm4::new_from_slice(&[0u8; 16]).unwrap();
//! let mut block = Block::default();
//! cipher.encrypt_block(&mut block);
//! cipher.decrypt_block(&mut block);
//! assert_eq!(block, Block::default());
//! ```
#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs, rust_2018_idioms)]

#[cfg(test)]
extern crate std;

pub use cipher;

use cfg_if::cfg_if;
use cipher::{consts::U16, generic_array::GenericArray};

mod autodetect;
mod buf;
mod consts;
mod key;
mod soft;

cfg_if! {
    if #[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), not(sm4_force_soft)))] {
        mod batch;
        mod ni;
    }
}

pub use autodetect::{Engine, Sm4};

/// SM4 block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// SM4 key size in bytes.
pub const KEY_SIZE: usize = 16;

/// 128-bit SM4 block.
pub type Block = GenericArray<u8, U16>;

/// 128-bit SM4 key.
pub type Key = GenericArray<u8, U16>;
