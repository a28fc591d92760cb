use crate::{
    consts::{CK, FK, ROUNDS},
    soft::tau,
    Key,
};

#[cfg(feature = "zeroize")]
use cipher::zeroize::Zeroize;

/// Expanded SM4 subkeys. `dec` is `enc` in reverse round order.
#[derive(Clone)]
pub(crate) struct RoundKeys {
    pub(crate) enc: [u32; ROUNDS],
    pub(crate) dec: [u32; ROUNDS],
}

impl RoundKeys {
    pub(crate) fn expand(key: &Key) -> Self {
        let mut k = [0u32; 4];
        key.chunks_exact(4)
            .zip(k.iter_mut().zip(FK.iter()))
            .for_each(|(chunk, (v, fk))| *v = to_u32(chunk) ^ fk);

        let mut enc = [0u32; ROUNDS];
        let mut dec = [0u32; ROUNDS];
        for i in 0..ROUNDS {
            let rk = k[0] ^ key_transform(k[1] ^ k[2] ^ k[3] ^ CK[i]);
            k = [k[1], k[2], k[3], rk];
            enc[i] = rk;
            dec[ROUNDS - 1 - i] = rk;
        }

        #[cfg(feature = "zeroize")]
        k.zeroize();

        Self { enc, dec }
    }
}

#[cfg(feature = "zeroize")]
#[cfg_attr(docsrs, doc(cfg(feature = "zeroize")))]
impl Drop for RoundKeys {
    fn drop(&mut self) {
        self.enc.zeroize();
        self.dec.zeroize();
    }
}

// L' from the key schedule; the cipher body uses a different L.
#[inline(always)]
fn key_transform(x: u32) -> u32 {
    let b = tau(x);
    b ^ b.rotate_left(13) ^ b.rotate_left(23)
}

#[inline(always)]
pub(crate) fn to_u32(chunk: &[u8]) -> u32 {
    u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])
}
