//! Engine selection and the `Sm4` cipher type.

use crate::{key::RoundKeys, soft::SoftBackend, Key};
use cipher::{
    consts::U16, AlgorithmName, BlockCipher, BlockClosure, BlockDecrypt, BlockEncrypt,
    BlockSizeUser, KeyInit, KeySizeUser,
};
use core::fmt;

#[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), not(sm4_force_soft)))]
use crate::ni::NiBackend;

#[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), not(sm4_force_soft)))]
cpufeatures::new!(sm4_intrinsics, "aes", "ssse3");

/// Round engine bound to an [`Sm4`] instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Engine {
    /// Portable S-box table implementation.
    Generic,
    /// AES-NI based implementation, four blocks per call.
    Accelerated,
}

impl Engine {
    /// Returns the fastest engine the running CPU supports.
    ///
    /// The CPUID probe runs once per process; later calls read the cached
    /// answer.
    pub fn detect() -> Self {
        #[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), not(sm4_force_soft)))]
        if sm4_intrinsics::get() {
            return Engine::Accelerated;
        }

        Engine::Generic
    }
}

/// SM4 block cipher (GB/T 32907-2016).
#[derive(Clone)]
pub struct Sm4 {
    keys: RoundKeys,
    engine: Engine,
}

impl Sm4 {
    /// Creates a cipher bound to `engine`.
    ///
    /// Returns `None` if `engine` is [`Engine::Accelerated`] and the CPU
    /// does not support it.
    pub fn with_engine(key: &Key, engine: Engine) -> Option<Self> {
        if engine == Engine::Accelerated && Engine::detect() != Engine::Accelerated {
            return None;
        }
        Some(Self {
            keys: RoundKeys::expand(key),
            engine,
        })
    }

    /// Engine chosen when this instance was created.
    pub fn engine(&self) -> Engine {
        self.engine
    }
}

macro_rules! if_accelerated {
    ($engine:expr, $body:expr) => {{
        #[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), not(sm4_force_soft)))]
        if $engine == Engine::Accelerated {
            $body;
            return;
        }
    }};
}

impl KeySizeUser for Sm4 {
    type KeySize = U16;
}

impl KeyInit for Sm4 {
    #[inline]
    fn new(key: &Key) -> Self {
        Self {
            keys: RoundKeys::expand(key),
            engine: Engine::detect(),
        }
    }
}

impl BlockSizeUser for Sm4 {
    type BlockSize = U16;
}

impl BlockCipher for Sm4 {}

impl BlockEncrypt for Sm4 {
    fn encrypt_with_backend(&self, f: impl BlockClosure<BlockSize = U16>) {
        if_accelerated!(self.engine, {
            // `Accelerated` is only ever bound after `Engine::detect` confirmed it.
            let mut backend = unsafe { NiBackend::new(&self.keys.enc) };
            f.call(&mut backend)
        });

        f.call(&mut SoftBackend(&self.keys.enc));
    }
}

impl BlockDecrypt for Sm4 {
    fn decrypt_with_backend(&self, f: impl BlockClosure<BlockSize = U16>) {
        if_accelerated!(self.engine, {
            let mut backend = unsafe { NiBackend::new(&self.keys.dec) };
            f.call(&mut backend)
        });

        f.call(&mut SoftBackend(&self.keys.dec));
    }
}

impl fmt::Debug for Sm4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sm4 { ... }")
    }
}

impl AlgorithmName for Sm4 {
    fn write_alg_name(f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sm4")
    }
}

#[cfg(feature = "zeroize")]
#[cfg_attr(docsrs, doc(cfg(feature = "zeroize")))]
impl cipher::zeroize::ZeroizeOnDrop for Sm4 {}
