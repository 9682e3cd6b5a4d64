use crate::error::EntropyError;
use rand::{rngs::OsRng, CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use zeroize::Zeroize;

/// Fill `buf` with cryptographically secure bytes from the OS.
///
/// Either every byte is filled or an error is returned; there is no partial
/// fill.
pub fn fill_entropy(buf: &mut [u8]) -> Result<(), EntropyError> {
    OsRng.try_fill_bytes(buf)?;
    Ok(())
}

/// Deterministic bit generator seeded once from the OS entropy source.
///
/// Supplies all randomness the TLS engine needs for a session. The seed
/// material is wiped after the generator is constructed. Reseeding, if the
/// engine wants it, is the engine's own policy; this core seeds exactly
/// once.
pub struct GeneratorSession {
    rng: ChaCha20Rng,
}

impl GeneratorSession {
    /// Construct a generator from fresh OS entropy.
    pub fn seeded() -> Result<Self, EntropyError> {
        let mut seed = [0u8; 32];
        fill_entropy(&mut seed)?;
        let rng = ChaCha20Rng::from_seed(seed);
        seed.zeroize();
        Ok(Self { rng })
    }

    /// Fill the provided buffer with generator output.
    pub fn fill(&mut self, buf: &mut [u8]) {
        self.rng.fill_bytes(buf);
    }
}

impl RngCore for GeneratorSession {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

impl CryptoRng for GeneratorSession {}

impl std::fmt::Debug for GeneratorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorSession").finish_non_exhaustive()
    }
}
