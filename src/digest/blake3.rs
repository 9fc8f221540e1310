//! BLAKE3-based output digesting.

use super::ContentDigest;

/// Incremental BLAKE3 state.
#[derive(Debug, Clone)]
pub(crate) struct Blake3Digester {
    state: blake3::Hasher,
}

impl Blake3Digester {
    /// Creates a new digester.
    pub(crate) fn new() -> Self {
        Self {
            state: blake3::Hasher::new(),
        }
    }

    /// Updates the digest with more data.
    pub(crate) fn update(&mut self, data: &[u8]) {
        self.state.update(data);
    }

    /// Finalizes and returns the digest.
    pub(crate) fn finalize(&self) -> ContentDigest {
        ContentDigest::new(self.state.finalize().into())
    }

    /// Digests data in one shot.
    #[cfg(test)]
    pub(crate) fn digest(data: &[u8]) -> ContentDigest {
        ContentDigest::new(blake3::hash(data).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest() {
        let digest = Blake3Digester::digest(b"hello world");
        assert_eq!(digest.as_bytes().len(), 32);

        let digest2 = Blake3Digester::digest(b"hello world");
        assert_eq!(digest, digest2);

        let digest3 = Blake3Digester::digest(b"hello world!");
        assert_ne!(digest, digest3);
    }

    #[test]
    fn test_incremental_matches_one_shot() {
        let mut digester = Blake3Digester::new();
        digester.update(b"hello ");
        digester.update(b"world");

        assert_eq!(digester.finalize(), Blake3Digester::digest(b"hello world"));
    }
}
