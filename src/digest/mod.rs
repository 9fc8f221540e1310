//! Content digests for pipeline output.
//!
//! - [`ContentDigest`] - 32-byte digest of the bytes a run delivered
//! - `Blake3Digester` - incremental BLAKE3 state (requires `digest-blake3`)

mod value;

#[cfg(feature = "digest-blake3")]
mod blake3;

pub use value::ContentDigest;

#[cfg(feature = "digest-blake3")]
pub(crate) use self::blake3::Blake3Digester;

/// Running digest over the sink-bound byte stream.
///
/// A no-op when the feature is off or the config disables it.
#[derive(Debug, Default)]
pub(crate) struct OutputDigest {
    #[cfg(feature = "digest-blake3")]
    state: Option<Blake3Digester>,
}

impl OutputDigest {
    pub(crate) fn new(config: &crate::config::DigestConfig) -> Self {
        #[cfg(feature = "digest-blake3")]
        return Self {
            state: config.enabled.then(Blake3Digester::new),
        };
        #[cfg(not(feature = "digest-blake3"))]
        {
            let _ = config;
            Self {}
        }
    }

    pub(crate) fn update(&mut self, data: &[u8]) {
        #[cfg(feature = "digest-blake3")]
        if let Some(state) = self.state.as_mut() {
            state.update(data);
        }
        #[cfg(not(feature = "digest-blake3"))]
        let _ = data;
    }

    pub(crate) fn finish(self) -> Option<ContentDigest> {
        #[cfg(feature = "digest-blake3")]
        return self.state.map(|s| s.finalize());
        #[cfg(not(feature = "digest-blake3"))]
        return None;
    }
}
