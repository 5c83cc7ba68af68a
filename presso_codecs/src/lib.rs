mod gzip_codec;
mod lz4_codec;
mod zstd_codec;

pub use gzip_codec::{GzipCodec, GZIP_MAGIC};
pub use lz4_codec::{Lz4Codec, LZ4_MAGIC};
pub use zstd_codec::{
    zstd_available, UnavailableZstdCodec, ZstdCodec, ZSTD_LEVEL_KEY, ZSTD_MAGIC,
};

use std::sync::Arc;

use presso_core::{Codec, CompressorRegistry};

/// Build the standard registry.
///
/// The order is fixed and is the detection precedence: lz4 first (also the
/// hard-coded initial default), then zstd, then gzip. The zstd slot runs the
/// one-time native capability probe; if the probe fails, a same-named
/// unavailable stub takes its place so downstream code never branches on
/// availability itself.
pub fn default_registry() -> CompressorRegistry {
    let zstd: Arc<dyn Codec> = if zstd_available() {
        Arc::new(ZstdCodec::default())
    } else {
        Arc::new(UnavailableZstdCodec)
    };
    CompressorRegistry::new(vec![Arc::new(Lz4Codec), zstd, Arc::new(GzipCodec)])
}
