use std::io::{self, BufRead};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::OnceLock;

use anyhow::Context;
use tracing::debug;

use presso_core::codec::{buf_starts_with, seekable_starts_with, Codec, SeekableInput};
use presso_core::Settings;

/// Standard zstd frame magic (little-endian 0xFD2FB528). zstd output is
/// self-describing, so detection needs no extra container bytes.
pub const ZSTD_MAGIC: &[u8; 4] = &[0x28, 0xB5, 0x2F, 0xFD];

/// Settings key for the zstd compression level.
pub const ZSTD_LEVEL_KEY: &str = "compress.zstd.level";

const DEFAULT_LEVEL: i32 = 3;

/// Zstandard codec over the native zstd bindings.
///
/// Each payload becomes one independent zstd frame at the configured level
/// (default: 3). The level is runtime-tunable through
/// `compress.zstd.level`, so it sits in an atomic rather than a plain field.
///
/// Best for: general text, JSON, logs, mixed structured data.
pub struct ZstdCodec {
    level: AtomicI32,
}

impl Default for ZstdCodec {
    fn default() -> Self {
        Self::new(DEFAULT_LEVEL)
    }
}

impl ZstdCodec {
    pub fn new(level: i32) -> Self {
        Self {
            level: AtomicI32::new(level),
        }
    }

    /// Current compression level (1 = fast / larger, 22 = slow / smallest).
    pub fn level(&self) -> i32 {
        self.level.load(Ordering::Relaxed)
    }
}

impl Codec for ZstdCodec {
    fn name(&self) -> &'static str {
        "zstd"
    }

    fn configure(&self, settings: &Settings) -> anyhow::Result<()> {
        if let Some(raw) = settings.get(ZSTD_LEVEL_KEY) {
            let level: i32 = raw
                .parse()
                .with_context(|| format!("invalid {} value '{}'", ZSTD_LEVEL_KEY, raw))?;
            self.level.store(level, Ordering::Relaxed);
        }
        Ok(())
    }

    fn is_compressed(&self, data: &[u8]) -> bool {
        data.starts_with(ZSTD_MAGIC)
    }

    fn is_compressed_buf(&self, buf: &mut dyn BufRead) -> io::Result<bool> {
        buf_starts_with(buf, ZSTD_MAGIC)
    }

    fn is_compressed_seekable(&self, input: &mut dyn SeekableInput) -> io::Result<bool> {
        seekable_starts_with(input, ZSTD_MAGIC)
    }

    fn compress(&self, data: &[u8]) -> anyhow::Result<Vec<u8>> {
        let compressed = zstd::bulk::compress(data, self.level())?;
        Ok(compressed)
    }

    fn decompress(&self, data: &[u8]) -> anyhow::Result<Vec<u8>> {
        let raw = zstd::decode_all(data)?;
        Ok(raw)
    }
}

/// One-time capability probe for the native zstd implementation: a tiny
/// compress/decompress round-trip, run once and cached. The standard
/// registry bootstrap uses the result to pick between [`ZstdCodec`] and
/// [`UnavailableZstdCodec`].
pub fn zstd_available() -> bool {
    static AVAILABLE: OnceLock<bool> = OnceLock::new();
    *AVAILABLE.get_or_init(|| match probe() {
        Ok(()) => true,
        Err(err) => {
            debug!("failed to load native zstd support: {err:#}");
            false
        }
    })
}

fn probe() -> anyhow::Result<()> {
    let sample = b"zstd capability probe";
    let compressed = zstd::bulk::compress(sample, DEFAULT_LEVEL)?;
    let restored = zstd::decode_all(compressed.as_slice())?;
    anyhow::ensure!(restored == sample, "zstd probe round-trip mismatch");
    Ok(())
}

/// Stand-in registered under the same name when the native zstd probe
/// fails: never matches any header (even a real zstd frame), and fails
/// loudly if asked to do actual work.
pub struct UnavailableZstdCodec;

impl Codec for UnavailableZstdCodec {
    fn name(&self) -> &'static str {
        "zstd"
    }

    fn is_compressed(&self, _data: &[u8]) -> bool {
        false
    }

    fn is_compressed_buf(&self, _buf: &mut dyn BufRead) -> io::Result<bool> {
        Ok(false)
    }

    fn is_compressed_seekable(&self, _input: &mut dyn SeekableInput) -> io::Result<bool> {
        Ok(false)
    }

    fn compress(&self, _data: &[u8]) -> anyhow::Result<Vec<u8>> {
        anyhow::bail!("zstd support is unavailable: the native library failed its load probe")
    }

    fn decompress(&self, _data: &[u8]) -> anyhow::Result<Vec<u8>> {
        anyhow::bail!("zstd support is unavailable: the native library failed its load probe")
    }
}
