use std::io::{self, BufRead, Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use presso_core::codec::{buf_starts_with, seekable_starts_with, Codec, SeekableInput};

/// Gzip magic plus the deflate compression-method byte flate2 always emits.
pub const GZIP_MAGIC: &[u8; 3] = &[0x1F, 0x8B, 0x08];

/// Gzip codec over flate2.
///
/// Slowest of the bundled codecs, but its output is readable by standard
/// tooling (`gunzip`, browsers), which makes it the interchange choice.
pub struct GzipCodec;

impl Codec for GzipCodec {
    fn name(&self) -> &'static str {
        "gzip"
    }

    fn is_compressed(&self, data: &[u8]) -> bool {
        data.starts_with(GZIP_MAGIC)
    }

    fn is_compressed_buf(&self, buf: &mut dyn BufRead) -> io::Result<bool> {
        buf_starts_with(buf, GZIP_MAGIC)
    }

    fn is_compressed_seekable(&self, input: &mut dyn SeekableInput) -> io::Result<bool> {
        seekable_starts_with(input, GZIP_MAGIC)
    }

    fn compress(&self, data: &[u8]) -> anyhow::Result<Vec<u8>> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data)?;
        let compressed = encoder.finish()?;
        Ok(compressed)
    }

    fn decompress(&self, data: &[u8]) -> anyhow::Result<Vec<u8>> {
        let mut raw = Vec::new();
        GzDecoder::new(data).read_to_end(&mut raw)?;
        Ok(raw)
    }
}
