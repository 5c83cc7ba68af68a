use std::io::{self, BufRead};

use lz4_flex::{compress_prepend_size, decompress_size_prepended};

use presso_core::codec::{buf_starts_with, seekable_starts_with, Codec, SeekableInput};

/// Container magic prepended to the lz4 payload. The lz4_flex block format
/// carries no header of its own, so detection needs one of ours.
pub const LZ4_MAGIC: &[u8; 4] = b"PLZ4";

/// LZ4 block codec.
///
/// Fastest decompression of the bundled codecs, and the hard-coded initial
/// default of the standard registry. Best for hot paths where decode speed
/// matters more than size reduction.
pub struct Lz4Codec;

impl Codec for Lz4Codec {
    fn name(&self) -> &'static str {
        "lz4"
    }

    fn is_compressed(&self, data: &[u8]) -> bool {
        data.starts_with(LZ4_MAGIC)
    }

    fn is_compressed_buf(&self, buf: &mut dyn BufRead) -> io::Result<bool> {
        buf_starts_with(buf, LZ4_MAGIC)
    }

    fn is_compressed_seekable(&self, input: &mut dyn SeekableInput) -> io::Result<bool> {
        seekable_starts_with(input, LZ4_MAGIC)
    }

    fn compress(&self, data: &[u8]) -> anyhow::Result<Vec<u8>> {
        let body = compress_prepend_size(data);
        let mut out = Vec::with_capacity(LZ4_MAGIC.len() + body.len());
        out.extend_from_slice(LZ4_MAGIC);
        out.extend_from_slice(&body);
        Ok(out)
    }

    fn decompress(&self, data: &[u8]) -> anyhow::Result<Vec<u8>> {
        let body = data
            .strip_prefix(LZ4_MAGIC.as_slice())
            .ok_or_else(|| anyhow::anyhow!("data is missing the lz4 container magic"))?;
        let raw = decompress_size_prepended(body)
            .map_err(|e| anyhow::anyhow!("lz4 decompress error: {}", e))?;
        Ok(raw)
    }
}
