use std::io::{self, BufRead, Read, Seek, SeekFrom};

use crate::settings::Settings;

/// Core compression abstraction.
///
/// Each `Codec` implementation:
/// - Is identified by a stable, registry-unique `name()`.
/// - Can recognize its own output from the leading header bytes, in all
///   three input shapes (byte slice, buffered reader, seekable input).
/// - Compresses and decompresses whole payloads; any framing it needs for
///   later detection is its own responsibility and opaque to the registry.
pub trait Codec: Send + Sync {
    /// Stable codec name, used for default-codec selection in settings.
    fn name(&self) -> &'static str;

    /// Apply external settings. Codecs extract their own tunables from the
    /// full settings view; unrelated keys are ignored. Errors propagate to
    /// whoever drives [`CompressorRegistry::configure`] uncaught.
    ///
    /// [`CompressorRegistry::configure`]: crate::registry::CompressorRegistry::configure
    fn configure(&self, _settings: &Settings) -> anyhow::Result<()> {
        Ok(())
    }

    /// Whether `data` starts with this codec's header.
    ///
    /// Must be side-effect-free and read only the given slice. Callers
    /// probing a sub-range pass a subslice; a bad offset/length is their
    /// slicing panic, not a condition this layer reports.
    fn is_compressed(&self, data: &[u8]) -> bool;

    /// Header check against a buffered reader, peeking without consuming.
    ///
    /// The reader must be left unchanged on a non-match so the next codec
    /// (or the caller) sees the same bytes. On a match the position is this
    /// codec's business; implementations here also leave it untouched.
    fn is_compressed_buf(&self, buf: &mut dyn BufRead) -> io::Result<bool>;

    /// Header check against a seekable input at an arbitrary offset.
    ///
    /// Performs a bounded lookahead read and restores the stream position
    /// before returning, match or not. I/O errors propagate.
    fn is_compressed_seekable(&self, input: &mut dyn SeekableInput) -> io::Result<bool>;

    /// Compress a whole payload, including whatever header this codec's
    /// detection looks for.
    fn compress(&self, data: &[u8]) -> anyhow::Result<Vec<u8>>;

    /// Decompress a whole payload previously produced by `compress`.
    fn decompress(&self, data: &[u8]) -> anyhow::Result<Vec<u8>>;
}

/// Random-access input that detection may probe non-destructively.
/// Blanket-implemented, so `File`, `Cursor<&[u8]>` etc. all qualify.
pub trait SeekableInput: Read + Seek {}

impl<T: Read + Seek + ?Sized> SeekableInput for T {}

/// Read up to `buf.len()` bytes, stopping early at EOF. Returns the number
/// of bytes filled.
pub fn read_at_most<R: Read + ?Sized>(input: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

/// Shared buffered-reader predicate for codecs whose header is a fixed
/// magic prefix. Peeks via `fill_buf` and consumes nothing.
///
/// A reader whose currently buffered window is shorter than the magic is
/// treated as a non-match.
pub fn buf_starts_with(buf: &mut dyn BufRead, magic: &[u8]) -> io::Result<bool> {
    let head = buf.fill_buf()?;
    Ok(head.len() >= magic.len() && &head[..magic.len()] == magic)
}

/// Shared seekable predicate: reads at most `magic.len()` bytes, then seeks
/// back to the original position whether or not the magic matched.
pub fn seekable_starts_with(input: &mut dyn SeekableInput, magic: &[u8]) -> io::Result<bool> {
    debug_assert!(magic.len() <= 8, "header magic is expected to be short");
    let origin = input.stream_position()?;
    let mut head = [0u8; 8];
    let head = &mut head[..magic.len()];
    let filled = read_at_most(input, head)?;
    input.seek(SeekFrom::Start(origin))?;
    Ok(filled == magic.len() && &head[..] == magic)
}
