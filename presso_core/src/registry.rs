use std::borrow::Cow;
use std::io::{self, BufRead};
use std::sync::{Arc, RwLock};

use tracing::warn;

use crate::codec::{Codec, SeekableInput};
use crate::settings::Settings;

/// Settings key naming the default codec; the value is matched
/// case-insensitively against registered codec names.
pub const DEFAULT_TYPE_KEY: &str = "compress.default.type";

/// Name assumed when [`DEFAULT_TYPE_KEY`] is absent from the settings.
pub const DEFAULT_TYPE_FALLBACK: &str = "lz4";

/// Ordered, fixed-after-construction collection of codecs, plus the single
/// mutable slot holding the codec used for new compressions.
///
/// Registry order is the detection precedence: the first codec whose header
/// predicate matches wins, so insertion order is the tie-break when header
/// patterns overlap. The codec list is never mutated after `new`, which
/// makes all detection entry points safe for unsynchronized concurrent use.
///
/// Instances are meant to be passed around explicitly (typically as
/// `Arc<CompressorRegistry>`) rather than stashed in a global, so tests can
/// run parallel registries with different wiring.
pub struct CompressorRegistry {
    codecs: Vec<Arc<dyn Codec>>,
    default: RwLock<Arc<dyn Codec>>,
}

impl CompressorRegistry {
    /// Build a registry from an ordered codec list.
    ///
    /// The first codec is the initial default. Panics on an empty list or a
    /// duplicate codec name; both are wiring bugs, not runtime conditions.
    pub fn new(codecs: Vec<Arc<dyn Codec>>) -> Self {
        assert!(!codecs.is_empty(), "registry requires at least one codec");
        for (i, a) in codecs.iter().enumerate() {
            for b in &codecs[i + 1..] {
                assert_ne!(a.name(), b.name(), "duplicate codec name in registry");
            }
        }
        let default = RwLock::new(Arc::clone(&codecs[0]));
        Self { codecs, default }
    }

    /// The ordered codec list (read-only; order is detection precedence).
    pub fn codecs(&self) -> &[Arc<dyn Codec>] {
        &self.codecs
    }

    /// Exact-name lookup. Case-insensitive matching exists only in
    /// [`configure`](Self::configure), mirroring how the name arrives there
    /// from external settings.
    pub fn by_name(&self, name: &str) -> Option<&Arc<dyn Codec>> {
        self.codecs.iter().find(|c| c.name() == name)
    }

    /// First codec (in registry order) whose header matches `data`, or
    /// `None` when the data is plain. `None` is a normal outcome, never an
    /// error.
    pub fn detect(&self, data: &[u8]) -> Option<&Arc<dyn Codec>> {
        self.codecs.iter().find(|c| c.is_compressed(data))
    }

    /// Whether any registered codec recognizes `data` as its output.
    pub fn is_compressed(&self, data: &[u8]) -> bool {
        self.detect(data).is_some()
    }

    /// Detection over a buffered reader. Codec predicates peek without
    /// consuming, so on `Ok(None)` the reader is positioned exactly where
    /// the caller left it.
    pub fn detect_buf(&self, buf: &mut dyn BufRead) -> io::Result<Option<&Arc<dyn Codec>>> {
        for codec in &self.codecs {
            if codec.is_compressed_buf(buf)? {
                return Ok(Some(codec));
            }
        }
        Ok(None)
    }

    /// Detection over a seekable input positioned at an arbitrary offset.
    /// The position is restored regardless of the outcome; an I/O error
    /// aborts the scan and propagates.
    pub fn detect_seekable(
        &self,
        input: &mut dyn SeekableInput,
    ) -> io::Result<Option<&Arc<dyn Codec>>> {
        for codec in &self.codecs {
            if codec.is_compressed_seekable(input)? {
                return Ok(Some(codec));
            }
        }
        Ok(None)
    }

    /// Apply external settings: run every codec's own `configure` (errors
    /// propagate uncaught), then re-select the default codec from
    /// [`DEFAULT_TYPE_KEY`]. An unrecognized name leaves the default
    /// unchanged and logs a warning.
    ///
    /// The default-slot write guard is held across the whole call, so
    /// concurrent `configure` / [`set_default_codec`](Self::set_default_codec)
    /// attempts never interleave.
    pub fn configure(&self, settings: &Settings) -> anyhow::Result<()> {
        let mut default = self.default.write().unwrap_or_else(|e| e.into_inner());
        for codec in &self.codecs {
            codec.configure(settings)?;
        }
        let wanted = settings.get_or(DEFAULT_TYPE_KEY, DEFAULT_TYPE_FALLBACK);
        match self
            .codecs
            .iter()
            .find(|c| c.name().eq_ignore_ascii_case(wanted))
        {
            Some(codec) => *default = Arc::clone(codec),
            None => warn!("failed to find default codec type [{wanted}]"),
        }
        Ok(())
    }

    /// The codec currently used for new compressions.
    pub fn default_codec(&self) -> Arc<dyn Codec> {
        // The slot only ever holds a fully-written Arc, so a lock poisoned
        // by a panicking codec `configure` is still safe to read through.
        Arc::clone(&self.default.read().unwrap_or_else(|e| e.into_inner()))
    }

    /// Explicit default override. Accepts any codec, including one absent
    /// from the registry; tests lean on that to install doubles.
    pub fn set_default_codec(&self, codec: Arc<dyn Codec>) {
        *self.default.write().unwrap_or_else(|e| e.into_inner()) = codec;
    }

    /// Decompress `data` if some registered codec recognizes it, otherwise
    /// hand the input back untouched. Decompression errors from the matched
    /// codec propagate unchanged.
    pub fn uncompress_if_needed<'a>(&self, data: &'a [u8]) -> anyhow::Result<Cow<'a, [u8]>> {
        match self.detect(data) {
            Some(codec) => Ok(Cow::Owned(codec.decompress(data)?)),
            None => Ok(Cow::Borrowed(data)),
        }
    }
}
