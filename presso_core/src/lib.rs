pub mod codec;
pub mod registry;
pub mod settings;

pub use codec::{Codec, SeekableInput};
pub use registry::{CompressorRegistry, DEFAULT_TYPE_FALLBACK, DEFAULT_TYPE_KEY};
pub use settings::Settings;
