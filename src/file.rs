//! Load/save entry points
//!
//! Thin facade tying the codec bridge and the buffer model together. Any
//! container the external codec tool understands can be loaded; the output
//! container is chosen from the save path's extension by the tool itself.

use crate::buffer::AudioBuffer;
use crate::codec::CodecBridge;
use crate::config::CodecConfig;
use crate::error::Result;
use std::path::Path;

/// Load an audio file into an [`AudioBuffer`] using the default tool
/// configuration.
pub async fn load(path: impl AsRef<Path>) -> Result<AudioBuffer> {
    load_with(path, &CodecConfig::default()).await
}

/// Load an audio file with an explicit tool configuration
pub async fn load_with(path: impl AsRef<Path>, config: &CodecConfig) -> Result<AudioBuffer> {
    CodecBridge::new(config.clone()).decode(path).await
}

/// Save an [`AudioBuffer`] to `path` using the default tool configuration.
///
/// The container format is determined by the path's extension.
pub async fn save(buffer: &AudioBuffer, path: impl AsRef<Path>) -> Result<()> {
    save_with(buffer, path, &CodecConfig::default()).await
}

/// Save an [`AudioBuffer`] with an explicit tool configuration
pub async fn save_with(
    buffer: &AudioBuffer,
    path: impl AsRef<Path>,
    config: &CodecConfig,
) -> Result<()> {
    CodecBridge::new(config.clone()).encode(buffer, path).await
}
