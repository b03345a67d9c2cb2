//! Codec tool configuration
//!
//! The external codec tool's location and invocation parameters are an
//! explicit, injectable value rather than an implicit global lookup, so the
//! bridge stays testable with stub executables.

use crate::format::SampleFormat;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the external codec tool invocation
#[derive(Debug, Clone, Deserialize)]
pub struct CodecConfig {
    /// Decoder/encoder binary; a bare name is resolved via `PATH`
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Stream-inspection binary; a bare name is resolved via `PATH`
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: PathBuf,

    /// Bounded wait applied to every subprocess interaction.
    ///
    /// On expiry the child process is killed and reaped before the timeout
    /// error is surfaced.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,

    /// Raw PCM format exchanged over the pipe, negotiated once per call.
    ///
    /// Defaults to 32-bit float little-endian so integer formats up to
    /// 24 bits cross the pipe without quantization.
    #[serde(default = "default_pipe_format")]
    pub pipe_format: SampleFormat,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_pipe_format() -> SampleFormat {
    SampleFormat::F32_LE
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            timeout: default_timeout(),
            pipe_format: default_pipe_format(),
        }
    }
}
