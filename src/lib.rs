//! # audiopipe
//!
//! Load, transform, and save digital audio as in-memory sample buffers.
//!
//! Decoded audio lives in an [`AudioBuffer`]: normalized `f64` samples,
//! interleaved frame-major, at a known sample rate and channel count.
//! Decoding and encoding of container formats is delegated to an external
//! codec tool (ffmpeg) driven over pipes by [`CodecBridge`]; the buffer
//! itself carries a small set of composable signal operations (trim, gain,
//! fade, mix, resample, channel conversion, format export).
//!
//! ```no_run
//! use audiopipe::{load, save, FadeCurve, FadeDirection};
//!
//! # async fn example() -> audiopipe::Result<()> {
//! let song = load("song.flac").await?;
//! let intro = song
//!     .trim(0, song.sample_rate() as usize * 10)?
//!     .fade(FadeDirection::Out, song.sample_rate() as usize, FadeCurve::Linear);
//! save(&intro, "intro.mp3").await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod buffer;
pub mod codec;
pub mod config;
pub mod error;
pub mod fade;
pub mod file;
pub mod format;
pub mod probe;

pub use buffer::AudioBuffer;
pub use codec::CodecBridge;
pub use config::CodecConfig;
pub use error::{Error, Result};
pub use fade::{FadeCurve, FadeDirection};
pub use file::{load, load_with, save, save_with};
pub use format::{ByteOrder, SampleEncoding, SampleFormat};
pub use probe::StreamInfo;
