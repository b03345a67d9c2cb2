//! Core audio buffer type and signal operations
//!
//! [`AudioBuffer`] holds decoded audio as normalized `f64` samples,
//! interleaved frame-major: `[frame0 ch0, frame0 ch1, frame1 ch0, ...]`.
//! This interleaving is also the canonical raw-PCM layout exchanged with the
//! codec bridge.
//!
//! All signal operations are pure and value-returning: they produce a fresh
//! buffer and never leave the sample storage with a shape inconsistent with
//! the channel and frame counts. The buffer exclusively owns its backing
//! storage; callers needing concurrent mutation must serialize access
//! themselves (single-writer contract, no internal locking).

use crate::error::{Error, Result};
use crate::fade::{FadeCurve, FadeDirection};
use crate::format::SampleFormat;
use tracing::debug;

/// Decoded audio: a fixed-shape matrix of normalized samples
/// (channels × frames) at a known sample rate.
///
/// Samples are stored interleaved frame-major as `f64` in [-1.0, 1.0]
/// (operations like [`gain`](Self::gain) may deliberately exceed that range;
/// clamping happens only on export via [`as_format`](Self::as_format)).
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Interleaved frame-major samples, length == frame_count * channel_count
    samples: Vec<f64>,

    /// Sample rate in Hz, always > 0
    sample_rate: u32,

    /// Number of channels, always >= 1
    channel_count: u16,
}

impl AudioBuffer {
    /// Create a buffer from interleaved frame-major samples.
    ///
    /// Fails with a range error if the sample rate is zero or the channel
    /// count is zero, and with a format error if the sample vector is not a
    /// whole number of frames.
    pub fn new(samples: Vec<f64>, sample_rate: u32, channel_count: u16) -> Result<Self> {
        if sample_rate == 0 {
            return Err(Error::Range("sample rate must be positive".to_string()));
        }
        if channel_count == 0 {
            return Err(Error::Range("channel count must be at least 1".to_string()));
        }
        if samples.len() % channel_count as usize != 0 {
            return Err(Error::Format(format!(
                "{} samples is not a whole number of {}-channel frames",
                samples.len(),
                channel_count
            )));
        }
        Ok(Self {
            samples,
            sample_rate,
            channel_count,
        })
    }

    /// Create a silent buffer of the given shape
    pub fn silence(frame_count: usize, sample_rate: u32, channel_count: u16) -> Result<Self> {
        Self::new(
            vec![0.0; frame_count * channel_count as usize],
            sample_rate,
            channel_count,
        )
    }

    /// Parse raw PCM bytes into a buffer.
    ///
    /// This is the construction path used by the codec bridge after decode:
    /// bytes are interpreted per `format` and normalized into [-1.0, 1.0].
    pub fn from_raw(
        raw: &[u8],
        format: &SampleFormat,
        sample_rate: u32,
        channel_count: u16,
    ) -> Result<Self> {
        let samples = format.to_normalized(raw)?;
        Self::new(samples, sample_rate, channel_count)
    }

    /// Number of frames (samples per channel)
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.channel_count as usize
    }

    /// Number of channels
    pub fn channel_count(&self) -> u16 {
        self.channel_count
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Interleaved frame-major samples
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// True if the buffer holds no frames
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.frame_count() as f64 / self.sample_rate as f64
    }

    /// Sample at a given frame and channel, if in bounds
    pub fn sample(&self, frame: usize, channel: u16) -> Option<f64> {
        if frame >= self.frame_count() || channel >= self.channel_count {
            return None;
        }
        Some(self.samples[frame * self.channel_count as usize + channel as usize])
    }

    /// Extract the frame range `[start_frame, end_frame)` into a new buffer.
    ///
    /// Requires `start_frame <= end_frame <= frame_count`.
    pub fn trim(&self, start_frame: usize, end_frame: usize) -> Result<AudioBuffer> {
        if start_frame > end_frame || end_frame > self.frame_count() {
            return Err(Error::Range(format!(
                "trim range {}..{} outside buffer of {} frames",
                start_frame,
                end_frame,
                self.frame_count()
            )));
        }
        let ch = self.channel_count as usize;
        let samples = self.samples[start_frame * ch..end_frame * ch].to_vec();
        Ok(AudioBuffer {
            samples,
            sample_rate: self.sample_rate,
            channel_count: self.channel_count,
        })
    }

    /// Multiply every sample by `factor`.
    ///
    /// Does not clamp: a caller may intentionally push samples outside
    /// [-1.0, 1.0] and rely on saturation at export time.
    pub fn gain(&self, factor: f64) -> AudioBuffer {
        let samples = self.samples.iter().map(|s| s * factor).collect();
        AudioBuffer {
            samples,
            sample_rate: self.sample_rate,
            channel_count: self.channel_count,
        }
    }

    /// Apply a monotonic fade envelope over the first (fade-in) or last
    /// (fade-out) `duration_frames` frames.
    ///
    /// A duration longer than the buffer is clamped to the buffer length,
    /// never an error. For the fade-in the first faded frame is scaled to
    /// silence and the last is left at full amplitude; the fade-out mirrors
    /// this.
    pub fn fade(
        &self,
        direction: FadeDirection,
        duration_frames: usize,
        curve: FadeCurve,
    ) -> AudioBuffer {
        let frames = self.frame_count();
        let duration = duration_frames.min(frames);
        let mut samples = self.samples.clone();
        let ch = self.channel_count as usize;

        // Normalized position with exact endpoints: 0.0 at the first faded
        // frame, 1.0 at the last. A one-frame fade collapses to the silent
        // endpoint.
        let position = |i: usize| -> f64 {
            if duration > 1 {
                i as f64 / (duration - 1) as f64
            } else {
                match direction {
                    FadeDirection::In => 0.0,
                    FadeDirection::Out => 1.0,
                }
            }
        };

        for i in 0..duration {
            let (frame, gain) = match direction {
                FadeDirection::In => (i, curve.fade_in_gain(position(i))),
                FadeDirection::Out => (frames - duration + i, curve.fade_out_gain(position(i))),
            };
            for c in 0..ch {
                samples[frame * ch + c] *= gain;
            }
        }

        AudioBuffer {
            samples,
            sample_rate: self.sample_rate,
            channel_count: self.channel_count,
        }
    }

    /// Additively overlay `other` onto a copy of this buffer starting at
    /// `offset_frames`.
    ///
    /// Frames of `other` that map before frame 0 are dropped; frames past
    /// this buffer's end extend the result (the tail is appended, not
    /// dropped), so the result holds
    /// `max(frame_count, offset_frames + other.frame_count)` frames.
    ///
    /// Requires identical sample rate and channel count; no implicit
    /// resampling happens here — resample or channel-convert first.
    pub fn mix(&self, other: &AudioBuffer, offset_frames: i64) -> Result<AudioBuffer> {
        if self.sample_rate != other.sample_rate {
            return Err(Error::IncompatibleBuffer(format!(
                "sample rates differ: {} vs {}",
                self.sample_rate, other.sample_rate
            )));
        }
        if self.channel_count != other.channel_count {
            return Err(Error::IncompatibleBuffer(format!(
                "channel counts differ: {} vs {}",
                self.channel_count, other.channel_count
            )));
        }

        let ch = self.channel_count as usize;
        let out_frames = (self.frame_count() as i64)
            .max(offset_frames + other.frame_count() as i64) as usize;

        let mut samples = vec![0.0; out_frames * ch];
        samples[..self.samples.len()].copy_from_slice(&self.samples);

        for j in 0..other.frame_count() {
            let target = offset_frames + j as i64;
            if target < 0 {
                continue;
            }
            let target = target as usize;
            for c in 0..ch {
                samples[target * ch + c] += other.samples[j * ch + c];
            }
        }

        Ok(AudioBuffer {
            samples,
            sample_rate: self.sample_rate,
            channel_count: self.channel_count,
        })
    }

    /// Resample onto a new timeline by linear interpolation between the
    /// original sample instants.
    ///
    /// The result holds `round(frame_count * target_rate / sample_rate)`
    /// frames at `target_rate`. A zero target rate is a range error; the
    /// current rate returns a copy.
    pub fn resample(&self, target_rate: u32) -> Result<AudioBuffer> {
        if target_rate == 0 {
            return Err(Error::Range("target sample rate must be positive".to_string()));
        }
        if target_rate == self.sample_rate {
            return Ok(self.clone());
        }

        let frames = self.frame_count();
        let ch = self.channel_count as usize;
        let new_frames =
            (frames as f64 * target_rate as f64 / self.sample_rate as f64).round() as usize;

        debug!(
            "Resampling {} frames at {}Hz to {} frames at {}Hz",
            frames, self.sample_rate, new_frames, target_rate
        );

        let mut samples = Vec::with_capacity(new_frames * ch);
        if frames > 0 {
            // Source frames per output frame on the new timeline
            let step = self.sample_rate as f64 / target_rate as f64;
            for i in 0..new_frames {
                let pos = i as f64 * step;
                let idx = (pos.floor() as usize).min(frames - 1);
                let next = (idx + 1).min(frames - 1);
                let frac = pos - idx as f64;
                for c in 0..ch {
                    let a = self.samples[idx * ch + c];
                    let b = self.samples[next * ch + c];
                    samples.push(a + (b - a) * frac);
                }
            }
        }

        Ok(AudioBuffer {
            samples,
            sample_rate: target_rate,
            channel_count: self.channel_count,
        })
    }

    /// Convert to a different channel count.
    ///
    /// Mono is duplicated into every output channel; multi-channel input is
    /// averaged with equal weights down to mono. Any other N→M conversion is
    /// unsupported (no spatial downmix matrix).
    pub fn to_channel_count(&self, target: u16) -> Result<AudioBuffer> {
        if target == 0 {
            return Err(Error::Range("channel count must be at least 1".to_string()));
        }
        if target == self.channel_count {
            return Ok(self.clone());
        }

        let frames = self.frame_count();
        let ch = self.channel_count as usize;

        let samples = if self.channel_count == 1 {
            // Mono -> multi: duplicate the single channel
            let mut out = Vec::with_capacity(frames * target as usize);
            for &sample in &self.samples {
                for _ in 0..target {
                    out.push(sample);
                }
            }
            out
        } else if target == 1 {
            // Multi -> mono: equal-weight average
            let mut out = Vec::with_capacity(frames);
            for frame in self.samples.chunks_exact(ch) {
                out.push(frame.iter().sum::<f64>() / ch as f64);
            }
            out
        } else {
            return Err(Error::UnsupportedConversion {
                from: self.channel_count,
                to: target,
            });
        };

        Ok(AudioBuffer {
            samples,
            sample_rate: self.sample_rate,
            channel_count: target,
        })
    }

    /// Extract a single channel as a mono buffer
    pub fn channel(&self, channel: u16) -> Result<AudioBuffer> {
        if channel >= self.channel_count {
            return Err(Error::Range(format!(
                "channel {} out of range for {}-channel buffer",
                channel, self.channel_count
            )));
        }
        let ch = self.channel_count as usize;
        let samples = self
            .samples
            .iter()
            .skip(channel as usize)
            .step_by(ch)
            .copied()
            .collect();
        Ok(AudioBuffer {
            samples,
            sample_rate: self.sample_rate,
            channel_count: 1,
        })
    }

    /// Append `other` in time after this buffer.
    ///
    /// Requires identical sample rate and channel count.
    pub fn concat(&self, other: &AudioBuffer) -> Result<AudioBuffer> {
        if self.sample_rate != other.sample_rate {
            return Err(Error::IncompatibleBuffer(format!(
                "sample rates differ: {} vs {}",
                self.sample_rate, other.sample_rate
            )));
        }
        if self.channel_count != other.channel_count {
            return Err(Error::IncompatibleBuffer(format!(
                "channel counts differ: {} vs {}",
                self.channel_count, other.channel_count
            )));
        }
        let mut samples = Vec::with_capacity(self.samples.len() + other.samples.len());
        samples.extend_from_slice(&self.samples);
        samples.extend_from_slice(&other.samples);
        Ok(AudioBuffer {
            samples,
            sample_rate: self.sample_rate,
            channel_count: self.channel_count,
        })
    }

    /// Serialize to raw PCM bytes in the canonical interleaved frame-major
    /// layout, quantized per `format`.
    ///
    /// Values outside [-1.0, 1.0] saturate here (see
    /// [`SampleFormat::from_normalized`]).
    pub fn as_format(&self, format: &SampleFormat) -> Result<Vec<u8>> {
        Ok(format.from_normalized(&self.samples))
    }
}
