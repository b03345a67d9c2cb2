//! Raw PCM sample format descriptions and conversion
//!
//! A [`SampleFormat`] describes how raw bytes map to numeric sample values:
//! bit depth, integer signedness or float, and byte order. Conversion always
//! goes through the normalized `f64` domain of [-1.0, 1.0] so buffers decoded
//! from different formats can be operated on uniformly.
//!
//! `f64` is used as the internal domain (rather than `f32`) so that 24-bit
//! and 32-bit integer codes survive normalization without precision loss.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// How a raw sample value is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleEncoding {
    /// Two's-complement signed integer
    Signed,
    /// Unsigned integer, biased by half the range
    Unsigned,
    /// IEEE 754 floating point (32-bit only)
    Float,
}

/// Byte order of multi-byte samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    /// Least significant byte first
    Little,
    /// Most significant byte first
    Big,
}

/// Describes how raw bytes map to numeric sample values.
///
/// Immutable value type, constructed once per buffer/codec negotiation.
/// The bit depth and encoding jointly determine the numeric range used for
/// normalization: signed 16-bit spans [-32768, 32767], float spans
/// [-1.0, 1.0], and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SampleFormatRepr")]
pub struct SampleFormat {
    /// Bits per sample: 8, 16, 24, or 32
    pub bit_depth: u8,

    /// Integer signedness or float
    pub encoding: SampleEncoding,

    /// Byte order of multi-byte samples (ignored for 8-bit)
    pub byte_order: ByteOrder,
}

/// Wire shape for [`SampleFormat`] deserialization.
///
/// Deserialized values go through [`SampleFormat::new`] so an invalid bit
/// depth or encoding combination surfaces as an error instead of producing a
/// format that panics or garbles normalization later.
#[derive(Deserialize)]
struct SampleFormatRepr {
    bit_depth: u8,
    encoding: SampleEncoding,
    byte_order: ByteOrder,
}

impl TryFrom<SampleFormatRepr> for SampleFormat {
    type Error = Error;

    fn try_from(repr: SampleFormatRepr) -> Result<Self> {
        SampleFormat::new(repr.bit_depth, repr.encoding, repr.byte_order)
    }
}

impl SampleFormat {
    /// Create a validated sample format.
    ///
    /// Bit depth must be 8, 16, 24, or 32; float encoding requires 32 bits.
    pub fn new(bit_depth: u8, encoding: SampleEncoding, byte_order: ByteOrder) -> Result<Self> {
        if !matches!(bit_depth, 8 | 16 | 24 | 32) {
            return Err(Error::Format(format!(
                "unsupported bit depth: {} (expected 8, 16, 24, or 32)",
                bit_depth
            )));
        }
        if encoding == SampleEncoding::Float && bit_depth != 32 {
            return Err(Error::Format(format!(
                "float samples must be 32-bit, got {}-bit",
                bit_depth
            )));
        }
        Ok(Self {
            bit_depth,
            encoding,
            byte_order,
        })
    }

    /// Signed 16-bit little-endian (CD-style PCM)
    pub const S16_LE: SampleFormat = SampleFormat {
        bit_depth: 16,
        encoding: SampleEncoding::Signed,
        byte_order: ByteOrder::Little,
    };

    /// Signed 24-bit little-endian
    pub const S24_LE: SampleFormat = SampleFormat {
        bit_depth: 24,
        encoding: SampleEncoding::Signed,
        byte_order: ByteOrder::Little,
    };

    /// Signed 32-bit little-endian
    pub const S32_LE: SampleFormat = SampleFormat {
        bit_depth: 32,
        encoding: SampleEncoding::Signed,
        byte_order: ByteOrder::Little,
    };

    /// Unsigned 8-bit
    pub const U8: SampleFormat = SampleFormat {
        bit_depth: 8,
        encoding: SampleEncoding::Unsigned,
        byte_order: ByteOrder::Little,
    };

    /// 32-bit float little-endian (default pipe format for the codec bridge)
    pub const F32_LE: SampleFormat = SampleFormat {
        bit_depth: 32,
        encoding: SampleEncoding::Float,
        byte_order: ByteOrder::Little,
    };

    /// Bytes occupied by a single sample
    pub fn bytes_per_sample(&self) -> usize {
        self.bit_depth as usize / 8
    }

    /// ffmpeg raw format/muxer name (e.g. `s16le`, `u8`, `f32le`)
    pub fn ffmpeg_format_name(&self) -> String {
        let prefix = match self.encoding {
            SampleEncoding::Signed => "s",
            SampleEncoding::Unsigned => "u",
            SampleEncoding::Float => "f",
        };
        // 8-bit formats carry no endianness suffix
        if self.bit_depth == 8 {
            return format!("{}8", prefix);
        }
        let suffix = match self.byte_order {
            ByteOrder::Little => "le",
            ByteOrder::Big => "be",
        };
        format!("{}{}{}", prefix, self.bit_depth, suffix)
    }

    /// ffmpeg PCM codec name (e.g. `pcm_s16le`)
    pub fn ffmpeg_codec_name(&self) -> String {
        format!("pcm_{}", self.ffmpeg_format_name())
    }

    /// Largest positive integer code for this bit depth
    fn int_max(&self) -> f64 {
        ((1i64 << (self.bit_depth - 1)) - 1) as f64
    }

    /// Bias subtracted from unsigned codes to center them at zero
    fn unsigned_bias(&self) -> i64 {
        1i64 << (self.bit_depth - 1)
    }

    /// Interpret a raw byte run as normalized `f64` samples in [-1.0, 1.0].
    ///
    /// Integer codes are divided by the largest positive code of the format;
    /// the single most-negative code is clamped so every format maps into
    /// [-1.0, 1.0] exactly. Fails with a format error if the byte run is not
    /// a whole number of samples.
    pub fn to_normalized(&self, raw: &[u8]) -> Result<Vec<f64>> {
        let width = self.bytes_per_sample();
        if raw.len() % width != 0 {
            return Err(Error::Format(format!(
                "byte run of {} bytes is not a multiple of the {}-byte sample width",
                raw.len(),
                width
            )));
        }

        let mut samples = Vec::with_capacity(raw.len() / width);
        for chunk in raw.chunks_exact(width) {
            let bits = self.read_bits(chunk);
            let value = match self.encoding {
                SampleEncoding::Float => f32::from_bits(bits as u32) as f64,
                SampleEncoding::Signed => {
                    // Sign-extend from bit_depth to 64 bits
                    let shift = 64 - self.bit_depth as u32;
                    let code = ((bits as i64) << shift) >> shift;
                    code as f64 / self.int_max()
                }
                SampleEncoding::Unsigned => {
                    let code = bits as i64 - self.unsigned_bias();
                    code as f64 / self.int_max()
                }
            };
            samples.push(value.clamp(-1.0, 1.0));
        }
        Ok(samples)
    }

    /// Quantize normalized samples into raw bytes.
    ///
    /// Values outside [-1.0, 1.0] are clamped (lossy saturation, not an
    /// error) before quantization. Rounding is half-to-even to minimize bias.
    pub fn from_normalized(&self, samples: &[f64]) -> Vec<u8> {
        let width = self.bytes_per_sample();
        let mut raw = Vec::with_capacity(samples.len() * width);
        for &sample in samples {
            let clamped = sample.clamp(-1.0, 1.0);
            let bits = match self.encoding {
                SampleEncoding::Float => f32::to_bits(clamped as f32) as u64,
                SampleEncoding::Signed => {
                    let code = (clamped * self.int_max()).round_ties_even() as i64;
                    code as u64
                }
                SampleEncoding::Unsigned => {
                    let code = (clamped * self.int_max()).round_ties_even() as i64;
                    (code + self.unsigned_bias()) as u64
                }
            };
            self.write_bits(bits, &mut raw);
        }
        raw
    }

    /// Assemble one sample's bytes into an unsigned bit pattern
    fn read_bits(&self, chunk: &[u8]) -> u64 {
        let mut bits = 0u64;
        match self.byte_order {
            ByteOrder::Little => {
                for (i, &b) in chunk.iter().enumerate() {
                    bits |= (b as u64) << (8 * i);
                }
            }
            ByteOrder::Big => {
                for &b in chunk {
                    bits = (bits << 8) | b as u64;
                }
            }
        }
        bits
    }

    /// Append one sample's bit pattern in this format's byte order
    fn write_bits(&self, bits: u64, out: &mut Vec<u8>) {
        let width = self.bytes_per_sample();
        match self.byte_order {
            ByteOrder::Little => {
                for i in 0..width {
                    out.push((bits >> (8 * i)) as u8);
                }
            }
            ByteOrder::Big => {
                for i in (0..width).rev() {
                    out.push((bits >> (8 * i)) as u8);
                }
            }
        }
    }
}

impl Default for SampleFormat {
    /// Default is signed 16-bit little-endian
    fn default() -> Self {
        SampleFormat::S16_LE
    }
}

impl std::fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.ffmpeg_format_name())
    }
}
