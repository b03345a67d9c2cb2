//! Fade envelope curves
//!
//! Provides the fade curve shapes applied by
//! [`AudioBuffer::fade`](crate::buffer::AudioBuffer::fade) with exact
//! endpoint behavior:
//! a fade-in envelope is 0.0 at its first frame and 1.0 at its last,
//! a fade-out envelope is the mirror image.

use serde::{Deserialize, Serialize};

/// Fade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeDirection {
    /// Ramp up from silence at the start of the buffer
    In,
    /// Ramp down to silence at the end of the buffer
    Out,
}

/// Fade curve shapes
///
/// - Linear: constant rate of change, precise and predictable
/// - Exponential: slow start, fast finish, natural-sounding fade-in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeCurve {
    /// Linear: v(t) = t
    Linear,

    /// Exponential: v(t) = t²
    Exponential,
}

impl FadeCurve {
    /// Gain multiplier at normalized position `t` through a fade-in.
    ///
    /// `t` runs from 0.0 (first faded frame) to 1.0 (last faded frame);
    /// returns 0.0 at the start and 1.0 at the end, monotonically increasing.
    pub fn fade_in_gain(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            FadeCurve::Linear => t,
            FadeCurve::Exponential => t * t,
        }
    }

    /// Gain multiplier at normalized position `t` through a fade-out.
    ///
    /// Mirror of [`fade_in_gain`](Self::fade_in_gain): 1.0 at the start of
    /// the fade, 0.0 at the end.
    pub fn fade_out_gain(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            FadeCurve::Linear => 1.0 - t,
            FadeCurve::Exponential => {
                let inv = 1.0 - t;
                inv * inv
            }
        }
    }

    /// Parse a curve from its lowercase name
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "linear" => Some(FadeCurve::Linear),
            "exponential" => Some(FadeCurve::Exponential),
            _ => None,
        }
    }

    /// All available curve variants
    pub fn all_variants() -> &'static [FadeCurve] {
        &[FadeCurve::Linear, FadeCurve::Exponential]
    }
}

impl Default for FadeCurve {
    fn default() -> Self {
        FadeCurve::Linear
    }
}

impl std::fmt::Display for FadeCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FadeCurve::Linear => "linear",
            FadeCurve::Exponential => "exponential",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_in_endpoints() {
        for curve in FadeCurve::all_variants() {
            assert_eq!(curve.fade_in_gain(0.0), 0.0, "{} fade-in start", curve);
            assert_eq!(curve.fade_in_gain(1.0), 1.0, "{} fade-in end", curve);
        }
    }

    #[test]
    fn test_fade_out_endpoints() {
        for curve in FadeCurve::all_variants() {
            assert_eq!(curve.fade_out_gain(0.0), 1.0, "{} fade-out start", curve);
            assert_eq!(curve.fade_out_gain(1.0), 0.0, "{} fade-out end", curve);
        }
    }

    #[test]
    fn test_monotonic() {
        for curve in FadeCurve::all_variants() {
            let mut prev_in = -1.0;
            let mut prev_out = 2.0;
            for step in 0..=100 {
                let t = step as f64 / 100.0;
                let g_in = curve.fade_in_gain(t);
                let g_out = curve.fade_out_gain(t);
                assert!(g_in >= prev_in, "{} fade-in not monotonic at {}", curve, t);
                assert!(g_out <= prev_out, "{} fade-out not monotonic at {}", curve, t);
                prev_in = g_in;
                prev_out = g_out;
            }
        }
    }

    #[test]
    fn test_out_of_range_positions_clamped() {
        assert_eq!(FadeCurve::Linear.fade_in_gain(-0.5), 0.0);
        assert_eq!(FadeCurve::Linear.fade_in_gain(1.5), 1.0);
        assert_eq!(FadeCurve::Exponential.fade_out_gain(2.0), 0.0);
    }

    #[test]
    fn test_parse() {
        assert_eq!(FadeCurve::from_str("linear"), Some(FadeCurve::Linear));
        assert_eq!(FadeCurve::from_str("EXPONENTIAL"), Some(FadeCurve::Exponential));
        assert_eq!(FadeCurve::from_str("cosine"), None);
    }
}
