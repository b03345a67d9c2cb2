//! End-to-end buffer pipeline tests
//!
//! Exercises the in-core operations chained the way a caller would use them:
//! load-shaped synthetic audio, trim, fade, mix, resample, and export to raw
//! PCM, checking sample counts and amplitudes at every boundary.

use audiopipe::{AudioBuffer, FadeCurve, FadeDirection, SampleFormat};

/// One second of a 440 Hz sine at the given rate, stereo interleaved
fn sine_buffer(sample_rate: u32, channels: u16) -> AudioBuffer {
    let frames = sample_rate as usize;
    let mut samples = Vec::with_capacity(frames * channels as usize);
    for i in 0..frames {
        let t = i as f64 / sample_rate as f64;
        let value = (2.0 * std::f64::consts::PI * 440.0 * t).sin() * 0.5;
        for _ in 0..channels {
            samples.push(value);
        }
    }
    AudioBuffer::new(samples, sample_rate, channels).unwrap()
}

#[test]
fn test_trim_then_export_byte_count() {
    // The canonical scenario: 1 second of 2-channel 44100 Hz audio, first
    // half trimmed and exported as signed 16-bit PCM
    let buffer = sine_buffer(44100, 2);
    assert_eq!(buffer.frame_count(), 44100);
    assert_eq!(buffer.channel_count(), 2);

    let half = buffer.trim(0, 22050).unwrap();
    let raw = half.as_format(&SampleFormat::S16_LE).unwrap();
    assert_eq!(raw.len(), 22050 * 2 * 2);
}

#[test]
fn test_overlay_two_takes_with_tail() {
    let bed = sine_buffer(44100, 2);
    let sting = sine_buffer(44100, 2).trim(0, 11025).unwrap().gain(0.25);

    // Overlay the sting so it runs past the end of the bed
    let offset = 40000i64;
    let mixed = bed.mix(&sting, offset).unwrap();
    assert_eq!(mixed.frame_count(), 40000 + 11025);

    // Before the overlay the bed is untouched
    assert_eq!(mixed.sample(100, 0), bed.sample(100, 0));
    // The appended tail is the sting alone
    let tail_frame = 44100 + 10;
    let sting_frame = (tail_frame as i64 - offset) as usize;
    let expected = sting.sample(sting_frame, 0).unwrap();
    assert!((mixed.sample(tail_frame, 0).unwrap() - expected).abs() < 1e-12);
}

#[test]
fn test_mix_requires_matching_rates() {
    // Differing rates must always be rejected, never silently mixed
    let a = sine_buffer(44100, 2);
    let b = sine_buffer(48000, 2);
    assert!(a.mix(&b, 0).is_err());

    // Resampling first makes the pair compatible
    let b_matched = b.resample(44100).unwrap();
    assert!(a.mix(&b_matched, 0).is_ok());
}

#[test]
fn test_resample_pipeline_rates_and_lengths() {
    let buffer = sine_buffer(44100, 2);

    let up = buffer.resample(48000).unwrap();
    assert_eq!(up.sample_rate(), 48000);
    assert_eq!(up.frame_count(), 48000);

    let down = up.resample(22050).unwrap();
    assert_eq!(down.sample_rate(), 22050);
    let expected = (44100.0f64 * 22050.0 / 44100.0).round() as i64;
    assert!((down.frame_count() as i64 - expected).abs() <= 1);
}

#[test]
fn test_fade_in_full_length_boundary() {
    let buffer = sine_buffer(8000, 1);
    let frames = buffer.frame_count();
    let faded = buffer.fade(FadeDirection::In, frames, FadeCurve::Linear);

    assert_eq!(faded.sample(0, 0), Some(0.0));
    // Last sample keeps its original amplitude
    assert_eq!(faded.sample(frames - 1, 0), buffer.sample(frames - 1, 0));
}

#[test]
fn test_mono_downmix_then_restore_shape() {
    let buffer = sine_buffer(44100, 2);
    let mono = buffer.to_channel_count(1).unwrap();
    assert_eq!(mono.channel_count(), 1);
    assert_eq!(mono.frame_count(), buffer.frame_count());

    // Both source channels were identical, so the average equals either one
    assert_eq!(mono.sample(1234, 0), buffer.sample(1234, 0));

    let back = mono.to_channel_count(2).unwrap();
    assert_eq!(back.channel_count(), 2);
    assert_eq!(back.sample(1234, 0), back.sample(1234, 1));
}

#[test]
fn test_gain_fade_export_saturation() {
    // Push the signal out of range, fade the tail, export: only export clamps
    let buffer = sine_buffer(8000, 1).gain(3.0);
    let peak = buffer
        .samples()
        .iter()
        .cloned()
        .fold(0.0f64, |acc, s| acc.max(s.abs()));
    assert!(peak > 1.0);

    let faded = buffer.fade(FadeDirection::Out, 4000, FadeCurve::Exponential);
    let raw = faded.as_format(&SampleFormat::S16_LE).unwrap();
    assert_eq!(raw.len(), faded.frame_count() * 2);

    // Round-trip through the format brings everything into range
    let restored = AudioBuffer::from_raw(&raw, &SampleFormat::S16_LE, 8000, 1).unwrap();
    for &s in restored.samples() {
        assert!((-1.0..=1.0).contains(&s));
    }
}
