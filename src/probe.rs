//! Stream inspection via ffprobe
//!
//! Runs the probe tool with JSON output and extracts the properties of the
//! first audio stream: sample rate, channel count, and (when the container
//! reports them) duration and bit depth. The decode path uses these to
//! negotiate the raw PCM pipe format and to sanity-check stream length.

use crate::config::CodecConfig;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Properties of an audio stream as reported by the probe tool
#[derive(Debug, Clone, PartialEq)]
pub struct StreamInfo {
    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Number of channels
    pub channels: u16,

    /// Container-reported duration, if known (best-effort; absent for some
    /// streamed containers)
    pub duration_seconds: Option<f64>,

    /// Bits per sample, when the container stores PCM (0 is reported as
    /// absent)
    pub bits_per_sample: Option<u8>,
}

/// ffprobe `-print_format json` output (relevant subset)
#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    // ffprobe emits numeric fields as JSON strings
    sample_rate: Option<String>,
    channels: Option<u16>,
    bits_per_sample: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Inspect the first audio stream of a container file
pub async fn probe_stream(config: &CodecConfig, path: &Path) -> Result<StreamInfo> {
    debug!("Probing {} with {}", path.display(), config.ffprobe_path.display());

    let output = timeout(
        config.timeout,
        Command::new(&config.ffprobe_path)
            .args(["-v", "error", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(path)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output(),
    )
    .await
    .map_err(|_| Error::Timeout(config.timeout))?
    .map_err(|e| Error::Probe(format!("failed to run {}: {}", config.ffprobe_path.display(), e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Probe(format!(
            "{} exited with {}: {}",
            config.ffprobe_path.display(),
            output.status,
            stderr.trim()
        )));
    }

    parse_probe_output(&String::from_utf8_lossy(&output.stdout))
}

/// Extract [`StreamInfo`] from probe JSON text
pub(crate) fn parse_probe_output(json: &str) -> Result<StreamInfo> {
    let parsed: ProbeOutput =
        serde_json::from_str(json).map_err(|e| Error::Probe(format!("unparsable output: {}", e)))?;

    let stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"))
        .ok_or_else(|| Error::Probe("no audio stream found".to_string()))?;

    let sample_rate = stream
        .sample_rate
        .as_deref()
        .and_then(|s| s.parse::<u32>().ok())
        .filter(|&r| r > 0)
        .ok_or_else(|| Error::Probe("missing or invalid sample rate".to_string()))?;

    let channels = stream
        .channels
        .filter(|&c| c > 0)
        .ok_or_else(|| Error::Probe("missing or invalid channel count".to_string()))?;

    let duration_seconds = parsed
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0);

    let bits_per_sample = stream
        .bits_per_sample
        .filter(|&b| b > 0 && b <= 32)
        .map(|b| b as u8);

    Ok(StreamInfo {
        sample_rate,
        channels,
        duration_seconds,
        bits_per_sample,
    })
}
