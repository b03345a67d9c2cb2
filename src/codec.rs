//! Subprocess codec bridge
//!
//! Converts between arbitrary on-disk container formats and the in-memory
//! [`AudioBuffer`] by driving an external codec tool (ffmpeg) over pipes.
//! Raw PCM crosses the pipe headerless, interleaved frame-major, in the
//! format negotiated via [`CodecConfig::pipe_format`]; the stream length is
//! implicit from `frames × channels × bytes_per_sample`.
//!
//! Each decode/encode call is an independent session: the child process is
//! spawned, its streams are pumped concurrently (stdin writer, stdout reader,
//! stderr reader as separate tasks joined at the end, so neither pipe buffer
//! can deadlock the other), and the process is reaped before the call
//! returns on every path. Every stream interaction and the exit wait run
//! under the configured bounded timeout; on expiry the child is killed
//! before the timeout error is surfaced.

use crate::buffer::AudioBuffer;
use crate::config::CodecConfig;
use crate::error::{Error, Result};
use crate::probe::{probe_stream, StreamInfo};
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Per-call bridge to the external codec tool
pub struct CodecBridge {
    config: CodecConfig,
}

impl CodecBridge {
    /// Create a bridge with the given tool configuration
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Check whether the configured codec tool can be executed.
    ///
    /// Useful for environments where ffmpeg may not be installed.
    pub fn is_available(config: &CodecConfig) -> bool {
        std::process::Command::new(&config.ffmpeg_path)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Decode a container file into an [`AudioBuffer`].
    ///
    /// The stream is probed first for its sample rate and channel count,
    /// then the codec tool is asked to emit raw PCM at that shape in the
    /// negotiated pipe format. The tool's stderr is drained concurrently
    /// with the PCM read and attached to any decode error.
    pub async fn decode(&self, path: impl AsRef<Path>) -> Result<AudioBuffer> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::Decode(format!("file not found: {}", path.display())));
        }

        let stream = probe_stream(&self.config, path).await?;
        let fmt = self.config.pipe_format;
        debug!(
            "Decoding {} ({} Hz, {} ch) to raw {}",
            path.display(),
            stream.sample_rate,
            stream.channels,
            fmt
        );

        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(["-v", "error"])
            .arg("-i")
            .arg(path)
            .args(["-f", &fmt.ffmpeg_format_name()])
            .args(["-acodec", &fmt.ffmpeg_codec_name()])
            .args(["-ar", &stream.sample_rate.to_string()])
            .args(["-ac", &stream.channels.to_string()])
            .arg("-")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                Error::Decode(format!(
                    "failed to spawn {}: {}",
                    self.config.ffmpeg_path.display(),
                    e
                ))
            })?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Decode("child stdout not captured".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::Decode("child stderr not captured".to_string()))?;

        let mut pcm = Vec::new();
        let mut diagnostics = String::new();
        {
            // Drain PCM and diagnostics concurrently so a full stderr pipe
            // cannot stall the decoder
            let pump = async {
                let (out_res, err_res) = tokio::join!(
                    stdout.read_to_end(&mut pcm),
                    stderr.read_to_string(&mut diagnostics)
                );
                out_res?;
                err_res?;
                Ok::<(), std::io::Error>(())
            };
            match timeout(self.config.timeout, pump).await {
                Ok(res) => res?,
                Err(_) => return self.kill_with_timeout(&mut child).await,
            }
        }

        let status = match timeout(self.config.timeout, child.wait()).await {
            Ok(res) => res?,
            Err(_) => return self.kill_with_timeout(&mut child).await,
        };

        if !status.success() {
            return Err(Error::Decode(format!(
                "{} exited with {}: {}",
                self.config.ffmpeg_path.display(),
                status,
                diagnostics.trim()
            )));
        }

        let frame_bytes = fmt.bytes_per_sample() * stream.channels as usize;
        if pcm.len() % frame_bytes != 0 {
            return Err(Error::Decode(format!(
                "PCM stream of {} bytes truncated mid-frame ({} bytes per frame)",
                pcm.len(),
                frame_bytes
            )));
        }
        let frames = pcm.len() / frame_bytes;
        self.check_expected_length(&stream, frames, &diagnostics)?;

        info!(
            "Decoded {}: {} frames, {} channels at {} Hz",
            path.display(),
            frames,
            stream.channels,
            stream.sample_rate
        );
        AudioBuffer::from_raw(&pcm, &fmt, stream.sample_rate, stream.channels)
    }

    /// Encode an [`AudioBuffer`] into a container file at `path`.
    ///
    /// The output container is chosen by the codec tool from the path's
    /// extension. The buffer's raw PCM is written to the tool's stdin in
    /// full, stdin is closed to signal end-of-input, and the tool is waited
    /// on. A missing or empty output file afterward is an encode error even
    /// on a zero exit. Zero-length buffers are valid and produce a minimal
    /// container.
    pub async fn encode(&self, buffer: &AudioBuffer, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let fmt = self.config.pipe_format;
        let raw = buffer.as_format(&fmt)?;
        debug!(
            "Encoding {} frames ({} bytes of raw {}) to {}",
            buffer.frame_count(),
            raw.len(),
            fmt,
            path.display()
        );

        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(["-v", "error", "-y"])
            .args(["-f", &fmt.ffmpeg_format_name()])
            .args(["-ar", &buffer.sample_rate().to_string()])
            .args(["-ac", &buffer.channel_count().to_string()])
            .args(["-i", "-"])
            .arg(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                Error::Encode(format!(
                    "failed to spawn {}: {}",
                    self.config.ffmpeg_path.display(),
                    e
                ))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Encode("child stdin not captured".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::Encode("child stderr not captured".to_string()))?;

        let mut diagnostics = String::new();
        let write_res;
        {
            // Writer and stderr reader run as independent tasks; the write
            // result is judged only after the exit status is known, since a
            // failing encoder closes its stdin early (broken pipe)
            let writer = async move {
                stdin.write_all(&raw).await?;
                stdin.shutdown().await?;
                Ok::<(), std::io::Error>(())
            };
            let pump = async {
                tokio::join!(writer, stderr.read_to_string(&mut diagnostics))
            };
            match timeout(self.config.timeout, pump).await {
                Ok((w, e)) => {
                    write_res = w;
                    e?;
                }
                Err(_) => return self.kill_with_timeout(&mut child).await,
            }
        }

        let status = match timeout(self.config.timeout, child.wait()).await {
            Ok(res) => res?,
            Err(_) => return self.kill_with_timeout(&mut child).await,
        };

        if !status.success() {
            return Err(Error::Encode(format!(
                "{} exited with {}: {}",
                self.config.ffmpeg_path.display(),
                status,
                diagnostics.trim()
            )));
        }
        if let Err(e) = write_res {
            return Err(Error::Encode(format!("failed writing PCM to encoder: {}", e)));
        }

        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.len() > 0 => {}
            Ok(_) => {
                return Err(Error::Encode(format!(
                    "encoder produced an empty file at {}",
                    path.display()
                )))
            }
            Err(_) => {
                return Err(Error::Encode(format!(
                    "encoder produced no file at {}",
                    path.display()
                )))
            }
        }

        info!(
            "Encoded {} frames at {} Hz to {}",
            buffer.frame_count(),
            buffer.sample_rate(),
            path.display()
        );
        Ok(())
    }

    /// Best-effort length check against the container-reported duration.
    ///
    /// Container durations are approximate for some compressed formats, so
    /// only a clearly short stream (more than 10% and a full frame under the
    /// declared length) is treated as an error. Unknown durations accept
    /// whatever complete stream the tool produced.
    fn check_expected_length(
        &self,
        stream: &StreamInfo,
        frames: usize,
        diagnostics: &str,
    ) -> Result<()> {
        let Some(duration) = stream.duration_seconds else {
            return Ok(());
        };
        let expected = duration * stream.sample_rate as f64;
        if (frames as f64) + 1.0 < expected * 0.9 {
            return Err(Error::Decode(format!(
                "PCM stream shorter than declared: got {} frames, container reports ~{:.0}: {}",
                frames,
                expected,
                diagnostics.trim()
            )));
        }
        if (frames as f64 - expected).abs() > 1.0 {
            debug!(
                "Decoded frame count {} differs from container-reported ~{:.0}",
                frames, expected
            );
        }
        Ok(())
    }

    /// Kill and reap an unresponsive child, then surface the timeout
    async fn kill_with_timeout<T>(&self, child: &mut Child) -> Result<T> {
        warn!(
            "{} unresponsive after {:?}, killing",
            self.config.ffmpeg_path.display(),
            self.config.timeout
        );
        if let Err(e) = child.kill().await {
            warn!("Failed to kill codec process: {}", e);
        }
        Err(Error::Timeout(self.config.timeout))
    }
}
