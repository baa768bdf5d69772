//! Audio transcoding - turning an acquired video file into mp3 bytes with
//! fractional percent progress.
//!
//! The shipped engine is [`Ffmpeg`], which drives an ffmpeg subprocess and
//! derives percents from its stderr telemetry. Anything implementing
//! [`TranscodeEngine`] can stand in for it.
use crate::core::send_or_error;
use crate::error::{Error, Result};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWrite, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Encoder turning an on-disk video artifact into mp3 bytes.
// Allow async_fn_in_trait - auto trait bounds resolve once components are
// concrete, which is how callers consume the facade.
#[allow(async_fn_in_trait)]
pub trait TranscodeEngine {
    type Error: std::error::Error + Send + Sync + 'static;
    /// Transcode the input file to mp3, writing encoded bytes into `output`.
    ///
    /// Percent readings arrive on `progress` while the engine can measure
    /// them; a source whose length the engine cannot determine emits none. A
    /// clean finish always ends with an exact 100. When `cancel` fires the
    /// engine stops promptly and returns an error.
    async fn transcode_to_mp3<W>(
        &self,
        input: &Path,
        output: W,
        progress: Option<mpsc::Sender<f64>>,
        cancel: &CancellationToken,
    ) -> std::result::Result<(), Self::Error>
    where
        W: AsyncWrite + Send + Unpin;
}

/// Run the transcoding stage with the library's error attribution: a missing
/// source file is the caller's mistake, an engine failure is a transcoding
/// error, and an engine failure after cancellation is a cancellation.
pub(crate) async fn transcode_stage<E, W>(
    engine: &E,
    input: &Path,
    output: W,
    progress: Option<mpsc::Sender<f64>>,
    cancel: &CancellationToken,
) -> Result<()>
where
    E: TranscodeEngine,
    W: AsyncWrite + Send + Unpin,
{
    if !tokio::fs::try_exists(input).await.unwrap_or(false) {
        return Err(Error::invalid_input(format!(
            "transcode source {} does not exist",
            input.display()
        )));
    }
    match engine.transcode_to_mp3(input, output, progress, cancel).await {
        Ok(()) => Ok(()),
        Err(_) if cancel.is_cancelled() => Err(Error::cancelled()),
        Err(e) => Err(Error::transcode(e)),
    }
}

/// ffmpeg subprocess engine.
///
/// Encoded mp3 bytes are read from the child's stdout; stderr carries the
/// input dump and `-progress` telemetry the percents are derived from.
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    executable: PathBuf,
}

impl Ffmpeg {
    pub(crate) fn new(executable: PathBuf) -> Self {
        Self { executable }
    }
}

impl TranscodeEngine for Ffmpeg {
    type Error = io::Error;
    async fn transcode_to_mp3<W>(
        &self,
        input: &Path,
        mut output: W,
        progress: Option<mpsc::Sender<f64>>,
        cancel: &CancellationToken,
    ) -> std::result::Result<(), Self::Error>
    where
        W: AsyncWrite + Send + Unpin,
    {
        info!("Transcoding {} with {}", input.display(), self.executable.display());
        let mut child = Command::new(&self.executable)
            .arg("-hide_banner")
            .arg("-nostats")
            .arg("-i")
            .arg(input)
            .arg("-vn")
            .arg("-f")
            .arg("mp3")
            .arg("-progress")
            .arg("pipe:2")
            .arg("pipe:1")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // An early return must not leave an encoder running.
            .kill_on_drop(true)
            .spawn()?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("ffmpeg stdout not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("ffmpeg stderr not captured"))?;
        let mut lines = BufReader::new(stderr).lines();
        let mut telemetry = FfmpegTelemetry::default();
        let mut log_tail: Vec<String> = Vec::new();
        let copy = tokio::io::copy(&mut stdout, &mut output);
        futures::pin_mut!(copy);
        let mut copy_done = false;
        let mut lines_done = false;
        while !(copy_done && lines_done) {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    let _ = child.kill().await;
                    return Err(io::Error::other("ffmpeg killed by cancellation"));
                }
                line = lines.next_line(), if !lines_done => {
                    match line? {
                        Some(line) => match telemetry.observe(&line) {
                            Reading::Percent(percent) => {
                                if let Some(tx) = &progress {
                                    send_or_error(tx, percent).await;
                                }
                            }
                            Reading::End => {
                                if let Some(tx) = &progress {
                                    send_or_error(tx, 100.0).await;
                                }
                            }
                            Reading::Telemetry => {}
                            Reading::Log => {
                                if log_tail.len() >= LOG_TAIL_LINES {
                                    log_tail.remove(0);
                                }
                                log_tail.push(line);
                            }
                        },
                        None => lines_done = true,
                    }
                }
                copied = &mut copy, if !copy_done => {
                    copied?;
                    copy_done = true;
                }
            }
        }
        let status = child.wait().await?;
        if !status.success() {
            let detail = if log_tail.is_empty() {
                String::new()
            } else {
                format!(" - {}", log_tail.join(" | "))
            };
            return Err(io::Error::other(format!("ffmpeg exited with {status}{detail}")));
        }
        debug!("ffmpeg finished cleanly for {}", input.display());
        if let Some(tx) = &progress {
            if !telemetry.ended {
                send_or_error(tx, 100.0).await;
            }
        }
        Ok(())
    }
}

const LOG_TAIL_LINES: usize = 10;

/// What one stderr line told us.
#[derive(Debug, PartialEq)]
enum Reading {
    /// A fresh percent, strictly greater than any previously reported.
    Percent(f64),
    /// The `progress=end` marker - the encode measured out complete.
    End,
    /// A telemetry line carrying nothing to report.
    Telemetry,
    /// Not telemetry - an ordinary log line, kept for error detail.
    Log,
}

/// Incremental parser for ffmpeg stderr: learns the stream length from the
/// input dump's `Duration:` header, then derives percents from `-progress`
/// elapsed-time telemetry.
#[derive(Debug, Default)]
struct FfmpegTelemetry {
    duration_us: Option<u64>,
    last_percent: f64,
    ended: bool,
}

impl FfmpegTelemetry {
    fn observe(&mut self, line: &str) -> Reading {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix("Duration:") {
            let clock = rest.split(',').next().unwrap_or_default().trim();
            if let Some(us) = parse_clock_to_us(clock) {
                self.duration_us = Some(us);
            }
            return Reading::Log;
        }
        let Some((key, value)) = line.split_once('=') else {
            return Reading::Log;
        };
        if key.chars().any(char::is_whitespace) {
            return Reading::Log;
        }
        match key {
            // out_time_ms is microseconds too, despite the name.
            "out_time_us" | "out_time_ms" => {
                let Some(total) = self.duration_us else {
                    return Reading::Telemetry;
                };
                let Ok(elapsed) = value.trim().parse::<i64>() else {
                    return Reading::Telemetry;
                };
                if total == 0 || elapsed < 0 {
                    return Reading::Telemetry;
                }
                let percent = (elapsed as f64 / total as f64 * 100.0).min(100.0);
                if percent > self.last_percent {
                    self.last_percent = percent;
                    Reading::Percent(percent)
                } else {
                    Reading::Telemetry
                }
            }
            "progress" => {
                if value.trim() == "end" {
                    self.ended = true;
                    self.last_percent = 100.0;
                    Reading::End
                } else {
                    Reading::Telemetry
                }
            }
            _ => Reading::Telemetry,
        }
    }
}

// "HH:MM:SS.cc" as printed in the input dump.
fn parse_clock_to_us(clock: &str) -> Option<u64> {
    let (whole, frac) = match clock.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (clock, ""),
    };
    let mut parts = whole.split(':');
    let hours: u64 = parts.next()?.trim().parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds: u64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let mut us = (hours * 3600 + minutes * 60 + seconds) * 1_000_000;
    let mut scale = 100_000;
    for digit in frac.chars().take(6) {
        us += digit.to_digit(10)? as u64 * scale;
        scale /= 10;
    }
    Some(us)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn clock_parses_to_microseconds() {
        assert_eq!(parse_clock_to_us("00:00:10.00"), Some(10_000_000));
        assert_eq!(parse_clock_to_us("01:02:03.50"), Some(3_723_500_000));
        assert_eq!(parse_clock_to_us("00:00:00"), Some(0));
        assert_eq!(parse_clock_to_us("N/A"), None);
    }

    #[test]
    fn telemetry_reports_percent_against_header_duration() {
        let mut telemetry = FfmpegTelemetry::default();
        assert_eq!(
            telemetry.observe("  Duration: 00:00:10.00, start: 0.000000, bitrate: 5 kb/s"),
            Reading::Log
        );
        assert_eq!(
            telemetry.observe("out_time_us=5000000"),
            Reading::Percent(50.0)
        );
        // Same instant under the misnamed millisecond key reports nothing new.
        assert_eq!(telemetry.observe("out_time_ms=5000000"), Reading::Telemetry);
        assert_eq!(telemetry.observe("progress=continue"), Reading::Telemetry);
        assert_eq!(
            telemetry.observe("out_time_us=10000000"),
            Reading::Percent(100.0)
        );
        assert_eq!(telemetry.observe("progress=end"), Reading::End);
        assert!(telemetry.ended);
    }

    #[test]
    fn telemetry_without_duration_stays_silent() {
        let mut telemetry = FfmpegTelemetry::default();
        assert_eq!(telemetry.observe("out_time_us=5000000"), Reading::Telemetry);
        assert_eq!(telemetry.observe("progress=end"), Reading::End);
    }

    #[test]
    fn unknown_duration_header_is_ignored() {
        let mut telemetry = FfmpegTelemetry::default();
        assert_eq!(
            telemetry.observe("  Duration: N/A, start: 0.000000, bitrate: N/A"),
            Reading::Log
        );
        assert_eq!(telemetry.observe("out_time_us=5000000"), Reading::Telemetry);
    }

    #[test]
    fn percent_never_decreases() {
        let mut telemetry = FfmpegTelemetry::default();
        telemetry.observe("  Duration: 00:00:10.00, start: 0.000000, bitrate: 5 kb/s");
        assert_eq!(
            telemetry.observe("out_time_us=6000000"),
            Reading::Percent(60.0)
        );
        assert_eq!(telemetry.observe("out_time_us=4000000"), Reading::Telemetry);
    }

    #[test]
    fn percent_is_capped_at_one_hundred() {
        let mut telemetry = FfmpegTelemetry::default();
        telemetry.observe("  Duration: 00:00:10.00, start: 0.000000, bitrate: 5 kb/s");
        assert_eq!(
            telemetry.observe("out_time_us=15000000"),
            Reading::Percent(100.0)
        );
    }

    #[test]
    fn ordinary_stderr_lines_read_as_log() {
        let mut telemetry = FfmpegTelemetry::default();
        assert_eq!(
            telemetry.observe("Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'in.mp4':"),
            Reading::Log
        );
        assert_eq!(
            telemetry.observe("[mp3 @ 0x5591] Header missing"),
            Reading::Log
        );
        // Free-form lines that merely contain '=' are still log lines.
        assert_eq!(
            telemetry.observe("  Stream #0:0(und): Audio: aac (LC), fltp, 130 kb/s (default) rate= 0"),
            Reading::Log
        );
    }
}
