//! Progress event shapes emitted by the acquisition stages.
use serde::{Deserialize, Serialize};

/// Progress of a single byte-transfer stage.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DownloadProgress {
    /// Percent complete, 0 to 100. Never decreases across one download, and
    /// the final event of a successful download is exactly 100.
    pub percent: f64,
    /// Size of the transfer as declared by the source. 0 when undeclared.
    pub total_bytes: u64,
}

/// Merged progress across the two stages of one audio acquisition.
///
/// Each stage owns half of `overall`: while the video downloads,
/// `overall` is `video / 2`; once transcoding begins, `video` is pinned at
/// 100 and `overall` is `50 + audio / 2`. The final event of a successful
/// acquisition is exactly 100/100/100.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombinedProgress {
    pub overall: f64,
    pub video: f64,
    /// 0 until the transcoding stage begins.
    pub audio: f64,
}

impl CombinedProgress {
    pub(crate) fn downloading(video: f64) -> Self {
        Self {
            overall: video / 2.0,
            video,
            audio: 0.0,
        }
    }
    pub(crate) fn transcoding(audio: f64) -> Self {
        Self {
            overall: 50.0 + audio / 2.0,
            video: 100.0,
            audio,
        }
    }
    pub(crate) fn complete() -> Self {
        Self {
            overall: 100.0,
            video: 100.0,
            audio: 100.0,
        }
    }
}

/// Zeroed per-item progress, part of the placeholder item record some
/// frontends key their state off.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressState {
    pub overall: f64,
    pub downloading: bool,
    pub video: StageProgress,
    pub music: StageProgress,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StageProgress {
    pub progress: f64,
    pub loading: bool,
    pub indeterminate: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn download_phase_owns_first_half_of_overall() {
        assert_eq!(
            CombinedProgress::downloading(40.0),
            CombinedProgress {
                overall: 20.0,
                video: 40.0,
                audio: 0.0
            }
        );
    }

    #[test]
    fn transcode_phase_pins_video_at_one_hundred() {
        assert_eq!(
            CombinedProgress::transcoding(40.0),
            CombinedProgress {
                overall: 70.0,
                video: 100.0,
                audio: 40.0
            }
        );
    }

    #[test]
    fn complete_is_exactly_one_hundred_everywhere() {
        let done = CombinedProgress::complete();
        assert_eq!(done.overall, 100.0);
        assert_eq!(done.video, 100.0);
        assert_eq!(done.audio, 100.0);
    }
}
