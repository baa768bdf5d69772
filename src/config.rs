//! Construction-time configuration, passed explicitly to the library.
//! No global or ambient state is read for the resolution or acquisition
//! operations - everything lives on this object.
use crate::utils::constants::MAX_RESULTS;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Data API key, sent as the `key` query parameter on every provider
    /// call.
    pub api_key: ApiKey,
    #[serde(default)]
    pub ffmpeg: FfmpegLocation,
    /// Directory for intermediate video artifacts when transcoding to a
    /// stream. Defaults to a `ytfetch` subdirectory of the OS temp dir.
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
    /// Page ceiling for playlist and search calls. One page only - no
    /// continuations are followed.
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

impl Config {
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            ffmpeg: FfmpegLocation::default(),
            temp_dir: None,
            max_results: MAX_RESULTS,
        }
    }
    pub(crate) fn resolved_temp_dir(&self) -> PathBuf {
        self.temp_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("ytfetch"))
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self(raw_text.into())
    }
    pub(crate) fn get_raw(&self) -> &str {
        &self.0
    }
}

// Keys end up in logs via Debug far too easily, so redact.
impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey(/* private fields */)")
    }
}

/// Transcoder executable per host OS. Any unset entry falls back to `ffmpeg`
/// on PATH.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FfmpegLocation {
    pub linux: Option<PathBuf>,
    pub windows: Option<PathBuf>,
    pub macos: Option<PathBuf>,
}

impl FfmpegLocation {
    pub(crate) fn resolve(&self) -> PathBuf {
        let configured = if cfg!(target_os = "windows") {
            self.windows.as_ref()
        } else if cfg!(target_os = "macos") {
            self.macos.as_ref()
        } else {
            self.linux.as_ref()
        };
        configured
            .cloned()
            .unwrap_or_else(|| PathBuf::from("ffmpeg"))
    }
}

fn default_max_results() -> u32 {
    MAX_RESULTS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_debug_is_redacted() {
        let key = ApiKey::new("AIzaSy-very-secret");
        let debug = format!("{key:?}");
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn unset_ffmpeg_location_falls_back_to_path_lookup() {
        let location = FfmpegLocation::default();
        assert_eq!(location.resolve(), PathBuf::from("ffmpeg"));
    }

    #[test]
    fn max_results_defaults_when_missing_from_serialized_form() {
        let config: Config = serde_json::from_str(r#"{"api_key":"k"}"#).unwrap();
        assert_eq!(config.max_results, MAX_RESULTS);
        assert!(config.temp_dir.is_none());
    }
}
