//! Re-usable core structures.
// Intended to be for structures that are also suitable to be reused by other
// libraries. As opposed to simply part of the interface.
use crate::utils::constants::WATCH_URL;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Type safe version of an ID used as part of Youtube's interface.
pub trait YoutubeID<'a> {
    fn get_raw(&self) -> &str;
    fn from_raw<S: Into<Cow<'a, str>>>(raw_str: S) -> Self;
}

macro_rules! impl_youtube_id {
    ($t:ty) => {
        impl<'a> YoutubeID<'a> for $t {
            fn get_raw(&self) -> &str {
                &self.0
            }
            fn from_raw<S: Into<Cow<'a, str>>>(raw_str: S) -> Self {
                Self(raw_str.into())
            }
        }
    };
}

#[derive(PartialEq, Eq, Hash, Debug, Clone, Serialize, Deserialize)]
pub struct VideoID<'a>(Cow<'a, str>);
#[derive(PartialEq, Eq, Hash, Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistID<'a>(Cow<'a, str>);

impl_youtube_id!(VideoID<'a>);
impl_youtube_id!(PlaylistID<'a>);

impl<'a> VideoID<'a> {
    /// An ID with an empty raw string carries no identity.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn into_owned(self) -> VideoID<'static> {
        VideoID(Cow::Owned(self.0.into_owned()))
    }
}

impl<'a> PlaylistID<'a> {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Produce the canonical watch page URL for a video ID.
/// An empty ID produces the bare watch URL with no query component.
pub fn watch_url(id: &VideoID<'_>) -> String {
    if id.is_empty() {
        return WATCH_URL.to_string();
    }
    format!("{WATCH_URL}?v={}", id.get_raw())
}

/// Reduce a display title to a filesystem-safe stem.
/// Every character outside ASCII alphanumerics becomes '_', and the result is
/// lowercased. Deterministic, so repeat calls for the same title land on the
/// same files.
pub fn safe_filename(title: &str) -> String {
    title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
