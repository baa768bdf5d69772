//! Metadata resolution - typed video records from a catalog provider.
//!
//! The shipped provider is [`DataApi`], which talks to the Youtube Data API
//! v3 using an API key. Anything implementing [`CatalogProvider`] can stand
//! in for it, which is how the integration tests run without a network.
use crate::client::Client;
use crate::common::{watch_url, PlaylistID, VideoID, YoutubeID};
use crate::config::ApiKey;
use crate::diskinfo::DiskReport;
use crate::error::{Error, Result};
use crate::progress::ProgressState;
use crate::utils::constants::DATA_API_URL;
use crate::YtFetch;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Read-only metadata source for video records.
///
/// Implementations report their own error type; the resolver operations wrap
/// any failure as a provider error without retrying.
// Allow async_fn_in_trait - auto trait bounds resolve once components are
// concrete, which is how callers consume the facade.
#[allow(async_fn_in_trait)]
pub trait CatalogProvider {
    type Error: std::error::Error + Send + Sync + 'static;
    /// Fetch records for a set of video IDs in one call.
    async fn videos(
        &self,
        ids: &[VideoID<'_>],
    ) -> std::result::Result<Vec<CatalogVideo>, Self::Error>;
    /// List the video IDs of a playlist's members - first page only.
    async fn playlist_video_ids(
        &self,
        playlist_id: &PlaylistID<'_>,
        max_results: u32,
    ) -> std::result::Result<Vec<VideoID<'static>>, Self::Error>;
    /// Free-text search returning matching video IDs - first page only.
    async fn search_video_ids(
        &self,
        query: &str,
        max_results: u32,
    ) -> std::result::Result<Vec<VideoID<'static>>, Self::Error>;
}

/// Raw per-video record as returned by a provider, before it is shaped into
/// a [`VideoItem`].
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogVideo {
    pub id: String,
    pub title: String,
    /// "" when the provider has no thumbnail for the video.
    pub thumbnail_url: String,
    /// ISO-8601 duration, "" when the provider did not declare one.
    pub iso_duration: String,
}

/// Point-in-time snapshot of a video's metadata.
///
/// Records are never merged or patched after creation - ask again for a new
/// snapshot. `Default` produces the empty placeholder record frontends use
/// before any metadata has arrived.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoItem {
    pub id: String,
    pub title: String,
    /// Canonical watch URL derived from the ID.
    pub video_url: String,
    pub thumbnail_url: String,
    /// Clock-formatted duration such as "03:21", "" when unknown.
    pub duration: String,
    pub disabled: bool,
    #[serde(default)]
    pub disk_info: DiskReport,
    #[serde(default)]
    pub progress: ProgressState,
}

impl VideoItem {
    fn from_catalog(video: CatalogVideo) -> Self {
        let video_url = watch_url(&VideoID::from_raw(video.id.as_str()));
        Self {
            id: video.id,
            title: video.title,
            video_url,
            thumbnail_url: video.thumbnail_url,
            duration: format_clock_duration(&video.iso_duration),
            disabled: false,
            disk_info: DiskReport::default(),
            progress: ProgressState::default(),
        }
    }
}

impl<P, S, E> YtFetch<P, S, E>
where
    P: CatalogProvider,
{
    /// Fetch metadata records for a set of video IDs.
    ///
    /// All IDs go to the provider in a single batched call. The returned
    /// sequence follows the provider's response order, and IDs the provider
    /// does not know are absent from it, so it may be shorter than the
    /// input.
    pub async fn items_info(&self, ids: &[VideoID<'_>]) -> Result<Vec<VideoItem>> {
        if ids.is_empty() {
            return Err(Error::invalid_input("no video ids provided"));
        }
        let videos = self
            .catalog
            .videos(ids)
            .await
            .map_err(Error::provider)?;
        Ok(videos.into_iter().map(VideoItem::from_catalog).collect())
    }
    /// Fetch metadata records for the members of a playlist.
    ///
    /// Reads a single provider page (at most `max_results` members) and
    /// resolves the member IDs through [`Self::items_info`]. A playlist with
    /// no members resolves to an empty list, not an error.
    pub async fn playlist_items(&self, playlist_id: &PlaylistID<'_>) -> Result<Vec<VideoItem>> {
        if playlist_id.is_empty() {
            return Err(Error::invalid_input("no playlist id provided"));
        }
        let ids = self
            .catalog
            .playlist_video_ids(playlist_id, self.config.max_results)
            .await
            .map_err(Error::provider)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.items_info(&ids).await
    }
    /// Search for videos by free text and fetch their metadata records.
    ///
    /// Reads a single provider page. A search that matches nothing is an
    /// error - callers showing results distinguish "nothing matched" from
    /// "empty playlist".
    pub async fn search_items(&self, query: &str) -> Result<Vec<VideoItem>> {
        if query.is_empty() {
            return Err(Error::invalid_input("no search text provided"));
        }
        let ids = self
            .catalog
            .search_video_ids(query, self.config.max_results)
            .await
            .map_err(Error::provider)?;
        if ids.is_empty() {
            return Err(Error::not_found(query));
        }
        self.items_info(&ids).await
    }
}

/// Key-authenticated Youtube Data API v3 provider.
#[derive(Debug, Clone)]
pub struct DataApi {
    client: Client,
    api_key: ApiKey,
}

impl DataApi {
    pub(crate) fn new(client: Client, api_key: ApiKey) -> Self {
        Self { client, api_key }
    }
}

impl CatalogProvider for DataApi {
    type Error = reqwest::Error;
    async fn videos(
        &self,
        ids: &[VideoID<'_>],
    ) -> std::result::Result<Vec<CatalogVideo>, Self::Error> {
        let id_chain = ids.iter().map(|id| id.get_raw()).join(",");
        let response: VideoListResponse = self
            .client
            .get_json(
                format!("{DATA_API_URL}videos"),
                &[
                    ("key", self.api_key.get_raw()),
                    ("part", "snippet,contentDetails,id"),
                    ("id", id_chain.as_str()),
                ],
            )
            .await?;
        Ok(catalog_videos_from_response(response))
    }
    async fn playlist_video_ids(
        &self,
        playlist_id: &PlaylistID<'_>,
        max_results: u32,
    ) -> std::result::Result<Vec<VideoID<'static>>, Self::Error> {
        let max_results = max_results.to_string();
        let response: PlaylistItemListResponse = self
            .client
            .get_json(
                format!("{DATA_API_URL}playlistItems"),
                &[
                    ("key", self.api_key.get_raw()),
                    ("part", "snippet"),
                    ("playlistId", playlist_id.get_raw()),
                    ("maxResults", max_results.as_str()),
                ],
            )
            .await?;
        Ok(playlist_video_ids_from_response(response))
    }
    async fn search_video_ids(
        &self,
        query: &str,
        max_results: u32,
    ) -> std::result::Result<Vec<VideoID<'static>>, Self::Error> {
        let max_results = max_results.to_string();
        let response: SearchListResponse = self
            .client
            .get_json(
                format!("{DATA_API_URL}search"),
                &[
                    ("key", self.api_key.get_raw()),
                    ("part", "id"),
                    ("q", query),
                    ("type", "video"),
                    ("maxResults", max_results.as_str()),
                ],
            )
            .await?;
        Ok(search_video_ids_from_response(response))
    }
}

// Data API response shapes - only the fields this library reads.
#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoResource>,
}
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoResource {
    id: String,
    snippet: Option<VideoSnippet>,
    content_details: Option<ContentDetails>,
}
#[derive(Debug, Default, Deserialize)]
struct VideoSnippet {
    #[serde(default)]
    title: String,
    thumbnails: Option<Thumbnails>,
}
#[derive(Debug, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
}
#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}
#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: Option<String>,
}
#[derive(Debug, Deserialize)]
struct PlaylistItemListResponse {
    #[serde(default)]
    items: Vec<PlaylistItemResource>,
}
#[derive(Debug, Deserialize)]
struct PlaylistItemResource {
    snippet: Option<PlaylistItemSnippet>,
}
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemSnippet {
    resource_id: Option<ResourceId>,
}
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: Option<String>,
}
#[derive(Debug, Deserialize)]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchResource>,
}
#[derive(Debug, Deserialize)]
struct SearchResource {
    id: Option<SearchResultId>,
}
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResultId {
    video_id: Option<String>,
}

fn catalog_videos_from_response(response: VideoListResponse) -> Vec<CatalogVideo> {
    response
        .items
        .into_iter()
        .map(|item| {
            let snippet = item.snippet.unwrap_or_default();
            CatalogVideo {
                id: item.id,
                title: snippet.title,
                thumbnail_url: snippet
                    .thumbnails
                    .and_then(|t| t.high)
                    .map(|t| t.url)
                    .unwrap_or_default(),
                iso_duration: item
                    .content_details
                    .and_then(|c| c.duration)
                    .unwrap_or_default(),
            }
        })
        .collect()
}

fn playlist_video_ids_from_response(response: PlaylistItemListResponse) -> Vec<VideoID<'static>> {
    response
        .items
        .into_iter()
        .filter_map(|item| item.snippet?.resource_id?.video_id)
        .map(VideoID::from_raw)
        .collect()
}

// Non-video hits carry no videoId and are skipped.
fn search_video_ids_from_response(response: SearchListResponse) -> Vec<VideoID<'static>> {
    response
        .items
        .into_iter()
        .filter_map(|item| item.id?.video_id)
        .map(VideoID::from_raw)
        .collect()
}

/// Format the provider's ISO-8601 duration as a clock string, trimming
/// leading zero units: "PT3M21S" formats as "03:21". Unknown or unparseable
/// durations format as "".
pub(crate) fn format_clock_duration(iso: &str) -> String {
    let Some(total) = parse_iso_duration(iso) else {
        return String::new();
    };
    let hours = total / 3600;
    let minutes = total % 3600 / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else if minutes > 0 {
        format!("{minutes:02}:{seconds:02}")
    } else {
        format!("{seconds:02}")
    }
}

// The Data API uses the PnDTnHnMnS subset for video durations.
fn parse_iso_duration(raw: &str) -> Option<u64> {
    let rest = raw.strip_prefix('P')?;
    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => (date, time),
        None => (rest, ""),
    };
    let mut seconds = 0u64;
    let mut number = String::new();
    for c in date_part.chars() {
        if c.is_ascii_digit() {
            number.push(c);
        } else if c == 'D' {
            seconds += number.parse::<u64>().ok()? * 86_400;
            number.clear();
        } else {
            return None;
        }
    }
    if !number.is_empty() {
        return None;
    }
    for c in time_part.chars() {
        if c.is_ascii_digit() {
            number.push(c);
        } else {
            let value: u64 = number.parse().ok()?;
            number.clear();
            match c {
                'H' => seconds += value * 3600,
                'M' => seconds += value * 60,
                'S' => seconds += value,
                _ => return None,
            }
        }
    }
    if !number.is_empty() {
        return None;
    }
    Some(seconds)
}
