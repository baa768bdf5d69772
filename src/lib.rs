//! # ytfetch
//! Library for looking up Youtube video metadata and downloading videos as
//! local mp3 files, using the Data API v3 for metadata and ffmpeg for
//! transcoding.
//! ## Examples
//! Basic metadata search with an API key:
//! ```no_run
//! #[tokio::main]
//! pub async fn main() -> Result<(), ytfetch::Error> {
//!     let config = ytfetch::Config::new(ytfetch::ApiKey::new("API_KEY"));
//!     let yt = ytfetch::YtFetch::new(config)?;
//!     let results = yt.search_items("never gonna give you up").await?;
//!     println!("{:?}", results);
//!     Ok(())
//! }
//! ```
//! Downloading a video's audio into a directory as mp3:
//! ```no_run
//! use tokio_util::sync::CancellationToken;
//! use ytfetch::{ApiKey, Config, Destination, VideoID, YoutubeID, YtFetch};
//!
//! #[tokio::main]
//! pub async fn main() -> Result<(), ytfetch::Error> {
//!     let yt = YtFetch::new(Config::new(ApiKey::new("API_KEY")))?;
//!     let id = VideoID::from_raw("dQw4w9WgXcQ");
//!     let items = yt.items_info(&[id.clone()]).await?;
//!     yt.download_audio(
//!         &id,
//!         Destination::directory("./music", &items[0].title),
//!         None,
//!         CancellationToken::new(),
//!     )
//!     .await?;
//!     Ok(())
//! }
//! ```
//! ## Optional Features
//! ### TLS
//! NOTE: To use an alternative TLS, you will need to specify `default-features
//! = false`. As reqwest preferentially uses default-tls when multiple TLS
//! features are enabled. See reqwest docs for more information.
//! <https://docs.rs/reqwest/latest/reqwest/tls/index.html>
//! - **default-tls** *(enabled by default)*: Utilises the default TLS from
//!   reqwest - at the time of writing is native-tls.
//! - **native-tls**: This feature forces use of the the native-tls crate,
//!   reliant on vendors tls.
//! - **rustls-tls**: This feature forces use of the rustls crate, written in
//!   rust.
use catalog::DataApi;
use client::Client;
use source::HttpSource;
use std::path::{Path, PathBuf};
use transcode::Ffmpeg;
use utils::constants::{AUDIO_EXT, VIDEO_EXT};

pub use builder::YtFetchBuilder;
pub use catalog::{CatalogProvider, CatalogVideo, VideoItem};
pub use common::{safe_filename, watch_url, PlaylistID, VideoID, YoutubeID};
pub use config::{ApiKey, Config, FfmpegLocation};
pub use diskinfo::DiskReport;
pub use error::{Error, ErrorKind, Result};
pub use progress::{CombinedProgress, DownloadProgress};
pub use source::{Destination, MediaInfo, MediaSource};
pub use transcode::TranscodeEngine;

pub mod builder;
pub mod catalog;
mod client;
pub mod common;
pub mod config;
mod core;
pub mod diskinfo;
pub mod error;
mod pipeline;
pub mod progress;
pub mod source;
pub mod transcode;
mod utils;

/// A handle to the metadata and download pipeline, wrapping a
/// reqwest::Client and the set of pipeline components.
/// Generic over the components so alternative backends can be slotted in;
/// the defaults are the stock set assembled by [`YtFetch::new`].
#[derive(Debug, Clone)]
pub struct YtFetch<P = DataApi, S = HttpSource, E = Ffmpeg> {
    catalog: P,
    source: S,
    engine: E,
    client: Client,
    config: Config,
    temp_dir: PathBuf,
}

impl YtFetch {
    /// Create a new handle using the stock components - the Data API
    /// catalog provider, the HTTP media source and the ffmpeg transcoding
    /// engine - and reqwest's default TLS.
    pub fn new(config: Config) -> Result<Self> {
        YtFetchBuilder::new(config).build()
    }
    /// Create a new handle using the stock components and rustls.
    #[cfg(feature = "rustls-tls")]
    pub fn new_rustls_tls(config: Config) -> Result<Self> {
        YtFetchBuilder::new_rustls_tls(config).build()
    }
    /// Create a new handle using the stock components and native-tls.
    #[cfg(feature = "native-tls")]
    pub fn new_native_tls(config: Config) -> Result<Self> {
        YtFetchBuilder::new_native_tls(config).build()
    }
}

impl<P, S, E> YtFetch<P, S, E> {
    /// Follow a single redirect and return the target URL - expands
    /// youtu.be and other shortened links. A URL that does not redirect
    /// comes back unchanged.
    pub async fn expand_url(&self, url: &str) -> Result<String> {
        let target = self
            .client
            .resolve_redirect(url)
            .await
            .map_err(Error::provider)?;
        Ok(target.unwrap_or_else(|| url.to_string()))
    }
    /// Report which artifacts of a title already exist in a directory,
    /// keyed by extension (mp3 and mp4).
    pub async fn disk_state(&self, title: &str, directory: &Path) -> DiskReport {
        diskinfo::disk_state(title, directory, &[AUDIO_EXT, VIDEO_EXT]).await
    }
}
