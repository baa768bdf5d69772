//! Video acquisition - streaming content bytes to a destination with percent
//! progress.
//!
//! The shipped source is [`HttpSource`], a streaming GET against the video's
//! watch URL. Anything implementing [`MediaSource`] can stand in for it.
use crate::client::Client;
use crate::common::{safe_filename, watch_url, VideoID, YoutubeID};
use crate::core::send_or_error;
use crate::error::{Error, Result};
use crate::progress::DownloadProgress;
use crate::utils::constants::VIDEO_EXT;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Declared shape of an opened content stream.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MediaInfo {
    /// Size advertised by the source. 0 when the source declared none, in
    /// which case the download emits no percent events until the final 100.
    pub total_bytes: u64,
}

/// Source of raw content bytes for a video.
// Allow async_fn_in_trait - auto trait bounds resolve once components are
// concrete, which is how callers consume the facade.
#[allow(async_fn_in_trait)]
pub trait MediaSource {
    type Error: std::error::Error + Send + Sync + 'static;
    /// Open the content stream for a video, returning the declared length
    /// alongside the chunk stream.
    async fn open(
        &self,
        id: &VideoID<'_>,
    ) -> std::result::Result<
        (
            MediaInfo,
            impl Stream<Item = std::result::Result<Bytes, Self::Error>> + Send,
        ),
        Self::Error,
    >;
}

/// Streaming HTTP GET source reading from the canonical watch URL.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }
}

impl MediaSource for HttpSource {
    type Error = reqwest::Error;
    async fn open(
        &self,
        id: &VideoID<'_>,
    ) -> std::result::Result<
        (
            MediaInfo,
            impl Stream<Item = std::result::Result<Bytes, Self::Error>> + Send,
        ),
        Self::Error,
    > {
        let url = watch_url(id);
        let (total, stream) = self.client.get_stream(url).await?;
        Ok((
            MediaInfo {
                total_bytes: total.unwrap_or_default(),
            },
            stream,
        ))
    }
}

/// Where a download or transcode writes its output.
pub enum Destination {
    /// `<dir>/<safe_filename(title)>.<ext>` under an existing directory. The
    /// stage owns creating and, on failure, removing the file.
    Directory { dir: PathBuf, title: String },
    /// A caller-supplied sink. The stage flushes it; closing it stays with
    /// the caller.
    Writer(Box<dyn AsyncWrite + Send + Unpin>),
}

impl Destination {
    pub fn directory(dir: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self::Directory {
            dir: dir.into(),
            title: title.into(),
        }
    }
    pub fn writer(writer: impl AsyncWrite + Send + Unpin + 'static) -> Self {
        Self::Writer(Box::new(writer))
    }
}

/// Stream a video's content into the writer, reporting per-chunk percent
/// progress against the declared length and an exact 100 at stream end.
pub(crate) async fn download_to_writer<S, W>(
    source: &S,
    id: &VideoID<'_>,
    writer: &mut W,
    progress: Option<&mpsc::Sender<DownloadProgress>>,
    cancel: &CancellationToken,
) -> Result<()>
where
    S: MediaSource,
    W: AsyncWrite + Unpin + ?Sized,
{
    let (info, stream) = source.open(id).await.map_err(Error::transfer)?;
    futures::pin_mut!(stream);
    let total = info.total_bytes;
    let mut read: u64 = 0;
    loop {
        // Biased so a cancelled token wins over a ready chunk.
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::cancelled()),
            next = stream.next() => next,
        };
        let Some(chunk) = next else {
            break;
        };
        let chunk = chunk.map_err(Error::transfer)?;
        writer.write_all(&chunk).await?;
        read += chunk.len() as u64;
        if let Some(tx) = progress {
            if total > 0 {
                let percent = (read as f64 / total as f64 * 100.0).min(100.0);
                send_or_error(
                    tx,
                    DownloadProgress {
                        percent,
                        total_bytes: total,
                    },
                )
                .await;
            }
        }
    }
    writer.flush().await?;
    if let Some(tx) = progress {
        send_or_error(
            tx,
            DownloadProgress {
                percent: 100.0,
                total_bytes: total,
            },
        )
        .await;
    }
    Ok(())
}

/// Stream a video's content into a file, removing the partial file if the
/// download does not complete.
pub(crate) async fn download_to_path<S>(
    source: &S,
    id: &VideoID<'_>,
    path: &Path,
    progress: Option<&mpsc::Sender<DownloadProgress>>,
    cancel: &CancellationToken,
) -> Result<()>
where
    S: MediaSource,
{
    let mut file = fs_err::tokio::File::create(path).await?;
    let result = download_to_writer(source, id, &mut file, progress, cancel).await;
    if result.is_err() {
        drop(file);
        remove_file_best_effort(path).await;
    }
    result
}

/// Best-effort artifact removal - failure is logged, never surfaced.
pub(crate) async fn remove_file_best_effort(path: &Path) {
    match fs_err::tokio::remove_file(path).await {
        Ok(()) => info!("Removed artifact {}", path.display()),
        Err(e) => warn!("Failed to remove artifact: {e}"),
    }
}

/// Path a directory-mode stage writes to for the given title and extension.
pub(crate) fn artifact_path(dir: &Path, title: &str, ext: &str) -> PathBuf {
    dir.join(format!("{}.{ext}", safe_filename(title)))
}

impl<P, S, E> crate::YtFetch<P, S, E>
where
    S: MediaSource,
{
    /// Download a video's content without transcoding.
    ///
    /// Directory destinations land at `<dir>/<safe_filename(title)>.mp4`.
    /// Progress percents arrive on `progress` against the declared content
    /// length, finishing with an exact 100. Cancelling removes any partial
    /// stage-created file before the call returns.
    pub async fn download_video(
        &self,
        id: &VideoID<'_>,
        destination: Destination,
        progress: Option<mpsc::Sender<DownloadProgress>>,
        cancel: CancellationToken,
    ) -> Result<()> {
        if id.is_empty() {
            return Err(Error::invalid_input("no video id provided"));
        }
        info!("Downloading video {}", id.get_raw());
        match destination {
            Destination::Directory { dir, title } => {
                let path = artifact_path(&dir, &title, VIDEO_EXT);
                download_to_path(&self.source, id, &path, progress.as_ref(), &cancel).await
            }
            Destination::Writer(mut writer) => {
                download_to_writer(&self.source, id, &mut writer, progress.as_ref(), &cancel).await
            }
        }
    }
}
