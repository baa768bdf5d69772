//! Shared in-memory components for the integration tests. The pipeline runs
//! end to end against these without a network or an ffmpeg install.
use bytes::Bytes;
use futures::Stream;
use std::collections::HashMap;
use std::io;
use std::path::Path;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use ytfetch::builder::YtFetchBuilder;
use ytfetch::{
    ApiKey, CatalogProvider, CatalogVideo, Config, MediaInfo, MediaSource, PlaylistID,
    TranscodeEngine, VideoID, YoutubeID, YtFetch,
};

/// Build a handle around the supplied components, with the temp directory
/// pointed inside the test's own tempdir.
pub fn new_mock_fetch<P, S, E>(
    catalog: P,
    source: S,
    engine: E,
    temp_dir: &Path,
) -> YtFetch<P, S, E>
where
    P: CatalogProvider,
    S: MediaSource,
    E: TranscodeEngine,
{
    let mut config = Config::new(ApiKey::new("test-key"));
    config.temp_dir = Some(temp_dir.to_path_buf());
    YtFetchBuilder::new(config)
        .with_components(catalog, source, engine)
        .build()
        .unwrap()
}

/// Collect every event from a progress channel until the sender side closes.
pub async fn drain<T>(mut rx: mpsc::Receiver<T>) -> Vec<T> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

pub fn catalog_video(id: &str, title: &str) -> CatalogVideo {
    CatalogVideo {
        id: id.to_string(),
        title: title.to_string(),
        thumbnail_url: format!("https://i.ytimg.com/vi/{id}/hqdefault.jpg"),
        iso_duration: "PT3M21S".to_string(),
    }
}

/// Provider canned with fixed records and ID lists.
#[derive(Clone, Debug, Default)]
pub struct FixedCatalog {
    pub videos: Vec<CatalogVideo>,
    pub playlists: HashMap<String, Vec<String>>,
    pub searches: HashMap<String, Vec<String>>,
}

impl CatalogProvider for FixedCatalog {
    type Error = io::Error;
    async fn videos(&self, ids: &[VideoID<'_>]) -> Result<Vec<CatalogVideo>, io::Error> {
        Ok(self
            .videos
            .iter()
            .filter(|video| ids.iter().any(|id| id.get_raw() == video.id))
            .cloned()
            .collect())
    }
    async fn playlist_video_ids(
        &self,
        playlist_id: &PlaylistID<'_>,
        max_results: u32,
    ) -> Result<Vec<VideoID<'static>>, io::Error> {
        Ok(self
            .playlists
            .get(playlist_id.get_raw())
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .take(max_results as usize)
            .map(VideoID::from_raw)
            .collect())
    }
    async fn search_video_ids(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<VideoID<'static>>, io::Error> {
        Ok(self
            .searches
            .get(query)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .take(max_results as usize)
            .map(VideoID::from_raw)
            .collect())
    }
}

/// Provider that always fails, like a Data API rejecting the key.
#[derive(Clone, Copy, Debug)]
pub struct FailingCatalog;

impl CatalogProvider for FailingCatalog {
    type Error = io::Error;
    async fn videos(&self, _ids: &[VideoID<'_>]) -> Result<Vec<CatalogVideo>, io::Error> {
        Err(io::Error::other("quota exceeded"))
    }
    async fn playlist_video_ids(
        &self,
        _playlist_id: &PlaylistID<'_>,
        _max_results: u32,
    ) -> Result<Vec<VideoID<'static>>, io::Error> {
        Err(io::Error::other("quota exceeded"))
    }
    async fn search_video_ids(
        &self,
        _query: &str,
        _max_results: u32,
    ) -> Result<Vec<VideoID<'static>>, io::Error> {
        Err(io::Error::other("quota exceeded"))
    }
}

/// Source canned with an in-memory chunk sequence.
#[derive(Clone, Debug)]
pub struct StaticSource {
    pub chunks: Vec<Bytes>,
    pub total_bytes: u64,
    /// Fail the stream after yielding this many chunks.
    pub fail_after: Option<usize>,
}

impl StaticSource {
    pub fn single_chunk(content: &'static [u8]) -> Self {
        Self::chunked(&[content])
    }
    pub fn chunked(chunks: &[&'static [u8]]) -> Self {
        let chunks: Vec<Bytes> = chunks.iter().copied().map(Bytes::from_static).collect();
        let total_bytes = chunks.iter().map(|chunk| chunk.len() as u64).sum();
        Self {
            chunks,
            total_bytes,
            fail_after: None,
        }
    }
}

impl MediaSource for StaticSource {
    type Error = io::Error;
    async fn open(
        &self,
        _id: &VideoID<'_>,
    ) -> Result<
        (
            MediaInfo,
            impl Stream<Item = Result<Bytes, io::Error>> + Send,
        ),
        io::Error,
    > {
        let mut items: Vec<Result<Bytes, io::Error>> =
            self.chunks.iter().cloned().map(Ok).collect();
        if let Some(yielded) = self.fail_after {
            items.truncate(yielded);
            items.push(Err(io::Error::other("stream interrupted")));
        }
        Ok((
            MediaInfo {
                total_bytes: self.total_bytes,
            },
            futures::stream::iter(items),
        ))
    }
}

/// Engine that writes a fixed payload instead of really encoding.
#[derive(Clone, Debug)]
pub struct StubEngine {
    pub output: Bytes,
    pub percents: Vec<f64>,
    pub fail_after_write: bool,
}

impl StubEngine {
    pub fn with_output(output: &'static [u8]) -> Self {
        Self {
            output: Bytes::from_static(output),
            percents: vec![40.0, 100.0],
            fail_after_write: false,
        }
    }
    /// Writes a partial payload, then fails - like an encoder dying
    /// mid-stream.
    pub fn failing() -> Self {
        Self {
            output: Bytes::from_static(b"partial"),
            percents: Vec::new(),
            fail_after_write: true,
        }
    }
}

impl TranscodeEngine for StubEngine {
    type Error = io::Error;
    async fn transcode_to_mp3<W>(
        &self,
        input: &Path,
        mut output: W,
        progress: Option<mpsc::Sender<f64>>,
        _cancel: &CancellationToken,
    ) -> Result<(), io::Error>
    where
        W: AsyncWrite + Send + Unpin,
    {
        // Real engines read their input from disk; mirror that dependency.
        tokio::fs::metadata(input).await?;
        if let Some(tx) = &progress {
            for percent in &self.percents {
                let _ = tx.send(*percent).await;
            }
        }
        output.write_all(&self.output).await?;
        output.flush().await?;
        if self.fail_after_write {
            return Err(io::Error::other("exited with code 1"));
        }
        Ok(())
    }
}

/// Engine that only stops when cancelled, like a real encoder that runs
/// until killed.
#[derive(Clone, Copy, Debug)]
pub struct BlockingEngine;

impl TranscodeEngine for BlockingEngine {
    type Error = io::Error;
    async fn transcode_to_mp3<W>(
        &self,
        _input: &Path,
        _output: W,
        _progress: Option<mpsc::Sender<f64>>,
        cancel: &CancellationToken,
    ) -> Result<(), io::Error>
    where
        W: AsyncWrite + Send + Unpin,
    {
        cancel.cancelled().await;
        Err(io::Error::other("engine killed"))
    }
}
