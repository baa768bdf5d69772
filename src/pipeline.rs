//! The combined download-and-transcode operation.
//!
//! Audio is produced in two stages: the video is downloaded to disk first,
//! then the engine reads it back and encodes mp3. Each stage reports its own
//! percents on an internal channel; a forwarding task folds them into
//! [`CombinedProgress`] updates so a consumer can drive a single bar.

use crate::common::{VideoID, YoutubeID};
use crate::core::send_or_error;
use crate::error::{Error, Result};
use crate::progress::{CombinedProgress, DownloadProgress};
use crate::source::{
    artifact_path, download_to_path, remove_file_best_effort, Destination, MediaSource,
};
use crate::transcode::{transcode_stage, TranscodeEngine};
use crate::utils::constants::{AUDIO_EXT, VIDEO_EXT};
use crate::YtFetch;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWrite;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use uuid::Uuid;

/// Stage channels are drained by a forwarding task as fast as they fill, so
/// the capacity only needs to cover short scheduling gaps.
const PROGRESS_CHANNEL_SIZE: usize = 64;

impl<P, S, E> YtFetch<P, S, E>
where
    S: MediaSource,
    E: TranscodeEngine,
{
    /// Download a video and transcode it to mp3.
    ///
    /// Directory destinations keep both artifacts: the video lands at
    /// `<dir>/<safe_filename(title)>.mp4` and the audio next to it with an
    /// `.mp3` extension. If transcoding fails the partial mp3 is removed but
    /// the downloaded video is kept, so a retry can be attempted without
    /// downloading again.
    ///
    /// Writer destinations receive only the mp3 bytes. The intermediate
    /// video goes to a uniquely-named file under the temp directory and is
    /// removed before the call returns, whether transcoding succeeded or
    /// not.
    ///
    /// Progress updates merge both stages into one overall figure: the
    /// download drives 0-50, transcoding drives 50-100, and a final update
    /// of exactly 100 on every field follows a successful run. Cancelling
    /// stops the active stage and cleans up its partial output.
    pub async fn download_audio(
        &self,
        id: &VideoID<'_>,
        destination: Destination,
        progress: Option<mpsc::Sender<CombinedProgress>>,
        cancel: CancellationToken,
    ) -> Result<()> {
        if id.is_empty() {
            return Err(Error::invalid_input("no video id provided"));
        }
        info!("Downloading audio for video {}", id.get_raw());
        match destination {
            Destination::Directory { dir, title } => {
                self.audio_into_directory(id, &dir, &title, progress.as_ref(), &cancel)
                    .await?
            }
            Destination::Writer(mut writer) => {
                self.audio_into_writer(id, &mut writer, progress.as_ref(), &cancel)
                    .await?
            }
        }
        if let Some(tx) = progress.as_ref() {
            send_or_error(tx, CombinedProgress::complete()).await;
        }
        Ok(())
    }

    async fn audio_into_directory(
        &self,
        id: &VideoID<'_>,
        dir: &Path,
        title: &str,
        progress: Option<&mpsc::Sender<CombinedProgress>>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let video_path = artifact_path(dir, title, VIDEO_EXT);
        self.run_download_stage(id, &video_path, progress, cancel)
            .await?;
        let audio_path = artifact_path(dir, title, AUDIO_EXT);
        let mut audio_file = fs_err::tokio::File::create(&audio_path).await?;
        let transcoded = self
            .run_transcode_stage(&video_path, &mut audio_file, progress, cancel)
            .await;
        if transcoded.is_err() {
            drop(audio_file);
            // The partial mp3 goes; the finished video stays for a retry.
            remove_file_best_effort(&audio_path).await;
        }
        transcoded
    }

    async fn audio_into_writer<W>(
        &self,
        id: &VideoID<'_>,
        writer: &mut W,
        progress: Option<&mpsc::Sender<CombinedProgress>>,
        cancel: &CancellationToken,
    ) -> Result<()>
    where
        W: AsyncWrite + Send + Unpin,
    {
        fs_err::tokio::create_dir_all(&self.temp_dir).await?;
        let video_path = self.temp_video_path();
        self.run_download_stage(id, &video_path, progress, cancel)
            .await?;
        let transcoded = self
            .run_transcode_stage(&video_path, writer, progress, cancel)
            .await;
        remove_file_best_effort(&video_path).await;
        transcoded
    }

    fn temp_video_path(&self) -> PathBuf {
        // Unique stems keep concurrent downloads of the same video apart.
        self.temp_dir
            .join(format!("{}.{VIDEO_EXT}", Uuid::new_v4().simple()))
    }

    async fn run_download_stage(
        &self,
        id: &VideoID<'_>,
        path: &Path,
        progress: Option<&mpsc::Sender<CombinedProgress>>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        match progress {
            None => download_to_path(&self.source, id, path, None, cancel).await,
            Some(tx) => {
                let (video_tx, mut video_rx) = mpsc::channel::<DownloadProgress>(PROGRESS_CHANNEL_SIZE);
                let tx = tx.clone();
                let forwarder = tokio::spawn(async move {
                    while let Some(update) = video_rx.recv().await {
                        send_or_error(&tx, CombinedProgress::downloading(update.percent)).await;
                    }
                });
                let downloaded =
                    download_to_path(&self.source, id, path, Some(&video_tx), cancel).await;
                // The stage sender must go before the forwarder is awaited,
                // or the drain never finishes.
                drop(video_tx);
                if let Err(e) = forwarder.await {
                    error!("Download progress forwarder panicked: {e}");
                }
                downloaded
            }
        }
    }

    async fn run_transcode_stage<W>(
        &self,
        input: &Path,
        output: W,
        progress: Option<&mpsc::Sender<CombinedProgress>>,
        cancel: &CancellationToken,
    ) -> Result<()>
    where
        W: AsyncWrite + Send + Unpin,
    {
        match progress {
            None => transcode_stage(&self.engine, input, output, None, cancel).await,
            Some(tx) => {
                let (audio_tx, mut audio_rx) = mpsc::channel(PROGRESS_CHANNEL_SIZE);
                let tx = tx.clone();
                let forwarder = tokio::spawn(async move {
                    while let Some(percent) = audio_rx.recv().await {
                        send_or_error(&tx, CombinedProgress::transcoding(percent)).await;
                    }
                });
                // The stage owns its sender, so the forwarder drains as soon
                // as the stage returns.
                let transcoded =
                    transcode_stage(&self.engine, input, output, Some(audio_tx), cancel).await;
                if let Err(e) = forwarder.await {
                    error!("Transcode progress forwarder panicked: {e}");
                }
                transcoded
            }
        }
    }
}
