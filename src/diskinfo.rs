//! Disk presence checks for previously acquired artifacts.
use crate::common::safe_filename;
use crate::utils::constants::{AUDIO_EXT, VIDEO_EXT};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Which artifact files for a title are already on disk, keyed by extension.
/// Computed fresh on every call - nothing is cached between calls, so the
/// same question twice returns the current state both times.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiskReport {
    pub safe_title: String,
    pub present: BTreeMap<String, bool>,
}

// The default report is the placeholder shape - both extensions frontends
// key off are preset to absent.
impl Default for DiskReport {
    fn default() -> Self {
        Self {
            safe_title: String::new(),
            present: BTreeMap::from([
                (AUDIO_EXT.to_string(), false),
                (VIDEO_EXT.to_string(), false),
            ]),
        }
    }
}

/// Report which of `<directory>/<safe_filename(title)>.<ext>` exist for the
/// requested extensions. An empty title or extension list reports nothing.
/// Probe failures count as absent - this is a read-only inspection and never
/// errors.
pub async fn disk_state(title: &str, directory: &Path, extensions: &[&str]) -> DiskReport {
    if title.is_empty() || extensions.is_empty() {
        return DiskReport {
            safe_title: String::new(),
            present: BTreeMap::new(),
        };
    }
    let safe_title = safe_filename(title);
    let checks = extensions.iter().map(|ext| {
        let path = directory.join(format!("{safe_title}.{ext}"));
        async move {
            let exists = tokio::fs::try_exists(path).await.unwrap_or(false);
            (ext.to_string(), exists)
        }
    });
    let present = join_all(checks).await.into_iter().collect();
    DiskReport {
        safe_title,
        present,
    }
}
