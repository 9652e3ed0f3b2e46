//! Generated animation handles and the single "current video" slot.

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tempfile::{Builder, NamedTempFile, TempPath};
use tokio::sync::watch;
use tracing::debug;

static NEXT_ASSET_ID: AtomicU64 = AtomicU64::new(1);

/// A locally addressable animation produced by the video backend.
///
/// The payload lives in a temporary file that is removed when the last handle
/// to the asset is dropped. Dropping is the release.
pub struct VideoAsset {
    id: u64,
    size: u64,
    path: TempPath,
}

impl VideoAsset {
    /// Write `bytes` into a fresh `.mp4` temporary file under `dir`.
    pub fn from_bytes(dir: &Path, bytes: &[u8]) -> io::Result<Self> {
        let mut file = Self::create_file(dir)?;
        file.write_all(bytes)?;
        file.as_file_mut().sync_all()?;
        Ok(Self::from_temp_path(file.into_temp_path(), bytes.len() as u64))
    }

    pub(crate) fn create_file(dir: &Path) -> io::Result<NamedTempFile> {
        std::fs::create_dir_all(dir)?;
        Builder::new()
            .prefix("tutorlens-")
            .suffix(".mp4")
            .tempfile_in(dir)
    }

    /// Take ownership of a finished payload. The file is removed when the
    /// asset is dropped.
    pub(crate) fn from_temp_path(path: TempPath, size: u64) -> Self {
        Self {
            id: NEXT_ASSET_ID.fetch_add(1, Ordering::Relaxed),
            size,
            path,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Copy the payload to a permanent location. The asset itself is left
    /// untouched and is still released on drop.
    pub fn save_copy(&self, destination: &Path) -> io::Result<PathBuf> {
        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(&self.path, destination)?;
        Ok(destination.to_path_buf())
    }
}

impl fmt::Debug for VideoAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoAsset")
            .field("id", &self.id)
            .field("size", &self.size)
            .field("path", &self.path.to_path_buf())
            .finish()
    }
}

impl Drop for VideoAsset {
    fn drop(&mut self) {
        debug!(asset = self.id, "releasing video asset");
    }
}

/// Holds the asset currently on display. Only a successful generation
/// replaces it; only a session reset clears it.
#[derive(Debug)]
pub struct VideoSlot {
    tx: watch::Sender<Option<Arc<VideoAsset>>>,
}

impl VideoSlot {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Install `asset` and release the one it replaces. A caller still holding
    /// a handle from [`VideoSlot::get`] keeps the old file alive until that
    /// handle is dropped.
    pub fn set(&self, asset: VideoAsset) {
        let id = asset.id();
        let previous = self.tx.send_replace(Some(Arc::new(asset)));
        if let Some(previous) = previous {
            debug!(replaced = previous.id(), current = id, "video slot replaced");
        }
    }

    pub fn get(&self) -> Option<Arc<VideoAsset>> {
        self.tx.borrow().clone()
    }

    pub fn clear(&self) {
        if let Some(previous) = self.tx.send_replace(None) {
            debug!(released = previous.id(), "video slot cleared");
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<VideoAsset>>> {
        self.tx.subscribe()
    }
}

impl Default for VideoSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn from_bytes_writes_payload() {
        let dir = TempDir::new().unwrap();
        let asset = VideoAsset::from_bytes(dir.path(), b"mp4-bytes").unwrap();

        assert_eq!(asset.size(), 9);
        assert_eq!(std::fs::read(asset.path()).unwrap(), b"mp4-bytes");
        assert_eq!(asset.path().extension().unwrap(), "mp4");
    }

    #[test]
    fn replacing_releases_previous_asset() {
        let dir = TempDir::new().unwrap();
        let slot = VideoSlot::new();
        let first = VideoAsset::from_bytes(dir.path(), b"one").unwrap();
        let first_path = first.path().to_path_buf();
        slot.set(first);
        assert!(first_path.exists());

        let second = VideoAsset::from_bytes(dir.path(), b"two").unwrap();
        let second_id = second.id();
        slot.set(second);

        assert!(!first_path.exists());
        assert_eq!(slot.get().map(|a| a.id()), Some(second_id));
    }

    #[test]
    fn clear_empties_slot_and_releases() {
        let dir = TempDir::new().unwrap();
        let slot = VideoSlot::new();
        let asset = VideoAsset::from_bytes(dir.path(), b"x").unwrap();
        let path = asset.path().to_path_buf();
        slot.set(asset);

        slot.clear();

        assert!(slot.get().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn outstanding_handles_delay_release() {
        let dir = TempDir::new().unwrap();
        let slot = VideoSlot::new();
        slot.set(VideoAsset::from_bytes(dir.path(), b"held").unwrap());
        let held = slot.get().unwrap();

        slot.set(VideoAsset::from_bytes(dir.path(), b"next").unwrap());
        assert!(held.path().exists());

        let path = held.path().to_path_buf();
        drop(held);
        assert!(!path.exists());
    }

    #[test]
    fn save_copy_outlives_asset() {
        let dir = TempDir::new().unwrap();
        let asset = VideoAsset::from_bytes(dir.path(), b"keep").unwrap();
        let dest = dir.path().join("saved").join("out.mp4");

        asset.save_copy(&dest).unwrap();
        drop(asset);

        assert_eq!(std::fs::read(&dest).unwrap(), b"keep");
    }
}
