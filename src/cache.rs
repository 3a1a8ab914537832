//! Keyed caches for derived container data and the playlist that owns them.
//!
//! Everything derived from a container is a pure function of its bytes, so
//! cache entries are keyed by path plus a modification signature and are
//! dropped wholesale when the playlist is reloaded.

use crate::assets::AssetKind;
use crate::config::AifmConfig;
use crate::container::{extension_of, file_stem_of, Container, DEFAULT_MAX_MEMBER_BYTES};
use crate::error::{AifmError, Result};
use crate::manifest::sha256_hex;
use crate::track::{AssetContent, TrackDescriber, TrackDescriptor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::time::SystemTime;
use tempfile::TempDir;

/// Modification signature of a container file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    pub modified: Option<SystemTime>,
    pub len: u64,
}

impl Signature {
    /// `None` when the file cannot be stat'ed
    pub fn of(path: &Path) -> Option<Self> {
        let metadata = std::fs::metadata(path).ok()?;
        Some(Self {
            modified: metadata.modified().ok(),
            len: metadata.len(),
        })
    }
}

type Slot = Arc<OnceLock<Arc<TrackDescriptor>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic while holding the lock leaves the map itself consistent
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Track descriptors keyed by container identity.
///
/// Concurrent requests for the same key wait for a single computation.
#[derive(Debug, Default)]
pub struct TrackCache {
    entries: Mutex<HashMap<PathBuf, (Signature, Slot)>>,
}

impl TrackCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached descriptor for `path`, computing it with `describe` on a miss
    /// or when the file changed since it was cached
    pub fn get_or_describe<F>(&self, path: &Path, describe: F) -> Arc<TrackDescriptor>
    where
        F: FnOnce(&Path) -> TrackDescriptor,
    {
        let Some(signature) = Signature::of(path) else {
            return Arc::new(describe(path));
        };

        let slot = {
            let mut entries = lock(&self.entries);
            match entries.get(path) {
                Some((cached, slot)) if *cached == signature => Arc::clone(slot),
                _ => {
                    let slot: Slot = Arc::new(OnceLock::new());
                    entries.insert(path.to_path_buf(), (signature, Arc::clone(&slot)));
                    slot
                }
            }
        };

        Arc::clone(slot.get_or_init(|| Arc::new(describe(path))))
    }

    /// Cached descriptor without computing one
    pub fn get(&self, path: &Path) -> Option<Arc<TrackDescriptor>> {
        let signature = Signature::of(path)?;
        let entries = lock(&self.entries);
        match entries.get(path) {
            Some((cached, slot)) if *cached == signature => slot.get().cloned(),
            _ => None,
        }
    }

    pub fn invalidate(&self, path: &Path) {
        lock(&self.entries).remove(path);
    }

    pub fn clear(&self) {
        lock(&self.entries).clear();
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

enum CacheDir {
    Temp(TempDir),
    Fixed(PathBuf),
}

impl CacheDir {
    fn path(&self) -> &Path {
        match self {
            CacheDir::Temp(dir) => dir.path(),
            CacheDir::Fixed(path) => path,
        }
    }
}

/// Payload audio extracted to disk so it can be served as a plain file
pub struct PayloadCache {
    dir: CacheDir,
    max_member_bytes: u64,
    extracted: Mutex<HashMap<PathBuf, (Option<Signature>, PathBuf)>>,
}

impl std::fmt::Debug for PayloadCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadCache")
            .field("dir", &self.dir.path())
            .field("extracted", &lock(&self.extracted).len())
            .finish()
    }
}

impl PayloadCache {
    /// Cache in a fresh temporary directory, removed on drop
    pub fn temporary() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("aifm_audio_cache_").tempdir()?;
        Ok(Self::with_dir(CacheDir::Temp(dir)))
    }

    /// Cache in `dir`, creating it if needed
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self::with_dir(CacheDir::Fixed(dir)))
    }

    pub fn from_config(config: &AifmConfig) -> Result<Self> {
        let cache = match &config.cache.payload_dir {
            Some(dir) => Self::in_dir(dir)?,
            None => Self::temporary()?,
        };
        Ok(cache.with_member_limit(config.limits.max_member_bytes))
    }

    fn with_dir(dir: CacheDir) -> Self {
        Self {
            dir,
            max_member_bytes: DEFAULT_MAX_MEMBER_BYTES,
            extracted: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_member_limit(mut self, max_member_bytes: u64) -> Self {
        self.max_member_bytes = max_member_bytes;
        self
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the extracted audio for `container_path`, extracting it on
    /// first use and again whenever the container file changes.
    ///
    /// Output lands in `<dir>/<identity>/<container stem><ext>`, where the
    /// identity is derived from the canonical container path.
    pub fn audio_file(&self, container_path: &Path) -> Result<PathBuf> {
        let key = std::fs::canonicalize(container_path)
            .unwrap_or_else(|_| container_path.to_path_buf());
        let signature = Signature::of(&key);

        let mut extracted = lock(&self.extracted);
        if let Some((cached, out)) = extracted.get(&key) {
            if signature.is_some() && *cached == signature {
                return Ok(out.clone());
            }
        }

        let mut container =
            Container::open(container_path)?.with_member_limit(self.max_member_bytes);
        let member = container
            .audio_member()
            .ok_or(AifmError::NoAudioPayload)?
            .clone();

        let stem = container_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_stem_of(&member).to_string());
        let entry_dir = self.dir.path().join(identity_of(&key));
        std::fs::create_dir_all(&entry_dir)?;
        let out = entry_dir.join(format!("{}{}", stem, extension_of(&member)));

        let data = container.read_member(&member)?;
        std::fs::write(&out, data)?;
        tracing::debug!(container = %container_path.display(), out = %out.display(), "extracted payload audio");

        extracted.insert(key, (signature, out.clone()));
        Ok(out)
    }

    /// Forget extracted entries; files already on disk are left in place
    pub fn clear(&self) {
        lock(&self.extracted).clear();
    }
}

/// Short stable directory name for a container path
fn identity_of(path: &Path) -> String {
    let digest = sha256_hex(path.to_string_lossy().as_bytes());
    digest[..16].to_string()
}

/// One playlist entry as shown to users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackEntry {
    pub title: String,
    pub path: PathBuf,
}

/// Ordered set of containers plus the caches derived from them
#[derive(Debug)]
pub struct Playlist {
    tracks: Vec<PathBuf>,
    version: u64,
    describer: TrackDescriber,
    info: TrackCache,
    payloads: PayloadCache,
}

impl Playlist {
    pub fn new(describer: TrackDescriber, payloads: PayloadCache) -> Self {
        Self {
            tracks: Vec::new(),
            version: 0,
            describer,
            info: TrackCache::new(),
            payloads,
        }
    }

    pub fn from_config(config: &AifmConfig) -> Result<Self> {
        Ok(Self::new(
            TrackDescriber::from_config(config),
            PayloadCache::from_config(config)?,
        ))
    }

    /// Replace the tracks and drop every cached derivation
    pub fn load_tracks(&mut self, tracks: Vec<PathBuf>) {
        self.tracks = tracks;
        self.invalidate();
        tracing::info!(count = self.tracks.len(), version = self.version, "loaded playlist");
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.version += 1;
        self.info.clear();
        self.payloads.clear();
    }

    /// Bumped on every reload or clear
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn entries(&self) -> Vec<TrackEntry> {
        self.tracks
            .iter()
            .map(|path| TrackEntry {
                title: path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                path: path.clone(),
            })
            .collect()
    }

    /// Track at `index`, clamped into range; `None` when empty
    pub fn track(&self, index: usize) -> Option<&Path> {
        let last = self.tracks.len().checked_sub(1)?;
        self.tracks.get(index.min(last)).map(PathBuf::as_path)
    }

    /// Descriptor for the track at `index` (clamped), cached per container
    pub fn track_info(&self, index: usize) -> Option<Arc<TrackDescriptor>> {
        let path = self.track(index)?;
        Some(
            self.info
                .get_or_describe(path, |path| self.describer.describe(path)),
        )
    }

    /// Extracted payload audio for the track at `index` (clamped)
    pub fn audio_file(&self, index: usize) -> Result<Option<PathBuf>> {
        match self.track(index) {
            Some(path) => self.payloads.audio_file(path).map(Some),
            None => Ok(None),
        }
    }

    /// Bytes of an asset of the track at `index` (clamped)
    pub fn asset(&self, index: usize, kind: AssetKind) -> Result<Option<AssetContent>> {
        match self.track(index) {
            Some(path) => self.describer.read_asset(path, kind),
            None => Ok(None),
        }
    }

    pub fn cache(&self) -> &TrackCache {
        &self.info
    }
}
