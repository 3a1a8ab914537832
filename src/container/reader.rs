use crate::container::format::{is_audio, normalize_path, DEFAULT_MAX_MEMBER_BYTES, PAYLOAD_PREFIX};
use crate::error::{AifmError, Result};
use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use zip::result::ZipError;
use zip::ZipArchive;

/// Upper bound on the buffer preallocated from a member's declared size
const INITIAL_READ_CAPACITY: u64 = 64 * 1024;

/// An opened AIFM container.
///
/// Owns the archive handle for the duration of one operation. Nothing read
/// through it is cached; callers decide their own caching policy.
pub struct Container<R = File> {
    archive: ZipArchive<R>,
    members: Vec<String>,
    index: HashSet<String>,
    max_member_bytes: u64,
}

impl Container<File> {
    /// Open a container file for reading
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "opening container");

        let file = File::open(path)
            .map_err(|e| AifmError::InvalidArchive(format!("{}: {}", path.display(), e)))?;
        Self::from_reader(file)
    }
}

impl<R: Read + Seek> Container<R> {
    /// Open a container from any seekable reader
    pub fn from_reader(reader: R) -> Result<Self> {
        let mut archive =
            ZipArchive::new(reader).map_err(|e| AifmError::InvalidArchive(e.to_string()))?;

        let mut members = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let entry = archive
                .by_index_raw(i)
                .map_err(|e| AifmError::InvalidArchive(e.to_string()))?;
            if entry.is_dir() || entry.name().is_empty() {
                continue;
            }
            members.push(entry.name().to_string());
        }

        let index = members.iter().cloned().collect();

        Ok(Self {
            archive,
            members,
            index,
            max_member_bytes: DEFAULT_MAX_MEMBER_BYTES,
        })
    }

    /// Set the upper bound on the uncompressed size of any member read
    pub fn with_member_limit(mut self, max_member_bytes: u64) -> Self {
        self.max_member_bytes = max_member_bytes;
        self
    }

    /// Member paths in archive order, directory entries excluded
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Number of non-directory members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Check if a member exists in the container
    pub fn contains(&self, path: &str) -> bool {
        self.index.contains(path) || self.index.contains(&normalize_path(path))
    }

    /// Check for a member stored under exactly `path`, without normalization
    pub fn contains_exact(&self, path: &str) -> bool {
        self.index.contains(path)
    }

    /// Members whose path starts with `prefix`, in archive order
    pub fn list_prefix(&self, prefix: &str) -> Vec<&String> {
        self.members
            .iter()
            .filter(|path| path.starts_with(prefix))
            .collect()
    }

    /// First audio member under `payload/`, in archive order
    pub fn audio_member(&self) -> Option<&String> {
        self.members
            .iter()
            .find(|path| path.starts_with(PAYLOAD_PREFIX) && is_audio(path))
    }

    /// Read the raw bytes of a member
    pub fn read_member(&mut self, path: &str) -> Result<Vec<u8>> {
        let name = if self.index.contains(path) {
            path.to_string()
        } else {
            let normalized = normalize_path(path);
            if !self.index.contains(&normalized) {
                return Err(AifmError::MemberNotFound(path.to_string()));
            }
            normalized
        };

        let limit = self.max_member_bytes;
        let mut entry = self.archive.by_name(&name).map_err(|e| match e {
            ZipError::FileNotFound => AifmError::MemberNotFound(name.clone()),
            other => AifmError::CorruptMember {
                path: name.clone(),
                reason: other.to_string(),
            },
        })?;

        let declared = entry.size();
        if declared > limit {
            return Err(AifmError::MemberTooLarge {
                path: name,
                size: declared,
                limit,
            });
        }

        // Headers can lie about the uncompressed size, so cap the read as well
        let mut data = Vec::with_capacity(declared.min(INITIAL_READ_CAPACITY) as usize);
        (&mut entry)
            .take(limit.saturating_add(1))
            .read_to_end(&mut data)
            .map_err(|e| AifmError::CorruptMember {
                path: name.clone(),
                reason: e.to_string(),
            })?;

        if data.len() as u64 > limit {
            return Err(AifmError::MemberTooLarge {
                path: name,
                size: data.len() as u64,
                limit,
            });
        }

        tracing::debug!(member = %name, bytes = data.len(), "read member");
        Ok(data)
    }
}
