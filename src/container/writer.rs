use crate::container::format::{compression_for, normalize_path, MANIFEST_PATH};
use crate::error::{AifmError, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Reject absolute paths and parent-directory traversal
fn validate_member_path(path: &str) -> Result<String> {
    let normalized = normalize_path(path);

    if normalized.is_empty()
        || normalized.starts_with('/')
        || normalized.chars().nth(1) == Some(':')
        || normalized.split('/').any(|part| part == "..")
    {
        return Err(AifmError::InvalidMemberPath(path.to_string()));
    }

    Ok(normalized)
}

/// Container writer for authoring .aifm files
pub struct ContainerWriter {
    zip: ZipWriter<BufWriter<File>>,
    members: Vec<String>,
}

impl ContainerWriter {
    /// Create a new container file, truncating any existing file
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            zip: ZipWriter::new(BufWriter::new(file)),
            members: Vec::new(),
        })
    }

    /// Add a member, choosing stored or deflated by extension
    pub fn add_member(&mut self, path: &str, data: &[u8]) -> Result<()> {
        let method = compression_for(path);
        self.add_member_with_compression(path, data, method)
    }

    /// Add a member with an explicit compression method
    pub fn add_member_with_compression(
        &mut self,
        path: &str,
        data: &[u8],
        method: zip::CompressionMethod,
    ) -> Result<()> {
        let name = validate_member_path(path)?;
        let options = SimpleFileOptions::default().compression_method(method);

        self.zip.start_file(name.as_str(), options)?;
        self.zip.write_all(data)?;
        self.members.push(name);
        Ok(())
    }

    /// Add a member from a file on disk
    pub fn add_member_from_disk(&mut self, path: &str, source: &Path) -> Result<()> {
        let data = std::fs::read(source)?;
        self.add_member(path, &data)
    }

    /// Add an explicit directory entry
    pub fn add_directory(&mut self, path: &str) -> Result<()> {
        let name = validate_member_path(path)?;
        self.zip
            .add_directory(name.as_str(), SimpleFileOptions::default())?;
        Ok(())
    }

    /// Serialize and add `manifest.json`
    pub fn add_manifest(&mut self, manifest: &serde_json::Value) -> Result<()> {
        let json = serde_json::to_vec_pretty(manifest)?;
        self.add_member(MANIFEST_PATH, &json)
    }

    /// Members written so far, in order
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Write the central directory and flush to disk
    pub fn finalize(self) -> Result<()> {
        let mut writer = self.zip.finish()?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_rejects_traversal() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut writer = ContainerWriter::create(temp_file.path()).unwrap();

        assert!(writer.add_member("../../etc/passwd", b"x").is_err());
        assert!(writer.add_member("/etc/passwd", b"x").is_err());
        assert!(writer.add_member("C:\\Windows\\x.txt", b"x").is_err());
        assert!(writer.add_member("", b"x").is_err());
        assert!(writer.members().is_empty());
    }

    #[test]
    fn test_normalizes_backslashes() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut writer = ContainerWriter::create(temp_file.path()).unwrap();

        writer.add_member("metadata\\lyrics.txt", b"la la").unwrap();
        assert_eq!(writer.members(), &["metadata/lyrics.txt"]);
        writer.finalize().unwrap();
    }
}
