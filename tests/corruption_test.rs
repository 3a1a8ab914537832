//! Corruption detection
//!
//! Damaged containers must surface as well-formed outcomes, never as
//! errors or panics reaching the caller.

use aifm_rs::{
    AifmError, Container, ContainerWriter, IntegrityDeclaration, TrackDescriber,
    VerificationEngine, VerificationStatus,
};
use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom, Write};
use tempfile::NamedTempFile;

const AUDIO_MARKER: &[u8] = b"UNIQUE-AUDIO-MARKER-0123456789";

/// Helper: Create an intact container whose audio is stored uncompressed
fn create_test_container() -> NamedTempFile {
    let temp_file = NamedTempFile::new().unwrap();
    let audio = AUDIO_MARKER.repeat(8);

    let mut decl = IntegrityDeclaration::new();
    decl.add_file("payload/track.mp3", &audio);

    let mut writer = ContainerWriter::create(temp_file.path()).unwrap();
    writer
        .add_manifest(&serde_json::json!({"integrity": decl.to_value()}))
        .unwrap();
    writer
        .add_member_with_compression("payload/track.mp3", &audio, zip::CompressionMethod::Stored)
        .unwrap();
    writer.finalize().unwrap();
    temp_file
}

/// Helper: Overwrite one byte at `offset`
fn corrupt_byte_at(path: &std::path::Path, offset: u64, new_value: u8) {
    let mut file = OpenOptions::new().write(true).open(path).unwrap();
    file.seek(SeekFrom::Start(offset)).unwrap();
    file.write_all(&[new_value]).unwrap();
}

fn find(haystack: &[u8], needle: &[u8]) -> usize {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
        .unwrap()
}

#[test]
fn test_flipped_payload_byte_is_tampered() {
    let temp_file = create_test_container();
    let path = temp_file.path();

    let bytes = std::fs::read(path).unwrap();
    let offset = find(&bytes, AUDIO_MARKER);
    corrupt_byte_at(path, offset as u64, b'X');

    // The zip CRC no longer matches, so the member cannot be read back
    let mut container = Container::open(path).unwrap();
    assert!(matches!(
        container.read_member("payload/track.mp3"),
        Err(AifmError::CorruptMember { .. })
    ));

    let outcome = VerificationEngine::builtin().verify(path);
    assert!(!outcome.ok);
    assert_eq!(outcome.status, VerificationStatus::Tampered);
    assert_eq!(outcome.details[0].path, "payload/track.mp3");
    assert!(outcome.details[0].reason.starts_with("unreadable:"));
}

#[test]
fn test_truncated_container_is_error() {
    let temp_file = create_test_container();
    let path = temp_file.path();

    let len = std::fs::metadata(path).unwrap().len();
    OpenOptions::new()
        .write(true)
        .open(path)
        .unwrap()
        .set_len(len / 2)
        .unwrap();

    assert!(matches!(
        Container::open(path),
        Err(AifmError::InvalidArchive(_))
    ));

    let track = TrackDescriber::default().describe(path);
    assert_eq!(track.verify.status, VerificationStatus::Error);
    assert!(!track.verify.ok);
    assert!(!track.assets.cover.exists);
    assert_eq!(track.fields.author, "—");
}

#[test]
fn test_empty_file_is_error() {
    let temp_file = NamedTempFile::new().unwrap();

    let outcome = VerificationEngine::builtin().verify(temp_file.path());
    assert_eq!(outcome.status, VerificationStatus::Error);
    assert_eq!(outcome.details.len(), 1);
}
