//! Integration tests for aifm-rs library

use aifm_rs::manifest::sha256_hex;
use aifm_rs::{
    AssetKind, CheckResult, Container, ContainerWriter, Engine, FnVerifier, IntegrityDeclaration,
    RawVerification, TrackDescriber, VerificationEngine, VerificationStatus,
};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;

const AUDIO: &[u8] = b"RIFF....WAVEfmt fake audio payload";
const COVER: &[u8] = b"\x89PNG fake cover";
const LYRICS: &[u8] = b"la la la";

/// Helper: Write a container with the given manifest and members
fn write_container(manifest: Option<&Value>, members: &[(&str, &[u8])]) -> NamedTempFile {
    let temp_file = NamedTempFile::new().unwrap();
    let mut writer = ContainerWriter::create(temp_file.path()).unwrap();
    if let Some(manifest) = manifest {
        writer.add_manifest(manifest).unwrap();
    }
    for (path, data) in members {
        writer.add_member(path, data).unwrap();
    }
    writer.finalize().unwrap();
    temp_file
}

/// Helper: Manifest declaring correct digests for the standard members
fn honest_manifest() -> Value {
    let mut decl = IntegrityDeclaration::new();
    decl.add_file("payload/track.wav", AUDIO);
    decl.add_file("metadata/cover.png", COVER);
    decl.add_file("metadata/lyrics.txt", LYRICS);

    json!({
        "creator": {"name": "Ada Lovelace"},
        "origin": {"ai_platform": "Suno", "primary_url": "https://example.com/t/1"},
        "verification": {"tier": "gold"},
        "aifx": {"governance": {"mode": "declared"}},
        "integrity": decl.to_value(),
    })
}

fn standard_members() -> Vec<(&'static str, &'static [u8])> {
    vec![
        ("payload/track.wav", AUDIO),
        ("metadata/cover.png", COVER),
        ("metadata/lyrics.txt", LYRICS),
    ]
}

fn verify(path: &Path) -> aifm_rs::VerificationOutcome {
    VerificationEngine::builtin().verify(path)
}

#[test]
fn test_untouched_container_is_intact() {
    let temp_file = write_container(Some(&honest_manifest()), &standard_members());
    let outcome = verify(temp_file.path());

    assert!(outcome.ok);
    assert_eq!(outcome.status, VerificationStatus::Intact);
    assert_eq!(outcome.engine, Engine::Builtin);
    assert!(outcome.available);
    assert_eq!(outcome.details.len(), 3);
    assert_eq!(outcome.failures().count(), 0);
}

#[test]
fn test_only_manifest_entry_failing_warns() {
    let mut manifest = honest_manifest();
    manifest["integrity"]["hashed_files"]["manifest.json"] =
        json!({"sha256": sha256_hex(b"an older manifest"), "bytes": 17});

    let temp_file = write_container(Some(&manifest), &standard_members());
    let outcome = verify(temp_file.path());

    assert!(outcome.ok);
    assert_eq!(outcome.status, VerificationStatus::IntactManifestWarn);
    let failures: Vec<_> = outcome.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].path, "manifest.json");
}

#[test]
fn test_payload_mismatch_is_tampered_regardless_of_manifest_entry() {
    let mut manifest = honest_manifest();
    manifest["integrity"]["hashed_files"]["manifest.json"] = json!({"bytes": 1});

    let members = vec![
        ("payload/track.wav", b"RIFF....WAVEfmt FAKE audio payload" as &[u8]),
        ("metadata/cover.png", COVER),
        ("metadata/lyrics.txt", LYRICS),
    ];
    let temp_file = write_container(Some(&manifest), &members);
    let outcome = verify(temp_file.path());

    assert!(!outcome.ok);
    assert_eq!(outcome.status, VerificationStatus::Tampered);
    assert_eq!(
        outcome.details[0],
        CheckResult::fail("payload/track.wav", "sha256 mismatch")
    );
    // Every declared entry is still reported
    assert_eq!(outcome.details.len(), 4);
}

#[test]
fn test_size_checked_before_digest() {
    let mut manifest = honest_manifest();
    manifest["integrity"]["hashed_files"]["metadata/cover.png"] =
        json!({"sha256": sha256_hex(b"something else"), "bytes": 3});

    let temp_file = write_container(Some(&manifest), &standard_members());
    let outcome = verify(temp_file.path());

    let cover = outcome
        .details
        .iter()
        .find(|check| check.path == "metadata/cover.png")
        .unwrap();
    assert_eq!(
        cover.reason,
        format!("bytes mismatch: {} != 3", COVER.len())
    );
    assert_eq!(outcome.status, VerificationStatus::Tampered);
}

#[test]
fn test_missing_declared_file_is_tampered() {
    let members = vec![("payload/track.wav", AUDIO), ("metadata/cover.png", COVER)];
    let temp_file = write_container(Some(&honest_manifest()), &members);
    let outcome = verify(temp_file.path());

    assert_eq!(outcome.status, VerificationStatus::Tampered);
    assert!(outcome
        .details
        .contains(&CheckResult::fail("metadata/lyrics.txt", "missing file")));
}

#[test]
fn test_empty_hashed_files_is_tampered_not_warn() {
    let manifest = json!({"integrity": {"algorithm": "sha256", "hashed_files": {}}});
    let temp_file = write_container(Some(&manifest), &standard_members());
    let outcome = verify(temp_file.path());

    assert!(!outcome.ok);
    assert_eq!(outcome.status, VerificationStatus::Tampered);
    assert_eq!(
        outcome.details,
        vec![CheckResult::fail(
            "integrity.hashed_files",
            "missing/empty hashed_files"
        )]
    );
}

#[test]
fn test_unsupported_algorithm_is_tampered() {
    let mut manifest = honest_manifest();
    manifest["integrity"]["algorithm"] = json!("blake3");

    let temp_file = write_container(Some(&manifest), &standard_members());
    let outcome = verify(temp_file.path());

    assert_eq!(outcome.status, VerificationStatus::Tampered);
    assert_eq!(
        outcome.details,
        vec![CheckResult::fail(
            "integrity.algorithm",
            "unsupported algorithm: blake3"
        )]
    );
}

/// A container with no manifest at all produces a single manifest.json
/// failure and, because only manifest.json failed, normalizes to the same
/// lenient warning as a drifted manifest hash. This pins current behavior;
/// change it deliberately if an absent manifest should count as tampering.
#[test]
fn test_absent_manifest_normalizes_to_manifest_warn() {
    let temp_file = write_container(None, &standard_members());
    let outcome = verify(temp_file.path());

    assert_eq!(
        outcome.details,
        vec![CheckResult::fail("manifest.json", "missing manifest.json")]
    );
    assert!(outcome.ok);
    assert_eq!(outcome.status, VerificationStatus::IntactManifestWarn);
}

#[test]
fn test_describe_composes_fields_assets_and_verification() {
    let mut members = standard_members();
    members.push(("metadata/declaration.pdf", &b"%PDF-1.7"[..]));
    members.push(("metadata/suno_prompt.txt", &b"dreamy synthwave"[..]));

    let temp_file = write_container(Some(&honest_manifest()), &members);
    let track = TrackDescriber::default().describe(temp_file.path());

    assert_eq!(track.fields.author, "Ada Lovelace");
    assert_eq!(track.fields.ai_system, "Suno");
    assert_eq!(track.fields.tier, "gold");
    assert_eq!(track.fields.mode, "declared");
    assert_eq!(track.fields.origin_url, "https://example.com/t/1");

    assert_eq!(track.verify.status, VerificationStatus::Intact);

    assert_eq!(track.assets.cover.member.as_deref(), Some("metadata/cover.png"));
    assert_eq!(track.assets.declaration.extension, "pdf");
    assert_eq!(
        track.assets.prompt.member.as_deref(),
        Some("metadata/suno_prompt.txt")
    );
    assert_eq!(
        track.assets.lyrics.member.as_deref(),
        Some("metadata/lyrics.txt")
    );
    assert!(track.assets.manifest.exists);

    let value = serde_json::to_value(&track).unwrap();
    assert_eq!(value["verify"]["status"], "INTACT");
    assert_eq!(value["assets"]["cover"]["exists"], true);
    assert_eq!(value["fields"]["tier"], "gold");
}

#[test]
fn test_describe_without_manifest_uses_placeholders() {
    let temp_file = write_container(None, &standard_members());
    let track = TrackDescriber::default().describe(temp_file.path());

    assert_eq!(track.fields.author, "—");
    assert_eq!(track.fields.origin_url, "");
    assert!(!track.assets.manifest.exists);
    assert!(track.assets.cover.exists);
}

#[test]
fn test_read_asset() {
    let temp_file = write_container(Some(&honest_manifest()), &standard_members());
    let describer = TrackDescriber::default();

    let cover = describer
        .read_asset(temp_file.path(), AssetKind::Cover)
        .unwrap()
        .unwrap();
    assert_eq!(cover.member, "metadata/cover.png");
    assert_eq!(cover.data, COVER);
    assert_eq!(cover.media_type, "image/png");

    assert!(describer
        .read_asset(temp_file.path(), AssetKind::Declaration)
        .unwrap()
        .is_none());
}

#[test]
fn test_external_verifier_replaces_builtin() {
    let temp_file = write_container(None, &standard_members());
    let external = FnVerifier::new("verify_aifm", |path: &Path| {
        let container = Container::open(path)?;
        let checks = container
            .members()
            .iter()
            .map(|member| CheckResult::pass(member.as_str()))
            .collect();
        Ok(RawVerification { ok: true, checks })
    });

    let describer = TrackDescriber::default().with_external(Arc::new(external));
    let track = describer.describe(temp_file.path());

    assert_eq!(track.verify.engine, Engine::External);
    assert_eq!(track.verify.status, VerificationStatus::Intact);
    assert_eq!(track.verify.details.len(), 3);
}
