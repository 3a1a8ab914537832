use crate::container::{Container, DEFAULT_MAX_MEMBER_BYTES, MANIFEST_PATH};
use crate::manifest::{sha256_hex, HashedFile, IntegrityPrecondition, Manifest};
use crate::verify::{CheckResult, Classification, ContainerVerifier, RawVerification};
use std::io::{Read, Seek};
use std::path::Path;

pub const BUILTIN_VERIFIER_NAME: &str = "builtin";

/// Check every file declared in `integrity.hashed_files`.
///
/// Preconditions (missing manifest, unsupported algorithm, empty file table)
/// produce exactly one failing check. Otherwise every declared entry is
/// checked in declared order, with no early exit.
pub fn verify_container<R: Read + Seek>(container: &mut Container<R>) -> RawVerification {
    if !container.contains(MANIFEST_PATH) {
        return single_failure(MANIFEST_PATH, "missing manifest.json");
    }

    let manifest = Manifest::from_container(container);
    let declaration = match manifest.integrity() {
        Ok(declaration) => declaration,
        Err(IntegrityPrecondition::UnsupportedAlgorithm(algorithm)) => {
            return single_failure(
                "integrity.algorithm",
                format!("unsupported algorithm: {}", algorithm),
            );
        }
        Err(IntegrityPrecondition::MissingHashedFiles) => {
            return single_failure("integrity.hashed_files", "missing/empty hashed_files");
        }
    };

    let checks: Vec<CheckResult> = declaration
        .hashed_files
        .iter()
        .map(|file| check_file(container, file))
        .collect();

    for failed in checks.iter().filter(|check| !check.ok) {
        tracing::warn!(member = %failed.path, reason = %failed.reason, "integrity check failed");
    }

    let classification = Classification::of(&checks);
    RawVerification {
        ok: !classification.non_manifest_failed,
        checks,
    }
}

fn single_failure(path: &str, reason: impl Into<String>) -> RawVerification {
    let check = CheckResult::fail(path, reason);
    tracing::warn!(path = %check.path, reason = %check.reason, "integrity precondition failed");
    RawVerification {
        ok: false,
        checks: vec![check],
    }
}

/// Size is checked before digest
fn check_file<R: Read + Seek>(container: &mut Container<R>, file: &HashedFile) -> CheckResult {
    // Declared keys must name a member verbatim
    if !container.contains_exact(&file.path) {
        return CheckResult::fail(&file.path, "missing file");
    }

    let data = match container.read_member(&file.path) {
        Ok(data) => data,
        Err(e) => return CheckResult::fail(&file.path, format!("unreadable: {}", e)),
    };

    if let Some(expected) = file.bytes {
        let actual = data.len();
        if i64::try_from(actual).ok() != Some(expected) {
            return CheckResult::fail(
                &file.path,
                format!("bytes mismatch: {} != {}", actual, expected),
            );
        }
    }

    if let Some(expected) = &file.sha256 {
        if &sha256_hex(&data) != expected {
            return CheckResult::fail(&file.path, "sha256 mismatch");
        }
    }

    CheckResult::pass(&file.path)
}

/// The default verifier: sha256 over `integrity.hashed_files`
#[derive(Debug, Clone, Copy)]
pub struct BuiltinVerifier {
    max_member_bytes: u64,
}

impl Default for BuiltinVerifier {
    fn default() -> Self {
        Self {
            max_member_bytes: DEFAULT_MAX_MEMBER_BYTES,
        }
    }
}

impl BuiltinVerifier {
    pub fn new(max_member_bytes: u64) -> Self {
        Self { max_member_bytes }
    }
}

impl ContainerVerifier for BuiltinVerifier {
    fn name(&self) -> &str {
        BUILTIN_VERIFIER_NAME
    }

    fn verify(&self, container: &Path) -> anyhow::Result<RawVerification> {
        let mut container = Container::open(container)?.with_member_limit(self.max_member_bytes);
        Ok(verify_container(&mut container))
    }
}
