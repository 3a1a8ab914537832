//! Integrity verification for AIFM containers
//!
//! Checks come from either the builtin sha256 verifier or an injected
//! [`ContainerVerifier`]. Both feed the same normalization: any failure on a
//! path other than `manifest.json` is tamper evidence, while failures confined
//! to `manifest.json` only raise a warning.

mod builtin;
mod engine;
mod external;

pub use builtin::{verify_container, BuiltinVerifier};
pub use engine::VerificationEngine;
pub use external::{ContainerVerifier, FnVerifier, RawVerification};

use crate::container::MANIFEST_PATH;
use serde::{Deserialize, Serialize};

/// Outcome of checking one entity (a precondition or a declared file)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub ok: bool,
    pub path: String,
    /// Empty when `ok`
    #[serde(default)]
    pub reason: String,
}

impl CheckResult {
    pub fn pass(path: impl Into<String>) -> Self {
        Self {
            ok: true,
            path: path.into(),
            reason: String::new(),
        }
    }

    pub fn fail(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether this check concerns the manifest member itself
    pub fn is_manifest(&self) -> bool {
        self.path == MANIFEST_PATH
    }
}

/// Tri-state verification status (plus error and not-run states)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    Intact,
    IntactManifestWarn,
    Tampered,
    Error,
    Unknown,
}

impl VerificationStatus {
    /// Badge text shown to users
    pub fn label(&self) -> &'static str {
        match self {
            VerificationStatus::Intact => "INTACT",
            VerificationStatus::IntactManifestWarn => "INTACT (MANIFEST WARN)",
            VerificationStatus::Tampered => "TAMPERED",
            VerificationStatus::Error => "ERROR",
            VerificationStatus::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}

/// Which verifier produced an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Builtin,
    External,
}

/// Failing checks split by whether they concern `manifest.json`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classification {
    pub non_manifest_failed: bool,
    pub manifest_failed: bool,
}

impl Classification {
    pub fn of(details: &[CheckResult]) -> Self {
        details
            .iter()
            .filter(|check| !check.ok)
            .fold(Self::default(), |mut acc, check| {
                if check.is_manifest() {
                    acc.manifest_failed = true;
                } else {
                    acc.non_manifest_failed = true;
                }
                acc
            })
    }
}

/// Normalized verification result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub ok: bool,
    pub status: VerificationStatus,
    pub details: Vec<CheckResult>,
    /// False when verification was not run
    pub available: bool,
    pub engine: Engine,
}

impl VerificationOutcome {
    /// Normalize a raw check list.
    ///
    /// - any non-manifest failure: TAMPERED
    /// - only `manifest.json` failures: INTACT_MANIFEST_WARN (ok)
    /// - no failures: INTACT, unless the verifier itself reported failure
    pub fn from_checks(reported_ok: bool, details: Vec<CheckResult>, engine: Engine) -> Self {
        let classification = Classification::of(&details);

        let (ok, status) = if classification.non_manifest_failed {
            (false, VerificationStatus::Tampered)
        } else if classification.manifest_failed {
            (true, VerificationStatus::IntactManifestWarn)
        } else if reported_ok {
            (true, VerificationStatus::Intact)
        } else {
            (false, VerificationStatus::Tampered)
        };

        Self {
            ok,
            status,
            details,
            available: true,
            engine,
        }
    }

    /// Verifier fault: a single failing detail naming its source
    pub fn error(source: impl Into<String>, reason: impl Into<String>, engine: Engine) -> Self {
        Self {
            ok: false,
            status: VerificationStatus::Error,
            details: vec![CheckResult::fail(source, reason)],
            available: true,
            engine,
        }
    }

    /// Verification not run
    pub fn unknown(engine: Engine) -> Self {
        Self {
            ok: false,
            status: VerificationStatus::Unknown,
            details: Vec::new(),
            available: false,
            engine,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.details.iter().filter(|check| !check.ok)
    }

    pub fn is_manifest_warn(&self) -> bool {
        self.status == VerificationStatus::IntactManifestWarn
    }
}
