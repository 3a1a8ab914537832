use crate::config::AifmConfig;
use crate::container::Container;
use crate::verify::builtin::{verify_container, BuiltinVerifier};
use crate::verify::{ContainerVerifier, Engine, VerificationOutcome};
use std::any::Any;
use std::io::{Read, Seek};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

/// Runs a verifier against a container and normalizes its result.
///
/// Uses the builtin verifier unless an external one is injected. Verifier
/// faults never escape: they become an `ERROR` outcome.
#[derive(Clone)]
pub struct VerificationEngine {
    builtin: BuiltinVerifier,
    external: Option<Arc<dyn ContainerVerifier>>,
    enabled: bool,
}

impl Default for VerificationEngine {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for VerificationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationEngine")
            .field("builtin", &self.builtin)
            .field("external", &self.external.as_ref().map(|v| v.name().to_string()))
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl VerificationEngine {
    /// Engine backed by the builtin sha256 verifier
    pub fn builtin() -> Self {
        Self {
            builtin: BuiltinVerifier::default(),
            external: None,
            enabled: true,
        }
    }

    /// Engine configured from [`AifmConfig`]
    pub fn from_config(config: &AifmConfig) -> Self {
        Self {
            builtin: BuiltinVerifier::new(config.limits.max_member_bytes),
            external: None,
            enabled: config.verify.enabled,
        }
    }

    /// Replace the builtin verifier with an external one
    pub fn with_external(mut self, verifier: Arc<dyn ContainerVerifier>) -> Self {
        self.external = Some(verifier);
        self
    }

    /// Skip verification entirely; outcomes become `UNKNOWN`
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Which engine tag outcomes carry
    pub fn engine(&self) -> Engine {
        if self.external.is_some() {
            Engine::External
        } else {
            Engine::Builtin
        }
    }

    /// Verify the container at `path`
    pub fn verify(&self, path: &Path) -> VerificationOutcome {
        let engine = self.engine();
        if !self.enabled {
            return VerificationOutcome::unknown(engine);
        }

        let verifier: &dyn ContainerVerifier = match &self.external {
            Some(external) => external.as_ref(),
            None => &self.builtin,
        };

        let outcome = match catch_unwind(AssertUnwindSafe(|| verifier.verify(path))) {
            Ok(Ok(raw)) => VerificationOutcome::from_checks(raw.ok, raw.checks, engine),
            Ok(Err(e)) => {
                tracing::warn!(verifier = verifier.name(), error = %e, "verifier failed");
                VerificationOutcome::error(verifier.name(), format!("{:#}", e), engine)
            }
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                tracing::warn!(verifier = verifier.name(), reason = %reason, "verifier panicked");
                VerificationOutcome::error(verifier.name(), reason, engine)
            }
        };

        tracing::info!(
            path = %path.display(),
            status = ?outcome.status,
            engine = ?outcome.engine,
            "verified container"
        );
        outcome
    }

    /// Verify an already opened container with the builtin algorithm.
    ///
    /// Bypasses any injected external verifier, which only accepts paths;
    /// the outcome is always tagged [`Engine::Builtin`].
    pub fn verify_builtin<R: Read + Seek>(
        &self,
        container: &mut Container<R>,
    ) -> VerificationOutcome {
        if !self.enabled {
            return VerificationOutcome::unknown(Engine::Builtin);
        }
        let raw = verify_container(container);
        VerificationOutcome::from_checks(raw.ok, raw.checks, Engine::Builtin)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "verifier panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::{CheckResult, FnVerifier, RawVerification, VerificationStatus};

    #[test]
    fn test_external_output_is_normalized() {
        let external = FnVerifier::new("verify_aifm", |_path: &Path| {
            Ok(RawVerification {
                ok: false,
                checks: vec![
                    CheckResult::pass("payload/a.wav"),
                    CheckResult::fail("manifest.json", "bytes mismatch: 10 != 12"),
                ],
            })
        });
        let engine = VerificationEngine::builtin().with_external(Arc::new(external));

        let outcome = engine.verify(Path::new("ignored.aifm"));
        assert_eq!(outcome.engine, Engine::External);
        assert!(outcome.ok);
        assert_eq!(outcome.status, VerificationStatus::IntactManifestWarn);
        assert_eq!(outcome.details.len(), 2);
    }

    #[test]
    fn test_external_error_becomes_error_outcome() {
        let external = FnVerifier::new("verify_aifm", |_path: &Path| {
            Err(anyhow::anyhow!("keyring unavailable"))
        });
        let engine = VerificationEngine::builtin().with_external(Arc::new(external));

        let outcome = engine.verify(Path::new("ignored.aifm"));
        assert!(!outcome.ok);
        assert!(outcome.available);
        assert_eq!(outcome.status, VerificationStatus::Error);
        assert_eq!(
            outcome.details,
            vec![CheckResult::fail("verify_aifm", "keyring unavailable")]
        );
    }

    #[test]
    fn test_external_panic_is_contained() {
        let external = FnVerifier::new("verify_aifm", |_path: &Path| -> anyhow::Result<RawVerification> {
            panic!("boom")
        });
        let engine = VerificationEngine::builtin().with_external(Arc::new(external));

        let outcome = engine.verify(Path::new("ignored.aifm"));
        assert_eq!(outcome.status, VerificationStatus::Error);
        assert_eq!(outcome.details[0].reason, "boom");
    }

    #[test]
    fn test_unopenable_container_is_error() {
        let outcome = VerificationEngine::builtin().verify(Path::new("/nonexistent/a.aifm"));
        assert_eq!(outcome.status, VerificationStatus::Error);
        assert_eq!(outcome.engine, Engine::Builtin);
        assert_eq!(outcome.details[0].path, "builtin");
    }

    #[test]
    fn test_verify_builtin_bypasses_external() {
        let temp_file = tempfile::NamedTempFile::new().unwrap();
        let mut writer = crate::container::ContainerWriter::create(temp_file.path()).unwrap();
        writer.add_member("payload/a.wav", b"audio").unwrap();
        writer.finalize().unwrap();

        let external = FnVerifier::new("verify_aifm", |_path: &Path| {
            Err(anyhow::anyhow!("never called"))
        });
        let engine = VerificationEngine::builtin().with_external(Arc::new(external));
        assert_eq!(engine.engine(), Engine::External);

        let mut container = Container::open(temp_file.path()).unwrap();
        let outcome = engine.verify_builtin(&mut container);
        assert_eq!(outcome.engine, Engine::Builtin);
        assert_eq!(
            outcome.details,
            vec![CheckResult::fail("manifest.json", "missing manifest.json")]
        );
    }

    #[test]
    fn test_disabled_engine_is_unknown() {
        let outcome = VerificationEngine::builtin()
            .disabled()
            .verify(Path::new("/nonexistent/a.aifm"));
        assert_eq!(outcome.status, VerificationStatus::Unknown);
        assert!(!outcome.available);
    }
}
