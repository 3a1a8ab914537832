use crate::verify::CheckResult;
use std::path::Path;

/// Raw verifier output, before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawVerification {
    /// The verifier's own verdict
    pub ok: bool,
    /// Every check performed, in order
    pub checks: Vec<CheckResult>,
}

/// A swappable container verifier.
///
/// Implementations receive the container's path and report their own
/// checks; the engine normalizes them. Errors and panics are caught by the
/// engine and surface as an `ERROR` outcome.
pub trait ContainerVerifier: Send + Sync {
    /// Name reported as the failing path when the verifier itself faults
    fn name(&self) -> &str;

    fn verify(&self, container: &Path) -> anyhow::Result<RawVerification>;
}

/// Adapter turning a closure into a [`ContainerVerifier`]
pub struct FnVerifier<F> {
    name: String,
    verify: F,
}

impl<F> FnVerifier<F>
where
    F: Fn(&Path) -> anyhow::Result<RawVerification> + Send + Sync,
{
    pub fn new(name: impl Into<String>, verify: F) -> Self {
        Self {
            name: name.into(),
            verify,
        }
    }
}

impl<F> ContainerVerifier for FnVerifier<F>
where
    F: Fn(&Path) -> anyhow::Result<RawVerification> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn verify(&self, container: &Path) -> anyhow::Result<RawVerification> {
        (self.verify)(container)
    }
}
