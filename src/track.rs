//! Track descriptors: everything the presentation layer needs about one container.

use crate::assets::{resolve, AssetKind, AssetSet};
use crate::config::{AifmConfig, DEFAULT_PLACEHOLDER};
use crate::container::{media_type, Container, DEFAULT_MAX_MEMBER_BYTES};
use crate::error::Result;
use crate::manifest::{Manifest, TrackFields};
use crate::verify::{ContainerVerifier, VerificationEngine, VerificationOutcome};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Metadata, verification outcome and asset locations for one container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackDescriptor {
    pub fields: TrackFields,
    pub verify: VerificationOutcome,
    pub assets: AssetSet,
}

/// Bytes of a resolved asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetContent {
    pub member: String,
    pub data: Vec<u8>,
    pub media_type: &'static str,
}

/// Composes manifest fields, verification and asset resolution
#[derive(Debug, Clone)]
pub struct TrackDescriber {
    engine: VerificationEngine,
    placeholder: String,
    max_member_bytes: u64,
}

impl Default for TrackDescriber {
    fn default() -> Self {
        Self {
            engine: VerificationEngine::builtin(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            max_member_bytes: DEFAULT_MAX_MEMBER_BYTES,
        }
    }
}

impl TrackDescriber {
    pub fn new(engine: VerificationEngine) -> Self {
        Self {
            engine,
            ..Self::default()
        }
    }

    pub fn from_config(config: &AifmConfig) -> Self {
        Self {
            engine: VerificationEngine::from_config(config),
            placeholder: config.placeholder.clone(),
            max_member_bytes: config.limits.max_member_bytes,
        }
    }

    /// Use an external verifier instead of the builtin one
    pub fn with_external(mut self, verifier: Arc<dyn ContainerVerifier>) -> Self {
        self.engine = self.engine.with_external(verifier);
        self
    }

    pub fn engine(&self) -> &VerificationEngine {
        &self.engine
    }

    /// Describe the container at `path`.
    ///
    /// Never fails: an unreadable container yields placeholder fields, no
    /// assets, and whatever status the verifier reports for it.
    pub fn describe(&self, path: &Path) -> TrackDescriptor {
        let (fields, assets) = match self.open(path) {
            Ok(mut container) => {
                let manifest = Manifest::from_container(&mut container);
                (
                    TrackFields::from_manifest(&manifest, &self.placeholder),
                    AssetSet::resolve(&container),
                )
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot open container");
                (TrackFields::placeholder(&self.placeholder), AssetSet::absent())
            }
        };

        TrackDescriptor {
            fields,
            verify: self.engine.verify(path),
            assets,
        }
    }

    /// Resolve and read an asset; `None` when the container has no such asset
    pub fn read_asset(&self, path: &Path, kind: AssetKind) -> Result<Option<AssetContent>> {
        let mut container = self.open(path)?;
        let Some(member) = resolve(&container, kind).member else {
            return Ok(None);
        };

        let data = container.read_member(&member)?;
        Ok(Some(AssetContent {
            media_type: media_type(&member),
            member,
            data,
        }))
    }

    fn open(&self, path: &Path) -> Result<Container> {
        Ok(Container::open(path)?.with_member_limit(self.max_member_bytes))
    }
}
