//! aifm-rs: integrity verification and asset resolution for AIFM containers
//!
//! An AIFM container is a zip archive holding a JSON manifest
//! (`manifest.json`), payload audio under `payload/`, and auxiliary assets
//! (cover art, declaration, prompt, lyrics) under `metadata/`. This library
//! provides:
//! - Container reading and authoring
//! - Manifest lookup with multi-alias dotted paths
//! - SHA-256 integrity verification with a lenient manifest-only warning
//! - Heuristic resolution of semantically typed assets
//! - Cached track descriptors for a playlist
//!
//! # Example
//!
//! ```no_run
//! use aifm_rs::{TrackDescriber, VerificationStatus};
//! use std::path::Path;
//!
//! let describer = TrackDescriber::default();
//! let track = describer.describe(Path::new("song.aifm"));
//!
//! if track.verify.status == VerificationStatus::Tampered {
//!     for check in track.verify.failures() {
//!         eprintln!("{}: {}", check.path, check.reason);
//!     }
//! }
//! println!("author: {}", track.fields.author);
//! ```

// Core modules
pub mod assets;
pub mod cache;
pub mod config;
pub mod container;
pub mod error;
pub mod manifest;
pub mod track;
pub mod verify;

// Re-export commonly used types
pub use assets::{AssetDescriptor, AssetKind, AssetSet};
pub use cache::{PayloadCache, Playlist, TrackCache, TrackEntry};
pub use config::AifmConfig;
pub use container::{Container, ContainerWriter, MANIFEST_PATH, METADATA_PREFIX, PAYLOAD_PREFIX};
pub use error::{AifmError, Result};
pub use manifest::{HashedFile, IntegrityDeclaration, Manifest, TrackFields};
pub use track::{AssetContent, TrackDescriber, TrackDescriptor};
pub use verify::{
    BuiltinVerifier, CheckResult, ContainerVerifier, Engine, FnVerifier, RawVerification,
    VerificationEngine, VerificationOutcome, VerificationStatus,
};
