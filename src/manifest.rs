//! Manifest support for AIFM containers
//!
//! The manifest (`manifest.json`) is a free-form JSON document. Producers
//! disagree on where they put things, so metadata fields are looked up
//! through ordered lists of dotted-key aliases rather than a fixed schema.
//!
//! # Integrity block
//!
//! ```text
//! "integrity": {
//!   "algorithm": "sha256",
//!   "hashed_files": {
//!     "payload/track.wav": { "sha256": "<lowercase hex>", "bytes": 1234 },
//!     "metadata/cover.png": { "sha256": "<lowercase hex>", "bytes": 99 }
//!   }
//! }
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use aifm_rs::{Container, Manifest, TrackFields};
//! # use aifm_rs::error::Result;
//!
//! # fn main() -> Result<()> {
//! let mut container = Container::open("song.aifm")?;
//! let manifest = Manifest::from_container(&mut container);
//!
//! let fields = TrackFields::from_manifest(&manifest, "—");
//! println!("author: {}", fields.author);
//! # Ok(())
//! # }
//! ```

use crate::container::{Container, MANIFEST_PATH};
use crate::error::{AifmError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::io::{Read, Seek};

/// The only digest algorithm accepted in `integrity.algorithm`
pub const SUPPORTED_ALGORITHM: &str = "sha256";

pub const AUTHOR_PATHS: &[&str] = &["creator.name", "author"];
pub const AI_SYSTEM_PATHS: &[&str] = &["origin.ai_platform", "ai.system", "ai_system"];
pub const TIER_PATHS: &[&str] = &["verification.tier", "tier"];
pub const MODE_PATHS: &[&str] = &["mode", "aifx.governance.mode"];
pub const ORIGIN_URL_PATHS: &[&str] = &["origin.primary_url", "origin_url", "origin.url"];

/// Lowercase hex SHA-256 of `data`
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Parsed manifest document
///
/// Always holds a JSON object at the root; anything else parses to an
/// empty manifest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    root: Map<String, Value>,
}

impl Manifest {
    /// Parse from JSON, reporting decode failures
    pub fn from_json(data: &[u8]) -> Result<Self> {
        match serde_json::from_slice::<Value>(data)? {
            Value::Object(root) => Ok(Self { root }),
            other => Err(AifmError::Json(serde::de::Error::custom(format!(
                "manifest root must be an object, found {}",
                json_type_name(&other)
            )))),
        }
    }

    /// Parse from JSON, degrading to an empty manifest on any error
    pub fn parse(data: &[u8]) -> Self {
        Self::from_json(data).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "unreadable manifest, using empty manifest");
            Self::default()
        })
    }

    /// Read `manifest.json` from a container, degrading to an empty manifest
    /// when it is absent, unreadable or malformed
    pub fn from_container<R: Read + Seek>(container: &mut Container<R>) -> Self {
        if !container.contains(MANIFEST_PATH) {
            return Self::default();
        }

        match container.read_member(MANIFEST_PATH) {
            Ok(data) => Self::parse(&data),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read manifest.json");
                Self::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Root object of the document
    pub fn root(&self) -> &Map<String, Value> {
        &self.root
    }

    /// Resolve a dotted key path through nested objects
    ///
    /// A missing key or a non-object intermediate yields `None`.
    pub fn get(&self, dotted: &str) -> Option<&Value> {
        let mut parts = dotted.split('.');
        let mut current = self.root.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// First candidate path resolving to a non-null value
    pub fn first(&self, candidates: &[&str]) -> Option<&Value> {
        candidates
            .iter()
            .filter_map(|path| self.get(path))
            .find(|value| !value.is_null())
    }

    /// First candidate path resolving to a non-null value, else `default`
    pub fn lookup<'a>(&'a self, candidates: &[&str], default: &'a Value) -> &'a Value {
        self.first(candidates).unwrap_or(default)
    }

    /// First candidate rendered as display text; `None` when absent or empty
    pub fn lookup_text(&self, candidates: &[&str]) -> Option<String> {
        self.first(candidates)
            .map(value_to_text)
            .filter(|text| !text.is_empty())
    }

    /// Extract the integrity declaration
    ///
    /// A missing `algorithm` defaults to sha256. The algorithm is checked
    /// before the file table.
    pub fn integrity(&self) -> std::result::Result<IntegrityDeclaration, IntegrityPrecondition> {
        let empty = Map::new();
        let integrity = self
            .root
            .get("integrity")
            .and_then(Value::as_object)
            .unwrap_or(&empty);

        let algorithm = match integrity.get("algorithm") {
            None => SUPPORTED_ALGORITHM.to_string(),
            Some(Value::Null) => "null".to_string(),
            Some(value) => value_to_text(value),
        };
        if !algorithm.eq_ignore_ascii_case(SUPPORTED_ALGORITHM) {
            return Err(IntegrityPrecondition::UnsupportedAlgorithm(algorithm));
        }

        let table = match integrity.get("hashed_files").and_then(Value::as_object) {
            Some(table) if !table.is_empty() => table,
            _ => return Err(IntegrityPrecondition::MissingHashedFiles),
        };

        let hashed_files = table
            .iter()
            .map(|(path, meta)| HashedFile::from_entry(path, meta))
            .collect();

        Ok(IntegrityDeclaration {
            algorithm,
            hashed_files,
        })
    }
}

/// Render a JSON value as display text (strings unquoted)
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Why an integrity declaration cannot be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityPrecondition {
    /// `integrity.algorithm` names something other than sha256
    UnsupportedAlgorithm(String),
    /// `integrity.hashed_files` is missing, not an object, or empty
    MissingHashedFiles,
}

/// One declared entry of `integrity.hashed_files`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashedFile {
    /// Member path in the container
    pub path: String,

    /// Declared lowercase hex digest
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,

    /// Declared size in bytes, kept even when negative
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<i64>,
}

impl HashedFile {
    fn from_entry(path: &str, meta: &Value) -> Self {
        let (sha256, bytes) = match meta.as_object() {
            Some(meta) => (
                meta.get("sha256")
                    .map(value_to_text)
                    .map(|digest| digest.to_lowercase())
                    .filter(|digest| !digest.is_empty()),
                meta.get("bytes").and_then(Value::as_i64),
            ),
            None => (None, None),
        };

        Self {
            path: path.to_string(),
            sha256,
            bytes,
        }
    }
}

/// The manifest's digest algorithm plus its per-member expectations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityDeclaration {
    pub algorithm: String,
    pub hashed_files: Vec<HashedFile>,
}

impl Default for IntegrityDeclaration {
    fn default() -> Self {
        Self::new()
    }
}

impl IntegrityDeclaration {
    /// Start an empty sha256 declaration
    pub fn new() -> Self {
        Self {
            algorithm: SUPPORTED_ALGORITHM.to_string(),
            hashed_files: Vec::new(),
        }
    }

    /// Record the digest and size of a member
    pub fn add_file(&mut self, path: impl Into<String>, data: &[u8]) {
        self.hashed_files.push(HashedFile {
            path: path.into(),
            sha256: Some(sha256_hex(data)),
            bytes: i64::try_from(data.len()).ok(),
        });
    }

    /// Render as the manifest's `integrity` block
    pub fn to_value(&self) -> Value {
        let mut table = Map::new();
        for file in &self.hashed_files {
            let mut meta = Map::new();
            if let Some(digest) = &file.sha256 {
                meta.insert("sha256".to_string(), Value::String(digest.clone()));
            }
            if let Some(bytes) = file.bytes {
                meta.insert("bytes".to_string(), Value::from(bytes));
            }
            table.insert(file.path.clone(), Value::Object(meta));
        }

        serde_json::json!({
            "algorithm": self.algorithm,
            "hashed_files": table,
        })
    }
}

/// Display metadata extracted from a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackFields {
    pub author: String,
    pub ai_system: String,
    pub tier: String,
    pub mode: String,
    /// Empty when there is no link
    pub origin_url: String,
}

impl TrackFields {
    /// All fields unknown
    pub fn placeholder(placeholder: &str) -> Self {
        Self {
            author: placeholder.to_string(),
            ai_system: placeholder.to_string(),
            tier: placeholder.to_string(),
            mode: placeholder.to_string(),
            origin_url: String::new(),
        }
    }

    pub fn from_manifest(manifest: &Manifest, placeholder: &str) -> Self {
        let field = |paths: &[&str]| {
            manifest
                .lookup_text(paths)
                .unwrap_or_else(|| placeholder.to_string())
        };

        Self {
            author: field(AUTHOR_PATHS),
            ai_system: field(AI_SYSTEM_PATHS),
            tier: field(TIER_PATHS),
            mode: field(MODE_PATHS),
            origin_url: manifest.lookup_text(ORIGIN_URL_PATHS).unwrap_or_default(),
        }
    }
}
