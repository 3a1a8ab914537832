//! Asset resolution
//!
//! Containers in the wild do not agree on file names, so each semantic asset
//! kind is located with ranked heuristics: an allowed prefix, a
//! priority-ordered extension list and a set of hint substrings.

use crate::container::{extension_of, is_image, Container, MANIFEST_PATH, METADATA_PREFIX};
use serde::{Deserialize, Serialize};
use std::io::{Read, Seek};
use std::str::FromStr;

/// Exact cover locations, checked in order before falling back to a scan
pub const PREFERRED_COVER_PATHS: &[&str] = &[
    "metadata/cover.png",
    "metadata/cover.jpg",
    "metadata/cover.jpeg",
    "metadata/cover.webp",
    "cover.png",
    "cover.jpg",
    "cover.jpeg",
    "cover.webp",
];

/// Semantic role of a container member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Cover,
    Declaration,
    Prompt,
    Lyrics,
    Manifest,
}

impl AssetKind {
    pub const ALL: [AssetKind; 5] = [
        AssetKind::Cover,
        AssetKind::Declaration,
        AssetKind::Prompt,
        AssetKind::Lyrics,
        AssetKind::Manifest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Cover => "cover",
            AssetKind::Declaration => "declaration",
            AssetKind::Prompt => "prompt",
            AssetKind::Lyrics => "lyrics",
            AssetKind::Manifest => "manifest",
        }
    }

    /// Selection rule for the heuristic kinds; `None` for cover and manifest
    pub fn rule(&self) -> Option<SelectionRule> {
        match self {
            AssetKind::Declaration => Some(SelectionRule {
                prefixes: &[METADATA_PREFIX],
                extensions: &[".pdf", ".txt"],
                hints: &["declar", "legal", "license", "statement"],
            }),
            AssetKind::Prompt => Some(SelectionRule {
                prefixes: &[METADATA_PREFIX],
                extensions: &[".txt"],
                hints: &["prompt", "suno", "udio", "instruction"],
            }),
            AssetKind::Lyrics => Some(SelectionRule {
                prefixes: &[METADATA_PREFIX],
                extensions: &[".txt"],
                hints: &["lyric", "lyrics", "words", "verse"],
            }),
            AssetKind::Cover | AssetKind::Manifest => None,
        }
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for AssetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cover" => Ok(AssetKind::Cover),
            "declaration" => Ok(AssetKind::Declaration),
            "prompt" => Ok(AssetKind::Prompt),
            "lyrics" => Ok(AssetKind::Lyrics),
            "manifest" => Ok(AssetKind::Manifest),
            other => Err(format!("unknown asset kind: {}", other)),
        }
    }
}

/// Prefix, extension and hint rules for one asset kind
#[derive(Debug, Clone, Copy)]
pub struct SelectionRule {
    /// Lowercase prefixes a member path must start with
    pub prefixes: &'static [&'static str],
    /// Allowed extensions, most preferred first
    pub extensions: &'static [&'static str],
    /// Substrings that mark a member as a strong match
    pub hints: &'static [&'static str],
}

impl SelectionRule {
    fn extension_rank(&self, path: &str) -> usize {
        let ext = extension_of(path);
        self.extensions
            .iter()
            .position(|allowed| *allowed == ext)
            .unwrap_or(usize::MAX)
    }

    /// Pick the best member among `members`.
    ///
    /// Members carrying a hint win over those that do not; ties break on
    /// extension priority, then lowercase path.
    pub fn select<'a>(&self, members: &'a [String]) -> Option<&'a String> {
        let candidates: Vec<&String> = members
            .iter()
            .filter(|path| !path.is_empty() && !path.ends_with('/'))
            .filter(|path| {
                let lower = path.to_lowercase();
                self.prefixes.iter().any(|prefix| lower.starts_with(prefix))
            })
            .filter(|path| self.extensions.contains(&extension_of(path).as_str()))
            .collect();

        let hinted: Vec<&String> = candidates
            .iter()
            .copied()
            .filter(|path| {
                let lower = path.to_lowercase();
                self.hints.iter().any(|hint| lower.contains(hint))
            })
            .collect();

        let pool = if hinted.is_empty() { candidates } else { hinted };

        pool.into_iter()
            .min_by_key(|path| (self.extension_rank(path), path.to_lowercase()))
    }
}

/// Result of resolving one asset kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    pub kind: AssetKind,
    pub exists: bool,
    pub member: Option<String>,
    /// Lowercase extension without the dot; always `json` for the manifest
    pub extension: String,
}

impl AssetDescriptor {
    pub fn absent(kind: AssetKind) -> Self {
        Self {
            kind,
            exists: false,
            member: None,
            extension: default_extension(kind),
        }
    }

    fn found(kind: AssetKind, member: &str) -> Self {
        let extension = match kind {
            AssetKind::Manifest => default_extension(kind),
            _ => extension_of(member).trim_start_matches('.').to_string(),
        };
        Self {
            kind,
            exists: true,
            member: Some(member.to_string()),
            extension,
        }
    }
}

fn default_extension(kind: AssetKind) -> String {
    match kind {
        AssetKind::Manifest => "json".to_string(),
        _ => String::new(),
    }
}

/// Locate the cover image among `members`
pub fn find_cover(members: &[String]) -> Option<&String> {
    for preferred in PREFERRED_COVER_PATHS {
        if let Some(found) = members.iter().find(|path| path.as_str() == *preferred) {
            return Some(found);
        }
    }

    members.iter().find(|path| {
        let lower = path.to_lowercase();
        is_image(&lower) && (!lower.contains('/') || lower.starts_with(METADATA_PREFIX))
    })
}

/// Resolve `kind` against a member list (archive order)
pub fn resolve_members(members: &[String], kind: AssetKind) -> AssetDescriptor {
    let found = match kind {
        AssetKind::Cover => find_cover(members),
        AssetKind::Manifest => members.iter().find(|path| path.as_str() == MANIFEST_PATH),
        _ => kind.rule().and_then(|rule| rule.select(members)),
    };

    tracing::debug!(kind = %kind, member = ?found, "resolved asset");
    match found {
        Some(member) => AssetDescriptor::found(kind, member),
        None => AssetDescriptor::absent(kind),
    }
}

/// Resolve `kind` inside an opened container
pub fn resolve<R: Read + Seek>(container: &Container<R>, kind: AssetKind) -> AssetDescriptor {
    resolve_members(container.members(), kind)
}

/// Descriptors for every asset kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSet {
    pub cover: AssetDescriptor,
    pub declaration: AssetDescriptor,
    pub prompt: AssetDescriptor,
    pub lyrics: AssetDescriptor,
    pub manifest: AssetDescriptor,
}

impl AssetSet {
    /// Every kind absent
    pub fn absent() -> Self {
        Self {
            cover: AssetDescriptor::absent(AssetKind::Cover),
            declaration: AssetDescriptor::absent(AssetKind::Declaration),
            prompt: AssetDescriptor::absent(AssetKind::Prompt),
            lyrics: AssetDescriptor::absent(AssetKind::Lyrics),
            manifest: AssetDescriptor::absent(AssetKind::Manifest),
        }
    }

    pub fn resolve<R: Read + Seek>(container: &Container<R>) -> Self {
        let members = container.members();
        Self {
            cover: resolve_members(members, AssetKind::Cover),
            declaration: resolve_members(members, AssetKind::Declaration),
            prompt: resolve_members(members, AssetKind::Prompt),
            lyrics: resolve_members(members, AssetKind::Lyrics),
            manifest: resolve_members(members, AssetKind::Manifest),
        }
    }

    pub fn get(&self, kind: AssetKind) -> &AssetDescriptor {
        match kind {
            AssetKind::Cover => &self.cover,
            AssetKind::Declaration => &self.declaration,
            AssetKind::Prompt => &self.prompt,
            AssetKind::Lyrics => &self.lyrics,
            AssetKind::Manifest => &self.manifest,
        }
    }
}
