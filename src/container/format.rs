//! Layout constants and path helpers for AIFM containers

/// Path of the manifest member
pub const MANIFEST_PATH: &str = "manifest.json";

/// Prefix holding cover art, declaration, prompt and lyrics members
pub const METADATA_PREFIX: &str = "metadata/";

/// Prefix holding audio payload members
pub const PAYLOAD_PREFIX: &str = "payload/";

/// Audio extensions recognised under `payload/`
pub const AUDIO_EXTENSIONS: &[&str] = &[
    ".wav", ".mp3", ".m4a", ".aac", ".aiff", ".aif", ".flac", ".ogg",
];

/// Image extensions recognised for cover art
pub const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".webp"];

/// Default upper bound on the uncompressed size of a single member (512 MiB)
pub const DEFAULT_MAX_MEMBER_BYTES: u64 = 512 * 1024 * 1024;

/// Normalize path to forward slashes (cross-platform compatibility)
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Lowercase extension of the last path component, including the leading dot.
///
/// Dotfiles (`.hidden`) and names ending in a dot have no extension.
pub fn extension_of(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(0) | None => String::new(),
        Some(idx) if idx + 1 == name.len() => String::new(),
        Some(idx) => name[idx..].to_lowercase(),
    }
}

/// Last path component of a member path
pub fn file_name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Stem (file name without extension) of a member path
pub fn file_stem_of(path: &str) -> &str {
    let name = file_name_of(path);
    let ext_len = extension_of(name).len();
    &name[..name.len() - ext_len]
}

pub fn is_audio(path: &str) -> bool {
    AUDIO_EXTENSIONS.contains(&extension_of(path).as_str())
}

pub fn is_image(path: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&extension_of(path).as_str())
}

/// Guess the media type served for a member
pub fn media_type(path: &str) -> &'static str {
    match extension_of(path).as_str() {
        ".jpg" | ".jpeg" => "image/jpeg",
        ".png" => "image/png",
        ".webp" => "image/webp",
        ".pdf" => "application/pdf",
        ".txt" => "text/plain; charset=utf-8",
        ".json" => "application/json; charset=utf-8",
        ".mp3" => "audio/mpeg",
        ".wav" => "audio/wav",
        ".m4a" | ".aac" => "audio/mp4",
        ".flac" => "audio/flac",
        ".ogg" => "audio/ogg",
        _ => "application/octet-stream",
    }
}

/// Choose how a member is stored when authoring a container
pub fn compression_for(path: &str) -> zip::CompressionMethod {
    // Already compressed formats gain nothing from deflate
    match extension_of(path).as_str() {
        ".png" | ".jpg" | ".jpeg" | ".webp" | ".mp3" | ".m4a" | ".aac" | ".flac" | ".ogg"
        | ".pdf" => zip::CompressionMethod::Stored,
        _ => zip::CompressionMethod::Deflated,
    }
}
