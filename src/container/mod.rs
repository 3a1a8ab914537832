mod format;
mod reader;
mod writer;

pub use format::{
    compression_for, extension_of, file_name_of, file_stem_of, is_audio, is_image, media_type,
    normalize_path, AUDIO_EXTENSIONS, DEFAULT_MAX_MEMBER_BYTES, IMAGE_EXTENSIONS, MANIFEST_PATH,
    METADATA_PREFIX, PAYLOAD_PREFIX,
};
pub use reader::Container;
pub use writer::ContainerWriter;
