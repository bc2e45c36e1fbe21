//! Decode errors.

use crate::ChunkKind;

/// Result alias used by every decode entry point.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Everything that can go wrong while decoding a terrain container.
///
/// None of these are recoverable: the format is inferred rather than
/// documented, so a mismatch means an assumption about the layout is wrong.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Bad magic number or tag in a container or editor file header.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A version that is unknown or inconsistent with the chunks present.
    #[error("version mismatch: {0}")]
    VersionMismatch(String),

    /// A chunk payload that failed to decompress to its declared size.
    #[error("corrupt {kind} chunk: {reason}")]
    CorruptChunk { kind: ChunkKind, reason: String },

    /// An LZ4 block that failed to inflate to its declared size, before it is
    /// attributed to a chunk or editor payload.
    #[error("lz4 block: {0}")]
    Decompress(String),

    /// Scene metadata needed for decoding was not supplied.
    #[error("missing metadata: {0}")]
    MissingMetadata(&'static str),

    /// The delegated PNG decoder failed.
    #[error("image decode failed: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// A decoded image had a pixel layout the chunk cannot interpret.
    #[error("unexpected pixel layout in {kind} chunk: {bytes_per_pixel} bytes per pixel")]
    PixelLayout {
        kind: ChunkKind,
        bytes_per_pixel: usize,
    },

    /// A length prefix or fixed-size read past the end of the buffer.
    #[error("buffer overrun at offset {offset}: needed {needed} bytes, {available} available")]
    BufferOverrun {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Node or pixel counts that do not fit the grid they are reordered into.
    #[error("grid mismatch: {height}x{width} grid cannot hold {len} entries")]
    GridMismatch {
        height: usize,
        width: usize,
        len: usize,
    },

    /// Detail level index outside the resolution table.
    #[error("detail level {0} is outside the resolution table")]
    InvalidDetailLevel(usize),
}

impl DecodeError {
    pub(crate) fn corrupt(kind: ChunkKind, reason: impl Into<String>) -> Self {
        Self::CorruptChunk {
            kind,
            reason: reason.into(),
        }
    }
}
