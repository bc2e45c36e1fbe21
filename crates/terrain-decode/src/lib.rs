//! Decode compiled terrain containers (`terrain.bin`).
//!
//! A container packs five chunks (material index, heightmaps, normal maps,
//! paint weights and physics materials) as LZ4-compressed blocks of
//! per-node PNG images. This crate provides pure synchronous functions that
//! turn those bytes into per-node float arrays. File access, scene metadata
//! and the editor format live in the `terrain` crate.
//!
//! # Design principles
//!
//! - **Synchronous**: No async, no threading primitives
//! - **User-controlled parallelism**: Client decides how to parallelize
//! - **No I/O**: Every entry point takes a byte slice
//!
//! # Key functions
//!
//! - [`decode_u16`] / [`decode_s8`]: Bit-exact UNORM/SNORM to float
//! - [`transpose`]: Column-major to row-major reordering
//! - [`decompress_chunk`]: Inflate a chunk payload to its declared size
//! - [`decode_material_index`], [`decode_heights`], [`decode_normals`],
//!   [`decode_weights`], [`decode_physics`]: Per-chunk node decoding

mod error;

pub mod chunk;
pub mod grid;
pub mod height;
pub mod material_index;
pub mod normal;
pub mod normalized;
pub mod physics;
pub mod pixels;
pub mod reader;
pub mod weight;

pub use chunk::{
    CHUNK_HEADER_SIZE, CONTAINER_MAGIC, CONTAINER_TAG, ChunkDescriptor, ChunkHeader, ChunkKind,
    ContainerHeader, MaterialIndexHeader, decompress_chunk, decompress_exact, derive_node_count,
    read_node_offsets,
};
pub use error::{DecodeError, DecodeResult};
pub use grid::{GridDims, transpose};
pub use height::{HeightRange, decode_heights};
pub use material_index::{MATERIAL_INDEX_LAYERS, decode_material_index};
pub use normal::decode_normals;
pub use normalized::{decode_s8, decode_u16};
pub use physics::decode_physics;
pub use pixels::{PixelBuffer, decode_png, pixels_to_floats};
pub use reader::ByteReader;
pub use weight::decode_weights;

/// Paint layer slots per node in the weight chunk.
pub const WEIGHT_SLOTS: usize = 16;

/// Physics material records per node.
pub const PHYSICS_SLOTS: usize = 4;

/// Side length (minus one) of a node's vertex grid for each detail level.
pub const DETAIL_LEVELS: [u32; 11] = [1, 2, 4, 8, 16, 32, 64, 128, 256, 512, 1024];

/// Paint layers of one node, indexed by slot.
pub type WeightLayers = [Option<Vec<f32>>; WEIGHT_SLOTS];

/// Physics material records of one node.
pub type PhysicsLayers = [Option<Vec<u8>>; PHYSICS_SLOTS];

/// Vertices per axis for a detail level index: `DETAIL_LEVELS[level] + 1`.
pub fn vertex_resolution(level: usize) -> DecodeResult<u32> {
    DETAIL_LEVELS
        .get(level)
        .map(|side| side + 1)
        .ok_or(DecodeError::InvalidDetailLevel(level))
}

/// Decoded data of one node (or one material-index layer).
#[derive(Debug, Clone, PartialEq)]
pub enum NodePayload {
    /// One float per sample: heights, normal channels, material index.
    Dense(Vec<f32>),
    /// Sixteen optional paint layers.
    Weights(WeightLayers),
    /// Four raw physics material records.
    Physics(PhysicsLayers),
}

impl NodePayload {
    #[must_use]
    pub fn as_dense(&self) -> Option<&[f32]> {
        match self {
            Self::Dense(values) => Some(values),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_weights(&self) -> Option<&WeightLayers> {
        match self {
            Self::Weights(layers) => Some(layers),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_physics(&self) -> Option<&PhysicsLayers> {
        match self {
            Self::Physics(layers) => Some(layers),
            _ => None,
        }
    }

    /// Number of samples held, summed over present layers.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        match self {
            Self::Dense(values) => values.len(),
            Self::Weights(layers) => layers.iter().flatten().map(Vec::len).sum(),
            Self::Physics(layers) => layers.iter().flatten().map(Vec::len).sum(),
        }
    }
}
