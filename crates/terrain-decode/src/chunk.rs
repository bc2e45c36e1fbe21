//! Container header, chunk descriptors and chunk payload framing.

use std::fmt;

use crate::error::{DecodeError, DecodeResult};
use crate::reader::ByteReader;

/// Magic number at the start of a compiled terrain container.
pub const CONTAINER_MAGIC: u32 = 0x3652_475A;

/// Four-character tag following the magic.
pub const CONTAINER_TAG: [u8; 4] = *b"RTRN";

/// Width of the per-chunk header that precedes the compressed bytes.
pub const CHUNK_HEADER_SIZE: usize = 40;

/// Width of one chunk descriptor in the container header.
pub const DESCRIPTOR_SIZE: usize = 20;

/// The five sub-resources of a terrain container, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkKind {
    MaterialIndex,
    Height,
    Normal,
    Weight,
    Physics,
}

impl ChunkKind {
    /// Chunk order for a container of the given version.
    #[must_use]
    pub fn for_version(version: i32) -> &'static [ChunkKind] {
        const V1: &[ChunkKind] = &[
            ChunkKind::MaterialIndex,
            ChunkKind::Height,
            ChunkKind::Normal,
            ChunkKind::Weight,
        ];
        const V2: &[ChunkKind] = &[
            ChunkKind::MaterialIndex,
            ChunkKind::Height,
            ChunkKind::Normal,
            ChunkKind::Weight,
            ChunkKind::Physics,
        ];
        if version >= 2 { V2 } else { V1 }
    }

    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::MaterialIndex => "MIDX",
            Self::Height => "HGHT",
            Self::Normal => "NRML",
            Self::Weight => "WGHT",
            Self::Physics => "PHYM",
        }
    }
}

impl fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Fixed container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    pub magic: u32,
    pub tag: [u8; 4],
    pub version: i32,
}

impl ContainerHeader {
    /// Read and validate the header.
    ///
    /// The magic is checked before anything else is read, so a foreign file
    /// is rejected after its first four bytes.
    pub fn read(reader: &mut ByteReader<'_>) -> DecodeResult<Self> {
        let magic = reader.read_u32()?;
        if magic != CONTAINER_MAGIC {
            return Err(DecodeError::UnsupportedFormat(format!(
                "container magic {magic:#010x}, expected {CONTAINER_MAGIC:#010x}"
            )));
        }

        let tag = reader.read_u32()?.to_le_bytes();
        if tag != CONTAINER_TAG {
            return Err(DecodeError::UnsupportedFormat(format!(
                "container tag {:?}, expected {:?}",
                String::from_utf8_lossy(&tag),
                String::from_utf8_lossy(&CONTAINER_TAG),
            )));
        }

        let version = reader.read_i32()?;
        if !(1..=2).contains(&version) {
            return Err(DecodeError::VersionMismatch(format!(
                "container version {version}, expected 1 or 2"
            )));
        }

        Ok(Self {
            magic,
            tag,
            version,
        })
    }
}

/// One entry of the descriptor table following the container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkDescriptor {
    pub kind: ChunkKind,
    /// Type word as stored; not validated against `kind`.
    pub type_tag: u32,
    pub version: i32,
    pub offset: u32,
    /// Chunk header plus compressed bytes, despite the name.
    pub png_size: i32,
    pub decompressed_size: i32,
}

impl ChunkDescriptor {
    pub fn read(reader: &mut ByteReader<'_>, kind: ChunkKind) -> DecodeResult<Self> {
        Ok(Self {
            kind,
            type_tag: reader.read_u32()?,
            version: reader.read_i32()?,
            offset: reader.read_u32()?,
            png_size: reader.read_i32()?,
            decompressed_size: reader.read_i32()?,
        })
    }

    /// Number of compressed bytes after the chunk header.
    pub fn compressed_len(&self) -> DecodeResult<usize> {
        usize::try_from(i64::from(self.png_size) - CHUNK_HEADER_SIZE as i64).map_err(|_| {
            DecodeError::corrupt(
                self.kind,
                format!("declared size {} is smaller than its header", self.png_size),
            )
        })
    }

    pub fn decompressed_len(&self) -> DecodeResult<usize> {
        usize::try_from(self.decompressed_size).map_err(|_| {
            DecodeError::corrupt(
                self.kind,
                format!("negative decompressed size {}", self.decompressed_size),
            )
        })
    }
}

/// Derive the node count from the descriptor table.
///
/// The container has no node count field. Everything between the end of the
/// material index and the start of the normal chunk, minus the height
/// payload, is the height chunk's `u32` offset table.
pub fn derive_node_count(
    material_index: &ChunkDescriptor,
    height: &ChunkDescriptor,
    normal: &ChunkDescriptor,
) -> DecodeResult<usize> {
    let table_bytes = i64::from(normal.offset)
        - i64::from(height.png_size)
        - (i64::from(material_index.offset) + i64::from(material_index.png_size));
    usize::try_from(table_bytes / 4).map_err(|_| {
        DecodeError::corrupt(
            ChunkKind::Height,
            format!("descriptor offsets imply a negative node table ({table_bytes} bytes)"),
        )
    })
}

/// Per-chunk header preceding the compressed payload.
///
/// None of these fields drive decoding; the descriptor sizes do. They are kept
/// so callers can inspect them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChunkHeader {
    pub count: i64,
    pub decompressed_size: i64,
    pub compressed_size: i64,
    pub reserved: i64,
    /// Matches bytes found in the companion editor file; likely an id.
    pub checksum: u32,
    pub block_size_hint: u32,
}

impl ChunkHeader {
    pub fn read(reader: &mut ByteReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            count: reader.read_i64()?,
            decompressed_size: reader.read_i64()?,
            compressed_size: reader.read_i64()?,
            reserved: reader.read_i64()?,
            checksum: reader.read_u32()?,
            block_size_hint: reader.read_u32()?,
        })
    }
}

/// Material-index variant of the chunk header: four opaque words and the
/// scene identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaterialIndexHeader {
    pub reserved: [i64; 4],
    pub scene_id: u64,
}

impl MaterialIndexHeader {
    pub fn read(reader: &mut ByteReader<'_>) -> DecodeResult<Self> {
        let mut reserved = [0i64; 4];
        for word in &mut reserved {
            *word = reader.read_i64()?;
        }
        Ok(Self {
            reserved,
            scene_id: reader.read_u64()?,
        })
    }
}

/// Read the compressed bytes that follow a chunk header and inflate them to
/// exactly the declared size.
pub fn decompress_chunk(
    reader: &mut ByteReader<'_>,
    descriptor: &ChunkDescriptor,
) -> DecodeResult<Vec<u8>> {
    let compressed = reader.read_bytes(descriptor.compressed_len()?)?;
    let expected = descriptor.decompressed_len()?;
    decompress_exact(compressed, expected).map_err(|e| match e {
        DecodeError::Decompress(reason) => DecodeError::corrupt(descriptor.kind, reason),
        other => other,
    })
}

/// Inflate an LZ4 block into a buffer of exactly `expected` bytes.
///
/// Failures are [`DecodeError::Decompress`]; callers that know which chunk
/// or file the block came from rewrap them.
pub fn decompress_exact(compressed: &[u8], expected: usize) -> DecodeResult<Vec<u8>> {
    // One LZ4 block byte expands to at most 255 bytes.
    if expected > compressed.len().saturating_mul(255).saturating_add(16) {
        return Err(DecodeError::Decompress(format!(
            "declared {expected} bytes cannot come from a {} byte block",
            compressed.len()
        )));
    }
    let mut output = vec![0u8; expected];
    let produced = lz4_flex::block::decompress_into(compressed, &mut output)
        .map_err(|e| DecodeError::Decompress(e.to_string()))?;
    if produced != expected {
        return Err(DecodeError::Decompress(format!(
            "inflated to {produced} bytes, declared {expected}"
        )));
    }
    Ok(output)
}

/// Read the `u32` node offset table that opens every chunk except the
/// material index.
pub fn read_node_offsets(reader: &mut ByteReader<'_>, node_count: usize) -> DecodeResult<Vec<u32>> {
    reader.read_u32_array(node_count)
}
