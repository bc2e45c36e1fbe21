//! Compiled terrain container (`terrain.bin`).

use std::path::Path;

use terrain_decode::{
    ByteReader, ChunkDescriptor, ChunkHeader, ChunkKind, ContainerHeader, DecodeError, GridDims,
    HeightRange, MATERIAL_INDEX_LAYERS, MaterialIndexHeader, NodePayload, decode_heights,
    decode_material_index, decode_normals, decode_physics, decode_weights, decompress_chunk,
    derive_node_count, read_node_offsets,
};

use crate::error::{Error, Result};
use crate::scene::SceneMetadata;

/// Framing read in front of a chunk's compressed bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkFrame {
    MaterialIndex(MaterialIndexHeader),
    Nodes {
        /// Per-node offsets into the decompressed payload, as stored.
        offsets: Vec<u32>,
        header: ChunkHeader,
    },
}

/// One decoded chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub descriptor: ChunkDescriptor,
    pub frame: ChunkFrame,
    /// Material-index layers, or one payload per node.
    pub nodes: Vec<NodePayload>,
}

impl Chunk {
    #[must_use]
    pub fn kind(&self) -> ChunkKind {
        self.descriptor.kind
    }
}

/// Inputs the chunk decoders take from the scene description.
#[derive(Debug, Clone, Copy, Default)]
struct DecodeContext {
    grid: Option<GridDims>,
    heights: HeightRange,
}

impl DecodeContext {
    fn from_scene(scene: Option<&SceneMetadata>) -> Self {
        scene.map_or_else(Self::default, |scene| Self {
            grid: scene.grid(),
            heights: scene.height_range(),
        })
    }
}

/// A fully decoded terrain container.
#[derive(Debug, Clone)]
pub struct TerrainContainer {
    header: ContainerHeader,
    node_count: usize,
    scene_id: Option<u64>,
    chunks: Vec<Chunk>,
}

impl TerrainContainer {
    /// Read and decode the container at `path`.
    pub fn open(path: impl AsRef<Path>, scene: Option<&SceneMetadata>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        tracing::info!("Read {} ({} bytes)", path.display(), bytes.len());
        Self::parse(&bytes, scene)
    }

    /// Decode a container held in memory.
    ///
    /// Grid dimensions and height bounds come from `scene`; without them the
    /// height, normal and weight chunks fail with `MissingMetadata`.
    pub fn parse(bytes: &[u8], scene: Option<&SceneMetadata>) -> Result<Self> {
        let context = DecodeContext::from_scene(scene);
        let mut reader = ByteReader::new(bytes);

        let header = ContainerHeader::read(&mut reader)?;
        let descriptors = read_descriptors(&mut reader, header.version)?;
        let node_count = derive_node_count(&descriptors[0], &descriptors[1], &descriptors[2])?;
        tracing::debug!(
            "Container version {} with {} chunks and {} nodes",
            header.version,
            descriptors.len(),
            node_count
        );

        let mut container = Self {
            header,
            node_count,
            scene_id: None,
            chunks: Vec::with_capacity(descriptors.len()),
        };
        for descriptor in descriptors {
            let chunk = container.read_chunk(&mut reader, descriptor, context)?;
            tracing::debug!(
                "Decoded {} chunk: {} entries, {} samples",
                chunk.kind(),
                chunk.nodes.len(),
                chunk.nodes.iter().map(NodePayload::sample_count).sum::<usize>()
            );
            container.chunks.push(chunk);
        }

        if !reader.is_empty() {
            tracing::warn!("{} trailing bytes after the last chunk", reader.remaining());
        }

        Ok(container)
    }

    fn read_chunk(
        &mut self,
        reader: &mut ByteReader<'_>,
        descriptor: ChunkDescriptor,
        context: DecodeContext,
    ) -> Result<Chunk> {
        let n = self.node_count;
        let frame = match descriptor.kind {
            ChunkKind::MaterialIndex => {
                let header = MaterialIndexHeader::read(reader)?;
                self.capture_scene_id(header.scene_id);
                ChunkFrame::MaterialIndex(header)
            }
            _ => ChunkFrame::Nodes {
                offsets: read_node_offsets(reader, n)?,
                header: ChunkHeader::read(reader)?,
            },
        };

        let data = decompress_chunk(reader, &descriptor)?;
        let nodes = match descriptor.kind {
            ChunkKind::MaterialIndex => decode_material_index(&data, MATERIAL_INDEX_LAYERS)?,
            ChunkKind::Height => decode_heights(&data, n, context.grid, context.heights)?,
            ChunkKind::Normal => decode_normals(&data, n, context.grid)?,
            ChunkKind::Weight => decode_weights(&data, n, context.grid)?,
            ChunkKind::Physics => decode_physics(&data, n)?,
        };

        Ok(Chunk {
            descriptor,
            frame,
            nodes,
        })
    }

    fn capture_scene_id(&mut self, id: u64) {
        if self.scene_id.is_none() {
            self.scene_id = Some(id);
        }
    }

    #[must_use]
    pub fn version(&self) -> i32 {
        self.header.version
    }

    #[must_use]
    pub fn tag(&self) -> [u8; 4] {
        self.header.tag
    }

    #[must_use]
    pub fn header(&self) -> &ContainerHeader {
        &self.header
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Identifier from the material-index header, written into the editor
    /// file header.
    #[must_use]
    pub fn scene_id(&self) -> Option<u64> {
        self.scene_id
    }

    /// Chunks in storage order.
    #[must_use]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ChunkDescriptor> {
        self.chunks.iter().map(|chunk| &chunk.descriptor)
    }

    #[must_use]
    pub fn chunk(&self, kind: ChunkKind) -> Option<&Chunk> {
        self.chunks.iter().find(|chunk| chunk.kind() == kind)
    }

    /// Decoded nodes of `kind`, empty if the container lacks that chunk.
    #[must_use]
    pub fn nodes(&self, kind: ChunkKind) -> &[NodePayload] {
        self.chunk(kind).map_or(&[], |chunk| &chunk.nodes)
    }
}

fn read_descriptors(reader: &mut ByteReader<'_>, version: i32) -> Result<Vec<ChunkDescriptor>> {
    let kinds = ChunkKind::for_version(version);
    let mut descriptors = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        let descriptor = ChunkDescriptor::read(reader, kind).map_err(|e| match (kind, e) {
            (ChunkKind::Physics, DecodeError::BufferOverrun { .. }) => {
                DecodeError::VersionMismatch(
                    "version 2 container ends before its physics descriptor".to_string(),
                )
            }
            (_, e) => e,
        })?;
        descriptors.push(descriptor);
    }
    Ok(descriptors)
}
