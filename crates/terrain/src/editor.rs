//! Editor terrain file (`terrain_ed.bin`).
//!
//! The file is a 52-byte header followed by one LZ4 block. The decompressed
//! payload is a flat stream of little-endian 32-bit words: the grid size, then
//! for every node (x outer, y inner) its season masks, normal samples, height
//! blocks and paint layers.

use terrain_decode::{
    ByteReader, ChunkKind, DecodeError, NodePayload, WEIGHT_SLOTS, decompress_exact,
    vertex_resolution,
};

use crate::container::TerrainContainer;
use crate::error::{Error, Result};
use crate::scene::{SceneMetadata, SceneNode, SeasonMasks};

pub const EDITOR_MAGIC: u32 = 0x3130_4B4F;
pub const EDITOR_VERSION: i64 = 2;
pub const EDITOR_HEADER_SIZE: usize = 52;

/// The compressed-size fields count 40 bytes more than the LZ4 block.
const COMPRESSED_SIZE_BIAS: i64 = 40;

/// Words after the vertex block, each repeating the height resolution.
pub const RESERVED_LEVEL_WORDS: usize = 32;

/// Normal maps carry four interleaved channels per vertex.
const NORMAL_CHANNELS: usize = 4;

/// Per-node words outside the sample arrays, used for the size estimate.
const NODE_OVERHEAD_WORDS: usize = 43;

/// What the height block after the level words carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeightSamples {
    /// Heights decoded from the container.
    #[default]
    Decoded,
    /// Zeros, leaving the engine to rebuild heights.
    Zeroed,
}

/// Which normal samples each vertex of the normal block takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalLayout {
    /// Vertex `k` takes samples `k..k + 4`, overlapping its neighbours. This
    /// is what the existing converter writes; whether the editor expects it is
    /// unconfirmed.
    #[default]
    Overlapping,
    /// Vertex `k` takes samples `4k..4k + 4`.
    Interleaved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeOptions {
    pub height_samples: HeightSamples,
    pub normal_layout: NormalLayout,
}

/// Fixed header in front of the compressed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorHeader {
    pub magic: u32,
    /// LZ4 block length plus 40.
    pub compressed_size: i64,
    pub version: i64,
    pub decompressed_size: i64,
    /// Repeats `compressed_size`.
    pub compressed_size_repeat: i64,
    pub reserved: i64,
    pub scene_id: u64,
}

impl EditorHeader {
    #[must_use]
    pub fn new(compressed_len: usize, decompressed_len: usize, scene_id: u64) -> Self {
        let compressed_size = compressed_len as i64 + COMPRESSED_SIZE_BIAS;
        Self {
            magic: EDITOR_MAGIC,
            compressed_size,
            version: EDITOR_VERSION,
            decompressed_size: decompressed_len as i64,
            compressed_size_repeat: compressed_size,
            reserved: 0,
            scene_id,
        }
    }

    pub fn read(reader: &mut ByteReader<'_>) -> Result<Self> {
        let magic = reader.read_u32()?;
        if magic != EDITOR_MAGIC {
            return Err(DecodeError::UnsupportedFormat(format!(
                "editor magic {magic:#010x}, expected {EDITOR_MAGIC:#010x}"
            ))
            .into());
        }

        let compressed_size = reader.read_i64()?;
        let version = reader.read_i64()?;
        if version != EDITOR_VERSION {
            return Err(DecodeError::VersionMismatch(format!(
                "editor version {version}, expected {EDITOR_VERSION}"
            ))
            .into());
        }

        let header = Self {
            magic,
            compressed_size,
            version,
            decompressed_size: reader.read_i64()?,
            compressed_size_repeat: reader.read_i64()?,
            reserved: reader.read_i64()?,
            scene_id: reader.read_u64()?,
        };
        if header.compressed_size_repeat != header.compressed_size {
            tracing::warn!(
                "Editor header size fields disagree: {} vs {}",
                header.compressed_size,
                header.compressed_size_repeat
            );
        }
        Ok(header)
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.magic.to_le_bytes());
        out.extend_from_slice(&self.compressed_size.to_le_bytes());
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&self.decompressed_size.to_le_bytes());
        out.extend_from_slice(&self.compressed_size_repeat.to_le_bytes());
        out.extend_from_slice(&self.reserved.to_le_bytes());
        out.extend_from_slice(&self.scene_id.to_le_bytes());
    }

    /// Length of the LZ4 block following the header.
    pub fn compressed_len(&self) -> Result<usize> {
        usize::try_from(self.compressed_size - COMPRESSED_SIZE_BIAS).map_err(|_| {
            Error::CorruptPayload(format!(
                "compressed size field {} is below {COMPRESSED_SIZE_BIAS}",
                self.compressed_size
            ))
        })
    }

    pub fn decompressed_len(&self) -> Result<usize> {
        usize::try_from(self.decompressed_size).map_err(|_| {
            Error::CorruptPayload(format!(
                "negative decompressed size {}",
                self.decompressed_size
            ))
        })
    }
}

/// One paint layer of a node.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightLayer {
    /// Slot number plus one.
    pub index: u32,
    pub weights: Vec<f32>,
}

/// One node of a decoded editor payload.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorNode {
    /// Loop counters `(x, y)` written by the encoder.
    pub position: (u32, u32),
    pub masks: SeasonMasks,
    pub normal_resolution: (u32, u32),
    pub normals: Vec<f32>,
    pub height_resolution: (u32, u32),
    /// Per-vertex block written before the level words; zero in every file
    /// produced so far.
    pub vertex_block: Vec<f32>,
    pub reserved_levels: [u32; RESERVED_LEVEL_WORDS],
    pub heights: Vec<f32>,
    pub materials: Vec<WeightLayer>,
}

impl EditorNode {
    fn read(reader: &mut ByteReader<'_>) -> Result<Self> {
        let position = (reader.read_u32()?, reader.read_u32()?);
        let masks = SeasonMasks {
            summer: reader.read_u32()?,
            fall: reader.read_u32()?,
            winter: reader.read_u32()?,
            spring: reader.read_u32()?,
        };

        let normal_resolution = (reader.read_u32()?, reader.read_u32()?);
        let normals = reader.read_f32_array(samples_for(normal_resolution, NORMAL_CHANNELS)?)?;

        let height_resolution = (reader.read_u32()?, reader.read_u32()?);
        let vertices = samples_for(height_resolution, 1)?;
        let vertex_block = reader.read_f32_array(vertices)?;

        let mut reserved_levels = [0u32; RESERVED_LEVEL_WORDS];
        for word in &mut reserved_levels {
            *word = reader.read_u32()?;
        }

        let heights = reader.read_f32_array(vertices)?;

        let material_count = reader.read_u32()?;
        let mut materials = Vec::new();
        for _ in 0..material_count {
            materials.push(WeightLayer {
                index: reader.read_u32()?,
                weights: reader.read_f32_array(vertices)?,
            });
        }

        Ok(Self {
            position,
            masks,
            normal_resolution,
            normals,
            height_resolution,
            vertex_block,
            reserved_levels,
            heights,
            materials,
        })
    }
}

/// A decoded editor file.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorFile {
    pub header: EditorHeader,
    pub dimensions: (u32, u32),
    /// Nodes in write order, x outer and y inner.
    pub nodes: Vec<EditorNode>,
}

impl EditorFile {
    #[must_use]
    pub fn node(&self, x: u32, y: u32) -> Option<&EditorNode> {
        let (dim_x, dim_y) = self.dimensions;
        if x >= dim_x || y >= dim_y {
            return None;
        }
        self.nodes.get(x as usize * dim_y as usize + y as usize)
    }
}

/// Serialize a decoded container into a complete editor file.
pub fn encode(
    container: &TerrainContainer,
    scene: &SceneMetadata,
    options: &EncodeOptions,
) -> Result<Vec<u8>> {
    let scene_id = container.scene_id().ok_or(Error::MissingMetadata(
        "container has no scene identifier",
    ))?;
    let payload = encode_payload(container, scene, options)?;
    Ok(pack(&payload, scene_id))
}

/// Serialize the uncompressed editor payload.
pub fn encode_payload(
    container: &TerrainContainer,
    scene: &SceneMetadata,
    options: &EncodeOptions,
) -> Result<Vec<u8>> {
    let name = scene
        .name
        .as_deref()
        .ok_or(Error::MissingMetadata("scene has no name"))?;
    let grid = scene
        .grid()
        .ok_or(Error::MissingMetadata("scene has no terrain dimensions"))?;
    let node_count = grid.node_count();
    if scene.nodes.len() < node_count {
        return Err(Error::MissingMetadata(
            "scene lists fewer nodes than its terrain dimensions",
        ));
    }

    let heights = container.nodes(ChunkKind::Height);
    let normals = container.nodes(ChunkKind::Normal);
    let weights = container.nodes(ChunkKind::Weight);

    let estimate = storage_estimate(container, node_count);
    let mut writer = PayloadWriter::with_capacity(estimate);
    writer.u32(grid.x as u32);
    writer.u32(grid.y as u32);

    let mut current = 0;
    for x in 0..grid.x {
        for y in 0..grid.y {
            let node = NodeSources {
                scene: &scene.nodes[current],
                heights: heights.get(current),
                normals: normals.get(current),
                weights: weights.get(current),
            };
            node.write(&mut writer, (x as u32, y as u32), current, options)?;
            current += 1;
        }
    }

    tracing::info!(
        "Encoded scene '{}': {} nodes, {} payload bytes (estimated {})",
        name,
        node_count,
        writer.len(),
        estimate
    );
    Ok(writer.into_inner())
}

/// Compress `payload` and prefix the editor header.
#[must_use]
pub fn pack(payload: &[u8], scene_id: u64) -> Vec<u8> {
    let compressed = compress_payload(payload);
    let header = EditorHeader::new(compressed.len(), payload.len(), scene_id);
    let mut out = Vec::with_capacity(EDITOR_HEADER_SIZE + compressed.len());
    header.write(&mut out);
    out.extend_from_slice(&compressed);
    tracing::debug!(
        "Packed {} payload bytes into {} compressed bytes",
        payload.len(),
        compressed.len()
    );
    out
}

/// Parse a complete editor file.
pub fn decode(bytes: &[u8]) -> Result<EditorFile> {
    let (header, payload) = unpack(bytes)?;
    let (dimensions, nodes) = decode_payload(&payload)?;
    Ok(EditorFile {
        header,
        dimensions,
        nodes,
    })
}

/// Read the header and inflate the payload without parsing it.
pub fn unpack(bytes: &[u8]) -> Result<(EditorHeader, Vec<u8>)> {
    let mut reader = ByteReader::new(bytes);
    let header = EditorHeader::read(&mut reader)?;
    let compressed = reader.read_bytes(header.compressed_len()?)?;
    if !reader.is_empty() {
        tracing::warn!("{} bytes after the compressed payload", reader.remaining());
    }

    let payload = decompress_payload(compressed, header.decompressed_len()?)?;
    Ok((header, payload))
}

/// Parse an uncompressed editor payload into its dimensions and nodes.
pub fn decode_payload(payload: &[u8]) -> Result<((u32, u32), Vec<EditorNode>)> {
    let mut reader = ByteReader::new(payload);
    let dimensions = (reader.read_u32()?, reader.read_u32()?);
    let count = (dimensions.0 as usize)
        .checked_mul(dimensions.1 as usize)
        .ok_or_else(|| Error::CorruptPayload(format!("grid {dimensions:?} overflows")))?;

    let mut nodes = Vec::new();
    for _ in 0..count {
        nodes.push(EditorNode::read(&mut reader)?);
    }

    if !reader.is_empty() {
        tracing::warn!("{} bytes after the last node", reader.remaining());
    }
    Ok((dimensions, nodes))
}

/// LZ4-compress a raw editor payload.
#[must_use]
pub fn compress_payload(raw: &[u8]) -> Vec<u8> {
    lz4_flex::block::compress(raw)
}

/// Inflate an LZ4 block to exactly `expected` bytes.
pub fn decompress_payload(compressed: &[u8], expected: usize) -> Result<Vec<u8>> {
    decompress_exact(compressed, expected).map_err(|e| match e {
        DecodeError::Decompress(reason) => Error::CorruptPayload(reason),
        other => other.into(),
    })
}

/// Capacity hint for the payload:
/// `4 * (2 + 43 * nodes + heights + normals + (weights + 1 per layer) + physics)`.
///
/// The zero vertex block is not counted and physics is counted but never
/// written, so this is not the payload length.
#[must_use]
pub fn storage_estimate(container: &TerrainContainer, node_count: usize) -> usize {
    let samples = |kind| -> usize {
        container
            .nodes(kind)
            .iter()
            .map(NodePayload::sample_count)
            .sum()
    };
    let weights: usize = container
        .nodes(ChunkKind::Weight)
        .iter()
        .filter_map(NodePayload::as_weights)
        .flat_map(|layers| layers.iter().flatten())
        .map(|layer| layer.len() + 1)
        .sum();

    4 * (2
        + NODE_OVERHEAD_WORDS * node_count
        + samples(ChunkKind::Height)
        + samples(ChunkKind::Normal)
        + weights
        + samples(ChunkKind::Physics))
}

/// Everything needed to write one node.
struct NodeSources<'a> {
    scene: &'a SceneNode,
    heights: Option<&'a NodePayload>,
    normals: Option<&'a NodePayload>,
    weights: Option<&'a NodePayload>,
}

impl NodeSources<'_> {
    fn write(
        &self,
        writer: &mut PayloadWriter,
        position: (u32, u32),
        index: usize,
        options: &EncodeOptions,
    ) -> Result<()> {
        writer.u32(position.0);
        writer.u32(position.1);

        let masks = self.scene.masks.unwrap_or_default();
        writer.u32(masks.summer);
        writer.u32(masks.fall);
        writer.u32(masks.winter);
        writer.u32(masks.spring);

        let normal_res = vertex_resolution(self.scene.normal_level)?;
        writer.u32(normal_res);
        writer.u32(normal_res);
        let normal_vertices = (normal_res as usize).pow(2);
        let normals = self.normals.and_then(NodePayload::as_dense);
        match options.normal_layout {
            NormalLayout::Overlapping => {
                let needed = normal_vertices + NORMAL_CHANNELS - 1;
                let samples = take(normals, needed, ChunkKind::Normal, index)?;
                for window in samples.windows(NORMAL_CHANNELS) {
                    writer.f32s(window);
                }
            }
            NormalLayout::Interleaved => {
                let needed = normal_vertices * NORMAL_CHANNELS;
                writer.f32s(take(normals, needed, ChunkKind::Normal, index)?);
            }
        }

        let height_res = vertex_resolution(self.scene.height_level)?;
        writer.u32(height_res);
        writer.u32(height_res);
        let vertices = (height_res as usize).pow(2);
        writer.zeros(vertices);
        for _ in 0..RESERVED_LEVEL_WORDS {
            writer.u32(height_res);
        }
        match options.height_samples {
            HeightSamples::Decoded => {
                let heights = self.heights.and_then(NodePayload::as_dense);
                writer.f32s(take(heights, vertices, ChunkKind::Height, index)?);
            }
            HeightSamples::Zeroed => writer.zeros(vertices),
        }

        let layers = self
            .weights
            .and_then(NodePayload::as_weights)
            .ok_or(Error::NodeDataTooShort {
                kind: ChunkKind::Weight,
                node: index,
                expected: WEIGHT_SLOTS,
                actual: 0,
            })?;
        let present = layers.iter().flatten().count();
        writer.u32(present as u32);
        for (slot, layer) in layers.iter().enumerate() {
            let Some(layer) = layer else {
                continue;
            };
            writer.u32(slot as u32 + 1);
            writer.f32s(take(Some(layer.as_slice()), vertices, ChunkKind::Weight, index)?);
        }

        Ok(())
    }
}

fn take(values: Option<&[f32]>, count: usize, kind: ChunkKind, node: usize) -> Result<&[f32]> {
    let values = values.unwrap_or_default();
    values.get(..count).ok_or(Error::NodeDataTooShort {
        kind,
        node,
        expected: count,
        actual: values.len(),
    })
}

fn samples_for(resolution: (u32, u32), channels: usize) -> Result<usize> {
    (resolution.0 as usize)
        .checked_mul(resolution.1 as usize)
        .and_then(|n| n.checked_mul(channels))
        .ok_or_else(|| Error::CorruptPayload(format!("resolution {resolution:?} overflows")))
}

/// Little-endian word writer for the payload.
struct PayloadWriter {
    buf: Vec<u8>,
}

impl PayloadWriter {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    fn u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    fn f32s(&mut self, values: &[f32]) {
        for value in values {
            self.buf.extend_from_slice(&value.to_le_bytes());
        }
    }

    fn zeros(&mut self, words: usize) {
        self.buf.resize(self.buf.len() + words * 4, 0);
    }

    fn len(&self) -> usize {
        self.buf.len()
    }

    fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn word(payload: &[u8], index: usize) -> u32 {
        u32::from_le_bytes(payload[index * 4..index * 4 + 4].try_into().unwrap())
    }

    #[test]
    fn header_layout() {
        let mut out = Vec::new();
        EditorHeader::new(100, 4096, 0x0102_0304_0506_0708).write(&mut out);
        assert_eq!(out.len(), EDITOR_HEADER_SIZE);
        assert_eq!(&out[..4], &EDITOR_MAGIC.to_le_bytes());
        assert_eq!(&out[4..12], &140i64.to_le_bytes());
        assert_eq!(&out[12..20], &2i64.to_le_bytes());
        assert_eq!(&out[20..28], &4096i64.to_le_bytes());
        assert_eq!(&out[28..36], &140i64.to_le_bytes());
        assert_eq!(&out[36..44], &0i64.to_le_bytes());
        assert_eq!(&out[44..52], &0x0102_0304_0506_0708u64.to_le_bytes());

        let header = EditorHeader::read(&mut ByteReader::new(&out)).unwrap();
        assert_eq!(header.compressed_len().unwrap(), 100);
        assert_eq!(header.decompressed_len().unwrap(), 4096);
    }

    #[test]
    fn pack_then_decode_empty_grid() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&0u32.to_le_bytes());
        payload.extend_from_slice(&5u32.to_le_bytes());
        let file = decode(&pack(&payload, 42)).unwrap();
        assert_eq!(file.dimensions, (0, 5));
        assert!(file.nodes.is_empty());
        assert_eq!(file.header.scene_id, 42);
    }

    #[test]
    fn wrong_magic_is_unsupported() {
        let mut bytes = pack(&[0; 8], 1);
        bytes[0] ^= 0xFF;
        assert!(matches!(
            decode(&bytes),
            Err(Error::Decode(DecodeError::UnsupportedFormat(_)))
        ));
    }

    #[test]
    fn wrong_version_is_rejected() {
        let mut bytes = pack(&[0; 8], 1);
        bytes[12..20].copy_from_slice(&3i64.to_le_bytes());
        assert!(matches!(
            decode(&bytes),
            Err(Error::Decode(DecodeError::VersionMismatch(_)))
        ));
    }

    #[test]
    fn declared_size_mismatch_is_corrupt() {
        let mut bytes = pack(&[7; 64], 1);
        bytes[20..28].copy_from_slice(&65i64.to_le_bytes());
        assert!(matches!(decode(&bytes), Err(Error::CorruptPayload(_))));
    }

    #[test]
    fn implausible_payload_size_is_corrupt() {
        let compressed = compress_payload(&[1; 16]);
        assert!(matches!(
            decompress_payload(&compressed, usize::MAX / 2),
            Err(Error::CorruptPayload(_))
        ));
    }

    #[test]
    fn weight_slots_are_numbered_from_one() {
        let mut layers: terrain_decode::WeightLayers = Default::default();
        for slot in [2, 7, 15] {
            layers[slot] = Some(vec![0.5; 4]);
        }
        let scene = SceneNode::default();
        let heights = NodePayload::Dense(vec![1.0; 4]);
        let normals = NodePayload::Dense(vec![0.5; 16]);
        let weights = NodePayload::Weights(layers);
        let sources = NodeSources {
            scene: &scene,
            heights: Some(&heights),
            normals: Some(&normals),
            weights: Some(&weights),
        };

        let mut writer = PayloadWriter::with_capacity(0);
        sources
            .write(&mut writer, (0, 0), 0, &EncodeOptions::default())
            .unwrap();
        let payload = writer.into_inner();

        // position 2, masks 4, normals 2 + 16, heights 2 + 4 + 32 + 4.
        let count_at = 2 + 4 + 2 + 16 + 2 + 4 + RESERVED_LEVEL_WORDS + 4;
        assert_eq!(word(&payload, count_at), 3);
        let indices: Vec<u32> = (0..3).map(|i| word(&payload, count_at + 1 + i * 5)).collect();
        assert_eq!(indices, vec![3, 8, 16]);
        assert_eq!(payload.len() / 4, count_at + 1 + 3 * 5);
    }

    fn normal_block(normals: Vec<f32>, layout: NormalLayout) -> Result<Vec<f32>> {
        let scene = SceneNode::default();
        let heights = NodePayload::Dense(vec![1.0; 4]);
        let normals = NodePayload::Dense(normals);
        let weights = NodePayload::Weights(Default::default());
        let sources = NodeSources {
            scene: &scene,
            heights: Some(&heights),
            normals: Some(&normals),
            weights: Some(&weights),
        };
        let options = EncodeOptions {
            normal_layout: layout,
            ..EncodeOptions::default()
        };
        let mut writer = PayloadWriter::with_capacity(0);
        sources.write(&mut writer, (0, 0), 3, &options)?;

        // position 2, masks 4, resolution 2, then 4 samples per vertex.
        let payload = writer.into_inner();
        Ok((0..16)
            .map(|i| f32::from_bits(word(&payload, 8 + i)))
            .collect())
    }

    #[test]
    fn overlapping_normals_slide_one_sample_per_vertex() {
        let normals: Vec<f32> = (0..16u8).map(f32::from).collect();
        let written = normal_block(normals, NormalLayout::Overlapping).unwrap();
        let expected: Vec<f32> = [0u8, 1, 2, 3, 1, 2, 3, 4, 2, 3, 4, 5, 3, 4, 5, 6]
            .into_iter()
            .map(f32::from)
            .collect();
        assert_eq!(written, expected);
    }

    #[test]
    fn interleaved_normals_take_four_samples_per_vertex() {
        let normals: Vec<f32> = (0..16u8).map(f32::from).collect();
        let written = normal_block(normals.clone(), NormalLayout::Interleaved).unwrap();
        assert_eq!(written, normals);
    }

    #[test]
    fn overlapping_normals_need_three_extra_samples() {
        let normals: Vec<f32> = (0..7u8).map(f32::from).collect();
        assert!(normal_block(normals, NormalLayout::Overlapping).is_ok());

        let err = normal_block(vec![0.5; 6], NormalLayout::Overlapping).unwrap_err();
        assert!(matches!(
            err,
            Error::NodeDataTooShort {
                kind: ChunkKind::Normal,
                node: 3,
                expected: 7,
                actual: 6
            }
        ));
    }

    #[test]
    fn short_interleaved_normals_are_reported() {
        let err = normal_block(vec![0.5; 15], NormalLayout::Interleaved).unwrap_err();
        assert!(matches!(
            err,
            Error::NodeDataTooShort {
                kind: ChunkKind::Normal,
                node: 3,
                expected: 16,
                actual: 15
            }
        ));
    }

    #[test]
    fn zeroed_heights_option() {
        let scene = SceneNode::default();
        let heights = NodePayload::Dense(vec![9.0; 4]);
        let normals = NodePayload::Dense(vec![0.5; 16]);
        let weights = NodePayload::Weights(Default::default());
        let sources = NodeSources {
            scene: &scene,
            heights: Some(&heights),
            normals: Some(&normals),
            weights: Some(&weights),
        };
        let mut writer = PayloadWriter::with_capacity(0);
        let options = EncodeOptions {
            height_samples: HeightSamples::Zeroed,
            ..EncodeOptions::default()
        };
        sources.write(&mut writer, (1, 2), 0, &options).unwrap();

        let mut payload = 1u32.to_le_bytes().to_vec();
        payload.extend_from_slice(&1u32.to_le_bytes());
        payload.extend(writer.into_inner());
        let (_, nodes) = decode_payload(&payload).unwrap();
        assert_eq!(nodes[0].position, (1, 2));
        assert_eq!(nodes[0].heights, vec![0.0; 4]);
        assert_eq!(nodes[0].reserved_levels, [2; RESERVED_LEVEL_WORDS]);
        assert!(nodes[0].materials.is_empty());
    }

    proptest! {
        #[test]
        fn arbitrary_payload_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
            let _ = decode_payload(&bytes);
        }

        #[test]
        fn arbitrary_file_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..128)) {
            let _ = decode(&bytes);
        }
    }
}
