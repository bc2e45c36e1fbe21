//! Heightmap chunk decoding.

use crate::error::DecodeResult;
use crate::grid::{GridDims, transpose};
use crate::normalized::decode_u16;
use crate::pixels::decode_png_with_width;
use crate::reader::ByteReader;
use crate::{ChunkKind, NodePayload};

/// Terrain height bounds used to scale normalized heightmap samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightRange {
    pub min: f32,
    pub max: f32,
}

impl Default for HeightRange {
    /// Bounds the engine assumes when a scene declares none.
    fn default() -> Self {
        Self {
            min: -100.0,
            max: 500.0,
        }
    }
}

impl HeightRange {
    /// Map a normalized sample in `[0, 1]` onto the terrain height range.
    #[must_use]
    pub fn rescale(&self, norm: f32) -> f32 {
        let (min, max) = (self.min.abs(), self.max.abs());
        if self.min > 0.0 {
            (max - min) * norm + min
        } else {
            (max + min) * norm - min
        }
    }
}

/// Decode the decompressed height chunk.
///
/// Each node is a 16-bit grayscale PNG. Pixels are stored column-major and
/// so are the nodes, so both levels are transposed into row-major order.
pub fn decode_heights(
    data: &[u8],
    node_count: usize,
    grid: Option<GridDims>,
    range: HeightRange,
) -> DecodeResult<Vec<NodePayload>> {
    let grid = GridDims::require(
        grid,
        node_count,
        "height chunk needs the terrain grid dimensions",
    )?;

    let mut reader = ByteReader::new(data);
    let mut nodes = Vec::with_capacity(node_count);
    for _ in 0..node_count {
        nodes.push(NodePayload::Dense(decode_node(&mut reader, range)?));
    }

    transpose(nodes, grid.x, grid.y)
}

fn decode_node(reader: &mut ByteReader<'_>, range: HeightRange) -> DecodeResult<Vec<f32>> {
    let pixels = decode_png_with_width(reader.read_sized()?, ChunkKind::Height, 2)?;
    let values = pixels
        .data
        .chunks_exact(2)
        .map(|p| range.rescale(decode_u16(u16::from_le_bytes([p[0], p[1]]))))
        .collect();
    transpose(values, pixels.height as usize, pixels.width as usize)
}
